//! Duplex channel
//!
//! Joins a reader and a writer, e.g. a child process's stdout and stdin.

use std::io::{self, BufReader, BufWriter, Read, Write};

/// A `Read + Write` channel made of two halves
pub struct Duplex<R: Read, W: Write> {
    /// Buffered read half
    reader: BufReader<R>,

    /// Buffered write half, flushed by the codec after every frame
    writer: BufWriter<W>,
}

impl<R: Read, W: Write> Duplex<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
        }
    }

    /// Split back into the two halves, flushing pending writes
    pub fn into_parts(self) -> io::Result<(R, W)> {
        let writer = self.writer.into_inner().map_err(|e| e.into_error())?;
        Ok((self.reader.into_inner(), writer))
    }
}

impl<R: Read, W: Write> Read for Duplex<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R: Read, W: Write> Write for Duplex<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
