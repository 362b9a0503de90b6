//! Transport Module
//!
//! Byte-channel adapters for driving a client or server. Connection
//! establishment, multiplexing and framing beyond the codec's own are left
//! to the integrator.
//!
//! - [`Duplex`]: joins a separate reader and writer into one channel
//! - [`LocalChannel`]: connects a client to a server in the same process

mod duplex;
mod local;

pub use duplex::Duplex;
pub use local::LocalChannel;
