//! Call Context
//!
//! A cancellable value carrying an optional deadline, threaded through every
//! call boundary. Contexts form a tree: a child observes the cancellation of
//! its ancestors, and its deadline is never later than its parent's.
//!
//! Cancellation is cooperative. Nothing aborts a handler that ignores its
//! context; expiry only makes [`Context::err`] report and [`Context::wait`]
//! return.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Select, Sender};
use parking_lot::Mutex;
use thiserror::Error;

/// Reason a context is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellable call context with an optional deadline
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    parent: Option<Context>,

    /// Effective deadline, already clamped to the parent's
    deadline: Option<Instant>,

    /// Dropping the sender disconnects `done_rx`, which wakes waiters
    done_tx: Mutex<Option<Sender<()>>>,
    done_rx: Receiver<()>,
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::new(None, None)
    }

    fn new(parent: Option<Context>, deadline: Option<Instant>) -> Self {
        let (done_tx, done_rx) = channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                parent,
                deadline,
                done_tx: Mutex::new(Some(done_tx)),
                done_rx,
            }),
        }
    }

    /// Derive a child context that can be cancelled independently
    pub fn with_cancel(&self) -> (Context, CancelGuard) {
        let child = Self::new(Some(self.clone()), self.deadline());
        let guard = CancelGuard { ctx: child.clone() };
        (child, guard)
    }

    /// Derive a child context expiring at `deadline` or at the parent's
    /// deadline, whichever comes first
    pub fn with_deadline(&self, deadline: Instant) -> (Context, CancelGuard) {
        let effective = match self.deadline() {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        let child = Self::new(Some(self.clone()), Some(effective));
        let guard = CancelGuard { ctx: child.clone() };
        (child, guard)
    }

    /// Derive a child context expiring after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelGuard) {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            // Too far out to represent
            None => self.with_cancel(),
        }
    }

    /// The effective deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left until the deadline, saturating at zero.
    /// `None` when the context has no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Why the context is done, or `None` while it is still live
    pub fn err(&self) -> Option<ContextError> {
        if self.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Whether the context is cancelled or expired
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Block until the context is done.
    ///
    /// Never returns for a context with no deadline whose chain is never
    /// cancelled.
    pub fn wait(&self) -> ContextError {
        loop {
            if let Some(err) = self.wait_until(None) {
                return err;
            }
        }
    }

    /// Block until the context is done or `timeout` elapses.
    /// Returns `None` if the timeout elapsed first.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ContextError> {
        self.wait_until(Instant::now().checked_add(timeout))
    }

    /// Cancel this context and every context derived from it
    fn cancel(&self) {
        self.inner.done_tx.lock().take();
    }

    fn is_cancelled(&self) -> bool {
        self.chain().any(|ctx| ctx.inner.done_tx.lock().is_none())
    }

    fn chain(&self) -> impl Iterator<Item = &Context> {
        std::iter::successors(Some(self), |ctx| ctx.inner.parent.as_ref())
    }

    fn wait_until(&self, limit: Option<Instant>) -> Option<ContextError> {
        if let Some(err) = self.err() {
            return Some(err);
        }

        let receivers: Vec<&Receiver<()>> = self.chain().map(|ctx| &ctx.inner.done_rx).collect();
        let mut select = Select::new();
        for rx in receivers.iter().copied() {
            select.recv(rx);
        }

        let until = match (self.inner.deadline, limit) {
            (Some(deadline), Some(limit)) => Some(deadline.min(limit)),
            (deadline, limit) => deadline.or(limit),
        };

        match until {
            Some(until) => {
                if let Ok(op) = select.select_deadline(until) {
                    let index = op.index();
                    // Senders are never used, so completing the operation only
                    // observes the disconnect.
                    let _ = op.recv(receivers[index]);
                }
            }
            None => {
                let op = select.select();
                let index = op.index();
                let _ = op.recv(receivers[index]);
            }
        }

        self.err()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.inner.deadline)
            .field("err", &self.err())
            .finish()
    }
}

/// Cancels its context when dropped
///
/// Keep the guard alive for as long as the derived context is in use.
#[must_use = "dropping the guard cancels the context immediately"]
pub struct CancelGuard {
    ctx: Context,
}

impl CancelGuard {
    /// Cancel the context now
    pub fn cancel(self) {
        // Drop does the work
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}

impl fmt::Debug for CancelGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelGuard").finish_non_exhaustive()
    }
}
