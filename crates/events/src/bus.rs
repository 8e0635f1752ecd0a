//! Event publishing/subscription abstraction.
//!
//! The bus distributes events to read models such as the tax-period
//! projection. It is not a store: the records written through the store ports
//! are the source of truth, and a lost publication never rolls anything back.
//!
//! Delivery is at-least-once, so consumers must be idempotent.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// A subscription to a bus. Each subscription receives every message
/// published after it was created.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Collect everything already queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        let mut out = Vec::new();
        while let Ok(m) = self.receiver.try_recv() {
            out.push(m);
        }
        out
    }
}

/// Pub/sub bus with broadcast semantics.
///
/// `publish()` may fail; callers that have already persisted their writes
/// should log the failure rather than abort.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
