//! Bounded, lossy single-producer/single-consumer queue between stages.
//!
//! A full queue drops the item being pushed instead of blocking the
//! producer. Neither end is `Clone`, so each queue has exactly one writer
//! and one reader.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::time::Duration;

/// Result of a pop attempt
#[derive(Debug, PartialEq, Eq)]
pub enum Pop<T> {
    Item(T),
    /// Nothing queued right now
    Empty,
    /// The producer is gone and the queue is drained
    Closed,
}

impl<T> Pop<T> {
    #[must_use]
    pub fn into_item(self) -> Option<T> {
        match self {
            Self::Item(item) => Some(item),
            Self::Empty | Self::Closed => None,
        }
    }
}

/// Producer half
#[derive(Debug)]
pub struct QueueWriter<T> {
    tx: Sender<T>,
}

/// Consumer half
#[derive(Debug)]
pub struct QueueReader<T> {
    rx: Receiver<T>,
}

/// Create a queue holding at most `capacity` items
#[must_use]
pub fn frame_queue<T>(capacity: usize) -> (QueueWriter<T>, QueueReader<T>) {
    // A zero-capacity crossbeam channel is a rendezvous; keep at least one slot
    let (tx, rx) = bounded(capacity.max(1));
    (QueueWriter { tx }, QueueReader { rx })
}

impl<T> QueueWriter<T> {
    /// Push without blocking
    ///
    /// Returns false if the item was dropped because the queue is full or
    /// the reader is gone.
    pub fn push(&self, item: T) -> bool {
        match self.tx.try_send(item) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }
}

impl<T> QueueReader<T> {
    /// Pop without blocking
    #[must_use]
    pub fn try_pop(&self) -> Pop<T> {
        match self.rx.try_recv() {
            Ok(item) => Pop::Item(item),
            Err(crossbeam_channel::TryRecvError::Empty) => Pop::Empty,
            Err(crossbeam_channel::TryRecvError::Disconnected) => Pop::Closed,
        }
    }

    /// Pop, waiting at most `timeout` for an item
    #[must_use]
    pub fn pop_timeout(&self, timeout: Duration) -> Pop<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Pop::Item(item),
            Err(RecvTimeoutError::Timeout) => Pop::Empty,
            Err(RecvTimeoutError::Disconnected) => Pop::Closed,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
