use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use super::types::Event;

/// Bounded FIFO buffer shared by every topic
///
/// Producers never wait: when the buffer is full the event is dropped and
/// counted. The receiving half lives in a slot so that exactly one dispatch
/// loop can drain it at a time, and hands it back when that loop exits.
pub struct EventQueue<E> {
    tx: mpsc::Sender<Arc<E>>,
    rx: Mutex<Option<mpsc::Receiver<Arc<E>>>>,
    dropped: AtomicU64,
}

impl<E: Event> EventQueue<E> {
    /// `capacity` is clamped to at least 1
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Try to append an event, returning whether it was kept
    pub fn push(&self, event: Arc<E>) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    topic = %event.topic(),
                    name = %event.name(),
                    capacity = self.capacity(),
                    "event queue full, dropping event"
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    topic = %event.topic(),
                    name = %event.name(),
                    "event queue closed, dropping event"
                );
                false
            }
        }
    }

    /// Events currently buffered
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Events rejected since creation
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Take the receiving half; `None` while a loop already owns it
    pub(crate) fn take_receiver(&self) -> Option<mpsc::Receiver<Arc<E>>> {
        self.rx.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Return the receiving half after a loop exits
    pub(crate) fn restore_receiver(&self, rx: mpsc::Receiver<Arc<E>>) {
        *self.rx.lock().unwrap_or_else(PoisonError::into_inner) = Some(rx);
    }
}
