//! Client-side buffer for transactions captured while offline.
//!
//! Items are held in arrival order and handed back as one batch by
//! [`OfflineQueue::flush`]. The queue is `Sync`, so a capture thread and a
//! sync thread can share it behind an `Arc`.

use parking_lot::Mutex;

/// FIFO buffer drained in whole batches.
#[derive(Debug)]
pub struct OfflineQueue<T> {
    pending: Mutex<Vec<T>>,
}

impl<T> Default for OfflineQueue<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }
}

impl<T> OfflineQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an item behind everything already pending.
    pub fn add(&self, item: T) {
        self.pending.lock().push(item);
    }

    /// Takes every pending item, oldest first, leaving the queue empty.
    pub fn flush(&self) -> Vec<T> {
        let batch = std::mem::take(&mut *self.pending.lock());
        if !batch.is_empty() {
            tracing::debug!(count = batch.len(), "offline queue flushed");
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
