//=========================================================================
// Deferred Queue
//=========================================================================
//
// FIFO buffer for work produced in the middle of a manager step and
// consumed at the next step boundary.
//
// Window hooks push commands here; the manager pushes lifecycle events
// for the host to drain.
//
//=========================================================================

//=== DeferredQueue =======================================================

/// FIFO buffer drained at step boundaries.
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    queue: Vec<T>,
}

impl<T> DeferredQueue<T> {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues an item for the next boundary.
    pub fn push(&mut self, item: T) {
        self.queue.push(item);
    }

    /// Returns an iterator over the queued items.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear()
    }

    /// Takes all items from the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.queue)
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
