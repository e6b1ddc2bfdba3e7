//! FIFO queue of events produced during dispatch.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::events::Event;

/// A FIFO queue for events spawned by handlers during dispatch.
///
/// Pop order equals push order. The queue lives inside the dispatcher's call
/// stack and is never shared across threads.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<Event>,
}

impl EventQueue {
    /// Create a new empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Create with pre-allocated capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an event to the back of the queue
    pub fn push(&mut self, event: impl Into<Event>) {
        self.queue.push_back(event.into());
    }

    /// Remove and return the event at the head of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueEmpty`] if the queue has no elements; check
    /// [`EventQueue::is_empty`] first.
    pub fn pop(&mut self) -> Result<Event> {
        self.queue.pop_front().ok_or(Error::QueueEmpty)
    }

    /// Check whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queued events
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
