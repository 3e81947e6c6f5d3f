//! Ordered, deduplicated message buffer.
//!
//! Order is insertion order: history pages go in at the front, live messages
//! at the back. Messages are never re-sorted by timestamp. Every id appears at
//! most once.
//!
//! Only live appends are capacity-bounded. Evicting from the front is a memory
//! bound, not data loss: evicted messages stay fetchable from history.

use std::collections::{HashSet, VecDeque};

use turf_proto::{Message, MessageId};

/// Live buffer capacity.
pub const DEFAULT_CAPACITY: usize = 200;

/// Result of [`MessageBuffer::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Id already present; buffer unchanged.
    Duplicate,
    /// Message appended; `evicted` messages were dropped from the front.
    Appended {
        /// Number of oldest messages removed to respect capacity
        evicted: usize,
    },
}

/// Message sequence unique by id.
#[derive(Debug, Clone)]
pub struct MessageBuffer {
    messages: VecDeque<Message>,
    ids: HashSet<MessageId>,
    capacity: usize,
}

impl MessageBuffer {
    /// Create an empty buffer. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self { messages: VecDeque::new(), ids: HashSet::new(), capacity: capacity.max(1) }
    }

    /// Replace the contents with `page`.
    ///
    /// Repeated ids inside the page keep their first occurrence.
    pub fn replace(&mut self, page: Vec<Message>) {
        self.clear();
        for message in page {
            if self.ids.insert(message.id.clone()) {
                self.messages.push_back(message);
            }
        }
    }

    /// Insert an older page before the current oldest message.
    ///
    /// Messages whose id is already buffered are dropped. The page's own
    /// order is kept. Returns the number of messages inserted.
    pub fn prepend(&mut self, page: Vec<Message>) -> usize {
        let fresh: Vec<Message> =
            page.into_iter().filter(|m| self.ids.insert(m.id.clone())).collect();

        let inserted = fresh.len();
        for message in fresh.into_iter().rev() {
            self.messages.push_front(message);
        }
        inserted
    }

    /// Append a live message, evicting from the front past capacity.
    pub fn append(&mut self, message: Message) -> AppendOutcome {
        if !self.ids.insert(message.id.clone()) {
            return AppendOutcome::Duplicate;
        }
        self.messages.push_back(message);

        let mut evicted = 0;
        while self.messages.len() > self.capacity {
            if let Some(oldest) = self.messages.pop_front() {
                self.ids.remove(&oldest.id);
                evicted += 1;
            }
        }
        AppendOutcome::Appended { evicted }
    }

    /// Whether a message with `id` is buffered.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Live capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest buffered message.
    pub fn oldest(&self) -> Option<&Message> {
        self.messages.front()
    }

    /// Newest buffered message.
    pub fn newest(&self) -> Option<&Message> {
        self.messages.back()
    }

    /// Message at `index` (0 is oldest).
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.messages.iter()
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
