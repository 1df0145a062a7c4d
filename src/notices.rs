//! User-facing transient notices
//!
//! Controllers report recoverable failures here instead of returning them to
//! the rendering layer. The queue is bounded; the oldest notice is dropped
//! once the limit is reached.

use crate::ProseError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    /// Low priority problems, such as a failed share
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Queue {
    items: VecDeque<Notice>,
    next_id: u64,
    limit: usize,
}

/// Shared notice queue
#[derive(Debug, Clone)]
pub struct Notices {
    queue: Arc<Mutex<Queue>>,
}

impl Notices {
    pub fn new(limit: usize) -> Self {
        Self {
            queue: Arc::new(Mutex::new(Queue {
                items: VecDeque::with_capacity(limit),
                next_id: 1,
                limit: limit.max(1),
            })),
        }
    }

    /// Add a notice and return its id
    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let mut queue = self.queue.lock();
        let id = queue.next_id;
        queue.next_id += 1;

        if queue.items.len() >= queue.limit {
            queue.items.pop_front();
        }

        let message = message.into();
        debug!(id, ?level, %message, "Notice raised");
        queue.items.push_back(Notice {
            id,
            level,
            message,
            created_at: Utc::now(),
        });
        id
    }

    /// Surface an error unless it belongs to the silent categories
    pub fn report(&self, error: &ProseError) -> Option<u64> {
        if error.is_silent() {
            return None;
        }

        let level = match error {
            ProseError::ShareFailure(_) => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        Some(self.push(level, error.user_message()))
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.queue.lock();
        let before = queue.items.len();
        queue.items.retain(|n| n.id != id);
        queue.items.len() != before
    }

    pub fn clear(&self) {
        self.queue.lock().items.clear();
    }

    /// Snapshot of the current notices, oldest first
    pub fn all(&self) -> Vec<Notice> {
        self.queue.lock().items.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<Notice> {
        self.queue.lock().items.back().cloned()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().items.is_empty()
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(20)
    }
}
