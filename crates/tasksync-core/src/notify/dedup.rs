//! Time-windowed duplicate suppression.
//!
//! Remembers when each `(event, task id)` pair was last sent. Entries older
//! than the window are evicted on every insert and the cache never holds
//! more than `capacity` entries, oldest evicted first.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use super::event::NotificationEvent;

pub type DedupKey = (NotificationEvent, i64);

#[derive(Debug)]
pub struct DedupCache {
    window: Duration,
    capacity: usize,
    last_sent: HashMap<DedupKey, Instant>,
    /// Insertion order; may hold stale entries for keys re-sent later.
    order: VecDeque<(DedupKey, Instant)>,
}

impl DedupCache {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            last_sent: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// `true` if `key` may be sent at `now`; records the send when it may.
    pub fn check_and_mark(&mut self, key: DedupKey, now: Instant) -> bool {
        if let Some(last) = self.last_sent.get(&key) {
            if now.saturating_duration_since(*last) < self.window {
                return false;
            }
        }

        self.last_sent.insert(key, now);
        self.order.push_back((key, now));
        self.evict(now);
        true
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&(key, at)) = self.order.front() {
            let expired = now.saturating_duration_since(at) >= self.window;
            if !expired && self.last_sent.len() <= self.capacity {
                break;
            }
            self.order.pop_front();
            if self.last_sent.get(&key) == Some(&at) {
                self.last_sent.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.last_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_empty()
    }
}
