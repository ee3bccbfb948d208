//! Markers for local writes the remote store has not confirmed yet.
//!
//! While a marker is live, snapshots from the remote side do not override
//! the task it covers: an edited task keeps its local value, a deleted task
//! stays deleted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::task::Task;

/// What the local side expects the remote row to become.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Present(Task),
    Deleted,
}

#[derive(Debug, Clone)]
struct Marker {
    expected: Expected,
    expires_at: Instant,
    seq: u64,
}

/// Live markers keyed by task id. The newest mutation on an id wins.
#[derive(Debug)]
pub struct PendingMutations {
    markers: HashMap<i64, Marker>,
    ttl: Duration,
    next_seq: u64,
}

impl PendingMutations {
    pub fn new(ttl: Duration) -> Self {
        Self {
            markers: HashMap::new(),
            ttl,
            next_seq: 0,
        }
    }

    /// Record a local write. Returns the marker's sequence number so the
    /// writer can later clear exactly this marker.
    pub fn mark(&mut self, id: i64, expected: Expected, now: Instant) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.markers.insert(
            id,
            Marker {
                expected,
                expires_at: now + self.ttl,
                seq,
            },
        );
        seq
    }

    /// Drop the marker for `id` only if it is still the one numbered `seq`.
    pub fn clear_if_current(&mut self, id: i64, seq: u64) -> bool {
        match self.markers.get(&id) {
            Some(marker) if marker.seq == seq => {
                self.markers.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Unconditionally drop the marker for `id`.
    pub fn confirm(&mut self, id: i64) {
        self.markers.remove(&id);
    }

    pub fn prune_expired(&mut self, now: Instant) {
        self.markers.retain(|_, marker| marker.expires_at > now);
    }

    pub fn expected(&self, id: i64) -> Option<&Expected> {
        self.markers.get(&id).map(|marker| &marker.expected)
    }

    /// Ids whose marker expects the row to be gone.
    pub fn deleted_ids(&self) -> Vec<i64> {
        self.markers
            .iter()
            .filter(|(_, marker)| marker.expected == Expected::Deleted)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
