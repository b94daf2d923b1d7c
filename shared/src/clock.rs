use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Vector clock mapping node id to a monotonic counter.
///
/// Serialises as a plain JSON map; an absent or empty map decodes to the
/// all-zeros clock. Components missing on either side of a comparison are
/// treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock {
    counters: BTreeMap<String, u64>,
}

impl VectorClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter for a node (zero when absent).
    pub fn get(&self, node_id: &str) -> u64 {
        self.counters.get(node_id).copied().unwrap_or(0)
    }

    /// Bump the local component and return its new value.
    pub fn increment(&mut self, node_id: &str) -> u64 {
        let counter = self.counters.entry(node_id.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Component-wise max with another clock.
    pub fn merge(&mut self, other: &VectorClock) {
        for (node_id, &counter) in &other.counters {
            let entry = self.counters.entry(node_id.clone()).or_insert(0);
            if counter > *entry {
                *entry = counter;
            }
        }
    }

    /// True iff `self` causally precedes `other`: every component of
    /// `self` is <= the matching component of `other`, and at least one
    /// is strictly smaller.
    pub fn happens_before(&self, other: &VectorClock) -> bool {
        let mut strictly_less = false;
        for (node_id, &counter) in &self.counters {
            let theirs = other.get(node_id);
            if counter > theirs {
                return false;
            }
            if counter < theirs {
                strictly_less = true;
            }
        }
        // Ids only the other side knows about still count as an advance.
        for (node_id, &theirs) in &other.counters {
            if theirs > 0 && !self.counters.contains_key(node_id) {
                strictly_less = true;
            }
        }
        strictly_less
    }

    /// True iff `other` is reflected in `self` (every component of
    /// `other` is <= ours). Used to check that replies cover requests.
    pub fn dominates(&self, other: &VectorClock) -> bool {
        other
            .counters
            .iter()
            .all(|(node_id, &counter)| self.get(node_id) >= counter)
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Thread-safe clock handle for one node: tick the own component before an
/// outbound operation, fold reply clocks back in on receipt.
pub struct NodeClock {
    node_id: String,
    clock: Mutex<VectorClock>,
}

impl NodeClock {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            clock: Mutex::new(VectorClock::new()),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Bump the own component and return the clock to send.
    pub fn tick_snapshot(&self) -> VectorClock {
        let mut clock = self.lock();
        clock.increment(&self.node_id);
        clock.clone()
    }

    /// Merge a clock received from a peer.
    pub fn observe(&self, remote: &VectorClock) {
        self.lock().merge(remote);
    }

    pub fn snapshot(&self) -> VectorClock {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VectorClock> {
        // A poisoned clock is still a valid clock; keep going with it.
        self.clock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
