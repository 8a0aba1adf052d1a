//! Process-unique identity tokens.
//!
//! Every tree node and every marker bag carries an identity token. Tokens are
//! drawn from a single process-wide counter, so two tokens compare equal only
//! if they were handed out by the same call to [`NodeId::next`]. Tokens are
//! never reused.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A stable, opaque identity for a tree node.
///
/// Copy-on-write updates keep the id of the node they copy, so the id answers
/// "is this logically the same node" while reference equality answers "is this
/// literally the same allocation".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh, never-before-seen id.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rehydrate an id received from another process.
    ///
    /// The local counter is advanced past `raw` so ids allocated afterwards
    /// cannot collide with transmitted ones.
    pub fn from_raw(raw: u64) -> Self {
        NEXT_NODE_ID.fetch_max(raw + 1, Ordering::Relaxed);
        Self(raw)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Deserialized ids go through [`NodeId::from_raw`] so the local counter never
/// hands out an id that arrived from elsewhere.
impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(NodeId::from_raw)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<NodeId> = (0..1000).map(|_| NodeId::next()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_from_raw_advances_counter() {
        let far = NodeId::next().as_u64() + 10_000;
        let received = NodeId::from_raw(far);
        assert_eq!(received.as_u64(), far);
        assert!(NodeId::next().as_u64() > far);
    }

    #[test]
    fn test_deserialize_advances_counter() {
        let far = NodeId::next().as_u64() + 20_000;
        let id: NodeId = serde_json::from_str(&far.to_string()).unwrap();
        assert_eq!(id.as_u64(), far);
        assert!(NodeId::next().as_u64() > far);
    }

    #[test]
    fn test_display() {
        let id = NodeId::from_raw(7);
        assert_eq!(id.to_string(), "node_7");
    }
}
