//! Markers: typed, identity-bearing metadata attached to tree nodes.
//!
//! A [`Markers`] bag is an ordered set of [`Marker`] entries. Markers are how
//! passes communicate results without changing the logical shape of a tree:
//! search hits, attribution gaps, parse failures and tool provenance are all
//! markers.
//!
//! # Idempotence
//!
//! [`Markers::add_if_absent`] only adds a marker when no marker of the same
//! kind with the same payload key is present. Marking passes use it so that
//! running the same pass twice leaves the marker set unchanged.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// The kind of a [`Marker`], used for presence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    SearchResult,
    MissingType,
    ParseExceptionResult,
    Provenance,
    Custom,
}

impl MarkerKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::SearchResult => "search_result",
            MarkerKind::MissingType => "missing_type",
            MarkerKind::ParseExceptionResult => "parse_exception",
            MarkerKind::Provenance => "provenance",
            MarkerKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marker {
    /// The node was found by a search pass.
    SearchResult {
        id: NodeId,
        description: Option<String>,
    },
    /// The node is missing type attribution it was expected to carry.
    MissingType { id: NodeId, description: String },
    /// The node stands in for source the front-end could not parse.
    ParseExceptionResult { id: NodeId, message: String },
    /// The node was produced or last touched by the named tool.
    Provenance { id: NodeId, source: String },
    /// Tool-specific annotation with an arbitrary JSON payload.
    Custom {
        id: NodeId,
        name: String,
        data: serde_json::Value,
    },
}

impl Marker {
    /// Create a search result marker.
    pub fn search_result(description: Option<String>) -> Self {
        Marker::SearchResult {
            id: NodeId::next(),
            description,
        }
    }

    /// Create a missing-type marker.
    pub fn missing_type(description: impl Into<String>) -> Self {
        Marker::MissingType {
            id: NodeId::next(),
            description: description.into(),
        }
    }

    /// Create a parse exception marker.
    pub fn parse_exception(message: impl Into<String>) -> Self {
        Marker::ParseExceptionResult {
            id: NodeId::next(),
            message: message.into(),
        }
    }

    /// Create a provenance marker.
    pub fn provenance(source: impl Into<String>) -> Self {
        Marker::Provenance {
            id: NodeId::next(),
            source: source.into(),
        }
    }

    /// Create a custom marker.
    pub fn custom(name: impl Into<String>, data: serde_json::Value) -> Self {
        Marker::Custom {
            id: NodeId::next(),
            name: name.into(),
            data,
        }
    }

    /// The identity of this marker.
    pub fn id(&self) -> NodeId {
        match self {
            Marker::SearchResult { id, .. }
            | Marker::MissingType { id, .. }
            | Marker::ParseExceptionResult { id, .. }
            | Marker::Provenance { id, .. }
            | Marker::Custom { id, .. } => *id,
        }
    }

    /// The kind of this marker.
    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::SearchResult { .. } => MarkerKind::SearchResult,
            Marker::MissingType { .. } => MarkerKind::MissingType,
            Marker::ParseExceptionResult { .. } => MarkerKind::ParseExceptionResult,
            Marker::Provenance { .. } => MarkerKind::Provenance,
            Marker::Custom { .. } => MarkerKind::Custom,
        }
    }

    /// Two markers are duplicates when they share a kind and payload, regardless of id.
    pub fn is_duplicate_of(&self, other: &Marker) -> bool {
        match (self, other) {
            (
                Marker::SearchResult { description: a, .. },
                Marker::SearchResult { description: b, .. },
            ) => a == b,
            (
                Marker::MissingType { description: a, .. },
                Marker::MissingType { description: b, .. },
            ) => a == b,
            (
                Marker::ParseExceptionResult { message: a, .. },
                Marker::ParseExceptionResult { message: b, .. },
            ) => a == b,
            (Marker::Provenance { source: a, .. }, Marker::Provenance { source: b, .. }) => {
                a == b
            }
            (
                Marker::Custom {
                    name: a, data: da, ..
                },
                Marker::Custom {
                    name: b, data: db, ..
                },
            ) => a == b && da == db,
            _ => false,
        }
    }

    /// Human-readable description, if the marker carries one.
    pub fn description(&self) -> Option<&str> {
        match self {
            Marker::SearchResult { description, .. } => description.as_deref(),
            Marker::MissingType { description, .. } => Some(description),
            Marker::ParseExceptionResult { message, .. } => Some(message),
            Marker::Provenance { source, .. } => Some(source),
            Marker::Custom { name, .. } => Some(name),
        }
    }
}

/// An ordered, identity-bearing set of markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markers {
    id: NodeId,
    entries: Vec<Marker>,
}

impl Default for Markers {
    fn default() -> Self {
        Self::new()
    }
}

impl Markers {
    /// An empty marker bag with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            entries: Vec::new(),
        }
    }

    /// Build a bag from existing parts, e.g. when decoding a transmitted tree.
    pub fn from_parts(id: NodeId, entries: Vec<Marker>) -> Self {
        Self { id, entries }
    }

    /// The identity of this bag.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// All markers in insertion order.
    pub fn entries(&self) -> &[Marker] {
        &self.entries
    }

    /// Iterate over the markers.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.entries.iter()
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag has no markers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any marker of `kind` is present.
    pub fn has(&self, kind: MarkerKind) -> bool {
        self.entries.iter().any(|m| m.kind() == kind)
    }

    /// The first marker of `kind`, if any.
    pub fn find(&self, kind: MarkerKind) -> Option<&Marker> {
        self.entries.iter().find(|m| m.kind() == kind)
    }

    /// All markers of `kind`.
    pub fn find_all(&self, kind: MarkerKind) -> impl Iterator<Item = &Marker> {
        self.entries.iter().filter(move |m| m.kind() == kind)
    }

    /// Returns a copy of this bag with `marker` appended unconditionally.
    pub fn add(&self, marker: Marker) -> Markers {
        let mut entries = self.entries.clone();
        entries.push(marker);
        Markers {
            id: self.id,
            entries,
        }
    }

    /// Returns a copy of this bag with `marker` appended unless a duplicate
    /// (same kind, same payload) is already present, in which case the bag is
    /// returned unchanged.
    pub fn add_if_absent(&self, marker: Marker) -> Markers {
        if self.entries.iter().any(|m| m.is_duplicate_of(&marker)) {
            return self.clone();
        }
        self.add(marker)
    }

    /// Returns a copy of this bag without any marker of `kind`.
    pub fn remove_kind(&self, kind: MarkerKind) -> Markers {
        Markers {
            id: self.id,
            entries: self
                .entries
                .iter()
                .filter(|m| m.kind() != kind)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_if_absent_is_idempotent() {
        let markers = Markers::new();
        let once = markers.add_if_absent(Marker::search_result(Some("found".into())));
        let twice = once.add_if_absent(Marker::search_result(Some("found".into())));
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_add_if_absent_distinguishes_descriptions() {
        let markers = Markers::new()
            .add_if_absent(Marker::search_result(Some("a".into())))
            .add_if_absent(Marker::search_result(Some("b".into())))
            .add_if_absent(Marker::search_result(None));
        assert_eq!(markers.len(), 3);
    }

    #[test]
    fn test_bag_identity_survives_updates() {
        let markers = Markers::new();
        let updated = markers.add(Marker::provenance("test"));
        assert_eq!(markers.id(), updated.id());
        assert!(markers.is_empty());
        assert!(updated.has(MarkerKind::Provenance));
    }

    #[test]
    fn test_remove_kind() {
        let markers = Markers::new()
            .add(Marker::missing_type("x"))
            .add(Marker::search_result(None));
        let removed = markers.remove_kind(MarkerKind::MissingType);
        assert_eq!(removed.len(), 1);
        assert!(removed.find(MarkerKind::SearchResult).is_some());
    }

    #[test]
    fn test_marker_roundtrips_through_json() {
        let marker = Marker::custom("owner", serde_json::json!({"team": "core"}));
        let json = serde_json::to_string(&marker).unwrap();
        let back: Marker = serde_json::from_str(&json).unwrap();
        assert_eq!(marker, back);
        assert_eq!(back.kind(), MarkerKind::Custom);
    }
}
