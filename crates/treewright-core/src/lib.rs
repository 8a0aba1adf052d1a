//! Core infrastructure for treewright.
//!
//! This crate provides language-agnostic infrastructure shared by the tree,
//! analysis and recipe crates:
//! - Node identity tokens ([`id::NodeId`])
//! - Typed, identity-bearing metadata attached to nodes ([`marker::Markers`])
//! - The unified error type and its output codes
//! - Run configuration
//! - Unified diff generation for before/after source text
//! - Text position utilities

pub mod config;
pub mod diff;
pub mod error;
pub mod id;
pub mod marker;
pub mod text;

pub use id::NodeId;
pub use marker::{Marker, MarkerKind, Markers};
pub use config::{MarkerPrinting, RunConfig};
pub use error::{OutputErrorCode, TreewrightError};
