//! Built-in search recipes.
//!
//! Search recipes never change source text: they attach search-result or
//! diagnostic markers, so a changed file in the run result is a file with
//! findings. Markers are added only when absent, so running a search over
//! its own output reports no changes.

mod find_annotations;
mod find_leaking_locals;
mod find_methods;
mod find_missing_types;
mod find_types;

pub use find_annotations::FindAnnotations;
pub use find_leaking_locals::FindLeakingLocals;
pub use find_methods::FindMethods;
pub use find_missing_types::FindMissingTypes;
pub use find_types::FindTypes;
