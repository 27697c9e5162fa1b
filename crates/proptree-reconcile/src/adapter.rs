//! The seam between the engine and a host object model.
//!
//! The engine knows nothing about how a derived/source relationship is
//! established or how properties are stored. It consumes the capabilities
//! below and nothing else, so any object model that can snapshot its nodes as
//! [`PropertyNode`]s can be reconciled.

use thiserror::Error;

use crate::value::PropertyValue;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("object not found")]
    ObjectNotFound,
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("not an array: {0}")]
    NotAnArray(String),
}

/// Transient snapshot of one node in an object's property tree, valid for the
/// reconciliation pass that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub path: String,
    pub value: PropertyValue,
    /// The host's bookkeeping says this node was explicitly set on the derived
    /// object. Independent of whether the value happens to equal the source's.
    pub is_override: bool,
    /// Structurally expected override (e.g. a name field), exempt from
    /// reconciliation.
    pub is_default_override: bool,
    /// `Some(len)` iff this node is an array field.
    pub array_len: Option<usize>,
}

impl PropertyNode {
    pub fn is_array(&self) -> bool {
        self.array_len.is_some()
    }
}

/// Capabilities the engine consumes from a host object model.
///
/// Implementations must uphold two invariants the engine relies on:
///
/// - `set_array_length` commits synchronously, so a following `find_by_path`
///   observes newly materialized elements; growing then shrinking by the same
///   delta with no other mutation in between leaves the untouched region's
///   values and override status unchanged.
/// - `flush` commits any pending in-memory edits so that override flags and
///   values read afterwards reflect committed state.
pub trait PropertyTreeAdapter {
    /// Opaque object handle. Cheap to copy, stable for the pass.
    type ObjectId: Copy + Eq + std::fmt::Debug;

    /// Returns the inheritance parent of `derived`, or `None` when the object
    /// is not part of an inheritance relation.
    fn resolve_source(&self, derived: Self::ObjectId) -> Option<Self::ObjectId>;

    /// Commits pending edits on `object` so reads observe the latest state.
    fn flush(&mut self, object: Self::ObjectId) -> Result<(), AdapterError>;

    /// Depth-first snapshot of every value-bearing node in the object's
    /// property tree, arrays before their elements. Restartable per call and
    /// consistent for the lifetime of one reconciliation pass.
    fn iterate_all(&self, object: Self::ObjectId) -> Result<Vec<PropertyNode>, AdapterError>;

    /// Direct lookup; `Ok(None)` when the path does not (yet) resolve.
    fn find_by_path(
        &self,
        object: Self::ObjectId,
        path: &str,
    ) -> Result<Option<PropertyNode>, AdapterError>;

    /// Length of the array node at `path`.
    fn array_length(&self, object: Self::ObjectId, path: &str) -> Result<usize, AdapterError>;

    /// Resizes the array node at `path`, materializing default-valued elements
    /// on growth. Committed synchronously.
    fn set_array_length(
        &mut self,
        object: Self::ObjectId,
        path: &str,
        len: usize,
    ) -> Result<(), AdapterError>;

    /// Clears the override marking at `path`, making the node's effective
    /// value the inherited one again. Tolerated on a non-overridden node.
    fn revert(&mut self, object: Self::ObjectId, path: &str) -> Result<(), AdapterError>;
}
