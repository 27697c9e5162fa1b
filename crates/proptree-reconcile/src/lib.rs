//! proptree-reconcile — override reconciliation over typed property trees.
//!
//! A *derived* object inherits field values from a *source* template object.
//! Fields edited on the derived side carry an override marker, whether or not
//! the edited value actually differs from the inherited one. This crate walks
//! the derived object's overridden nodes, resolves each path on the source
//! (growing source-side arrays when the derived array is longer), compares the
//! two values with type-aware equality, and clears exactly the overrides that
//! are provably no-ops. Genuine differences are never touched.
//!
//! The engine is host-agnostic: it drives a [`PropertyTreeAdapter`], and any
//! object model that can answer the adapter's six capabilities can be
//! reconciled. [`MemoryHost`] is the built-in adapter used by the CLI and the
//! test suite.

pub mod adapter;
pub mod batch;
pub mod engine;
pub mod memory;
pub mod scene;
pub mod value;

// Re-exports for convenience
pub use adapter::{AdapterError, PropertyNode, PropertyTreeAdapter};
pub use batch::{reconcile_all, BatchReport};
pub use engine::{reconcile, ReconcileError};
pub use memory::{MemoryHost, ObjectId, PropertyTree};
pub use scene::{Scene, SceneError, SceneObject};
pub use value::{approx_eq, deep_equal, PropertyKind, PropertyValue};
