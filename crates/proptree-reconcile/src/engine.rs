//! The reconciliation engine: walks a derived object's overridden nodes and
//! clears exactly those whose value equals the inherited source value.

use proptree_path::split_array_element;
use thiserror::Error;

use crate::adapter::{AdapterError, PropertyNode, PropertyTreeAdapter};
use crate::value::approx_eq;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("adapter failure: {0}")]
    Adapter(#[from] AdapterError),
}

/// Reconciles one derived object against its source, returning the number of
/// overrides reverted.
///
/// An object without a source has nothing to reconcile and yields 0. The call
/// is stateless and idempotent: running it twice in a row reverts nothing the
/// second time.
pub fn reconcile<A: PropertyTreeAdapter>(
    adapter: &mut A,
    derived: A::ObjectId,
) -> Result<usize, ReconcileError> {
    let source = match adapter.resolve_source(derived) {
        Some(id) => id,
        None => return Ok(0),
    };

    // Flush pending edits so override flags and values reflect committed
    // state. Stale snapshots would mis-detect overrides in both directions.
    adapter.flush(derived)?;
    adapter.flush(source)?;

    let mut reverted = 0;
    for node in adapter.iterate_all(derived)? {
        if !node.is_override || node.is_default_override {
            continue;
        }

        let source_node = match adapter.find_by_path(source, &node.path)? {
            Some(found) => found,
            None => match probe_array_growth(adapter, source, &node.path)? {
                Some(found) => found,
                // No corresponding source value, so equality cannot be
                // proven. The override stays.
                None => continue,
            },
        };

        if !approx_eq(&source_node.value, &node.value) {
            continue;
        }

        adapter.revert(derived, &node.path)?;
        reverted += 1;
    }
    Ok(reverted)
}

/// Attempts to resolve an array-element path on the source by growing the
/// enclosing source array to cover the index.
///
/// A derived array that is longer than its source leaves trailing element
/// paths unresolvable by direct lookup, even though the inherited value for a
/// not-yet-materialized element is a known default. Growing the source array
/// to `index + 1` materializes those defaults and makes the path addressable.
///
/// On success the growth is kept: exposing default-valued elements is exactly
/// the shape inheriting from the source should present. On failure the probe
/// is observably a no-op: the length is restored and any override marker the
/// length edit itself introduced on the array node is reverted.
fn probe_array_growth<A: PropertyTreeAdapter>(
    adapter: &mut A,
    source: A::ObjectId,
    path: &str,
) -> Result<Option<PropertyNode>, ReconcileError> {
    let elem = match split_array_element(path) {
        Some(elem) => elem,
        None => return Ok(None),
    };

    let array_node = match adapter.find_by_path(source, elem.array_path)? {
        Some(node) if node.is_array() => node,
        _ => return Ok(None),
    };
    let original_len = adapter.array_length(source, elem.array_path)?;
    // Direct lookup already failed, so an in-range index means the adapter's
    // view is inconsistent. Treat as unresolvable rather than guessing.
    if elem.index < original_len {
        return Ok(None);
    }

    let had_override_before = array_node.is_override;
    adapter.set_array_length(source, elem.array_path, elem.index + 1)?;

    // Both failure arms undo the growth before reporting, clearing any
    // spurious override marker the length edit created.
    match adapter.find_by_path(source, path) {
        Ok(Some(found)) => Ok(Some(found)),
        Ok(None) => {
            restore_after_failed_probe(
                adapter,
                source,
                elem.array_path,
                original_len,
                had_override_before,
            )?;
            Ok(None)
        }
        Err(err) => {
            // The lookup error wins; the restore is best-effort here.
            let _ = restore_after_failed_probe(
                adapter,
                source,
                elem.array_path,
                original_len,
                had_override_before,
            );
            Err(err.into())
        }
    }
}

fn restore_after_failed_probe<A: PropertyTreeAdapter>(
    adapter: &mut A,
    source: A::ObjectId,
    array_path: &str,
    original_len: usize,
    had_override_before: bool,
) -> Result<(), AdapterError> {
    adapter.set_array_length(source, array_path, original_len)?;

    // The length edits themselves can leave a spurious override marker on the
    // array node. Erase it only when it was not there before the probe.
    if !had_override_before {
        if let Some(node) = adapter.find_by_path(source, array_path)? {
            if node.is_override {
                adapter.revert(source, array_path)?;
            }
        }
    }
    Ok(())
}
