use proptree_reconcile::{
    reconcile, AdapterError, MemoryHost, ObjectId, PropertyNode, PropertyTree,
    PropertyTreeAdapter, PropertyValue, ReconcileError,
};

fn float_array(values: &[f32]) -> PropertyTree {
    PropertyTree::Array {
        element_default: Box::new(PropertyTree::float(0.0)),
        elements: values.iter().copied().map(PropertyTree::float).collect(),
    }
}

#[test]
fn probe_grows_source_and_reverts_default_valued_element() {
    let mut host = MemoryHost::new();
    let source = host.insert_object(
        "template",
        PropertyTree::fields([("points", float_array(&[1.0]))]),
    );
    let derived = host.insert_object(
        "instance",
        PropertyTree::fields([("points", float_array(&[1.0, 5.0, 0.0]))]),
    );
    host.set_source(derived, source);
    host.mark_override(derived, "points");
    host.mark_override(derived, "points.Array.data[1]");
    host.mark_override(derived, "points.Array.data[2]");

    let count = reconcile(&mut host, derived).unwrap();

    // Only the element equal to the grown default reverts. The differing
    // element and the length override stay.
    assert_eq!(count, 1);
    assert!(!host.is_overridden(derived, "points.Array.data[2]"));
    assert!(host.is_overridden(derived, "points.Array.data[1]"));
    assert!(host.is_overridden(derived, "points"));

    // Successful probes keep the growth: the source array now covers every
    // probed index, with materialized defaults.
    assert_eq!(host.array_len_at(source, "points"), Some(3));
    assert_eq!(
        host.value_at(source, "points.Array.data[2]"),
        Some(PropertyValue::Float(0.0))
    );
    // The source has no source of its own, so no override artifact appears.
    assert!(!host.is_overridden(source, "points"));
}

#[test]
fn nested_element_probe_grows_only_the_immediate_array() {
    fn row(cells: &[f32]) -> PropertyTree {
        PropertyTree::fields([("cells", float_array(cells))])
    }
    fn rows(rows: Vec<PropertyTree>, default_cells: &[f32]) -> PropertyTree {
        PropertyTree::Array {
            element_default: Box::new(row(default_cells)),
            elements: rows,
        }
    }

    let mut host = MemoryHost::new();
    let source = host.insert_object(
        "template",
        PropertyTree::fields([("rows", rows(vec![row(&[1.0])], &[]))]),
    );
    let derived = host.insert_object(
        "instance",
        PropertyTree::fields([("rows", rows(vec![row(&[1.0, 0.0, 0.0])], &[]))]),
    );
    host.set_source(derived, source);
    host.mark_override(derived, "rows.Array.data[0].cells.Array.data[2]");

    assert_eq!(reconcile(&mut host, derived).unwrap(), 1);
    assert!(!host.is_overridden(derived, "rows.Array.data[0].cells.Array.data[2]"));
    assert_eq!(host.array_len_at(source, "rows"), Some(1));
    assert_eq!(
        host.array_len_at(source, "rows.Array.data[0].cells"),
        Some(3)
    );
}

#[test]
fn missing_array_on_source_leaves_override_in_place() {
    let mut host = MemoryHost::new();
    let source = host.insert_object(
        "template",
        PropertyTree::fields([("other", PropertyTree::float(1.0))]),
    );
    let derived = host.insert_object(
        "instance",
        PropertyTree::fields([
            ("other", PropertyTree::float(1.0)),
            ("points", float_array(&[0.0])),
        ]),
    );
    host.set_source(derived, source);
    host.mark_override(derived, "points.Array.data[0]");

    assert_eq!(reconcile(&mut host, derived).unwrap(), 0);
    assert!(host.is_overridden(derived, "points.Array.data[0]"));
}

/// Delegates to a [`MemoryHost`] but reports one path as unresolvable, the
/// way a host lookup can fail even after the enclosing array was grown.
struct BlindSpotHost {
    inner: MemoryHost,
    blind: String,
}

impl PropertyTreeAdapter for BlindSpotHost {
    type ObjectId = ObjectId;

    fn resolve_source(&self, derived: ObjectId) -> Option<ObjectId> {
        self.inner.resolve_source(derived)
    }

    fn flush(&mut self, object: ObjectId) -> Result<(), AdapterError> {
        self.inner.flush(object)
    }

    fn iterate_all(&self, object: ObjectId) -> Result<Vec<PropertyNode>, AdapterError> {
        self.inner.iterate_all(object)
    }

    fn find_by_path(&self, object: ObjectId, path: &str) -> Result<Option<PropertyNode>, AdapterError> {
        if path == self.blind {
            return Ok(None);
        }
        self.inner.find_by_path(object, path)
    }

    fn array_length(&self, object: ObjectId, path: &str) -> Result<usize, AdapterError> {
        self.inner.array_length(object, path)
    }

    fn set_array_length(&mut self, object: ObjectId, path: &str, len: usize) -> Result<(), AdapterError> {
        self.inner.set_array_length(object, path, len)
    }

    fn revert(&mut self, object: ObjectId, path: &str) -> Result<(), AdapterError> {
        self.inner.revert(object, path)
    }
}

/// Template chain base <- mid <- leaf. The mid object has a source of its
/// own, so a length edit on it leaves an override marker behind, which is
/// exactly the artifact the probe's failure path must clean up. The leaf's
/// array is longer than mid's, with only the last element overridden.
fn template_chain() -> (MemoryHost, ObjectId, ObjectId) {
    let mut host = MemoryHost::new();
    let base = host.insert_object(
        "base",
        PropertyTree::fields([("points", float_array(&[1.0, 2.0]))]),
    );
    let mid = host.insert_object(
        "mid",
        PropertyTree::fields([("points", float_array(&[1.0, 2.0]))]),
    );
    let leaf = host.insert_object(
        "leaf",
        PropertyTree::fields([("points", float_array(&[1.0, 2.0, 0.0, 0.0, 0.0]))]),
    );
    host.set_source(mid, base);
    host.set_source(leaf, mid);
    host.mark_override(leaf, "points.Array.data[4]");
    (host, mid, leaf)
}

fn blind_spot_chain() -> (BlindSpotHost, ObjectId, ObjectId) {
    let (inner, mid, leaf) = template_chain();
    let host = BlindSpotHost {
        inner,
        blind: "points.Array.data[4]".to_string(),
    };
    (host, mid, leaf)
}

#[test]
fn failed_probe_restores_length_and_clears_spurious_override() {
    let (mut host, mid, leaf) = blind_spot_chain();

    assert_eq!(reconcile(&mut host, leaf).unwrap(), 0);

    // Probe failed: the growth was undone and the override marker the length
    // edit created on the source's array node was erased.
    assert_eq!(host.inner.array_len_at(mid, "points"), Some(2));
    assert!(!host.inner.is_overridden(mid, "points"));
    assert_eq!(
        host.inner.value_at(mid, "points.Array.data[1]"),
        Some(PropertyValue::Float(2.0))
    );
    // The unresolvable override is conservatively kept.
    assert!(host.inner.is_overridden(leaf, "points.Array.data[4]"));
}

#[test]
fn failed_probe_preserves_preexisting_array_override() {
    let (mut host, mid, leaf) = blind_spot_chain();
    host.inner.mark_override(mid, "points");

    assert_eq!(reconcile(&mut host, leaf).unwrap(), 0);

    // The marker predates the probe, so the cleanup must not touch it.
    assert_eq!(host.inner.array_len_at(mid, "points"), Some(2));
    assert!(host.inner.is_overridden(mid, "points"));
}

/// Delegates to a [`MemoryHost`] but errors the element lookup once the
/// enclosing array has grown past its original length, the way a host can
/// fail a lookup that was expected to succeed after a resize.
struct FaultAfterGrowthHost {
    inner: MemoryHost,
    element: String,
    array: String,
    original_len: usize,
}

impl PropertyTreeAdapter for FaultAfterGrowthHost {
    type ObjectId = ObjectId;

    fn resolve_source(&self, derived: ObjectId) -> Option<ObjectId> {
        self.inner.resolve_source(derived)
    }

    fn flush(&mut self, object: ObjectId) -> Result<(), AdapterError> {
        self.inner.flush(object)
    }

    fn iterate_all(&self, object: ObjectId) -> Result<Vec<PropertyNode>, AdapterError> {
        self.inner.iterate_all(object)
    }

    fn find_by_path(&self, object: ObjectId, path: &str) -> Result<Option<PropertyNode>, AdapterError> {
        if path == self.element {
            return match self.inner.array_len_at(object, &self.array) {
                Some(len) if len > self.original_len => {
                    Err(AdapterError::PathNotFound(path.to_string()))
                }
                _ => Ok(None),
            };
        }
        self.inner.find_by_path(object, path)
    }

    fn array_length(&self, object: ObjectId, path: &str) -> Result<usize, AdapterError> {
        self.inner.array_length(object, path)
    }

    fn set_array_length(&mut self, object: ObjectId, path: &str, len: usize) -> Result<(), AdapterError> {
        self.inner.set_array_length(object, path, len)
    }

    fn revert(&mut self, object: ObjectId, path: &str) -> Result<(), AdapterError> {
        self.inner.revert(object, path)
    }
}

#[test]
fn lookup_error_after_growth_still_restores_the_source_array() {
    let (inner, mid, leaf) = template_chain();
    let mut host = FaultAfterGrowthHost {
        inner,
        element: "points.Array.data[4]".to_string(),
        array: "points".to_string(),
        original_len: 2,
    };

    let err = reconcile(&mut host, leaf).unwrap_err();

    // The lookup error propagates, but only after the rollback ran: length
    // restored, untouched elements intact, no leftover override marker.
    assert!(matches!(
        err,
        ReconcileError::Adapter(AdapterError::PathNotFound(_))
    ));
    assert_eq!(host.inner.array_len_at(mid, "points"), Some(2));
    assert_eq!(
        host.inner.value_at(mid, "points.Array.data[1]"),
        Some(PropertyValue::Float(2.0))
    );
    assert!(!host.inner.is_overridden(mid, "points"));
    assert!(host.inner.is_overridden(leaf, "points.Array.data[4]"));
}
