//! In-memory host object model.
//!
//! A small arena of objects, each holding a typed property tree, a set of
//! overridden paths, and an optional source link. It implements
//! [`PropertyTreeAdapter`] and is what the CLI and the test suite reconcile
//! against; embedders with their own object model implement the trait
//! directly instead.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use proptree_path::{array_element, join, parse_steps, PathStep};

use crate::adapter::{AdapterError, PropertyNode, PropertyTreeAdapter};
use crate::value::PropertyValue;

/// One node of an object's property tree.
///
/// Structs are pure containers: they are traversed but carry no value of
/// their own, so they are never emitted as [`PropertyNode`]s and never carry
/// override markers. Arrays are value-bearing (their own value is the
/// length), and growth materializes clones of `element_default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyTree {
    Leaf(PropertyValue),
    Struct(IndexMap<String, PropertyTree>),
    Array {
        element_default: Box<PropertyTree>,
        elements: Vec<PropertyTree>,
    },
}

impl PropertyTree {
    /// Convenience constructor for a struct node.
    pub fn fields<I, S>(fields: I) -> PropertyTree
    where
        I: IntoIterator<Item = (S, PropertyTree)>,
        S: Into<String>,
    {
        PropertyTree::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convenience constructor for a float leaf.
    pub fn float(v: f32) -> PropertyTree {
        PropertyTree::Leaf(PropertyValue::Float(v))
    }
}

/// Handle to an object inside a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

#[derive(Debug, Clone)]
struct ObjectRecord {
    name: String,
    tree: PropertyTree,
    overrides: HashSet<String>,
    default_overrides: HashSet<String>,
    source: Option<ObjectId>,
}

/// Arena of objects with inheritance links and per-path override bookkeeping.
#[derive(Debug, Default)]
pub struct MemoryHost {
    objects: Vec<ObjectRecord>,
}

impl MemoryHost {
    pub fn new() -> MemoryHost {
        MemoryHost::default()
    }

    pub fn insert_object(&mut self, name: &str, tree: PropertyTree) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(ObjectRecord {
            name: name.to_string(),
            tree,
            overrides: HashSet::new(),
            default_overrides: HashSet::new(),
            source: None,
        });
        id
    }

    /// Links `derived` to the object it inherits from.
    ///
    /// # Panics
    ///
    /// Panics when `derived` does not belong to this host. Builder methods
    /// take ids this host handed out; the fallible adapter surface is the
    /// place for foreign handles.
    pub fn set_source(&mut self, derived: ObjectId, source: ObjectId) {
        self.objects[derived.0].source = Some(source);
    }

    /// Marks the node at `path` as locally overridden.
    ///
    /// # Panics
    ///
    /// Panics when `object` does not belong to this host.
    pub fn mark_override(&mut self, object: ObjectId, path: &str) {
        self.objects[object.0].overrides.insert(path.to_string());
    }

    /// Marks the node at `path` as a structurally expected override, exempt
    /// from reconciliation.
    ///
    /// # Panics
    ///
    /// Panics when `object` does not belong to this host.
    pub fn mark_default_override(&mut self, object: ObjectId, path: &str) {
        let record = &mut self.objects[object.0];
        record.overrides.insert(path.to_string());
        record.default_overrides.insert(path.to_string());
    }

    pub fn name(&self, object: ObjectId) -> &str {
        &self.objects[object.0].name
    }

    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        (0..self.objects.len()).map(ObjectId)
    }

    /// Leaf value at `path`, for inspection.
    pub fn value_at(&self, object: ObjectId, path: &str) -> Option<PropertyValue> {
        match descend(&self.objects.get(object.0)?.tree, path)? {
            PropertyTree::Leaf(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Length of the array at `path`, for inspection.
    pub fn array_len_at(&self, object: ObjectId, path: &str) -> Option<usize> {
        match descend(&self.objects.get(object.0)?.tree, path)? {
            PropertyTree::Array { elements, .. } => Some(elements.len()),
            _ => None,
        }
    }

    /// Whether the node at `path` carries an override marker. Queries on a
    /// foreign id answer `false` rather than panicking, like the other
    /// inspection accessors.
    pub fn is_overridden(&self, object: ObjectId, path: &str) -> bool {
        self.objects
            .get(object.0)
            .is_some_and(|record| record.overrides.contains(path))
    }

    fn record(&self, object: ObjectId) -> Result<&ObjectRecord, AdapterError> {
        self.objects.get(object.0).ok_or(AdapterError::ObjectNotFound)
    }

    fn record_mut(&mut self, object: ObjectId) -> Result<&mut ObjectRecord, AdapterError> {
        self.objects
            .get_mut(object.0)
            .ok_or(AdapterError::ObjectNotFound)
    }

    fn snapshot(record: &ObjectRecord, path: &str, tree: &PropertyTree) -> Option<PropertyNode> {
        let value = match tree {
            PropertyTree::Leaf(value) => value.clone(),
            // The array node's own value is its length; elements are
            // separate child nodes.
            PropertyTree::Array { elements, .. } => {
                PropertyValue::Other(serde_json::Value::from(elements.len()))
            }
            PropertyTree::Struct(_) => return None,
        };
        let array_len = match tree {
            PropertyTree::Array { elements, .. } => Some(elements.len()),
            _ => None,
        };
        Some(PropertyNode {
            path: path.to_string(),
            value,
            is_override: record.overrides.contains(path),
            is_default_override: record.default_overrides.contains(path),
            array_len,
        })
    }

    fn collect_nodes(record: &ObjectRecord, path: &str, tree: &PropertyTree, out: &mut Vec<PropertyNode>) {
        if let Some(node) = Self::snapshot(record, path, tree) {
            out.push(node);
        }
        match tree {
            PropertyTree::Leaf(_) => {}
            PropertyTree::Struct(fields) => {
                for (name, child) in fields {
                    Self::collect_nodes(record, &join(path, name), child, out);
                }
            }
            PropertyTree::Array { elements, .. } => {
                for (index, child) in elements.iter().enumerate() {
                    Self::collect_nodes(record, &array_element(path, index), child, out);
                }
            }
        }
    }
}

/// Immutable navigation to the subtree at `path`.
fn descend<'t>(mut tree: &'t PropertyTree, path: &str) -> Option<&'t PropertyTree> {
    for step in parse_steps(path)? {
        tree = match (tree, step) {
            (PropertyTree::Struct(fields), PathStep::Field(name)) => fields.get(name)?,
            (PropertyTree::Array { elements, .. }, PathStep::Element(index)) => {
                elements.get(index)?
            }
            _ => return None,
        };
    }
    Some(tree)
}

/// Mutable navigation to the subtree at `path`.
fn descend_mut<'t>(mut tree: &'t mut PropertyTree, path: &str) -> Option<&'t mut PropertyTree> {
    for step in parse_steps(path)? {
        tree = match (tree, step) {
            (PropertyTree::Struct(fields), PathStep::Field(name)) => fields.get_mut(name)?,
            (PropertyTree::Array { elements, .. }, PathStep::Element(index)) => {
                elements.get_mut(index)?
            }
            _ => return None,
        };
    }
    Some(tree)
}

impl PropertyTreeAdapter for MemoryHost {
    type ObjectId = ObjectId;

    fn resolve_source(&self, derived: ObjectId) -> Option<ObjectId> {
        self.objects.get(derived.0)?.source
    }

    fn flush(&mut self, object: ObjectId) -> Result<(), AdapterError> {
        // The in-memory model is always committed; flushing only validates
        // the handle.
        self.record(object).map(|_| ())
    }

    fn iterate_all(&self, object: ObjectId) -> Result<Vec<PropertyNode>, AdapterError> {
        let record = self.record(object)?;
        let mut out = Vec::new();
        if let PropertyTree::Struct(fields) = &record.tree {
            for (name, child) in fields {
                Self::collect_nodes(record, name, child, &mut out);
            }
        } else {
            Self::collect_nodes(record, "", &record.tree, &mut out);
        }
        Ok(out)
    }

    fn find_by_path(&self, object: ObjectId, path: &str) -> Result<Option<PropertyNode>, AdapterError> {
        let record = self.record(object)?;
        Ok(descend(&record.tree, path).and_then(|tree| Self::snapshot(record, path, tree)))
    }

    fn array_length(&self, object: ObjectId, path: &str) -> Result<usize, AdapterError> {
        let record = self.record(object)?;
        match descend(&record.tree, path) {
            Some(PropertyTree::Array { elements, .. }) => Ok(elements.len()),
            Some(_) => Err(AdapterError::NotAnArray(path.to_string())),
            None => Err(AdapterError::PathNotFound(path.to_string())),
        }
    }

    fn set_array_length(&mut self, object: ObjectId, path: &str, len: usize) -> Result<(), AdapterError> {
        let record = self.record_mut(object)?;
        let subtree = descend_mut(&mut record.tree, path)
            .ok_or_else(|| AdapterError::PathNotFound(path.to_string()))?;
        match subtree {
            PropertyTree::Array {
                element_default,
                elements,
            } => {
                if len < elements.len() {
                    elements.truncate(len);
                } else {
                    elements.resize_with(len, || (**element_default).clone());
                }
            }
            _ => return Err(AdapterError::NotAnArray(path.to_string())),
        }
        // A length edit is a local edit: on an object with a source it shows
        // up as an override on the array node, exactly the artifact the
        // probe's failure path has to clean up.
        if record.source.is_some() {
            record.overrides.insert(path.to_string());
        }
        Ok(())
    }

    fn revert(&mut self, object: ObjectId, path: &str) -> Result<(), AdapterError> {
        let record = self.record(object)?;
        let inherited = record
            .source
            .and_then(|source| self.objects.get(source.0))
            .and_then(|source| descend(&source.tree, path))
            .cloned();

        let record = self.record_mut(object)?;
        record.overrides.remove(path);
        record.default_overrides.remove(path);

        // Make the effective value the inherited one again. A leaf takes the
        // source value; an array node takes the source *length* only, so
        // element overrides keep their own values and markers.
        let (inherited, subtree) = match (inherited, descend_mut(&mut record.tree, path)) {
            (Some(inherited), Some(subtree)) => (inherited, subtree),
            _ => return Ok(()),
        };
        match (subtree, inherited) {
            (PropertyTree::Leaf(value), PropertyTree::Leaf(inherited_value)) => {
                *value = inherited_value;
            }
            (
                PropertyTree::Array { elements, .. },
                PropertyTree::Array {
                    elements: inherited_elements,
                    ..
                },
            ) => {
                if inherited_elements.len() < elements.len() {
                    elements.truncate(inherited_elements.len());
                } else {
                    elements.extend(inherited_elements[elements.len()..].iter().cloned());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_ids_fail_without_panicking() {
        let mut big = MemoryHost::new();
        big.insert_object("a", PropertyTree::float(1.0));
        let foreign = big.insert_object("b", PropertyTree::float(2.0));

        let mut small = MemoryHost::new();
        small.insert_object("only", PropertyTree::float(3.0));

        // Inspection accessors answer negatively; the adapter surface errors.
        assert!(!small.is_overridden(foreign, "x"));
        assert_eq!(small.value_at(foreign, "x"), None);
        assert_eq!(small.array_len_at(foreign, "x"), None);
        assert_eq!(small.flush(foreign), Err(AdapterError::ObjectNotFound));
        assert_eq!(small.resolve_source(foreign), None);
    }

    #[test]
    fn empty_path_addresses_a_non_struct_root() {
        let mut host = MemoryHost::new();
        let object = host.insert_object("scalar", PropertyTree::float(7.5));

        let node = host.find_by_path(object, "").unwrap().unwrap();
        assert_eq!(node.value, PropertyValue::Float(7.5));

        let nodes = host.iterate_all(object).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].path, "");
    }
}
