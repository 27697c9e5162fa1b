//! Typed property values and the equality rules the engine applies to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of type tags a property node can carry. Values of different
/// kinds are never considered equal, even when their components coincide
/// (a `Vector4` is not a `Quaternion`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Float,
    Vector2,
    Vector3,
    Vector4,
    Quaternion,
    Other,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Float => "float",
            PropertyKind::Vector2 => "vector2",
            PropertyKind::Vector3 => "vector3",
            PropertyKind::Vector4 => "vector4",
            PropertyKind::Quaternion => "quaternion",
            PropertyKind::Other => "other",
        }
    }
}

/// A single property value. Float-family variants hold raw IEEE components;
/// everything else is an opaque JSON value compared structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Float(f32),
    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Vector4([f32; 4]),
    Quaternion([f32; 4]),
    Other(Value),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Vector2(_) => PropertyKind::Vector2,
            PropertyValue::Vector3(_) => PropertyKind::Vector3,
            PropertyValue::Vector4(_) => PropertyKind::Vector4,
            PropertyValue::Quaternion(_) => PropertyKind::Quaternion,
            PropertyValue::Other(_) => PropertyKind::Other,
        }
    }
}

/// Type-aware approximate equality between two property values.
///
/// Float-family kinds compare with exact IEEE `==` per component. That is
/// deliberate: the goal is to catch a value re-entered identically (including
/// `-0.0` re-entered as `0.0`, which `==` already equates), not to coalesce
/// near-equal-but-distinct values. Opaque values compare structurally.
///
/// # Example
///
/// ```
/// use proptree_reconcile::value::{approx_eq, PropertyValue};
///
/// let pos = PropertyValue::Float(0.0);
/// let neg = PropertyValue::Float(-0.0);
/// assert!(approx_eq(&pos, &neg));
///
/// let a = PropertyValue::Vector3([1.0, 2.0, 3.0]);
/// let b = PropertyValue::Vector3([1.0, 2.0, 3.0 + f32::EPSILON * 4.0]);
/// assert!(!approx_eq(&a, &b));
/// ```
pub fn approx_eq(a: &PropertyValue, b: &PropertyValue) -> bool {
    if a.kind() != b.kind() {
        return false;
    }
    match (a, b) {
        (PropertyValue::Float(a), PropertyValue::Float(b)) => a == b,
        (PropertyValue::Vector2(a), PropertyValue::Vector2(b)) => components_eq(a, b),
        (PropertyValue::Vector3(a), PropertyValue::Vector3(b)) => components_eq(a, b),
        (PropertyValue::Vector4(a), PropertyValue::Vector4(b)) => components_eq(a, b),
        (PropertyValue::Quaternion(a), PropertyValue::Quaternion(b)) => components_eq(a, b),
        (PropertyValue::Other(a), PropertyValue::Other(b)) => deep_equal(a, b),
        _ => false,
    }
}

fn components_eq(a: &[f32], b: &[f32]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Performs a deep structural equality check between two JSON values.
///
/// Primitives compare by value, arrays element-by-element, objects
/// key-by-key (insertion order does not matter, key sets must match).
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len()
                && arr_a.iter().zip(arr_b.iter()).all(|(a, b)| deep_equal(a, b))
        }

        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            obj_a.iter().all(|(key, val_a)| match obj_b.get(key) {
                Some(val_b) => deep_equal(val_a, val_b),
                None => false,
            })
        }

        _ => false,
    }
}
