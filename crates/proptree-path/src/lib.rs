//! Property path utilities.
//!
//! A property path is a `String` key addressing one node in a property tree.
//! Nested struct fields are joined with `.`, and the reserved suffix
//! `<ArrayFieldPath>.Array.data[<index>]` addresses the zero-based
//! `<index>`-th element of the array field at `<ArrayFieldPath>`.
//!
//! # Example
//!
//! ```
//! use proptree_path::{array_element, join, split_array_element};
//!
//! let path = join("transform", "scale");
//! assert_eq!(path, "transform.scale");
//!
//! let elem = array_element("points", 2);
//! assert_eq!(elem, "points.Array.data[2]");
//!
//! let parsed = split_array_element(&elem).unwrap();
//! assert_eq!(parsed.array_path, "points");
//! assert_eq!(parsed.index, 2);
//! ```

use regex::Regex;

/// A parsed array-element address: the path of the enclosing array field and
/// the zero-based element index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayElement<'a> {
    pub array_path: &'a str,
    pub index: usize,
}

/// Joins a child field name onto a parent path.
///
/// An empty parent yields the bare field name, so roots compose naturally.
///
/// # Example
///
/// ```
/// use proptree_path::join;
///
/// assert_eq!(join("", "scale"), "scale");
/// assert_eq!(join("transform.scale", "x"), "transform.scale.x");
/// ```
pub fn join(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        return field.to_string();
    }
    let mut out = String::with_capacity(parent.len() + 1 + field.len());
    out.push_str(parent);
    out.push('.');
    out.push_str(field);
    out
}

/// Formats the address of the `index`-th element of the array at `array_path`.
///
/// # Example
///
/// ```
/// use proptree_path::array_element;
///
/// assert_eq!(array_element("points", 0), "points.Array.data[0]");
/// ```
pub fn array_element(array_path: &str, index: usize) -> String {
    format!("{array_path}.Array.data[{index}]")
}

/// Parses an array-element address, returning the enclosing array's path and
/// the element index.
///
/// Returns `None` when the path is not an element address, when the index is
/// not plain decimal digits, or when it overflows `usize`. For nested element
/// addresses the greedy prefix makes `array_path` the *immediate* enclosing
/// array:
///
/// ```
/// use proptree_path::split_array_element;
///
/// let parsed = split_array_element("a.Array.data[0].b.Array.data[1]").unwrap();
/// assert_eq!(parsed.array_path, "a.Array.data[0].b");
/// assert_eq!(parsed.index, 1);
///
/// assert!(split_array_element("transform.scale").is_none());
/// assert!(split_array_element("points.Array.data[-1]").is_none());
/// ```
pub fn split_array_element(path: &str) -> Option<ArrayElement<'_>> {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(.+)\.Array\.data\[(\d+)\]$").unwrap());

    let caps = re.captures(path)?;
    let array_path = caps.get(1)?.as_str();
    let index: usize = caps.get(2)?.as_str().parse().ok()?;
    Some(ArrayElement { array_path, index })
}

/// One structural step of a parsed property path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep<'a> {
    /// Descend into a named struct field.
    Field(&'a str),
    /// Descend into the `n`-th element of an array field.
    Element(usize),
}

/// Tokenizes a property path into structural steps.
///
/// The empty path addresses the tree root and yields no steps. The reserved
/// `Array.data[<index>]` pair collapses into a single [`PathStep::Element`].
/// Returns `None` on malformed paths (empty segments, a dangling `Array`
/// segment, or a bad index).
///
/// # Example
///
/// ```
/// use proptree_path::{parse_steps, PathStep};
///
/// assert_eq!(parse_steps(""), Some(vec![]));
///
/// let steps = parse_steps("points.Array.data[2].x").unwrap();
/// assert_eq!(
///     steps,
///     vec![
///         PathStep::Field("points"),
///         PathStep::Element(2),
///         PathStep::Field("x"),
///     ]
/// );
/// ```
pub fn parse_steps(path: &str) -> Option<Vec<PathStep<'_>>> {
    if path.is_empty() {
        return Some(Vec::new());
    }
    let mut steps = Vec::new();
    let mut parts = path.split('.');
    while let Some(part) = parts.next() {
        if part == "Array" {
            let data = parts.next()?;
            let digits = data.strip_prefix("data[")?.strip_suffix(']')?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            steps.push(PathStep::Element(digits.parse().ok()?));
        } else if part.is_empty() {
            return None;
        } else {
            steps.push(PathStep::Field(part));
        }
    }
    Some(steps)
}

/// Returns the parent path of `path`, or `None` at the root.
///
/// An element suffix counts as a single segment, so the parent of
/// `points.Array.data[2]` is `points`, not `points.Array.data`.
pub fn parent(path: &str) -> Option<&str> {
    if let Some(elem) = split_array_element(path) {
        return Some(elem.array_path);
    }
    path.rfind('.').map(|i| &path[..i])
}

/// Returns the last segment of `path` (the whole path when it has no parent).
///
/// # Example
///
/// ```
/// use proptree_path::last_segment;
///
/// assert_eq!(last_segment("transform.scale.x"), "x");
/// assert_eq!(last_segment("points.Array.data[2]"), "Array.data[2]");
/// assert_eq!(last_segment("scale"), "scale");
/// ```
pub fn last_segment(path: &str) -> &str {
    match parent(path) {
        Some(p) => &path[p.len() + 1..],
        None => path,
    }
}
