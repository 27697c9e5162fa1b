//! Scene fixture format: a JSON document describing a set of objects, their
//! property trees, override paths, and source-by-name links.
//!
//! Used by the CLI binary and by tests as a compact way to stand up a
//! [`MemoryHost`].

use serde::{Deserialize, Serialize};

use crate::memory::{MemoryHost, ObjectId, PropertyTree};

// Not derived via thiserror: the `source: String` field on `UnknownSource`
// collides with thiserror's implicit error-source convention.
#[derive(Debug)]
pub enum SceneError {
    Json(serde_json::Error),
    DuplicateName(String),
    UnknownSource { derived: String, source: String },
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Json(err) => write!(f, "invalid scene document: {err}"),
            SceneError::DuplicateName(name) => write!(f, "duplicate object name: {name}"),
            SceneError::UnknownSource { derived, source } => {
                write!(f, "object {derived:?} names unknown source {source:?}")
            }
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Json(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    /// Name of the source object this one inherits from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub tree: PropertyTree,
    /// Paths marked as locally overridden.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<String>,
    /// Paths marked as structurally expected overrides, exempt from
    /// reconciliation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_overrides: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn from_json(text: &str) -> Result<Scene, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Instantiates every object into `host`, resolving source links by name.
    ///
    /// Returns the created ids in document order. Source links may point
    /// forward or backward in the document.
    pub fn load_into(&self, host: &mut MemoryHost) -> Result<Vec<ObjectId>, SceneError> {
        let mut ids: Vec<ObjectId> = Vec::with_capacity(self.objects.len());
        let mut by_name: Vec<(&str, ObjectId)> = Vec::with_capacity(self.objects.len());

        for object in &self.objects {
            if by_name.iter().any(|(name, _)| *name == object.name) {
                return Err(SceneError::DuplicateName(object.name.clone()));
            }
            let id = host.insert_object(&object.name, object.tree.clone());
            for path in &object.overrides {
                host.mark_override(id, path);
            }
            for path in &object.default_overrides {
                host.mark_default_override(id, path);
            }
            by_name.push((&object.name, id));
            ids.push(id);
        }

        for (object, id) in self.objects.iter().zip(&ids) {
            if let Some(source_name) = &object.source {
                let source = by_name
                    .iter()
                    .find(|(name, _)| *name == source_name.as_str())
                    .map(|(_, id)| *id)
                    .ok_or_else(|| SceneError::UnknownSource {
                        derived: object.name.clone(),
                        source: source_name.clone(),
                    })?;
                host.set_source(*id, source);
            }
        }
        Ok(ids)
    }
}
