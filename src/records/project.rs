//! Project record type

use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::Record;

/// A project - the root aggregate that owns notes, tags, and todos by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: RecordId,

    /// Display name
    pub name: String,
}

impl Project {
    /// Create a new project with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(RecordKind::Project),
            name: name.into(),
        }
    }
}

impl Record for Project {
    const KIND: RecordKind = RecordKind::Project;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_roundtrip() {
        let project = Project::new("Work");
        let json = serde_json::to_string(&project).unwrap();
        let parsed: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(project, parsed);
        assert!(parsed.id.to_string().starts_with("PROJ-"));
    }
}
