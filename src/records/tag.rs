//! Tag record type

use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{OwnedRecord, Record};

/// A tag attached to notes and todos within a single project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: RecordId,

    /// Owning project
    pub project_id: RecordId,

    /// Display label
    pub label: String,

    /// Priority color, hex-encoded (e.g. "#ff0000")
    pub priority: String,
}

impl Tag {
    /// Create a new tag with a generated id, owned by the given project
    pub fn new(project_id: RecordId, label: impl Into<String>, priority: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(RecordKind::Tag),
            project_id,
            label: label.into(),
            priority: priority.into(),
        }
    }
}

impl Record for Tag {
    const KIND: RecordKind = RecordKind::Tag;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn project_id(&self) -> Option<&RecordId> {
        Some(&self.project_id)
    }
}

impl OwnedRecord for Tag {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        let project_id = RecordId::new(RecordKind::Project);
        let tag = Tag::new(project_id, "Urgent", "#ff0000");
        let json = serde_json::to_string(&tag).unwrap();
        let parsed: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(tag, parsed);
    }
}
