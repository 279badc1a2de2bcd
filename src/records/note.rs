//! Note record type - stored, view, and draft forms

use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{OwnedRecord, Record};
use crate::records::tag::Tag;

/// Persisted form of a note; tags are referenced by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: RecordId,

    /// Owning project
    pub project_id: RecordId,

    /// Short title
    pub title: String,

    /// Markdown body
    pub markdown: String,

    /// Ids of the tags attached to this note
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<RecordId>,
}

/// A note with its tag references resolved to actual tags
///
/// Resolution is a set-membership filter: a tag appears here exactly when
/// its id is in the stored `tag_ids` and it belongs to the same project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: RecordId,
    pub project_id: RecordId,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

/// User-supplied fields for creating or updating a note
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl Note {
    /// Build a stored note from a draft, owned by the given project
    pub fn from_draft(project_id: RecordId, draft: &NoteDraft) -> Self {
        Self {
            id: RecordId::new(RecordKind::Note),
            project_id,
            title: draft.title.clone(),
            markdown: draft.markdown.clone(),
            tag_ids: draft.tags.iter().map(|tag| tag.id.clone()).collect(),
        }
    }

    /// Resolve the stored tag ids against a project's tag list
    ///
    /// Tags keep the order of `tags`, not of `tag_ids`; ids that no longer
    /// resolve are dropped from the view.
    pub fn resolve(&self, tags: &[Tag]) -> NoteView {
        NoteView {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            title: self.title.clone(),
            markdown: self.markdown.clone(),
            tags: tags
                .iter()
                .filter(|tag| self.tag_ids.contains(&tag.id))
                .cloned()
                .collect(),
        }
    }
}

impl Record for Note {
    const KIND: RecordKind = RecordKind::Note;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn project_id(&self) -> Option<&RecordId> {
        Some(&self.project_id)
    }
}

impl OwnedRecord for Note {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tags(project_id: &RecordId) -> Vec<Tag> {
        vec![
            Tag::new(project_id.clone(), "Urgent", "#ff0000"),
            Tag::new(project_id.clone(), "Later", "#00ff00"),
        ]
    }

    #[test]
    fn test_resolve_is_set_membership() {
        let project_id = RecordId::new(RecordKind::Project);
        let tags = sample_tags(&project_id);

        let draft = NoteDraft {
            title: "Plan".into(),
            markdown: "# Q1".into(),
            tags: vec![tags[0].clone()],
        };
        let note = Note::from_draft(project_id, &draft);

        let view = note.resolve(&tags);
        assert_eq!(view.tags.len(), 1);
        assert_eq!(view.tags[0].id, tags[0].id);

        // every resolved tag id came from tag_ids, and vice versa
        for tag in &view.tags {
            assert!(note.tag_ids.contains(&tag.id));
        }
        for id in &note.tag_ids {
            assert!(view.tags.iter().any(|tag| &tag.id == id));
        }
    }

    #[test]
    fn test_resolve_drops_unknown_ids() {
        let project_id = RecordId::new(RecordKind::Project);
        let tags = sample_tags(&project_id);

        let mut note = Note::from_draft(
            project_id,
            &NoteDraft {
                title: "Plan".into(),
                markdown: String::new(),
                tags: tags.clone(),
            },
        );
        // reference a tag that is not in the project's tag list
        note.tag_ids.push(RecordId::new(RecordKind::Tag));

        let view = note.resolve(&tags);
        assert_eq!(view.tags.len(), 2);
    }

    #[test]
    fn test_note_empty_tags_roundtrip() {
        let project_id = RecordId::new(RecordKind::Project);
        let note = Note::from_draft(project_id, &NoteDraft::default());

        let json = serde_json::to_string(&note).unwrap();
        assert!(!json.contains("tag_ids"));
        let parsed: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(note, parsed);
    }
}
