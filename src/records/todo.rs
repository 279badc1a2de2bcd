//! Todo record type - stored, view, and draft forms

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{OwnedRecord, Record};
use crate::records::tag::Tag;

/// Persisted form of a todo; tags are referenced by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: RecordId,

    /// Owning project
    pub project_id: RecordId,

    /// Task description
    pub task: String,

    /// Whether the task is done
    pub is_completed: bool,

    /// Due date
    pub deadline: NaiveDate,

    /// Ids of the tags attached to this todo
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<RecordId>,
}

/// A todo with its tag references resolved to actual tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoView {
    pub id: RecordId,
    pub project_id: RecordId,
    pub task: String,
    pub is_completed: bool,
    pub deadline: NaiveDate,
    pub tags: Vec<Tag>,
}

/// User-supplied fields for creating or updating a todo
#[derive(Debug, Clone)]
pub struct TodoDraft {
    pub task: String,
    pub is_completed: bool,
    pub deadline: NaiveDate,
    pub tags: Vec<Tag>,
}

impl Todo {
    /// Build a stored todo from a draft, owned by the given project
    pub fn from_draft(project_id: RecordId, draft: &TodoDraft) -> Self {
        Self {
            id: RecordId::new(RecordKind::Todo),
            project_id,
            task: draft.task.clone(),
            is_completed: draft.is_completed,
            deadline: draft.deadline,
            tag_ids: draft.tags.iter().map(|tag| tag.id.clone()).collect(),
        }
    }

    /// Resolve the stored tag ids against a project's tag list
    pub fn resolve(&self, tags: &[Tag]) -> TodoView {
        TodoView {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            task: self.task.clone(),
            is_completed: self.is_completed,
            deadline: self.deadline,
            tags: tags
                .iter()
                .filter(|tag| self.tag_ids.contains(&tag.id))
                .cloned()
                .collect(),
        }
    }
}

impl Record for Todo {
    const KIND: RecordKind = RecordKind::Todo;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn project_id(&self) -> Option<&RecordId> {
        Some(&self.project_id)
    }
}

impl OwnedRecord for Todo {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_deadline_serializes_as_plain_date() {
        let project_id = RecordId::new(RecordKind::Project);
        let todo = Todo::from_draft(
            project_id,
            &TodoDraft {
                task: "Ship".into(),
                is_completed: false,
                deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                tags: Vec::new(),
            },
        );

        let json = serde_json::to_string(&todo).unwrap();
        assert!(json.contains("\"2025-01-01\""));
        let parsed: Todo = serde_json::from_str(&json).unwrap();
        assert_eq!(todo, parsed);
    }

    #[test]
    fn test_todo_resolve_carries_tag_labels() {
        let project_id = RecordId::new(RecordKind::Project);
        let tag = Tag::new(project_id.clone(), "Urgent", "#ff0000");
        let todo = Todo::from_draft(
            project_id,
            &TodoDraft {
                task: "Ship".into(),
                is_completed: false,
                deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                tags: vec![tag.clone()],
            },
        );

        let view = todo.resolve(std::slice::from_ref(&tag));
        assert_eq!(view.tags.len(), 1);
        assert_eq!(view.tags[0].label, "Urgent");
    }
}
