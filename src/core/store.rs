//! SQLite-backed record store
//!
//! This module is the persistence layer: one versioned local database with
//! four collections (projects, notes, tags, todos), each keyed by record id.
//! Notes, tags, and todos carry a non-unique secondary index on
//! `project_id`. Record bodies are stored as JSON so the store stays
//! generic over collections.
//!
//! The connection lives behind an async mutex; every operation is
//! asynchronous with respect to the caller.

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, ErrorCode};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::identity::{RecordId, RecordKind};
use crate::core::record::{OwnedRecord, Record};

/// Current schema version for migrations
const DB_VERSION: i32 = 1;

/// Errors raised by the record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or created
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Insert collided with an existing record id
    #[error("duplicate {kind} id: {id}")]
    DuplicateKey { kind: RecordKind, id: RecordId },

    #[error("storage query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("stored record body is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

/// The record store backed by SQLite
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create the database at the given path
    ///
    /// Parent directories are created as needed and the schema is applied
    /// idempotently, so opening an existing database is a no-op beyond the
    /// version check.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {e}", parent.display())))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Self::init_schema(&conn)?;
        debug!(path = %path.display(), "opened record store");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a transient in-memory store
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY NOT NULL
            );
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                body TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                body TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notes_project ON notes(project_id);
            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                body TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tags_project ON tags(project_id);
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                body TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_todos_project ON todos(project_id);
            "#,
        )?;

        let version: i32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if version < DB_VERSION {
            // future migrations branch on `version` here
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![DB_VERSION],
            )?;
        }

        Ok(())
    }

    /// Get all records of a collection, in creation order
    pub async fn get_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT body FROM {} ORDER BY id", R::KIND.table()))?;
        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }

    /// Get all records of a collection owned by the given project
    ///
    /// An unset project id matches nothing and returns the empty set; it is
    /// not an error.
    pub async fn get_by_project<R: OwnedRecord>(
        &self,
        project_id: Option<&RecordId>,
    ) -> Result<Vec<R>, StoreError> {
        let Some(project_id) = project_id else {
            return Ok(Vec::new());
        };

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT body FROM {} WHERE project_id = ?1 ORDER BY id",
            R::KIND.table()
        ))?;
        let bodies = stmt
            .query_map(params![project_id.to_string()], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }

    /// Insert a new record, failing if the id already exists
    pub async fn insert<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let body = serde_json::to_string(record)?;
        let conn = self.conn.lock().await;

        let result = match record.project_id() {
            Some(project_id) => conn.execute(
                &format!(
                    "INSERT INTO {} (id, project_id, body) VALUES (?1, ?2, ?3)",
                    R::KIND.table()
                ),
                params![record.id().to_string(), project_id.to_string(), body],
            ),
            None => conn.execute(
                &format!("INSERT INTO {} (id, body) VALUES (?1, ?2)", R::KIND.table()),
                params![record.id().to_string(), body],
            ),
        };

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateKey {
                    kind: R::KIND,
                    id: record.id().clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or replace a record by id (upsert)
    pub async fn replace<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let body = serde_json::to_string(record)?;
        let conn = self.conn.lock().await;

        match record.project_id() {
            Some(project_id) => conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO {} (id, project_id, body) VALUES (?1, ?2, ?3)",
                    R::KIND.table()
                ),
                params![record.id().to_string(), project_id.to_string(), body],
            )?,
            None => conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO {} (id, body) VALUES (?1, ?2)",
                    R::KIND.table()
                ),
                params![record.id().to_string(), body],
            )?,
        };

        Ok(())
    }

    /// Delete a record by id; deleting an absent id is a no-op
    pub async fn remove<R: Record>(&self, id: &RecordId) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", R::KIND.table()),
            params![id.to_string()],
        )?;
        Ok(())
    }

    /// Delete a project and every note, tag, and todo it owns
    ///
    /// The cascade runs in a single transaction: either the project and all
    /// of its children are gone, or nothing is.
    pub async fn remove_project(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        for kind in [RecordKind::Note, RecordKind::Tag, RecordKind::Todo] {
            tx.execute(
                &format!("DELETE FROM {} WHERE project_id = ?1", kind.table()),
                params![id.to_string()],
            )?;
        }
        tx.execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])?;

        tx.commit()?;
        Ok(())
    }

    /// Delete a tag and rewrite the `tag_ids` of every note and todo in the
    /// same project to exclude it
    ///
    /// Runs as one transaction so a referencing record can never be observed
    /// pointing at a tag that no longer exists.
    pub async fn remove_tag(
        &self,
        project_id: &RecordId,
        tag_id: &RecordId,
    ) -> Result<(), StoreError> {
        let tag_str = tag_id.to_string();
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM tags WHERE id = ?1", params![tag_str])?;

        for kind in [RecordKind::Note, RecordKind::Todo] {
            let rows: Vec<(String, String)> = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT id, body FROM {} WHERE project_id = ?1",
                    kind.table()
                ))?;
                let rows = stmt
                    .query_map(params![project_id.to_string()], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?
                    .collect::<Result<_, _>>()?;
                rows
            };

            for (id, body) in rows {
                let mut value: Value = serde_json::from_str(&body)?;
                let Some(ids) = value.get_mut("tag_ids").and_then(Value::as_array_mut) else {
                    continue;
                };
                let before = ids.len();
                ids.retain(|v| v.as_str() != Some(tag_str.as_str()));
                if ids.len() == before {
                    continue;
                }
                tx.execute(
                    &format!("UPDATE {} SET body = ?2 WHERE id = ?1", kind.table()),
                    params![id, value.to_string()],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Note, NoteDraft, Project, Tag, Todo, TodoDraft};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn draft_with_tags(tags: Vec<Tag>) -> NoteDraft {
        NoteDraft {
            title: "Plan".into(),
            markdown: "# Q1".into(),
            tags,
        }
    }

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("data").join("quickscribe.db");
        let _store = Store::open(&path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("quickscribe.db");

        let project = Project::new("Work");
        {
            let store = Store::open(&path).await.unwrap();
            store.insert(&project).await.unwrap();
        }

        let store = Store::open(&path).await.unwrap();
        let projects: Vec<Project> = store.get_all().await.unwrap();
        assert_eq!(projects, vec![project]);
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_fails() {
        let store = Store::open_in_memory().await.unwrap();
        let project = Project::new("Work");

        store.insert(&project).await.unwrap();
        let err = store.insert(&project).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_replace_upserts() {
        let store = Store::open_in_memory().await.unwrap();
        let mut project = Project::new("Work");

        // replace of an absent id inserts
        store.replace(&project).await.unwrap();

        project.name = "Home".into();
        store.replace(&project).await.unwrap();

        let projects: Vec<Project> = store.get_all().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Home");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();
        let project = Project::new("Work");
        let note = Note::from_draft(project.id.clone(), &draft_with_tags(Vec::new()));

        store.insert(&note).await.unwrap();
        store.remove::<Note>(&note.id).await.unwrap();
        store.remove::<Note>(&note.id).await.unwrap();

        let notes: Vec<Note> = store.get_by_project(Some(&project.id)).await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_project_filters_by_owner() {
        let store = Store::open_in_memory().await.unwrap();
        let work = Project::new("Work");
        let home = Project::new("Home");

        let work_note = Note::from_draft(work.id.clone(), &draft_with_tags(Vec::new()));
        let home_note = Note::from_draft(home.id.clone(), &draft_with_tags(Vec::new()));
        store.insert(&work_note).await.unwrap();
        store.insert(&home_note).await.unwrap();

        let notes: Vec<Note> = store.get_by_project(Some(&work.id)).await.unwrap();
        assert_eq!(notes, vec![work_note]);
    }

    #[tokio::test]
    async fn test_get_by_project_unset_returns_empty() {
        let store = Store::open_in_memory().await.unwrap();
        let project = Project::new("Work");
        let note = Note::from_draft(project.id.clone(), &draft_with_tags(Vec::new()));
        store.insert(&note).await.unwrap();

        let notes: Vec<Note> = store.get_by_project(None).await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_remove_project_cascades() {
        let store = Store::open_in_memory().await.unwrap();
        let project = Project::new("Work");
        store.insert(&project).await.unwrap();

        let tag = Tag::new(project.id.clone(), "Urgent", "#ff0000");
        let note = Note::from_draft(project.id.clone(), &draft_with_tags(vec![tag.clone()]));
        let todo = Todo::from_draft(
            project.id.clone(),
            &TodoDraft {
                task: "Ship".into(),
                is_completed: false,
                deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                tags: Vec::new(),
            },
        );
        store.insert(&tag).await.unwrap();
        store.insert(&note).await.unwrap();
        store.insert(&todo).await.unwrap();

        store.remove_project(&project.id).await.unwrap();

        let projects: Vec<Project> = store.get_all().await.unwrap();
        assert!(projects.is_empty());
        let notes: Vec<Note> = store.get_by_project(Some(&project.id)).await.unwrap();
        assert!(notes.is_empty());
        let tags: Vec<Tag> = store.get_by_project(Some(&project.id)).await.unwrap();
        assert!(tags.is_empty());
        let todos: Vec<Todo> = store.get_by_project(Some(&project.id)).await.unwrap();
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn test_remove_tag_rewrites_references() {
        let store = Store::open_in_memory().await.unwrap();
        let project = Project::new("Work");
        store.insert(&project).await.unwrap();

        let urgent = Tag::new(project.id.clone(), "Urgent", "#ff0000");
        let later = Tag::new(project.id.clone(), "Later", "#00ff00");
        store.insert(&urgent).await.unwrap();
        store.insert(&later).await.unwrap();

        let note = Note::from_draft(
            project.id.clone(),
            &draft_with_tags(vec![urgent.clone(), later.clone()]),
        );
        store.insert(&note).await.unwrap();

        store.remove_tag(&project.id, &urgent.id).await.unwrap();

        let tags: Vec<Tag> = store.get_by_project(Some(&project.id)).await.unwrap();
        assert_eq!(tags, vec![later.clone()]);

        let notes: Vec<Note> = store.get_by_project(Some(&project.id)).await.unwrap();
        assert_eq!(notes[0].tag_ids, vec![later.id.clone()]);
    }

    #[tokio::test]
    async fn test_remove_tag_leaves_unreferencing_records_alone() {
        let store = Store::open_in_memory().await.unwrap();
        let project = Project::new("Work");
        let tag = Tag::new(project.id.clone(), "Urgent", "#ff0000");
        let note = Note::from_draft(project.id.clone(), &draft_with_tags(Vec::new()));
        store.insert(&tag).await.unwrap();
        store.insert(&note).await.unwrap();

        store.remove_tag(&project.id, &tag.id).await.unwrap();

        let notes: Vec<Note> = store.get_by_project(Some(&project.id)).await.unwrap();
        assert_eq!(notes, vec![note]);
    }
}
