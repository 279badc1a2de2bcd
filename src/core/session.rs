//! Session state coordinator
//!
//! Holds the loaded project list, the active project selection, and the
//! denormalized notes/tags/todos for that project. Operations write through
//! the store first and only then patch the in-memory state, so a failed
//! persistence call never leaves state ahead of storage.
//!
//! A `Session` is built once at the composition root and passed down to
//! whatever renders it; there is no global instance. Consumers read state
//! through cloned snapshots and never mutate it directly.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::core::identity::RecordId;
use crate::core::store::{Store, StoreError};
use crate::records::{Note, NoteDraft, NoteView, Project, Tag, Todo, TodoDraft, TodoView};

/// Errors raised by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// A record operation was invoked with no active project
    #[error("no project is selected")]
    NoSelection,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only snapshot of the session state
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// All known projects
    pub projects: Vec<Project>,

    /// True until the initial project list has been fetched
    pub is_loading: bool,

    /// The active project, if any
    pub current_project: Option<Project>,

    /// Notes of the active project, tags resolved
    pub notes: Vec<NoteView>,

    /// Tags of the active project
    pub tags: Vec<Tag>,

    /// Todos of the active project, tags resolved
    pub todos: Vec<TodoView>,
}

/// The state coordinator over a record store
pub struct Session {
    store: Store,
    state: RwLock<SessionState>,
    selection_token: AtomicU64,
}

impl Session {
    /// Create a session over an opened store
    ///
    /// The state starts loading; call [`Session::load_projects`] to fetch
    /// the initial project list.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState {
                is_loading: true,
                ..SessionState::default()
            }),
            selection_token: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fetch all projects; clears the loading flag even on failure
    ///
    /// The loading flag signals "initial project list ready", not the
    /// per-project loads that happen on selection.
    pub async fn load_projects(&self) -> Result<(), SessionError> {
        let result = self.store.get_all::<Project>().await;
        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(projects) => {
                state.projects = projects;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "loading projects failed");
                Err(err.into())
            }
        }
    }

    /// Change the active project and load its contents
    ///
    /// The three per-project fetches run concurrently; all must succeed
    /// before the state is replaced, atomically, with the resolved views.
    /// On any fetch failure the prior state is retained. A result that
    /// arrives after a newer selection has been issued is discarded, so the
    /// visible state always reflects the latest selection. Selecting `None`
    /// clears the selection and empties the lists.
    pub async fn select_project(&self, project: Option<Project>) -> Result<(), SessionError> {
        let token = self.selection_token.fetch_add(1, Ordering::SeqCst) + 1;

        let (notes, tags, todos) = match project.as_ref() {
            Some(p) => {
                let fetched = tokio::try_join!(
                    self.store.get_by_project::<Note>(Some(&p.id)),
                    self.store.get_by_project::<Tag>(Some(&p.id)),
                    self.store.get_by_project::<Todo>(Some(&p.id)),
                );
                match fetched {
                    Ok(lists) => lists,
                    Err(err) => {
                        warn!(error = %err, project = %p.id, "loading project contents failed");
                        return Err(err.into());
                    }
                }
            }
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        let notes: Vec<NoteView> = notes.iter().map(|note| note.resolve(&tags)).collect();
        let todos: Vec<TodoView> = todos.iter().map(|todo| todo.resolve(&tags)).collect();

        let mut state = self.state.write().await;
        if self.selection_token.load(Ordering::SeqCst) != token {
            debug!("discarding stale selection result");
            return Ok(());
        }
        state.current_project = project;
        state.notes = notes;
        state.tags = tags;
        state.todos = todos;
        Ok(())
    }

    /// Create a project; the first project ever created becomes active
    pub async fn create_project(&self, name: impl Into<String>) -> Result<Project, SessionError> {
        let project = Project::new(name);
        self.store
            .insert(&project)
            .await
            .inspect_err(|err| warn!(error = %err, "creating project failed"))?;

        let select_first = {
            let mut state = self.state.write().await;
            state.projects.push(project.clone());
            state.projects.len() == 1 && state.current_project.is_none()
        };
        if select_first {
            if let Err(err) = self.select_project(Some(project.clone())).await {
                warn!(error = %err, "selecting the first project failed");
            }
        }
        Ok(project)
    }

    /// Delete a project and everything it owns
    ///
    /// If the deleted project was active, the selection is cleared; the
    /// caller is expected to navigate away.
    pub async fn delete_project(&self, id: &RecordId) -> Result<(), SessionError> {
        self.store
            .remove_project(id)
            .await
            .inspect_err(|err| warn!(error = %err, project = %id, "deleting project failed"))?;

        let mut state = self.state.write().await;
        state.projects.retain(|project| &project.id != id);
        if state
            .current_project
            .as_ref()
            .is_some_and(|project| &project.id == id)
        {
            state.current_project = None;
            state.notes.clear();
            state.tags.clear();
            state.todos.clear();
        }
        Ok(())
    }

    /// Create a note in the active project
    pub async fn create_note(&self, draft: NoteDraft) -> Result<NoteView, SessionError> {
        let project_id = self.current_project_id().await?;
        let note = Note::from_draft(project_id, &draft);
        self.store
            .insert(&note)
            .await
            .inspect_err(|err| warn!(error = %err, "creating note failed"))?;

        let view = note.resolve(&draft.tags);
        self.state.write().await.notes.push(view.clone());
        Ok(view)
    }

    /// Replace a note's fields, keeping its id
    pub async fn update_note(
        &self,
        id: &RecordId,
        draft: NoteDraft,
    ) -> Result<NoteView, SessionError> {
        let project_id = self.current_project_id().await?;
        let note = Note {
            id: id.clone(),
            project_id,
            title: draft.title.clone(),
            markdown: draft.markdown.clone(),
            tag_ids: draft.tags.iter().map(|tag| tag.id.clone()).collect(),
        };
        self.store
            .replace(&note)
            .await
            .inspect_err(|err| warn!(error = %err, note = %id, "updating note failed"))?;

        let view = note.resolve(&draft.tags);
        let mut state = self.state.write().await;
        if let Some(slot) = state.notes.iter_mut().find(|note| &note.id == id) {
            *slot = view.clone();
        }
        Ok(view)
    }

    /// Delete a note; deleting an absent id is a no-op
    pub async fn delete_note(&self, id: &RecordId) -> Result<(), SessionError> {
        self.store
            .remove::<Note>(id)
            .await
            .inspect_err(|err| warn!(error = %err, note = %id, "deleting note failed"))?;
        self.state.write().await.notes.retain(|note| &note.id != id);
        Ok(())
    }

    /// Create a tag in the active project
    pub async fn create_tag(
        &self,
        label: impl Into<String>,
        priority: impl Into<String>,
    ) -> Result<Tag, SessionError> {
        let project_id = self.current_project_id().await?;
        let tag = Tag::new(project_id, label, priority);
        self.store
            .insert(&tag)
            .await
            .inspect_err(|err| warn!(error = %err, "creating tag failed"))?;

        self.state.write().await.tags.push(tag.clone());
        Ok(tag)
    }

    /// Replace a tag's label and priority, keeping its id
    ///
    /// The copies denormalized into note and todo views are patched too, so
    /// a rename shows up everywhere the tag does.
    pub async fn update_tag(
        &self,
        id: &RecordId,
        label: impl Into<String>,
        priority: impl Into<String>,
    ) -> Result<Tag, SessionError> {
        let project_id = self.current_project_id().await?;
        let tag = Tag {
            id: id.clone(),
            project_id,
            label: label.into(),
            priority: priority.into(),
        };
        self.store
            .replace(&tag)
            .await
            .inspect_err(|err| warn!(error = %err, tag = %id, "updating tag failed"))?;

        let mut state = self.state.write().await;
        if let Some(slot) = state.tags.iter_mut().find(|tag| &tag.id == id) {
            *slot = tag.clone();
        }
        for note in &mut state.notes {
            for slot in note.tags.iter_mut().filter(|slot| &slot.id == id) {
                *slot = tag.clone();
            }
        }
        for todo in &mut state.todos {
            for slot in todo.tags.iter_mut().filter(|slot| &slot.id == id) {
                *slot = tag.clone();
            }
        }
        Ok(tag)
    }

    /// Delete a tag and remove it from every referencing note and todo
    pub async fn delete_tag(&self, id: &RecordId) -> Result<(), SessionError> {
        let project_id = self.current_project_id().await?;
        self.store
            .remove_tag(&project_id, id)
            .await
            .inspect_err(|err| warn!(error = %err, tag = %id, "deleting tag failed"))?;

        let mut state = self.state.write().await;
        state.tags.retain(|tag| &tag.id != id);
        for note in &mut state.notes {
            note.tags.retain(|tag| &tag.id != id);
        }
        for todo in &mut state.todos {
            todo.tags.retain(|tag| &tag.id != id);
        }
        Ok(())
    }

    /// Create a todo in the active project
    pub async fn create_todo(&self, draft: TodoDraft) -> Result<TodoView, SessionError> {
        let project_id = self.current_project_id().await?;
        let todo = Todo::from_draft(project_id, &draft);
        self.store
            .insert(&todo)
            .await
            .inspect_err(|err| warn!(error = %err, "creating todo failed"))?;

        let view = todo.resolve(&draft.tags);
        self.state.write().await.todos.push(view.clone());
        Ok(view)
    }

    /// Replace a todo's fields, keeping its id
    pub async fn update_todo(
        &self,
        id: &RecordId,
        draft: TodoDraft,
    ) -> Result<TodoView, SessionError> {
        let project_id = self.current_project_id().await?;
        let todo = Todo {
            id: id.clone(),
            project_id,
            task: draft.task.clone(),
            is_completed: draft.is_completed,
            deadline: draft.deadline,
            tag_ids: draft.tags.iter().map(|tag| tag.id.clone()).collect(),
        };
        self.store
            .replace(&todo)
            .await
            .inspect_err(|err| warn!(error = %err, todo = %id, "updating todo failed"))?;

        let view = todo.resolve(&draft.tags);
        let mut state = self.state.write().await;
        if let Some(slot) = state.todos.iter_mut().find(|todo| &todo.id == id) {
            *slot = view.clone();
        }
        Ok(view)
    }

    /// Delete a todo; deleting an absent id is a no-op
    pub async fn delete_todo(&self, id: &RecordId) -> Result<(), SessionError> {
        self.store
            .remove::<Todo>(id)
            .await
            .inspect_err(|err| warn!(error = %err, todo = %id, "deleting todo failed"))?;
        self.state.write().await.todos.retain(|todo| &todo.id != id);
        Ok(())
    }

    async fn current_project_id(&self) -> Result<RecordId, SessionError> {
        self.state
            .read()
            .await
            .current_project
            .as_ref()
            .map(|project| project.id.clone())
            .ok_or(SessionError::NoSelection)
    }
}
