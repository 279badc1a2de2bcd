//! Shared helper functions for CLI commands
//!
//! Every command builds the same composition root: load config, open the
//! store, build a session, fetch the project list. The helpers here keep
//! that wiring in one place.

use miette::{bail, IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::identity::RecordId;
use crate::core::{Config, Session, SessionState, Store};
use crate::records::{Project, Tag};

/// Open the store and build a session with the project list loaded
pub async fn open_session(global: &GlobalOpts, config: &Config) -> Result<Session> {
    let db_path = match global.data_dir.as_ref() {
        Some(dir) => dir.join("quickscribe.db"),
        None => config.db_path(),
    };

    let store = Store::open(&db_path).await.into_diagnostic()?;
    let session = Session::new(store);
    session.load_projects().await.into_diagnostic()?;
    Ok(session)
}

/// Resolve `--project` (or the configured default) and make it the active
/// selection
pub async fn select_project(
    session: &Session,
    global: &GlobalOpts,
    config: &Config,
) -> Result<Project> {
    let Some(selector) = global
        .project
        .as_deref()
        .or(config.default_project.as_deref())
    else {
        bail!("no project given; pass --project <name> or set default_project in the config");
    };

    let state = session.state().await;
    let project = find_project(&state, selector)?.clone();
    session
        .select_project(Some(project.clone()))
        .await
        .into_diagnostic()?;
    Ok(project)
}

/// Find a project by name or full id
pub fn find_project<'a>(state: &'a SessionState, selector: &str) -> Result<&'a Project> {
    match state
        .projects
        .iter()
        .find(|project| project.name == selector || project.id.to_string() == selector)
    {
        Some(project) => Ok(project),
        None => bail!("project not found: {selector}"),
    }
}

/// Resolve tag selectors (label or full id) against the active project's
/// tags
pub fn resolve_tags(tags: &[Tag], selectors: &[String]) -> Result<Vec<Tag>> {
    selectors
        .iter()
        .map(|selector| {
            tags.iter()
                .find(|tag| &tag.label == selector || &tag.id.to_string() == selector)
                .cloned()
                .ok_or_else(|| miette::miette!("tag not found in this project: {selector}"))
        })
        .collect()
}

/// Parse a record id selector, or find it by a display field
///
/// `candidates` pairs each known id with the display value users are
/// likely to type (note title, tag label, todo task).
pub fn resolve_id(selector: &str, candidates: &[(RecordId, &str)]) -> Result<RecordId> {
    if let Ok(id) = RecordId::parse(selector) {
        return Ok(id);
    }
    let mut matches = candidates
        .iter()
        .filter(|(_, display)| *display == selector);
    match (matches.next(), matches.next()) {
        (Some((id, _)), None) => Ok(id.clone()),
        (Some(_), Some(_)) => bail!("'{selector}' is ambiguous; use the full id"),
        (None, _) => bail!("not found: {selector}"),
    }
}

/// Format a RecordId for display, truncating if too long
pub fn format_short_id(id: &RecordId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RecordKind;

    #[test]
    fn test_format_short_id() {
        let id = RecordId::new(RecordKind::Note);
        let formatted = format_short_id(&id);
        assert!(formatted.len() <= 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn test_resolve_id_by_display_value() {
        let note = RecordId::new(RecordKind::Note);
        let other = RecordId::new(RecordKind::Note);
        let candidates = vec![(note.clone(), "Plan"), (other, "Backlog")];

        assert_eq!(resolve_id("Plan", &candidates).unwrap(), note);
        assert_eq!(resolve_id(&note.to_string(), &candidates).unwrap(), note);
        assert!(resolve_id("Missing", &candidates).is_err());
    }

    #[test]
    fn test_resolve_id_rejects_ambiguity() {
        let a = RecordId::new(RecordKind::Note);
        let b = RecordId::new(RecordKind::Note);
        let candidates = vec![(a, "Plan"), (b, "Plan")];
        assert!(resolve_id("Plan", &candidates).is_err());
    }

    #[test]
    fn test_resolve_tags_by_label() {
        let project = RecordId::new(RecordKind::Project);
        let tags = vec![
            Tag::new(project.clone(), "Urgent", "#ff0000"),
            Tag::new(project, "Later", "#00ff00"),
        ];

        let resolved = resolve_tags(&tags, &["Urgent".to_string()]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].label, "Urgent");

        assert!(resolve_tags(&tags, &["Missing".to_string()]).is_err());
    }
}
