//! QuickScribe: project-scoped notes, tags, and todos
//!
//! A local-first organizer persisting to an embedded SQLite database, with
//! a session coordinator that keeps an in-memory view of the active
//! project's contents.

pub mod cli;
pub mod core;
pub mod records;
