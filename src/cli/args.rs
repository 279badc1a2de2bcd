//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, init::InitArgs, note::NoteCommands, project::ProjectCommands,
    tag::TagCommands, todo::TodoCommands,
};

#[derive(Parser)]
#[command(name = "qs")]
#[command(author, version, about = "QuickScribe - project-scoped notes, tags, and todos")]
#[command(
    long_about = "A local-first organizer. Notes, tags, and todos are grouped into projects and persisted in an embedded database."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Directory holding the database (default: platform data dir)
    #[arg(long, global = true, env = "QS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Project to operate on, by name or id (default: from config)
    #[arg(long, short = 'p', global = true, env = "QS_PROJECT")]
    pub project: Option<String>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init(InitArgs),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Note management
    #[command(subcommand)]
    Note(NoteCommands),

    /// Tag management
    #[command(subcommand)]
    Tag(TagCommands),

    /// Todo management
    #[command(subcommand)]
    Todo(TodoCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
