//! `qs note` command - note management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{
    format_short_id, open_session, resolve_id, resolve_tags, select_project, truncate_str,
};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::records::NoteDraft;

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// List notes in the active project
    List,

    /// Show a note's full contents
    Show(ShowArgs),

    /// Create a new note
    New(NewArgs),

    /// Update a note's fields
    Edit(EditArgs),

    /// Delete a note
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Note title or id
    pub note: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Short title
    #[arg(long, short = 't')]
    pub title: String,

    /// Markdown body
    #[arg(long, short = 'm', default_value = "")]
    pub markdown: String,

    /// Attach a tag by label or id (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Note title or id
    pub note: String,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// New markdown body
    #[arg(long, short = 'm')]
    pub markdown: Option<String>,

    /// Replace the attached tags (repeatable; omit to keep current tags)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Note title or id
    pub note: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub async fn run(cmd: NoteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        NoteCommands::List => run_list(global).await,
        NoteCommands::Show(args) => run_show(args, global).await,
        NoteCommands::New(args) => run_new(args, global).await,
        NoteCommands::Edit(args) => run_edit(args, global).await,
        NoteCommands::Rm(args) => run_rm(args, global).await,
    }
}

async fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    let project = select_project(&session, global, &config).await?;
    let state = session.state().await;

    if state.notes.is_empty() {
        println!("No notes in '{}'.", project.name);
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "TITLE", "TAGS"]);
    for note in &state.notes {
        let tags = note
            .tags
            .iter()
            .map(|tag| tag.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        builder.push_record([
            format_short_id(&note.id),
            truncate_str(&note.title, 40),
            tags,
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));

    if !global.quiet {
        println!("{} note(s)", state.notes.len());
    }
    Ok(())
}

async fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    select_project(&session, global, &config).await?;
    let state = session.state().await;

    let candidates: Vec<_> = state
        .notes
        .iter()
        .map(|note| (note.id.clone(), note.title.as_str()))
        .collect();
    let id = resolve_id(&args.note, &candidates)?;
    let note = state
        .notes
        .iter()
        .find(|note| note.id == id)
        .ok_or_else(|| miette::miette!("note not found: {}", args.note))?;

    println!("{} ({})", style(&note.title).bold(), note.id);
    if !note.tags.is_empty() {
        let tags = note
            .tags
            .iter()
            .map(|tag| tag.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("tags: {tags}");
    }
    if !note.markdown.is_empty() {
        println!("\n{}", note.markdown);
    }
    Ok(())
}

async fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    select_project(&session, global, &config).await?;
    let state = session.state().await;

    let tags = resolve_tags(&state.tags, &args.tags)?;
    let note = session
        .create_note(NoteDraft {
            title: args.title,
            markdown: args.markdown,
            tags,
        })
        .await
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Created note {} ({})",
            style("✓").green(),
            style(&note.title).bold(),
            note.id
        );
    }
    Ok(())
}

async fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    select_project(&session, global, &config).await?;
    let state = session.state().await;

    let candidates: Vec<_> = state
        .notes
        .iter()
        .map(|note| (note.id.clone(), note.title.as_str()))
        .collect();
    let id = resolve_id(&args.note, &candidates)?;
    let current = state
        .notes
        .iter()
        .find(|note| note.id == id)
        .ok_or_else(|| miette::miette!("note not found: {}", args.note))?;

    let tags = if args.tags.is_empty() {
        current.tags.clone()
    } else {
        resolve_tags(&state.tags, &args.tags)?
    };
    let draft = NoteDraft {
        title: args.title.unwrap_or_else(|| current.title.clone()),
        markdown: args.markdown.unwrap_or_else(|| current.markdown.clone()),
        tags,
    };

    let note = session.update_note(&id, draft).await.into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Updated note {} ({})",
            style("✓").green(),
            style(&note.title).bold(),
            note.id
        );
    }
    Ok(())
}

async fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    select_project(&session, global, &config).await?;
    let state = session.state().await;

    let candidates: Vec<_> = state
        .notes
        .iter()
        .map(|note| (note.id.clone(), note.title.as_str()))
        .collect();
    let id = resolve_id(&args.note, &candidates)?;

    if !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete note '{}'?", args.note))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    session.delete_note(&id).await.into_diagnostic()?;

    if !global.quiet {
        println!("{} Deleted note {}", style("✓").green(), id);
    }
    Ok(())
}
