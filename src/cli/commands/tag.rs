//! `qs tag` command - tag management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_short_id, open_session, resolve_id, select_project};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// List tags in the active project
    List,

    /// Create a new tag
    New(NewArgs),

    /// Update a tag's label or priority color
    Edit(EditArgs),

    /// Delete a tag and detach it from notes and todos
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Display label
    pub label: String,

    /// Priority color as a hex string
    #[arg(long, default_value = "#cccccc")]
    pub priority: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Tag label or id
    pub tag: String,

    /// New label
    #[arg(long, short = 'l')]
    pub label: Option<String>,

    /// New priority color
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Tag label or id
    pub tag: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub async fn run(cmd: TagCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TagCommands::List => run_list(global).await,
        TagCommands::New(args) => run_new(args, global).await,
        TagCommands::Edit(args) => run_edit(args, global).await,
        TagCommands::Rm(args) => run_rm(args, global).await,
    }
}

async fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    let project = select_project(&session, global, &config).await?;
    let state = session.state().await;

    if state.tags.is_empty() {
        println!("No tags in '{}'.", project.name);
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "LABEL", "PRIORITY"]);
    for tag in &state.tags {
        builder.push_record([
            format_short_id(&tag.id),
            tag.label.clone(),
            tag.priority.clone(),
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));

    if !global.quiet {
        println!("{} tag(s)", state.tags.len());
    }
    Ok(())
}

async fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    select_project(&session, global, &config).await?;

    let tag = session
        .create_tag(&args.label, &args.priority)
        .await
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Created tag {} ({})",
            style("✓").green(),
            style(&tag.label).bold(),
            tag.id
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
        .tags
        .iter()
        .map(|tag| (tag.id.clone(), tag.label.as_str()))
        .collect();
    let id = resolve_id(&args.tag, &candidates)?;
    let current = state
        .tags
        .iter()
        .find(|tag| tag.id == id)
        .ok_or_else(|| miette::miette!("tag not found: {}", args.tag))?;

    let tag = session
        .update_tag(
            &id,
            args.label.unwrap_or_else(|| current.label.clone()),
            args.priority.unwrap_or_else(|| current.priority.clone()),
        )
        .await
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Updated tag {} ({})",
            style("✓").green(),
            style(&tag.label).bold(),
            tag.id
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
        .tags
        .iter()
        .map(|tag| (tag.id.clone(), tag.label.as_str()))
        .collect();
    let id = resolve_id(&args.tag, &candidates)?;

    if !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete tag '{}'? It will be removed from every note and todo.",
                args.tag
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    session.delete_tag(&id).await.into_diagnostic()?;

    if !global.quiet {
        println!("{} Deleted tag {}", style("✓").green(), id);
    }
    Ok(())
}
