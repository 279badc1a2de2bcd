//! `qs project` command - project management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{find_project, format_short_id, open_session};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects
    List,

    /// Create a new project
    New(NewArgs),

    /// Delete a project and everything it owns
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Project name or id
    pub project: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub async fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List => run_list(global).await,
        ProjectCommands::New(args) => run_new(args, global).await,
        ProjectCommands::Rm(args) => run_rm(args, global).await,
    }
}

async fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    let state = session.state().await;

    if state.projects.is_empty() {
        println!("No projects yet. Create one with `qs project new <name>`.");
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "NAME"]);
    for project in &state.projects {
        builder.push_record([format_short_id(&project.id), project.name.clone()]);
    }
    println!("{}", builder.build().with(Style::markdown()));

    if !global.quiet {
        println!("{} project(s)", state.projects.len());
    }
    Ok(())
}

async fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;

    let project = session
        .create_project(&args.name)
        .await
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Created project {} ({})",
            style("✓").green(),
            style(&project.name).bold(),
            project.id
        );
    }
    Ok(())
}

async fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    let state = session.state().await;
    let project = find_project(&state, &args.project)?.clone();

    if !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete project '{}' and all of its notes, tags, and todos?",
                project.name
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    session.delete_project(&project.id).await.into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Deleted project {}",
            style("✓").green(),
            style(&project.name).bold()
        );
    }
    Ok(())
}
