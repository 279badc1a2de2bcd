//! `qs todo` command - todo management

use chrono::NaiveDate;
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
use crate::records::TodoDraft;

#[derive(Subcommand, Debug)]
pub enum TodoCommands {
    /// List todos in the active project
    List,

    /// Create a new todo
    New(NewArgs),

    /// Update a todo's fields
    Edit(EditArgs),

    /// Mark a todo as completed
    Done(DoneArgs),

    /// Delete a todo
    Rm(RmArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Task description
    pub task: String,

    /// Due date (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    pub deadline: NaiveDate,

    /// Attach a tag by label or id (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Todo task or id
    pub todo: String,

    /// New task description
    #[arg(long)]
    pub task: Option<String>,

    /// New due date (YYYY-MM-DD)
    #[arg(long, short = 'd')]
    pub deadline: Option<NaiveDate>,

    /// Replace the attached tags (repeatable; omit to keep current tags)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct DoneArgs {
    /// Todo task or id
    pub todo: String,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Todo task or id
    pub todo: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub async fn run(cmd: TodoCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TodoCommands::List => run_list(global).await,
        TodoCommands::New(args) => run_new(args, global).await,
        TodoCommands::Edit(args) => run_edit(args, global).await,
        TodoCommands::Done(args) => run_done(args, global).await,
        TodoCommands::Rm(args) => run_rm(args, global).await,
    }
}

async fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    let project = select_project(&session, global, &config).await?;
    let state = session.state().await;

    if state.todos.is_empty() {
        println!("No todos in '{}'.", project.name);
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "TASK", "DONE", "DEADLINE", "TAGS"]);
    for todo in &state.todos {
        let tags = todo
            .tags
            .iter()
            .map(|tag| tag.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let done = if todo.is_completed { "x" } else { "" };
        builder.push_record([
            format_short_id(&todo.id),
            truncate_str(&todo.task, 40),
            done.to_string(),
            todo.deadline.to_string(),
            tags,
        ]);
    }
    println!("{}", builder.build().with(Style::markdown()));

    if !global.quiet {
        println!("{} todo(s)", state.todos.len());
    }
    Ok(())
}

async fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    select_project(&session, global, &config).await?;
    let state = session.state().await;

    let tags = resolve_tags(&state.tags, &args.tags)?;
    let todo = session
        .create_todo(TodoDraft {
            task: args.task,
            is_completed: false,
            deadline: args.deadline,
            tags,
        })
        .await
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Created todo {} ({})",
            style("✓").green(),
            style(&todo.task).bold(),
            todo.id
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
        .todos
        .iter()
        .map(|todo| (todo.id.clone(), todo.task.as_str()))
        .collect();
    let id = resolve_id(&args.todo, &candidates)?;
    let current = state
        .todos
        .iter()
        .find(|todo| todo.id == id)
        .ok_or_else(|| miette::miette!("todo not found: {}", args.todo))?;

    let tags = if args.tags.is_empty() {
        current.tags.clone()
    } else {
        resolve_tags(&state.tags, &args.tags)?
    };
    let draft = TodoDraft {
        task: args.task.unwrap_or_else(|| current.task.clone()),
        is_completed: current.is_completed,
        deadline: args.deadline.unwrap_or(current.deadline),
        tags,
    };

    let todo = session.update_todo(&id, draft).await.into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Updated todo {} ({})",
            style("✓").green(),
            style(&todo.task).bold(),
            todo.id
        );
    }
    Ok(())
}

async fn run_done(args: DoneArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let session = open_session(global, &config).await?;
    select_project(&session, global, &config).await?;
    let state = session.state().await;

    let candidates: Vec<_> = state
        .todos
        .iter()
        .map(|todo| (todo.id.clone(), todo.task.as_str()))
        .collect();
    let id = resolve_id(&args.todo, &candidates)?;
    let current = state
        .todos
        .iter()
        .find(|todo| todo.id == id)
        .ok_or_else(|| miette::miette!("todo not found: {}", args.todo))?;

    let draft = TodoDraft {
        task: current.task.clone(),
        is_completed: true,
        deadline: current.deadline,
        tags: current.tags.clone(),
    };
    let todo = session.update_todo(&id, draft).await.into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Completed todo {}",
            style("✓").green(),
            style(&todo.task).bold()
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
        .todos
        .iter()
        .map(|todo| (todo.id.clone(), todo.task.as_str()))
        .collect();
    let id = resolve_id(&args.todo, &candidates)?;

    if !args.force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete todo '{}'?", args.todo))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    session.delete_todo(&id).await.into_diagnostic()?;

    if !global.quiet {
        println!("{} Deleted todo {}", style("✓").green(), id);
    }
    Ok(())
}
