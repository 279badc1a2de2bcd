//! `qs init` command - create the database

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::{Config, Store};

#[derive(clap::Args, Debug)]
pub struct InitArgs {}

pub async fn run(_args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let db_path = match global.data_dir.as_ref() {
        Some(dir) => dir.join("quickscribe.db"),
        None => config.db_path(),
    };

    // opening applies the schema idempotently
    Store::open(&db_path).await.into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Initialized QuickScribe database at {}",
            style("✓").green(),
            db_path.display()
        );
    }
    Ok(())
}
