use clap::Parser;
use miette::Result;
use qs::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let default_filter = if global.verbose { "qs=debug" } else { "qs=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("QS_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init(args) => qs::cli::commands::init::run(args, &global).await,
        Commands::Project(cmd) => qs::cli::commands::project::run(cmd, &global).await,
        Commands::Note(cmd) => qs::cli::commands::note::run(cmd, &global).await,
        Commands::Tag(cmd) => qs::cli::commands::tag::run(cmd, &global).await,
        Commands::Todo(cmd) => qs::cli::commands::todo::run(cmd, &global).await,
        Commands::Completions(args) => qs::cli::commands::completions::run(args),
    }
}
