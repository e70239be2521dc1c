//! # Research Mate CLI (`mate`)
//!
//! ## Usage
//!
//! ```bash
//! mate --config ./config/mate.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mate shell` | Interactive session (default) |
//! | `mate search "<query>"` | Search for papers and print the results |
//! | `mate docs` | Print the documents attached to the session |
//!
//! ## Examples
//!
//! ```bash
//! # Talk to a local backend
//! mate shell --config ./config/mate.toml
//!
//! # Try the client without a backend
//! mate --offline search "residual"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use research_mate::config::{self, Config};
use research_mate::http::HttpTransport;
use research_mate::pacer::TokioPacer;
use research_mate::prompt::{self, NonInteractivePrompter, TerminalPrompter};
use research_mate::render::{self, TerminalObserver};
use research_mate::shell;
use research_mate_core::documents::RefreshOutcome;
use research_mate_core::memory::InMemoryBackend;
use research_mate_core::surface::{Collaborators, Prompter};
use research_mate_core::transport::Transport;
use research_mate_core::workspace::Workspace;

/// Research Mate: ask questions about your papers from the terminal.
#[derive(Parser)]
#[command(
    name = "mate",
    about = "Research Mate: upload papers, import search results, and ask questions about them",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/mate.toml`. When the file does not exist the
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/mate.toml")]
    config: PathBuf,

    /// Use a built-in in-memory backend instead of the configured server.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session.
    ///
    /// Loads the session documents, then reads commands from stdin until
    /// `quit` or end of input. Type `help` inside the shell for the list.
    Shell,

    /// Search for papers and print the results.
    Search {
        /// Free-text query.
        query: String,
    },

    /// Print the documents attached to the session.
    Docs,
}

fn transport(cfg: &Config, offline: bool) -> anyhow::Result<Arc<dyn Transport>> {
    if offline {
        tracing::info!("using the in-memory backend");
        return Ok(Arc::new(InMemoryBackend::demo()));
    }
    tracing::debug!(base_url = %cfg.backend.base_url, "using the HTTP backend");
    Ok(Arc::new(HttpTransport::new(
        &cfg.backend.base_url,
        cfg.timeout(),
    )?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    research_mate::init_logging(research_mate::DEFAULT_LOG_FILTER);
    let cli = Cli::parse();

    let cfg = config::load_or_minimal(&cli.config)?;
    let transport = transport(&cfg, cli.offline)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let lines = prompt::stdin_lines();
            let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter::new(lines.clone()));
            let collab = Collaborators::new(transport, Arc::new(TokioPacer), prompter)
                .with_observer(Arc::new(TerminalObserver::stdout()));
            let workspace = Workspace::new(collab, cfg.timing());
            shell::run(workspace, lines, atty::is(atty::Stream::Stdin)).await?;
        }
        Commands::Search { query } => {
            let workspace = one_shot(transport, &cfg);
            workspace.search.search(&query).await;
            print!("{}", render::search_panel(&workspace.search.view()));
        }
        Commands::Docs => {
            let workspace = one_shot(transport, &cfg);
            if let RefreshOutcome::Failed(err) = workspace.load().await {
                anyhow::bail!("Failed to load session documents: {}", err);
            }
            print!("{}", render::documents(&workspace.documents.view()));
        }
    }

    Ok(())
}

fn one_shot(transport: Arc<dyn Transport>, cfg: &Config) -> Workspace {
    let collab = Collaborators::new(
        transport,
        Arc::new(TokioPacer),
        Arc::new(NonInteractivePrompter),
    );
    Workspace::new(collab, cfg.timing())
}
