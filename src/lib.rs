//! # Research Mate
//!
//! Terminal client for a document question-answering assistant. The user
//! uploads PDFs (or imports papers found through search) into a backend
//! session, then asks questions answered against those documents.
//!
//! The controllers and view models live in [`research_mate_core`]; this crate
//! supplies what they need from a real environment: an HTTP transport, a
//! tokio pacer, terminal prompts and rendering, and the `mate` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────────────┐   ┌─────────────────┐
//! │  shell   │──▶│ research_mate_core   │──▶│  HttpTransport  │──▶ backend
//! │  (mate)  │   │ Workspace/controllers│   │  (or in-memory) │
//! └────▲─────┘   └─────────┬───────────┘   └─────────────────┘
//!      │                   │ ViewEvent
//!      └──── render ◀──────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`http`] | reqwest transport |
//! | [`pacer`] | tokio timer pacer |
//! | [`prompt`] | Terminal confirmations and alerts |
//! | [`render`] | Plain-text rendering and sanitizing |
//! | [`shell`] | Interactive command loop |

pub mod config;
pub mod http;
pub mod pacer;
pub mod prompt;
pub mod render;
pub mod shell;

use tracing_subscriber::EnvFilter;

/// Filters used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "research_mate=info,research_mate_core=info";

/// Install the global `tracing` subscriber, writing to stderr.
///
/// A valid `RUST_LOG` replaces `defaults` entirely.
pub fn init_logging(defaults: &str) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(env.as_deref(), defaults))
        .with_writer(std::io::stderr)
        .try_init();
}

fn log_filter(env: Option<&str>, defaults: &str) -> EnvFilter {
    match env.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        Some(Err(e)) => {
            eprintln!("ignoring invalid {}: {}", EnvFilter::DEFAULT_ENV, e);
            EnvFilter::new(defaults)
        }
        None => EnvFilter::new(defaults),
    }
}
