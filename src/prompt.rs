//! Terminal implementations of [`Prompter`] and the shared stdin line source.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use research_mate_core::surface::Prompter;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use crate::render::sanitize_line;

/// Lines typed by the user, shared by the shell loop and confirmations.
pub type Lines = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Start forwarding lines from `reader` into a [`Lines`] source.
///
/// The source closes when the reader hits EOF.
pub fn spawn_reader<R>(reader: R) -> Lines
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = reader.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    Arc::new(Mutex::new(rx))
}

pub fn stdin_lines() -> Lines {
    spawn_reader(BufReader::new(tokio::io::stdin()))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks on stdout and reads the answer from the shared line source.
pub struct TerminalPrompter {
    lines: Lines,
}

impl TerminalPrompter {
    pub fn new(lines: Lines) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, message: &str) -> bool {
        {
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "{} [y/N] ", message);
            let _ = out.flush();
        }
        match self.lines.lock().await.recv().await {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }

    fn alert(&self, message: &str) {
        println!("⚠ {}", sanitize_line(message));
    }
}

/// For one-shot commands: every confirmation is declined.
pub struct NonInteractivePrompter;

#[async_trait]
impl Prompter for NonInteractivePrompter {
    async fn confirm(&self, message: &str) -> bool {
        tracing::warn!(%message, "confirmation declined: not interactive");
        false
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", sanitize_line(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_answers() {
        for yes in ["y", "Y", " yes ", "YES"] {
            assert!(is_yes(yes), "{yes:?}");
        }
        for no in ["", "n", "no", "yep", "maybe"] {
            assert!(!is_yes(no), "{no:?}");
        }
    }

    #[tokio::test]
    async fn test_confirm_reads_next_line() {
        let lines = spawn_reader(BufReader::new(&b"yes\nno\n"[..]));
        let prompter = TerminalPrompter::new(lines);
        assert!(prompter.confirm("first?").await);
        assert!(!prompter.confirm("second?").await);
        assert!(!prompter.confirm("after eof?").await);
    }

    #[tokio::test]
    async fn test_non_interactive_declines() {
        assert!(!NonInteractivePrompter.confirm("delete?").await);
    }
}
