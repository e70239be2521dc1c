//! Interactive `mate shell`.
//!
//! Each line is one command. Commands that only wait on the network (`ask`,
//! `search`, `add`, `upload`) run as background tasks so the prompt stays
//! usable; commands that need a confirmation (`delete`, `clear`) run inline
//! because the answer is read from the same input.
//!
//! | Command | Action |
//! |---------|--------|
//! | `docs` | show the document list |
//! | `upload <path>...` | upload PDF files |
//! | `delete <n>` | delete document `n` |
//! | `ask <question>` | ask about the documents |
//! | `clear` | clear the chat transcript |
//! | `search <query>` | search for papers |
//! | `add <n>` | add search result `n` to the documents |
//! | `results` | show the search panel again |
//! | `help` | list commands |
//! | `quit` | leave, cancelling anything in flight |

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use research_mate_core::chat::{AskOutcome, ClearOutcome};
use research_mate_core::documents::DeleteOutcome;
use research_mate_core::search::{AddOutcome, SearchOutcome};
use research_mate_core::session::UploadOutcome;
use research_mate_core::transport::UploadFile;
use research_mate_core::workspace::Workspace;
use tokio::task::JoinSet;

use crate::prompt::Lines;
use crate::render;

pub const HELP: &str = "\
Commands:
  docs                 show the document list
  upload <path>...     upload PDF files
  delete <n>           delete document n
  ask <question>       ask about the documents
  clear                clear the chat transcript
  search <query>       search for papers
  add <n>              add search result n to the documents
  results              show the last search results
  help                 show this help
  quit                 leave (cancels anything in flight)
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Docs,
    Upload(Vec<PathBuf>),
    /// Zero-based document index.
    Delete(usize),
    Ask(String),
    Clear,
    Search(String),
    /// Zero-based result index.
    Add(usize),
    Results,
    Help,
    Quit,
}

/// Parse one input line. Numbers are one-based on input.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "docs" => ShellCommand::Docs,
        "upload" => {
            if rest.is_empty() {
                return Err("usage: upload <path>...".to_string());
            }
            ShellCommand::Upload(rest.split_whitespace().map(PathBuf::from).collect())
        }
        "delete" => ShellCommand::Delete(parse_position(rest, "delete <n>")?),
        "ask" => ShellCommand::Ask(rest.to_string()),
        "clear" => ShellCommand::Clear,
        "search" => ShellCommand::Search(rest.to_string()),
        "add" => ShellCommand::Add(parse_position(rest, "add <n>")?),
        "results" => ShellCommand::Results,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(command)
}

fn parse_position(arg: &str, usage: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("usage: {}", usage)),
    }
}

/// Read `paths` into upload parts. Unreadable files are reported and skipped.
pub async fn read_files(paths: &[PathBuf]) -> Vec<UploadFile> {
    let mut files = Vec::new();
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(bytes) => files.push(upload_file(path, bytes)),
            Err(e) => println!("cannot read {}: {}", path.display(), e),
        }
    }
    files
}

fn upload_file(path: &Path, bytes: Vec<u8>) -> UploadFile {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        UploadFile::pdf(name, bytes)
    } else {
        UploadFile::new(name, "application/octet-stream", bytes)
    }
}

/// Run the shell until `quit` or end of input.
///
/// On end of input, background work is awaited before returning so piped
/// scripts see every result.
pub async fn run(workspace: Workspace, lines: Lines, interactive: bool) -> Result<()> {
    workspace.load().await;
    print!("{}", render::documents(&workspace.documents.view()));
    if interactive {
        println!("Type 'help' for commands.");
    }

    let mut tasks = JoinSet::new();
    loop {
        if interactive {
            print!("mate> ");
            let _ = std::io::stdout().flush();
        }
        let Some(line) = lines.lock().await.recv().await else {
            break;
        };
        // Reap finished tasks so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        tracing::debug!(?command, "shell command");

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Help => print!("{}", HELP),
            ShellCommand::Quit => {
                tasks.shutdown().await;
                return Ok(());
            }
            ShellCommand::Docs => print!("{}", render::documents(&workspace.documents.view())),
            ShellCommand::Results => print!("{}", render::search_panel(&workspace.search.view())),
            ShellCommand::Delete(index) => delete(&workspace, index).await,
            ShellCommand::Clear => match workspace.chat.clear().await {
                ClearOutcome::Busy => println!("wait for the current answer before clearing"),
                ClearOutcome::Declined | ClearOutcome::Cleared => {}
            },
            ShellCommand::Ask(question) => {
                let ws = workspace.clone();
                tasks.spawn(async move {
                    if ws.chat.ask(&question).await == AskOutcome::Busy {
                        println!("still answering the previous question");
                    }
                });
            }
            ShellCommand::Search(query) => {
                let ws = workspace.clone();
                tasks.spawn(async move {
                    match ws.search.search(&query).await {
                        SearchOutcome::Ignored | SearchOutcome::Superseded => {}
                        _ => print!("{}", render::search_panel(&ws.search.view())),
                    }
                });
            }
            ShellCommand::Add(index) => {
                let Some(card) = workspace.search.card_at(index) else {
                    println!("no search result #{}", index + 1);
                    continue;
                };
                let ws = workspace.clone();
                tasks.spawn(async move {
                    match ws.search.add_to_documents(card).await {
                        AddOutcome::Added => {
                            println!("✓ Added");
                            print!("{}", render::documents(&ws.documents.view()));
                        }
                        AddOutcome::Failed(err) => println!("Error: {}", render::sanitize_line(err.message())),
                        AddOutcome::Busy => println!("result #{} is already being added", index + 1),
                        AddOutcome::Missing => println!("result #{} is no longer shown", index + 1),
                        AddOutcome::Rejected { .. } => {}
                    }
                });
            }
            ShellCommand::Upload(paths) => {
                let ws = workspace.clone();
                tasks.spawn(async move {
                    let files = read_files(&paths).await;
                    match ws.upload.upload(files).await {
                        UploadOutcome::Uploaded { count } => {
                            println!("uploaded {} file(s)", count);
                            print!("{}", render::documents(&ws.documents.view()));
                        }
                        UploadOutcome::NothingStored => println!("the backend stored nothing"),
                        UploadOutcome::Busy => println!("an upload is already running"),
                        UploadOutcome::Ignored => println!("nothing to upload"),
                        UploadOutcome::Failed(_) => print!("{}", render::upload_form(&ws.upload.view())),
                    }
                });
            }
        }
    }

    while tasks.join_next().await.is_some() {}
    Ok(())
}

async fn delete(workspace: &Workspace, index: usize) {
    match workspace.documents.delete_at(index).await {
        None => println!("no document #{}", index + 1),
        Some(DeleteOutcome::Deleted) => print!("{}", render::documents(&workspace.documents.view())),
        // Failures were already shown through the prompter.
        Some(_) => {}
    }
}
