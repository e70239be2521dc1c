//! Plain-text rendering of the core view models for a terminal.
//!
//! Everything shown here can originate outside the client (filenames,
//! paper titles, snippets, model answers), so all of it goes through
//! [`sanitize`] or [`sanitize_line`] before it reaches the terminal. Control
//! characters, including ANSI escape introducers, are dropped.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use research_mate_core::models::{Role, TurnKey};
use research_mate_core::surface::ViewObserver;
use research_mate_core::view::{
    DocumentBody, DocumentListView, SearchPanelView, UploadFormView, ViewEvent, ASSISTANT_SPEAKER,
};

/// Strip control characters, keeping newlines and tabs.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

/// Strip control characters and fold line breaks into spaces.
pub fn sanitize_line(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

// ============ Views ============

pub fn documents(view: &DocumentListView) -> String {
    match view {
        DocumentListView::NotLoaded => "(document list not loaded)\n".to_string(),
        DocumentListView::Empty { message } => format!("{}\n", message),
        DocumentListView::Items(items) => {
            let mut out = String::from("Documents:\n");
            for (i, item) in items.iter().enumerate() {
                let line = match &item.body {
                    DocumentBody::Upload { filename } => format!("📄 {}", sanitize_line(filename)),
                    DocumentBody::Scholar { title, link } => match link {
                        Some(link) => {
                            format!("🎓 {} <{}>", sanitize_line(title), sanitize_line(link))
                        }
                        None => format!("🎓 {}", sanitize_line(title)),
                    },
                };
                let marker = if item.delete_key.is_some() { "" } else { "  (cannot delete)" };
                let _ = writeln!(out, "  {:>2}. {}{}", i + 1, line, marker);
            }
            out
        }
    }
}

pub fn search_panel(view: &SearchPanelView) -> String {
    match view {
        SearchPanelView::Hidden => String::new(),
        SearchPanelView::Searching { message } | SearchPanelView::NoResults { message } => {
            format!("{}\n", message)
        }
        SearchPanelView::Failed { message } => format!("{}\n", sanitize_line(message)),
        SearchPanelView::Results { header, cards } => {
            let mut out = format!("{}\n", header);
            for card in cards {
                let _ = writeln!(out, "  [{}] {}", card.card.index + 1, sanitize_line(&card.title));
                if let Some(info) = &card.publication_info {
                    let _ = writeln!(out, "      {}", sanitize_line(info));
                }
                if let Some(snippet) = &card.snippet {
                    let _ = writeln!(out, "      {}", sanitize_line(snippet));
                }
                let _ = writeln!(out, "      {}", sanitize_line(&card.link));
                let state = if card.button.enabled { "" } else { " (busy)" };
                let _ = writeln!(out, "      [{}]{}", card.button.label, state);
            }
            out
        }
    }
}

pub fn upload_form(view: &UploadFormView) -> String {
    let mut out = String::new();
    if view.progress_visible {
        let _ = writeln!(out, "{}", view.submit.label);
    }
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", sanitize_line(notice));
    }
    out
}

// ============ Streaming transcript ============

/// Writes chat turns to a terminal as they are revealed.
///
/// The assistant prefix is printed when the pending turn appears, each
/// revealed chunk is appended in place, and the line is closed when the turn
/// settles. A turn that settles without streaming (an error message) is
/// printed whole.
pub struct TerminalObserver {
    out: Mutex<Box<dyn Write + Send>>,
    streamed: Mutex<HashSet<TurnKey>>,
}

impl TerminalObserver {
    pub fn stdout() -> Self {
        Self::to_writer(Box::new(std::io::stdout()))
    }

    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            streamed: Mutex::new(HashSet::new()),
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn streamed(&self) -> std::sync::MutexGuard<'_, HashSet<TurnKey>> {
        self.streamed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewObserver for TerminalObserver {
    fn notify(&self, event: &ViewEvent) {
        match event {
            ViewEvent::TurnAppended {
                role: Role::Assistant,
                ..
            } => self.write(&format!("{}: ", ASSISTANT_SPEAKER)),
            ViewEvent::Revealed { key, chunk } => {
                self.streamed().insert(*key);
                self.write(&sanitize(chunk));
            }
            ViewEvent::TurnSettled { key, text } => {
                if self.streamed().remove(key) {
                    self.write("\n");
                } else {
                    self.write(&format!("{}\n", sanitize(text)));
                }
            }
            ViewEvent::TranscriptCleared => self.write("(chat cleared)\n"),
            _ => {}
        }
    }
}
