//! Document list view-model.
//!
//! Holds the most recent successful session snapshot and renders it. The
//! snapshot is only ever replaced as a whole by [`DocumentList::refresh`];
//! nothing edits it in place, so the rendered list is always
//! `render_documents(last snapshot)`.
//!
//! Refreshes may overlap (two mutations completing close together). Each
//! refresh takes a ticket when issued and a reply is applied only if no later
//! ticket has been applied already, so a slow reply to an older refresh can
//! never overwrite a newer snapshot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::DocumentEntry;
use crate::surface::Collaborators;
use crate::transport::{exchange, MutationReply, Request, SessionSnapshot, TransportError};
use crate::view::{render_documents, DocumentListView, ViewEvent};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this document?";
pub const UNKNOWN_ERROR: &str = "Unknown error";
pub const NO_DELETE_KEY: &str = "document has no filename";

/// Result of [`DocumentList::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Replaced { count: usize },
    /// A newer refresh already landed; this reply was dropped.
    Stale,
    Failed(TransportError),
}

/// Result of [`DocumentList::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    /// The backend (or the entry itself) refused the delete.
    Rejected { message: String },
    Failed(TransportError),
}

#[derive(Default)]
struct ListState {
    entries: Option<Vec<DocumentEntry>>,
    issued: u64,
    applied: u64,
}

/// Client-side snapshot of the documents attached to the session.
///
/// Cheap to clone; clones share the same snapshot.
#[derive(Clone)]
pub struct DocumentList {
    inner: Arc<Inner>,
}

struct Inner {
    collab: Collaborators,
    state: Mutex<ListState>,
}

impl DocumentList {
    pub fn new(collab: Collaborators) -> Self {
        Self {
            inner: Arc::new(Inner {
                collab,
                state: Mutex::new(ListState::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ListState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Entries of the last applied snapshot (empty before the first one).
    pub fn entries(&self) -> Vec<DocumentEntry> {
        self.state().entries.clone().unwrap_or_default()
    }

    pub fn entry_at(&self, index: usize) -> Option<DocumentEntry> {
        self.state()
            .entries
            .as_ref()
            .and_then(|entries| entries.get(index).cloned())
    }

    pub fn view(&self) -> DocumentListView {
        match &self.state().entries {
            Some(entries) => render_documents(entries),
            None => DocumentListView::NotLoaded,
        }
    }

    /// Fetch the session snapshot and replace the list with it.
    ///
    /// A transport failure leaves the current list untouched.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = {
            let mut state = self.state();
            state.issued += 1;
            state.issued
        };

        let reply = exchange::<SessionSnapshot>(
            self.inner.collab.transport.as_ref(),
            Request::SessionData,
        )
        .await;

        let snapshot = match reply {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(error = %err, "session snapshot refresh failed");
                return RefreshOutcome::Failed(err);
            }
        };

        let entries = snapshot.uploaded_files.unwrap_or_default();
        let count = entries.len();
        {
            let mut state = self.state();
            if ticket < state.applied {
                tracing::debug!(ticket, applied = state.applied, "dropping stale snapshot");
                return RefreshOutcome::Stale;
            }
            state.applied = ticket;
            state.entries = Some(entries);
        }
        tracing::debug!(count, "document list replaced");
        self.inner.collab.notify(ViewEvent::Documents);
        RefreshOutcome::Replaced { count }
    }

    /// Delete the entry at `index` of the current list.
    pub async fn delete_at(&self, index: usize) -> Option<DeleteOutcome> {
        let entry = self.entry_at(index)?;
        Some(self.delete(&entry).await)
    }

    /// Ask for confirmation, delete `entry` on the backend, then refresh.
    ///
    /// Failures are shown to the user and leave the list as it was.
    pub async fn delete(&self, entry: &DocumentEntry) -> DeleteOutcome {
        let collab = &self.inner.collab;

        let Some(filename) = entry.delete_key().map(str::to_string) else {
            collab.prompter.alert(&delete_failed(NO_DELETE_KEY));
            return DeleteOutcome::Rejected {
                message: NO_DELETE_KEY.to_string(),
            };
        };

        if !collab.prompter.confirm(DELETE_CONFIRMATION).await {
            return DeleteOutcome::Declined;
        }

        let reply = exchange::<MutationReply>(
            collab.transport.as_ref(),
            Request::DeleteDocument {
                filename: filename.clone(),
            },
        )
        .await;

        match reply {
            Ok(reply) if reply.success => {
                tracing::info!(%filename, "document deleted");
                self.refresh().await;
                DeleteOutcome::Deleted
            }
            Ok(reply) => {
                let message = reply.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                tracing::warn!(%filename, %message, "delete rejected");
                collab.prompter.alert(&delete_failed(&message));
                DeleteOutcome::Rejected { message }
            }
            Err(err) => {
                tracing::error!(%filename, error = %err, "delete failed");
                collab.prompter.alert(&delete_failed(err.message()));
                DeleteOutcome::Failed(err)
            }
        }
    }
}

fn delete_failed(reason: &str) -> String {
    format!("Failed to delete document: {}", reason)
}
