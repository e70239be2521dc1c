//! Session bootstrap and the upload form.
//!
//! The bootstrap is the one place the document list is refreshed from: once
//! when the workspace loads and again after every successful mutation. The
//! upload form is the mutation that owns its own progress indicator.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::documents::{DocumentList, RefreshOutcome};
use crate::surface::Collaborators;
use crate::transport::{exchange, Request, TransportError, UploadFile, UploadReply};
use crate::view::{render_upload_form, UploadFormView, ViewEvent};

/// Re-fetches the session snapshot into the shared document list.
#[derive(Clone)]
pub struct SessionBootstrap {
    documents: DocumentList,
}

impl SessionBootstrap {
    pub fn new(documents: DocumentList) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    pub async fn run(&self) -> RefreshOutcome {
        tracing::debug!("bootstrapping session snapshot");
        self.documents.refresh().await
    }
}

/// Result of [`UploadForm::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No files were selected.
    Ignored,
    /// An upload is already running.
    Busy,
    /// The backend stored `count` files and the list was refreshed.
    Uploaded { count: usize },
    /// The backend replied without a file list; nothing was refreshed.
    NothingStored,
    Failed(TransportError),
}

#[derive(Default)]
struct FormState {
    in_flight: bool,
    notice: Option<String>,
}

pub struct UploadForm {
    collab: Collaborators,
    bootstrap: SessionBootstrap,
    state: Mutex<FormState>,
}

impl UploadForm {
    pub fn new(collab: Collaborators, bootstrap: SessionBootstrap) -> Self {
        Self {
            collab,
            bootstrap,
            state: Mutex::new(FormState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> UploadFormView {
        let state = self.state();
        render_upload_form(state.in_flight, state.notice.as_deref())
    }

    /// Send `files` to the backend and refresh the document list.
    pub async fn upload(&self, files: Vec<UploadFile>) -> UploadOutcome {
        if files.is_empty() {
            return UploadOutcome::Ignored;
        }
        {
            let mut state = self.state();
            if state.in_flight {
                return UploadOutcome::Busy;
            }
            state.in_flight = true;
            state.notice = None;
        }
        self.collab.notify(ViewEvent::UploadForm);

        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        tracing::info!(files = ?names, "uploading documents");
        let reply = exchange::<UploadReply>(self.collab.transport.as_ref(), Request::Upload { files })
            .await;

        let outcome = match reply {
            Ok(UploadReply {
                filenames: Some(stored),
            }) => {
                tracing::info!(stored = stored.len(), "upload complete");
                self.bootstrap.run().await;
                UploadOutcome::Uploaded {
                    count: stored.len(),
                }
            }
            Ok(UploadReply { filenames: None }) => {
                tracing::warn!("upload reply carried no filenames");
                UploadOutcome::NothingStored
            }
            Err(err) => {
                tracing::error!(error = %err, "upload failed");
                self.state().notice = Some(upload_failed(err.message()));
                UploadOutcome::Failed(err)
            }
        };

        self.state().in_flight = false;
        self.collab.notify(ViewEvent::UploadForm);
        outcome
    }
}

fn upload_failed(reason: &str) -> String {
    format!("❌ Failed to upload or process PDFs: {}", reason)
}
