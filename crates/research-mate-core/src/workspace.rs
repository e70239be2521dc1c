//! Wiring of every controller around one shared document list.

use std::sync::Arc;
use std::time::Duration;

use crate::chat::ChatTranscript;
use crate::documents::{DocumentList, RefreshOutcome};
use crate::search::SearchPanel;
use crate::session::{SessionBootstrap, UploadForm};
use crate::surface::Collaborators;

/// Fixed delays used by the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause between revealed answer characters.
    pub reveal_delay: Duration,
    /// How long a settled search card shows its result before resetting.
    pub add_reset_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(20),
            add_reset_delay: Duration::from_millis(2000),
        }
    }
}

/// The full client: one document list, its bootstrap, and the controllers
/// that mutate the session through it.
///
/// Cheap to clone; controllers are shared so operations can run as
/// independent tasks.
#[derive(Clone)]
pub struct Workspace {
    pub documents: DocumentList,
    pub bootstrap: SessionBootstrap,
    pub upload: Arc<UploadForm>,
    pub chat: Arc<ChatTranscript>,
    pub search: Arc<SearchPanel>,
}

impl Workspace {
    pub fn new(collab: Collaborators, timing: Timing) -> Self {
        let documents = DocumentList::new(collab.clone());
        let bootstrap = SessionBootstrap::new(documents.clone());
        Self {
            upload: Arc::new(UploadForm::new(collab.clone(), bootstrap.clone())),
            chat: Arc::new(ChatTranscript::new(collab.clone(), timing.reveal_delay)),
            search: Arc::new(SearchPanel::new(
                collab,
                bootstrap.clone(),
                timing.add_reset_delay,
            )),
            documents,
            bootstrap,
        }
    }

    /// Initial session snapshot.
    pub async fn load(&self) -> RefreshOutcome {
        self.bootstrap.run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::AskOutcome;
    use crate::memory::InMemoryBackend;
    use crate::search::AddOutcome;
    use crate::session::UploadOutcome;
    use crate::testing::{RecordingPacer, RecordingPrompter};
    use crate::transport::UploadFile;
    use crate::view::DocumentListView;

    fn offline() -> (Workspace, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::demo());
        let collab = Collaborators::new(
            backend.clone(),
            RecordingPacer::new(),
            RecordingPrompter::answering(true),
        );
        (Workspace::new(collab, Timing::default()), backend)
    }

    #[test]
    fn test_default_timing() {
        let timing = Timing::default();
        assert_eq!(timing.reveal_delay, Duration::from_millis(20));
        assert_eq!(timing.add_reset_delay, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_load_renders_empty_placeholder() {
        let (ws, _) = offline();
        assert_eq!(ws.documents.view(), DocumentListView::NotLoaded);
        assert_eq!(ws.load().await, RefreshOutcome::Replaced { count: 0 });
        assert!(matches!(ws.documents.view(), DocumentListView::Empty { .. }));
    }

    #[tokio::test]
    async fn test_mutations_share_one_document_list() {
        let (ws, backend) = offline();
        ws.load().await;

        let uploaded = ws
            .upload
            .upload(vec![UploadFile::pdf("thesis.pdf", Vec::new())])
            .await;
        assert_eq!(uploaded, UploadOutcome::Uploaded { count: 1 });

        ws.search.search("attention").await;
        let card = ws.search.card_at(0).expect("card");
        assert_eq!(ws.search.add_to_documents(card).await, AddOutcome::Added);
        assert_eq!(ws.documents.entries().len(), 2);

        assert_eq!(ws.chat.ask("what is this?").await, AskOutcome::Answered);

        ws.documents.delete_at(0).await;
        assert_eq!(ws.documents.entries().len(), 1);
        assert_eq!(backend.documents(), ws.documents.entries());
    }
}
