//! Typed view models and the pure functions that build them.
//!
//! Controllers hold state; a front end asks a controller for its view and
//! draws it. Views carry plain text fields, never markup, so externally
//! sourced titles and snippets cannot inject structure into the page.

use crate::models::{AddState, ChatTurn, DocumentEntry, DocumentSource, Role, TurnKey};
use crate::search::{Card, CardRef};

pub const NO_DOCUMENTS: &str = "No documents uploaded yet.";
pub const SCHOLAR_FALLBACK_TITLE: &str = "Scholar Paper";
pub const UNNAMED_UPLOAD: &str = "(unnamed document)";

pub const USER_SPEAKER: &str = "🧑‍🎓 You";
pub const ASSISTANT_SPEAKER: &str = "🤖 Research Mate";
pub const THINKING: &str = "Thinking...";

pub const SEARCHING: &str = "🔎 Searching Google Scholar...";
pub const NO_RESULTS: &str = "❌ No results found for your query.";
pub const RESULTS_HEADER: &str = "📚 Search Results:";

pub const UPLOAD_LABEL: &str = "Upload & Process PDFs";
pub const PROCESSING_LABEL: &str = "Processing...";

/// A state change a front end may want to redraw for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The document list was replaced.
    Documents,
    TurnAppended { key: TurnKey, role: Role },
    /// One increment was appended to a pending turn.
    Revealed { key: TurnKey, chunk: String },
    /// A pending turn received its final text.
    TurnSettled { key: TurnKey, text: String },
    TranscriptCleared,
    /// The question input changed enabled/focused state.
    Input,
    ScrolledToBottom,
    SearchPanel,
    Card { card: CardRef },
    UploadForm,
}

// ============ Document list ============

/// Rendered document list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentListView {
    /// No snapshot has been received yet.
    NotLoaded,
    Empty { message: &'static str },
    Items(Vec<DocumentItemView>),
}

impl DocumentListView {
    pub fn items(&self) -> &[DocumentItemView] {
        match self {
            DocumentListView::Items(items) => items,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentItemView {
    pub body: DocumentBody,
    /// Filename passed to the delete call; `None` hides the affordance.
    pub delete_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBody {
    Scholar { title: String, link: Option<String> },
    Upload { filename: String },
}

/// One view node per entry, in snapshot order.
pub fn render_documents(entries: &[DocumentEntry]) -> DocumentListView {
    if entries.is_empty() {
        return DocumentListView::Empty {
            message: NO_DOCUMENTS,
        };
    }
    DocumentListView::Items(entries.iter().map(render_document).collect())
}

fn render_document(entry: &DocumentEntry) -> DocumentItemView {
    let body = match entry.source {
        DocumentSource::Scholar => DocumentBody::Scholar {
            title: non_empty(entry.title.as_deref())
                .unwrap_or(SCHOLAR_FALLBACK_TITLE)
                .to_string(),
            link: non_empty(entry.link.as_deref()).map(str::to_string),
        },
        DocumentSource::Upload => DocumentBody::Upload {
            filename: non_empty(entry.filename.as_deref())
                .unwrap_or(UNNAMED_UPLOAD)
                .to_string(),
        },
    };
    DocumentItemView {
        body,
        delete_key: entry.delete_key().map(str::to_string),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ============ Transcript ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub speaker: &'static str,
    pub text: String,
    pub pending: bool,
}

pub fn render_turn(turn: &ChatTurn) -> TurnView {
    let speaker = match turn.role {
        Role::User => USER_SPEAKER,
        Role::Assistant => ASSISTANT_SPEAKER,
    };
    let text = if turn.pending && turn.text.is_empty() {
        THINKING.to_string()
    } else {
        turn.text.clone()
    };
    TurnView {
        speaker,
        text,
        pending: turn.pending,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputView {
    pub enabled: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptView {
    pub turns: Vec<TurnView>,
    pub input: InputView,
    /// Index of the turn the viewport was last scrolled to.
    pub scrolled_to: Option<usize>,
}

// ============ Search panel ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPanelView {
    Hidden,
    Searching { message: &'static str },
    NoResults { message: &'static str },
    Failed { message: String },
    Results {
        header: &'static str,
        cards: Vec<CardView>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub card: CardRef,
    pub title: String,
    pub publication_info: Option<String>,
    pub snippet: Option<String>,
    pub link: String,
    pub button: ButtonView,
}

pub fn searching() -> SearchPanelView {
    SearchPanelView::Searching { message: SEARCHING }
}

pub fn no_results() -> SearchPanelView {
    SearchPanelView::NoResults {
        message: NO_RESULTS,
    }
}

pub fn search_failed(reason: &str) -> SearchPanelView {
    SearchPanelView::Failed {
        message: format!("❌ Failed to fetch search results: {}", reason),
    }
}

/// Cards in response order; `generation` is the search that produced them.
pub fn render_cards(generation: u64, cards: &[Card]) -> SearchPanelView {
    let cards = cards
        .iter()
        .enumerate()
        .map(|(index, card)| CardView {
            card: CardRef { generation, index },
            title: card.result.title.clone(),
            publication_info: non_empty(card.result.publication_info.as_deref())
                .map(str::to_string),
            snippet: non_empty(card.result.snippet.as_deref()).map(str::to_string),
            link: card.result.link.clone(),
            button: add_button(card.add_state),
        })
        .collect();
    SearchPanelView::Results {
        header: RESULTS_HEADER,
        cards,
    }
}

pub fn add_button(state: AddState) -> ButtonView {
    ButtonView {
        label: state.label(),
        enabled: state.accepts_click(),
    }
}

// ============ Upload form ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFormView {
    pub submit: ButtonView,
    pub progress_visible: bool,
    pub notice: Option<String>,
}

pub fn render_upload_form(in_flight: bool, notice: Option<&str>) -> UploadFormView {
    UploadFormView {
        submit: ButtonView {
            label: if in_flight {
                PROCESSING_LABEL
            } else {
                UPLOAD_LABEL
            },
            enabled: !in_flight,
        },
        progress_visible: in_flight,
        notice: notice.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchResult;

    fn mixed_snapshot() -> Vec<DocumentEntry> {
        vec![
            DocumentEntry::upload("intro.pdf"),
            DocumentEntry::scholar(
                "scholar_0011aabb.pdf",
                "Deep Residual Learning",
                Some("https://example.org/resnet.pdf".to_string()),
            ),
            DocumentEntry::upload("appendix.pdf"),
        ]
    }

    #[test]
    fn test_render_one_node_per_entry() {
        for n in 0..4 {
            let snapshot: Vec<DocumentEntry> = mixed_snapshot().into_iter().cycle().take(n).collect();
            let view = render_documents(&snapshot);
            if n == 0 {
                assert_eq!(
                    view,
                    DocumentListView::Empty {
                        message: NO_DOCUMENTS
                    }
                );
            } else {
                assert_eq!(view.items().len(), n);
            }
        }
    }

    #[test]
    fn test_render_differentiates_by_source() {
        let view = render_documents(&mixed_snapshot());
        let items = view.items();
        assert_eq!(
            items[0].body,
            DocumentBody::Upload {
                filename: "intro.pdf".to_string()
            }
        );
        assert_eq!(
            items[1].body,
            DocumentBody::Scholar {
                title: "Deep Residual Learning".to_string(),
                link: Some("https://example.org/resnet.pdf".to_string()),
            }
        );
        assert_eq!(items[1].delete_key.as_deref(), Some("scholar_0011aabb.pdf"));
    }

    #[test]
    fn test_scholar_without_title_uses_fallback() {
        let mut entry = DocumentEntry::scholar("s.pdf", "", None);
        entry.title = None;
        let view = render_documents(&[entry]);
        assert_eq!(
            view.items()[0].body,
            DocumentBody::Scholar {
                title: SCHOLAR_FALLBACK_TITLE.to_string(),
                link: None
            }
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let snapshot = mixed_snapshot();
        assert_eq!(render_documents(&snapshot), render_documents(&snapshot));
    }

    #[test]
    fn test_pending_turn_shows_thinking_until_text_arrives() {
        let mut turn = ChatTurn {
            key: TurnKey(1),
            role: Role::Assistant,
            text: String::new(),
            pending: true,
        };
        assert_eq!(render_turn(&turn).text, THINKING);
        turn.text.push('X');
        assert_eq!(render_turn(&turn).text, "X");
        assert_eq!(render_turn(&turn).speaker, ASSISTANT_SPEAKER);
    }

    #[test]
    fn test_cards_keep_response_order_and_hide_empty_fields() {
        let cards = vec![
            Card::new(SearchResult {
                title: "B".to_string(),
                link: "https://b".to_string(),
                publication_info: Some(String::new()),
                snippet: Some("about b".to_string()),
            }),
            Card::new(SearchResult {
                title: "A".to_string(),
                link: "https://a".to_string(),
                publication_info: None,
                snippet: None,
            }),
        ];
        let SearchPanelView::Results { cards, .. } = render_cards(7, &cards) else {
            panic!("expected results");
        };
        assert_eq!(cards[0].title, "B");
        assert_eq!(cards[1].title, "A");
        assert_eq!(cards[0].publication_info, None);
        assert_eq!(cards[0].snippet.as_deref(), Some("about b"));
        assert_eq!(
            cards[1].card,
            CardRef {
                generation: 7,
                index: 1
            }
        );
        assert!(cards[1].button.enabled);
    }

    #[test]
    fn test_upload_form_labels() {
        let busy = render_upload_form(true, None);
        assert_eq!(busy.submit.label, PROCESSING_LABEL);
        assert!(!busy.submit.enabled);
        assert!(busy.progress_visible);

        let idle = render_upload_form(false, Some("oops"));
        assert_eq!(idle.submit.label, UPLOAD_LABEL);
        assert!(idle.submit.enabled);
        assert_eq!(idle.notice.as_deref(), Some("oops"));
    }
}
