//! Search panel controller.
//!
//! # Display lifecycle
//!
//! ```text
//! Hidden ──search──▶ Searching ──reply──▶ Results | NoResults | Failed
//!                        ▲                          │
//!                        └──────────search──────────┘
//! ```
//!
//! Every search bumps the panel generation. Only the reply to the most
//! recently issued search is rendered; older replies are dropped.
//!
//! # Card lifecycle
//!
//! ```text
//! Idle ──add──▶ Adding ──▶ Added | Failed ──(reset delay)──▶ Idle
//! ```
//!
//! Cards are addressed by [`CardRef`]. Once a newer search has replaced the
//! panel, settles and resets aimed at the old cards are no-ops.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::models::{AddState, SearchResult};
use crate::session::SessionBootstrap;
use crate::surface::Collaborators;
use crate::transport::{exchange, MutationReply, Request, SearchReply, TransportError};
use crate::view::{no_results, render_cards, search_failed, searching, SearchPanelView, ViewEvent};

pub const ADD_FAILED: &str = "Failed to add paper";

/// One rendered search result and the state of its add button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub result: SearchResult,
    pub add_state: AddState,
}

impl Card {
    pub fn new(result: SearchResult) -> Self {
        Self {
            result,
            add_state: AddState::Idle,
        }
    }
}

/// Stable address of a card: the search that produced it and its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardRef {
    pub generation: u64,
    pub index: usize,
}

/// Result of [`SearchPanel::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query; the panel was not touched.
    Ignored,
    Results { count: usize },
    NoResults,
    Failed(TransportError),
    /// A newer search was issued before this reply arrived.
    Superseded,
}

/// Result of [`SearchPanel::add_to_documents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Rejected { message: String },
    Failed(TransportError),
    /// The card is not idle.
    Busy,
    /// No such card on the panel.
    Missing,
}

#[derive(Debug, Default)]
enum Display {
    #[default]
    Hidden,
    Searching,
    NoResults,
    Failed(String),
    Results(Vec<Card>),
}

#[derive(Default)]
struct PanelState {
    generation: u64,
    display: Display,
}

impl PanelState {
    fn card_mut(&mut self, card: CardRef) -> Option<&mut Card> {
        if card.generation != self.generation {
            return None;
        }
        match &mut self.display {
            Display::Results(cards) => cards.get_mut(card.index),
            _ => None,
        }
    }
}

pub struct SearchPanel {
    collab: Collaborators,
    bootstrap: SessionBootstrap,
    reset_delay: Duration,
    state: Mutex<PanelState>,
}

impl SearchPanel {
    pub fn new(collab: Collaborators, bootstrap: SessionBootstrap, reset_delay: Duration) -> Self {
        Self {
            collab,
            bootstrap,
            reset_delay,
            state: Mutex::new(PanelState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn view(&self) -> SearchPanelView {
        let state = self.state();
        match &state.display {
            Display::Hidden => SearchPanelView::Hidden,
            Display::Searching => searching(),
            Display::NoResults => no_results(),
            Display::Failed(reason) => search_failed(reason),
            Display::Results(cards) => render_cards(state.generation, cards),
        }
    }

    /// Address of the card at `index` on the current panel.
    pub fn card_at(&self, index: usize) -> Option<CardRef> {
        let state = self.state();
        match &state.display {
            Display::Results(cards) if index < cards.len() => Some(CardRef {
                generation: state.generation,
                index,
            }),
            _ => None,
        }
    }

    pub fn card(&self, card: CardRef) -> Option<Card> {
        self.state().card_mut(card).cloned()
    }

    /// Run a paper search and render its results into the panel.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Ignored;
        }

        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.display = Display::Searching;
            state.generation
        };
        self.collab.notify(ViewEvent::SearchPanel);
        tracing::debug!(generation, %query, "searching papers");

        let reply = exchange::<SearchReply>(
            self.collab.transport.as_ref(),
            Request::SearchPapers {
                query: query.to_string(),
            },
        )
        .await;

        let (display, outcome) = match reply {
            Ok(reply) => {
                if let Some(error) = &reply.error {
                    tracing::warn!(%error, "search backend reported an error");
                }
                let papers = reply.papers.unwrap_or_default();
                if papers.is_empty() {
                    (Display::NoResults, SearchOutcome::NoResults)
                } else {
                    let count = papers.len();
                    let cards = papers.into_iter().map(Card::new).collect();
                    (Display::Results(cards), SearchOutcome::Results { count })
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "search failed");
                (
                    Display::Failed(err.message().to_string()),
                    SearchOutcome::Failed(err),
                )
            }
        };

        {
            let mut state = self.state();
            if state.generation != generation {
                tracing::debug!(generation, current = state.generation, "dropping superseded search");
                return SearchOutcome::Superseded;
            }
            state.display = display;
        }
        self.collab.notify(ViewEvent::SearchPanel);
        outcome
    }

    /// Add the card's paper to the session documents.
    ///
    /// Only an idle card accepts the action. Once settled, the card returns
    /// to idle after the reset delay.
    pub async fn add_to_documents(&self, card: CardRef) -> AddOutcome {
        let paper = {
            let mut state = self.state();
            let Some(target) = state.card_mut(card) else {
                return AddOutcome::Missing;
            };
            if !target.add_state.accepts_click() {
                return AddOutcome::Busy;
            }
            target.add_state = AddState::Adding;
            target.result.clone()
        };
        self.collab.notify(ViewEvent::Card { card });

        let title = paper.title.clone();
        let reply = exchange::<MutationReply>(
            self.collab.transport.as_ref(),
            Request::AddPaper { paper },
        )
        .await;

        let outcome = match reply {
            Ok(reply) if reply.success => {
                tracing::info!(%title, "paper added to documents");
                self.set_card(card, AddState::Added);
                self.bootstrap.run().await;
                AddOutcome::Added
            }
            Ok(reply) => {
                let message = reply.error.unwrap_or_else(|| ADD_FAILED.to_string());
                tracing::warn!(%title, %message, "add paper rejected");
                self.set_card(card, AddState::Failed);
                self.collab.prompter.alert(&message);
                AddOutcome::Rejected { message }
            }
            Err(err) => {
                tracing::error!(%title, error = %err, "add paper failed");
                self.set_card(card, AddState::Failed);
                AddOutcome::Failed(err)
            }
        };

        self.collab.pacer.pause(self.reset_delay).await;
        self.set_card(card, AddState::Idle);
        outcome
    }

    fn set_card(&self, card: CardRef, add_state: AddState) {
        let changed = match self.state().card_mut(card) {
            Some(target) => {
                target.add_state = add_state;
                true
            }
            None => false,
        };
        if changed {
            self.collab.notify(ViewEvent::Card { card });
        }
    }
}
