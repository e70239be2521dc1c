//! Chat transcript controller.
//!
//! Owns the ordered list of turns and the question input. A question is
//! accepted only while the input is enabled; accepting it appends the user
//! turn and a pending assistant turn and disables the input in one step, so
//! at most one pending turn exists at any time.
//!
//! The answer is written into the pending turn by a single reveal loop that
//! pulls increments from [`Reveal`] and pauses between them. Nothing else
//! writes to that turn while the loop runs. Whatever happens to the call, the
//! input is re-enabled, focused, and the viewport scrolled to the newest turn,
//! including when the `ask` future is dropped part-way through.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::models::{ChatTurn, Role, TurnKey};
use crate::reveal::Reveal;
use crate::surface::Collaborators;
use crate::transport::{exchange, AskReply, Request, TransportError};
use crate::view::{render_turn, InputView, TranscriptView, ViewEvent};

pub const PROCESSING_ERROR: &str = "❌ Error processing the question.";
pub const NETWORK_ERROR: &str = "❌ Network error occurred.";
pub const CLEAR_CONFIRMATION: &str = "Are you sure you want to clear the chat history?";

/// Result of [`ChatTranscript::ask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// Blank question; nothing happened.
    Ignored,
    /// Another question is in flight; nothing happened.
    Busy,
    /// The answer was fully revealed.
    Answered,
    /// The backend replied without an answer.
    Unanswered,
    Failed(TransportError),
}

/// Result of [`ChatTranscript::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Declined,
    Busy,
}

struct TranscriptState {
    turns: Vec<ChatTurn>,
    next_key: u64,
    input: InputView,
    scrolled_to: Option<usize>,
}

impl TranscriptState {
    fn push(&mut self, role: Role, text: &str, pending: bool) -> TurnKey {
        self.next_key += 1;
        let key = TurnKey(self.next_key);
        self.turns.push(ChatTurn {
            key,
            role,
            text: text.to_string(),
            pending,
        });
        key
    }

    fn turn_mut(&mut self, key: TurnKey) -> Option<&mut ChatTurn> {
        self.turns.iter_mut().find(|t| t.key == key)
    }
}

pub struct ChatTranscript {
    collab: Collaborators,
    reveal_delay: Duration,
    state: Mutex<TranscriptState>,
}

impl ChatTranscript {
    pub fn new(collab: Collaborators, reveal_delay: Duration) -> Self {
        Self {
            collab,
            reveal_delay,
            state: Mutex::new(TranscriptState {
                turns: Vec::new(),
                next_key: 0,
                input: InputView {
                    enabled: true,
                    focused: false,
                },
                scrolled_to: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TranscriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.state().turns.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.state().turns.iter().filter(|t| t.pending).count()
    }

    pub fn input(&self) -> InputView {
        self.state().input
    }

    pub fn view(&self) -> TranscriptView {
        let state = self.state();
        TranscriptView {
            turns: state.turns.iter().map(render_turn).collect(),
            input: state.input,
            scrolled_to: state.scrolled_to,
        }
    }

    /// Submit a question and reveal the answer into the transcript.
    pub async fn ask(&self, question: &str) -> AskOutcome {
        let question = question.trim();
        if question.is_empty() {
            return AskOutcome::Ignored;
        }

        let (user_key, pending_key) = {
            let mut state = self.state();
            if !state.input.enabled {
                return AskOutcome::Busy;
            }
            let user_key = state.push(Role::User, question, false);
            let pending_key = state.push(Role::Assistant, "", true);
            state.input = InputView {
                enabled: false,
                focused: false,
            };
            (user_key, pending_key)
        };
        let _finally = Settle {
            transcript: self,
            key: pending_key,
        };
        self.collab.notify(ViewEvent::TurnAppended {
            key: user_key,
            role: Role::User,
        });
        self.collab.notify(ViewEvent::TurnAppended {
            key: pending_key,
            role: Role::Assistant,
        });
        self.collab.notify(ViewEvent::Input);

        let reply = exchange::<AskReply>(
            self.collab.transport.as_ref(),
            Request::Ask {
                question: question.to_string(),
            },
        )
        .await;

        match reply {
            Ok(AskReply {
                answer: Some(answer),
            }) if !answer.is_empty() => {
                self.reveal(pending_key, &answer).await;
                AskOutcome::Answered
            }
            Ok(_) => {
                tracing::warn!("ask reply carried no answer");
                self.settle(pending_key, Some(PROCESSING_ERROR));
                AskOutcome::Unanswered
            }
            Err(err) => {
                tracing::error!(error = %err, "ask failed");
                self.settle(pending_key, Some(NETWORK_ERROR));
                AskOutcome::Failed(err)
            }
        }
    }

    /// Append `answer` to the pending turn one increment at a time.
    async fn reveal(&self, key: TurnKey, answer: &str) {
        for chunk in Reveal::new(answer) {
            let appended = {
                let mut state = self.state();
                match state.turn_mut(key) {
                    Some(turn) => {
                        turn.text.push_str(chunk);
                        true
                    }
                    None => false,
                }
            };
            if !appended {
                break;
            }
            self.collab.notify(ViewEvent::Revealed {
                key,
                chunk: chunk.to_string(),
            });
            self.collab.pacer.pause(self.reveal_delay).await;
        }
        self.settle(key, None);
        self.scroll_to_bottom();
    }

    /// Mark the pending turn final, optionally replacing its text.
    fn settle(&self, key: TurnKey, replacement: Option<&str>) {
        let text = {
            let mut state = self.state();
            match state.turn_mut(key) {
                Some(turn) if turn.pending => {
                    if let Some(replacement) = replacement {
                        turn.text = replacement.to_string();
                    }
                    turn.pending = false;
                    turn.text.clone()
                }
                _ => return,
            }
        };
        self.collab.notify(ViewEvent::TurnSettled { key, text });
    }

    fn scroll_to_bottom(&self) {
        {
            let mut state = self.state();
            state.scrolled_to = state.turns.len().checked_sub(1);
        }
        self.collab.notify(ViewEvent::ScrolledToBottom);
    }

    fn release_input(&self) {
        {
            let mut state = self.state();
            state.input = InputView {
                enabled: true,
                focused: true,
            };
        }
        self.collab.notify(ViewEvent::Input);
    }

    /// Empty the transcript after confirmation.
    ///
    /// Refused while a question is in flight.
    pub async fn clear(&self) -> ClearOutcome {
        if !self.input().enabled {
            return ClearOutcome::Busy;
        }
        if !self.collab.prompter.confirm(CLEAR_CONFIRMATION).await {
            return ClearOutcome::Declined;
        }
        {
            let mut state = self.state();
            if !state.input.enabled {
                return ClearOutcome::Busy;
            }
            state.turns.clear();
            state.scrolled_to = None;
        }
        self.collab.notify(ViewEvent::TranscriptCleared);
        ClearOutcome::Cleared
    }
}

/// Runs the end-of-question steps however `ask` exits.
struct Settle<'a> {
    transcript: &'a ChatTranscript,
    key: TurnKey,
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        self.transcript.settle(self.key, None);
        self.transcript.release_input();
        self.transcript.scroll_to_bottom();
    }
}
