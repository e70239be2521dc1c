//! # Research Mate Core
//!
//! UI-agnostic logic for the Research Mate client: the data model, the
//! transport contract, typed view models, and the controllers that keep the
//! document list, the chat transcript, and the search panel consistent with
//! asynchronous backend calls.
//!
//! This crate contains no tokio, reqwest, or filesystem I/O. Delays go through
//! the [`surface::Pacer`] trait and every backend call through
//! [`transport::Transport`], so the same controllers can be driven from a
//! terminal, a test harness, or a wasm front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── Workspace ────────────────────────────┐
//! │  UploadForm ──┐                                                   │
//! │  SearchPanel ─┼──▶ SessionBootstrap ──▶ DocumentList (single writer)
//! │  DocumentList ┘        (refresh)                                  │
//! │  ChatTranscript (pending turn + reveal)                           │
//! └───────────────┬───────────────────────────────────────────────────┘
//!                 ▼
//!            Transport ──▶ HTTP backend / InMemoryBackend
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Wire and state data types |
//! | [`transport`] | Backend contract and error shape |
//! | [`memory`] | In-memory backend for tests and offline use |
//! | [`surface`] | Pacer, prompter, and observer collaborators |
//! | [`view`] | Typed view models and pure render functions |
//! | [`reveal`] | Incremental answer reveal sequence |
//! | [`documents`] | Document list view-model |
//! | [`chat`] | Chat transcript controller |
//! | [`search`] | Search panel controller |
//! | [`session`] | Session bootstrap and upload form |
//! | [`workspace`] | Wiring of all controllers |

pub mod chat;
pub mod documents;
pub mod memory;
pub mod models;
pub mod reveal;
pub mod search;
pub mod session;
pub mod surface;
pub mod transport;
pub mod view;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
