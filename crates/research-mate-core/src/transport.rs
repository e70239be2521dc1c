//! Backend transport contract.
//!
//! Every controller reaches the backend through [`Transport::call`]: one
//! request, one JSON value back. Failures to reach the backend or to read its
//! reply as JSON collapse into [`TransportError`]. Application-level failures
//! (`success: false`, an `error` field, a missing `answer`) arrive as ordinary
//! JSON and are interpreted by the caller.
//!
//! # Endpoints
//!
//! | Request | Method | Path | Body |
//! |---------|--------|------|------|
//! | [`Request::SessionData`] | `GET` | `/session_data` | — |
//! | [`Request::Upload`] | `POST` | `/upload` | multipart `files[]` |
//! | [`Request::DeleteDocument`] | `POST` | `/delete_pdf` | form `filepath=…` |
//! | [`Request::Ask`] | `POST` | `/ask` | JSON `{question}` |
//! | [`Request::SearchPapers`] | `POST` | `/search_scholar` | JSON `{query}` |
//! | [`Request::AddPaper`] | `POST` | `/add_scholar_paper` | JSON search result |

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{DocumentEntry, SearchResult};

/// HTTP verb of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// The backend endpoints the controllers depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SessionData,
    Upload,
    DeleteDocument,
    Ask,
    SearchPapers,
    AddPaper,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::SessionData => "/session_data",
            Endpoint::Upload => "/upload",
            Endpoint::DeleteDocument => "/delete_pdf",
            Endpoint::Ask => "/ask",
            Endpoint::SearchPapers => "/search_scholar",
            Endpoint::AddPaper => "/add_scholar_paper",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::SessionData => Method::Get,
            _ => Method::Post,
        }
    }
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, "application/pdf", bytes)
    }
}

/// One outbound call to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    SessionData,
    Upload { files: Vec<UploadFile> },
    DeleteDocument { filename: String },
    Ask { question: String },
    SearchPapers { query: String },
    AddPaper { paper: SearchResult },
}

/// How a [`Request`] is encoded on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody<'a> {
    Empty,
    /// Multipart form; every file goes into the `files[]` field.
    Multipart(&'a [UploadFile]),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(&'static str, &'a str)>),
    Json(Value),
}

/// Multipart field name the backend reads uploads from.
pub const UPLOAD_FIELD: &str = "files[]";

impl Request {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Request::SessionData => Endpoint::SessionData,
            Request::Upload { .. } => Endpoint::Upload,
            Request::DeleteDocument { .. } => Endpoint::DeleteDocument,
            Request::Ask { .. } => Endpoint::Ask,
            Request::SearchPapers { .. } => Endpoint::SearchPapers,
            Request::AddPaper { .. } => Endpoint::AddPaper,
        }
    }

    pub fn body(&self) -> RequestBody<'_> {
        match self {
            Request::SessionData => RequestBody::Empty,
            Request::Upload { files } => RequestBody::Multipart(files),
            Request::DeleteDocument { filename } => {
                RequestBody::Form(vec![("filepath", filename.as_str())])
            }
            Request::Ask { question } => RequestBody::Json(json!({ "question": question })),
            Request::SearchPapers { query } => RequestBody::Json(json!({ "query": query })),
            Request::AddPaper { paper } => RequestBody::Json(json!({
                "title": paper.title,
                "link": paper.link,
                "publication_info": paper.publication_info,
                "snippet": paper.snippet,
            })),
        }
    }
}

/// The single failure shape of a transport call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the reply could not be read.
    #[error("{0}")]
    Network(String),
    /// The reply was not JSON, or not JSON of the expected shape.
    #[error("{0}")]
    Decode(String),
}

impl TransportError {
    pub fn network(message: impl std::fmt::Display) -> Self {
        Self::Network(message.to_string())
    }

    pub fn decode(message: impl std::fmt::Display) -> Self {
        Self::Decode(message.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            TransportError::Network(m) | TransportError::Decode(m) => m,
        }
    }
}

/// A backend reachable by the controllers.
///
/// Implementations perform exactly one round trip per call: no retries and
/// no timeout beyond what the environment imposes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: Request) -> Result<Value, TransportError>;
}

/// Issue `request` and decode the reply into `T`.
///
/// A reply of the wrong shape is a [`TransportError::Decode`].
pub async fn exchange<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: Request,
) -> Result<T, TransportError> {
    let endpoint = request.endpoint();
    let value = transport.call(request).await?;
    serde_json::from_value(value).map_err(|e| {
        TransportError::decode(format!(
            "unexpected response from {}: {}",
            endpoint.path(),
            e
        ))
    })
}

// ============ Replies ============

/// `GET /session_data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub uploaded_files: Option<Vec<DocumentEntry>>,
}

/// `POST /upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub filenames: Option<Vec<String>>,
}

/// Reply shape shared by `/delete_pdf` and `/add_scholar_paper`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /ask`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskReply {
    #[serde(default)]
    pub answer: Option<String>,
}

/// `POST /search_scholar`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchReply {
    #[serde(default)]
    pub papers: Option<Vec<SearchResult>>,
    #[serde(default)]
    pub error: Option<String>,
}
