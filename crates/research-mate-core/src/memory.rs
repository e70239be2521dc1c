//! In-memory [`Transport`] implementation for tests and offline use.
//!
//! Emulates the observable contract of the Research Mate backend for one
//! session: the document set lives in a `Vec` behind `std::sync::RwLock`,
//! paper search filters a fixed catalog, and answers come from a pluggable
//! answerer instead of a language model.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::models::{DocumentEntry, SearchResult};
use crate::transport::{Request, Transport, TransportError};

pub const NO_DOCUMENTS_ANSWER: &str = "❌ No PDFs uploaded yet. Please upload a PDF first.";
pub const UPLOAD_FOLDER: &str = "uploads";

/// Produces an answer from the question and the session's documents.
pub type Answerer = dyn Fn(&str, &[DocumentEntry]) -> String + Send + Sync;

/// Single-session backend held entirely in memory.
pub struct InMemoryBackend {
    documents: RwLock<Vec<DocumentEntry>>,
    catalog: Vec<SearchResult>,
    answerer: Arc<Answerer>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            catalog: Vec::new(),
            answerer: Arc::new(default_answer),
        }
    }

    /// Backend preloaded with a small catalog of well-known papers.
    pub fn demo() -> Self {
        Self::new().with_catalog(demo_catalog())
    }

    pub fn with_catalog(mut self, catalog: Vec<SearchResult>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_answerer(
        mut self,
        answerer: impl Fn(&str, &[DocumentEntry]) -> String + Send + Sync + 'static,
    ) -> Self {
        self.answerer = Arc::new(answerer);
        self
    }

    pub fn with_documents(self, documents: Vec<DocumentEntry>) -> Self {
        *self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = documents;
        self
    }

    pub fn documents(&self) -> Vec<DocumentEntry> {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<DocumentEntry>> {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<DocumentEntry>> {
        self.documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn upload(&self, names: impl Iterator<Item = String>) -> Value {
        let mut stored = Vec::new();
        let mut documents = self.write();
        for name in names {
            if !name.ends_with(".pdf") {
                continue;
            }
            let filename = secure_filename(&name);
            if filename.is_empty() {
                continue;
            }
            stored.push(format!("{}/{}", UPLOAD_FOLDER, filename));
            documents.push(DocumentEntry::upload(filename));
        }
        json!({ "filenames": stored })
    }

    fn delete(&self, filename: &str) -> Value {
        if filename.is_empty() {
            return failure("No filename provided");
        }
        let mut documents = self.write();
        let before = documents.len();
        documents.retain(|d| d.filename.as_deref() != Some(filename));
        if documents.len() == before {
            return failure("File not found in session");
        }
        json!({ "success": true })
    }

    fn ask(&self, question: &str) -> Value {
        let documents = self.read();
        if documents.is_empty() {
            return json!({ "answer": NO_DOCUMENTS_ANSWER });
        }
        json!({ "answer": (self.answerer)(question, &documents) })
    }

    fn search(&self, query: &str) -> Value {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return json!({ "error": "No query provided." });
        }
        let papers: Vec<&SearchResult> = self
            .catalog
            .iter()
            .filter(|paper| {
                paper.title.to_lowercase().contains(&query)
                    || paper
                        .snippet
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&query))
            })
            .collect();
        json!({ "papers": papers })
    }

    fn add(&self, paper: &SearchResult) -> Value {
        if !paper.link.to_lowercase().ends_with(".pdf") {
            return failure("The link is not a direct PDF link.");
        }
        let id = uuid::Uuid::new_v4().simple().to_string();
        let filename = format!("scholar_{}.pdf", &id[..8]);
        self.write().push(DocumentEntry::scholar(
            filename.clone(),
            paper.title.clone(),
            Some(paper.link.clone()),
        ));
        json!({ "success": true, "filename": filename, "title": paper.title })
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn call(&self, request: Request) -> Result<Value, TransportError> {
        let reply = match request {
            Request::SessionData => json!({ "uploaded_files": self.documents() }),
            Request::Upload { files } => self.upload(files.into_iter().map(|f| f.name)),
            Request::DeleteDocument { filename } => self.delete(&filename),
            Request::Ask { question } => self.ask(&question),
            Request::SearchPapers { query } => self.search(&query),
            Request::AddPaper { paper } => self.add(&paper),
        };
        Ok(reply)
    }
}

fn failure(message: &str) -> Value {
    json!({ "success": false, "error": message })
}

fn default_answer(question: &str, documents: &[DocumentEntry]) -> String {
    format!(
        "(offline) {} document(s) in session. No model is attached to answer \"{}\".",
        documents.len(),
        question
    )
}

/// Reduce an uploaded name to a safe flat filename, the way werkzeug's
/// `secure_filename` does on a POSIX host.
///
/// `/` becomes a word break, whitespace runs become a single `_`, and only
/// ASCII alphanumerics, `.`, `-` and `_` survive. Leading and trailing `.`
/// and `_` are stripped. Non-ASCII characters are dropped rather than
/// transliterated.
pub fn secure_filename(name: &str) -> String {
    let spaced = name.replace('/', " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    kept.trim_matches(['.', '_']).to_string()
}

fn demo_catalog() -> Vec<SearchResult> {
    let paper = |title: &str, link: &str, info: &str, snippet: &str| SearchResult {
        title: title.to_string(),
        link: link.to_string(),
        publication_info: Some(info.to_string()),
        snippet: Some(snippet.to_string()),
    };
    vec![
        paper(
            "Attention Is All You Need",
            "https://arxiv.org/pdf/1706.03762.pdf",
            "A Vaswani, N Shazeer, N Parmar - NeurIPS, 2017",
            "The dominant sequence transduction models are based on complex recurrent or convolutional neural networks.",
        ),
        paper(
            "Deep Residual Learning for Image Recognition",
            "https://arxiv.org/pdf/1512.03385.pdf",
            "K He, X Zhang, S Ren, J Sun - CVPR, 2016",
            "Deeper neural networks are more difficult to train.",
        ),
        paper(
            "BERT: Pre-training of Deep Bidirectional Transformers",
            "https://arxiv.org/pdf/1810.04805.pdf",
            "J Devlin, MW Chang, K Lee, K Toutanova - NAACL, 2019",
            "We introduce a new language representation model called BERT.",
        ),
        paper(
            "ImageNet Classification with Deep Convolutional Neural Networks",
            "https://dl.acm.org/doi/10.1145/3065386",
            "A Krizhevsky, I Sutskever, GE Hinton - NeurIPS, 2012",
            "We trained a large, deep convolutional neural network.",
        ),
    ]
}
