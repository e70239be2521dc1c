//! HTTP [`Transport`] backed by `reqwest`.
//!
//! Encodes each [`Request`] the way the backend expects it (multipart for
//! uploads, url-encoded form for deletes, JSON otherwise) and parses every
//! reply body as JSON. A non-2xx status is not an error on its own: the
//! backend reports application failures as `{ success: false, error }` with
//! 4xx/5xx codes, and those bodies are what the controllers surface.
//!
//! The client keeps a cookie store because the backend scopes the document
//! set to its session cookie.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use research_mate_core::transport::{
    Method, Request, RequestBody, Transport, TransportError, UploadFile, UPLOAD_FIELD,
};
use serde_json::Value;

pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(TransportError::network)
    }
}

fn multipart(files: &[UploadFile]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for file in files {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(TransportError::network)?;
        form = form.part(UPLOAD_FIELD, part);
    }
    Ok(form)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: Request) -> Result<Value, TransportError> {
        let endpoint = request.endpoint();
        let url = self.url(endpoint.path())?;

        let builder = match endpoint.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Multipart(files) => builder.multipart(multipart(files)?),
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Json(body) => builder.json(&body),
        };

        tracing::debug!(path = endpoint.path(), "sending request");
        let response = builder.send().await.map_err(TransportError::network)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(TransportError::network)?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(path = endpoint.path(), %status, "reply is not JSON");
            TransportError::decode(format!(
                "invalid JSON from {} ({}): {}",
                endpoint.path(),
                status,
                e
            ))
        })
    }
}
