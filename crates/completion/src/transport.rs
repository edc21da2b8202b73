//! HTTP transport abstraction.
//!
//! The client talks to the endpoint through [`Transport`] so the exchange can
//! be replaced in tests. [`HttpTransport`] is the reqwest-backed default.

use crate::credential::Credential;
use crate::types::ChatRequest;
use crate::{Error, Result};
use std::future::Future;

/// Raw reply from the endpoint: status code plus undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One POST of a JSON body with bearer authorization.
pub trait Transport: Send + Sync {
    /// Send `request` to `url` and return whatever came back.
    ///
    /// Only failures of the exchange itself are errors; any HTTP status is a
    /// successful reply.
    fn post(
        &self,
        url: &str,
        credential: &Credential,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<HttpReply>> + Send;
}

/// [`Transport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<HttpReply> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", credential.expose()))
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}
