//! Single-turn completion client.

use crate::credential::{Credential, CredentialStatus, check_credential};
use crate::transport::{HttpReply, HttpTransport, Transport};
use crate::types::{ChatRequest, ChatResponse, ErrorBody};
use crate::{Error, Result};
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Shown when a failed response carries no `error.message`.
pub const GENERIC_FAILURE_MESSAGE: &str = "API request failed";

/// Builder for [`CompletionClient`].
#[derive(Debug, Clone)]
pub struct CompletionClientBuilder {
    credential: Option<Credential>,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl CompletionClientBuilder {
    /// Start from the defaults. `credential` may be absent; calls then fail
    /// with a configuration error.
    pub fn new(credential: Option<Credential>) -> Self {
        Self {
            credential,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the maximum tokens for responses.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build with the reqwest transport.
    pub fn build(self) -> CompletionClient<HttpTransport> {
        self.build_with(HttpTransport::new())
    }

    /// Build with a custom transport.
    pub fn build_with<T: Transport>(self, transport: T) -> CompletionClient<T> {
        CompletionClient {
            transport,
            credential: self.credential,
            endpoint: self.endpoint,
            model: self.model,
            max_tokens: self.max_tokens,
        }
    }
}

/// Sends one user utterance per call and returns the first choice's text.
///
/// Holds no per-call state, so concurrent calls are independent. Callers that
/// want one request at a time must serialize themselves.
#[derive(Debug)]
pub struct CompletionClient<T = HttpTransport> {
    transport: T,
    credential: Option<Credential>,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn builder(credential: Option<Credential>) -> CompletionClientBuilder {
        CompletionClientBuilder::new(credential)
    }
}

impl<T: Transport> CompletionClient<T> {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Validate the configured credential.
    pub fn check_credential(&self) -> CredentialStatus {
        check_credential(self.credential.as_ref())
    }

    /// Send `user_text` verbatim as a single user message.
    pub async fn complete(&self, user_text: &str) -> Result<String> {
        let credential = match self.credential.as_ref() {
            Some(c) if check_credential(Some(c)).is_valid() => c,
            other => {
                let status = check_credential(other);
                warn!(status = ?status, "refusing request without usable credential");
                return Err(Error::Config(status.message().to_string()));
            }
        };

        let request = ChatRequest::single_turn(&self.model, user_text, self.max_tokens);
        debug!(
            model = %self.model,
            max_tokens = self.max_tokens,
            chars = user_text.chars().count(),
            "sending completion request"
        );

        let reply = self
            .transport
            .post(&self.endpoint, credential, &request)
            .await
            .inspect_err(|e| warn!(error = %e, "completion transport failed"))?;

        let result = interpret(reply);
        if let Err(e) = &result {
            warn!(error = %e, "completion failed");
        }
        result
    }
}

/// Classify a reply into reply text or an error.
fn interpret(reply: HttpReply) -> Result<String> {
    if !reply.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&reply.body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        return Err(Error::Api {
            status: reply.status,
            message,
        });
    }

    let response: ChatResponse =
        serde_json::from_str(&reply.body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| Error::InvalidResponse("response contained no choices".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed reply and records every request.
    struct FakeTransport {
        reply: std::result::Result<HttpReply, String>,
        calls: Mutex<Vec<(String, String, ChatRequest)>>,
    }

    impl FakeTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(HttpReply::new(status, body)),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                reply: Err(reason.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Transport for FakeTransport {
        async fn post(
            &self,
            url: &str,
            credential: &Credential,
            request: &ChatRequest,
        ) -> Result<HttpReply> {
            self.calls.lock().unwrap().push((
                url.to_string(),
                credential.expose().to_string(),
                request.clone(),
            ));
            self.reply.clone().map_err(Error::Network)
        }
    }

    fn client(transport: FakeTransport) -> CompletionClient<FakeTransport> {
        CompletionClient::builder(Some(Credential::new("sk-test"))).build_with(transport)
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let c = client(FakeTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"hello"}},{"message":{"content":"other"}}]}"#,
        ));
        assert_eq!(c.complete("hi").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn sends_fixed_request_shape() {
        let c = client(FakeTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"ok"}}]}"#,
        ));
        c.complete("  raw text\n").await.unwrap();

        let calls = c.transport.calls.lock().unwrap();
        let (url, token, request) = &calls[0];
        assert_eq!(url, DEFAULT_ENDPOINT);
        assert_eq!(token, "sk-test");
        assert_eq!(
            request,
            &ChatRequest::single_turn(DEFAULT_MODEL, "  raw text\n", DEFAULT_MAX_TOKENS)
        );
    }

    #[tokio::test]
    async fn api_error_message_is_used_verbatim() {
        let c = client(FakeTransport::replying(
            400,
            r#"{"error":{"message":"bad request","type":"invalid_request_error"}}"#,
        ));
        let err = c.complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 400, .. }));
        assert_eq!(err.to_string(), "bad request");
    }

    #[tokio::test]
    async fn api_error_without_message_falls_back() {
        for body in [
            "",
            "not json",
            "{}",
            r#"{"error":{}}"#,
            r#"{"error":{"message":""}}"#,
            r#"{"error":{"message":null}}"#,
        ] {
            let c = client(FakeTransport::replying(500, body));
            let err = c.complete("hi").await.unwrap_err();
            assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE, "body {body:?}");
        }
    }

    #[tokio::test]
    async fn invalid_credential_never_reaches_transport() {
        let cases = [
            (None, CredentialStatus::NotLoaded),
            (Some(Credential::new("your-api-key-here")), CredentialStatus::NotConfigured),
            (Some(Credential::new("  ")), CredentialStatus::NotConfigured),
        ];
        for (credential, status) in cases {
            let c = CompletionClient::builder(credential)
                .build_with(FakeTransport::replying(200, "{}"));
            let err = c.complete("hi").await.unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            assert_eq!(err.to_string(), status.message());
            assert_eq!(c.transport.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn empty_choices_is_invalid_response() {
        for body in [r#"{"choices":[]}"#, "{}"] {
            let c = client(FakeTransport::replying(200, body));
            let err = c.complete("hi").await.unwrap_err();
            assert!(matches!(err, Error::InvalidResponse(_)), "body {body:?}");
        }
    }

    #[tokio::test]
    async fn null_content_is_invalid_response() {
        let c = client(FakeTransport::replying(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        ));
        let err = c.complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_response() {
        let c = client(FakeTransport::replying(200, "<html>"));
        let err = c.complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let c = client(FakeTransport::failing("connection refused"));
        let err = c.complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let ok = client(FakeTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"same"}}]}"#,
        ));
        assert_eq!(ok.complete("hi").await.unwrap(), "same");
        assert_eq!(ok.complete("hi").await.unwrap(), "same");

        let calls = ok.transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert_eq!(calls[1].2.messages.len(), 1);
        drop(calls);

        let failing = client(FakeTransport::replying(400, r#"{"error":{"message":"nope"}}"#));
        let first = failing.complete("hi").await.unwrap_err().to_string();
        let second = failing.complete("hi").await.unwrap_err().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn builder_overrides_defaults() {
        let c = CompletionClient::builder(None)
            .endpoint("http://localhost:8080/v1/chat/completions")
            .model("gpt-4o-mini")
            .max_tokens(64)
            .build();
        assert_eq!(c.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(c.model(), "gpt-4o-mini");
        assert_eq!(c.max_tokens(), 64);
        assert_eq!(c.check_credential(), CredentialStatus::NotLoaded);
    }
}
