//! Single-turn chat completion client.
//!
//! Sends one user utterance to an OpenAI-compatible `/v1/chat/completions`
//! endpoint and returns the text of the first choice. There is no history,
//! streaming, or retry: each call is one POST and one classified result.
//!
//! # Overview
//!
//! - **Credential**: the bearer token, checked by [`check_credential`] before
//!   any request is made.
//! - **CompletionClient**: builds the request, sends it through a
//!   [`Transport`], and turns the reply into text or an [`Error`].
//! - **Transport**: the HTTP seam; [`HttpTransport`] uses reqwest.
//!
//! # Example
//!
//! ```no_run
//! use completion::{CompletionClient, Credential};
//!
//! # async fn example() -> completion::Result<()> {
//! let client = CompletionClient::builder(Some(Credential::new("sk-..."))).build();
//! let reply = client.complete("Hello!").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

mod client;
mod credential;
mod error;
mod transport;
mod types;

pub use client::{
    CompletionClient, CompletionClientBuilder, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, GENERIC_FAILURE_MESSAGE,
};
pub use credential::{Credential, CredentialStatus, PLACEHOLDER_API_KEY, check_credential};
pub use error::{Error, Result};
pub use transport::{HttpReply, HttpTransport, Transport};
pub use types::{ChatRequest, Message, Role};
