//! API credential handling.

use std::fmt;

/// Value shipped in sample configuration files. Treated as unset.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Bearer token for the completion endpoint.
///
/// Never exposes its value through `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn is_unusable(&self) -> bool {
        self.0 == PLACEHOLDER_API_KEY || self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Outcome of [`check_credential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Valid,
    /// No credential was supplied at all.
    NotLoaded,
    /// A credential was supplied but is blank or the placeholder.
    NotConfigured,
}

impl CredentialStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "API key configured.",
            Self::NotLoaded => {
                "API key not loaded. Set OPENAI_API_KEY and restart the application."
            }
            Self::NotConfigured => {
                "API key not configured. Set OPENAI_API_KEY in your .env file or gptchat.toml."
            }
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Decide whether a credential is usable for requests.
pub fn check_credential(credential: Option<&Credential>) -> CredentialStatus {
    match credential {
        None => CredentialStatus::NotLoaded,
        Some(c) if c.is_unusable() => CredentialStatus::NotConfigured,
        Some(_) => CredentialStatus::Valid,
    }
}
