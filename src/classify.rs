use serde::Serialize;

use crate::credential::{CredentialKind, DEEPSEEK_KEY_PREFIX, ProviderCredential};
use crate::error::PipelineError;

/// Words that mark a failure as a credential problem when nothing else classified it.
const AUTH_KEYWORDS: &[&str] = &[
    "auth",
    "credential",
    "permission",
    "unauthorized",
    "forbidden",
    "api key",
];

/// Cap on how much of an underlying failure is echoed back.
const MAX_DETAIL_CHARS: usize = 500;

/// The closed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    RateLimit,
    Timeout,
    Unknown,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Authentication => 401,
            Self::RateLimit => 429,
            Self::Timeout => 504,
            Self::Unknown => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: u16,
}

impl ClassifiedError {
    fn new(kind: ErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            status: kind.status_code(),
        }
    }
}

/// Map any pipeline failure onto the taxonomy. Never panics; the returned
/// message is never empty and never contains the credential's secret.
pub fn classify(err: &PipelineError, credential: Option<&ProviderCredential>) -> ClassifiedError {
    let scrub = |text: String| match credential {
        Some(c) => c.scrub(&text),
        None => text,
    };

    let classified = match err {
        // Tagged by the invoker: keep the tag.
        PipelineError::AuthFailed {
            provider, status, ..
        } => ClassifiedError::new(
            ErrorKind::Authentication,
            rejected_message(provider, *status, credential),
        ),
        PipelineError::RateLimited { provider } => ClassifiedError::new(
            ErrorKind::RateLimit,
            format!("rate limited by {provider}, try again shortly"),
        ),
        PipelineError::Timeout(_) => {
            ClassifiedError::new(ErrorKind::Timeout, err.user_message())
        }
        PipelineError::Upstream {
            status: Some(_), ..
        }
        | PipelineError::SchemaParse(_) => {
            ClassifiedError::new(ErrorKind::Unknown, detail(&scrub(err.to_string())))
        }

        PipelineError::NoCredential => {
            ClassifiedError::new(ErrorKind::Authentication, err.user_message())
        }

        _ if mentions_credentials(&err.to_string()) => ClassifiedError::new(
            ErrorKind::Authentication,
            format!(
                "{}; verify the API key's format and that it is scoped for chat completions",
                detail(&scrub(err.to_string()))
            ),
        ),

        _ if err.is_timeout() => ClassifiedError::new(ErrorKind::Timeout, err.user_message()),

        _ => ClassifiedError::new(
            ErrorKind::Unknown,
            detail(&scrub(format!("generation failed: {err}"))),
        ),
    };

    if classified.message.trim().is_empty() {
        return ClassifiedError::new(classified.kind, "generation failed".to_string());
    }
    classified
}

fn rejected_message(provider: &str, status: u16, credential: Option<&ProviderCredential>) -> String {
    match credential {
        Some(c) if c.kind == CredentialKind::DeepSeekKey && !c.format_valid => format!(
            "{provider} rejected the API key ({status}); DeepSeek keys start with \"{DEEPSEEK_KEY_PREFIX}\", \
             check that DEEPSEEK_API_KEY holds the full key"
        ),
        _ => format!(
            "{provider} rejected the credential ({status}); verify the API key's format and scope"
        ),
    }
}

fn mentions_credentials(text: &str) -> bool {
    let lower = text.to_lowercase();
    AUTH_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn detail(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= MAX_DETAIL_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_DETAIL_CHARS).collect();
    format!("{head}...")
}
