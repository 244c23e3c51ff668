use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no provider credential configured")]
    NoCredential,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("timeout after {0}ms")]
    Timeout(u64),

    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("auth failed for {provider}: {message}")]
    AuthFailed {
        provider: String,
        message: String,
        status: u16,
    },

    #[error("upstream error from {provider}: {message}")]
    Upstream {
        provider: String,
        message: String,
        status: Option<u16>,
    },

    #[error("schema parse error: {0}")]
    SchemaParse(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(String),
}

impl PipelineError {
    /// HTTP status returned by the provider, when the failure came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::AuthFailed { status, .. } => Some(*status),
            Self::Upstream { status, .. } => *status,
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the transport gave up waiting for the provider.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Produce a sanitized error message safe for returning to callers.
    /// Does not leak internal URLs or connection details.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoCredential => {
                "no provider credential is configured (set DEEPSEEK_API_KEY, HUGGINGFACE_TOKEN or HUGGINGFACE_API_KEY)"
                    .to_string()
            }
            Self::InvalidRequest(msg) => format!("invalid request: {msg}"),
            Self::Timeout(ms) => format!("generation timed out after {ms}ms"),
            Self::RateLimited { provider } => {
                format!("rate limited by {provider}, try again shortly")
            }
            Self::AuthFailed {
                provider, message, ..
            } => {
                format!("authentication failed for {provider}: {message}")
            }
            Self::Upstream {
                provider, message, ..
            } => format!("upstream error from {provider}: {message}"),
            Self::SchemaParse(msg) => format!("failed to parse provider response: {msg}"),
            Self::Request(e) if e.is_timeout() => "request to provider timed out".to_string(),
            Self::Request(e) if e.is_connect() => "could not connect to provider".to_string(),
            Self::Request(_) => "request to provider failed".to_string(),
            Self::Decode(msg) => format!("failed to decode generated output: {msg}"),
        }
    }
}
