use serde::Serialize;

use crate::config::Credentials;
use crate::error::PipelineError;

/// DeepSeek issues keys of the form `sk-...`.
pub const DEEPSEEK_KEY_PREFIX: &str = "sk-";

const REDACTED: &str = "[REDACTED]";

/// Leading characters of a secret that count as a leak when echoed on their own.
const PARTIAL_SECRET_CHARS: usize = 6;

/// Provider family behind a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    DeepSeek,
    HuggingFace,
}

impl ProviderFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::HuggingFace => "huggingface",
        }
    }
}

impl std::fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which configured secret was picked, in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CredentialKind {
    #[serde(rename = "deepseek_key")]
    DeepSeekKey,
    #[serde(rename = "huggingface_token")]
    HuggingFaceToken,
    #[serde(rename = "huggingface_key")]
    HuggingFaceKey,
}

impl CredentialKind {
    pub const PRIORITY: [CredentialKind; 3] = [
        CredentialKind::DeepSeekKey,
        CredentialKind::HuggingFaceToken,
        CredentialKind::HuggingFaceKey,
    ];

    pub fn family(&self) -> ProviderFamily {
        match self {
            Self::DeepSeekKey => ProviderFamily::DeepSeek,
            Self::HuggingFaceToken | Self::HuggingFaceKey => ProviderFamily::HuggingFace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepSeekKey => "deepseek_key",
            Self::HuggingFaceToken => "huggingface_token",
            Self::HuggingFaceKey => "huggingface_key",
        }
    }

    /// The configured secret for this kind, if present and non-blank.
    pub fn lookup<'a>(&self, credentials: &'a Credentials) -> Option<&'a str> {
        let value = match self {
            Self::DeepSeekKey => credentials.deepseek_key.as_deref(),
            Self::HuggingFaceToken => credentials.huggingface_token.as_deref(),
            Self::HuggingFaceKey => credentials.huggingface_key.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Local format check. Only DeepSeek keys have a known shape.
    fn accepts(&self, secret: &str) -> bool {
        match self {
            Self::DeepSeekKey => secret.starts_with(DEEPSEEK_KEY_PREFIX),
            Self::HuggingFaceToken | Self::HuggingFaceKey => true,
        }
    }
}

/// The one credential selected for a request.
#[derive(Clone)]
pub struct ProviderCredential {
    pub kind: CredentialKind,
    secret: String,
    /// False when the secret failed the local shape check. The credential is still
    /// used; the flag only sharpens the message if the provider rejects it.
    pub format_valid: bool,
}

impl ProviderCredential {
    pub fn new(kind: CredentialKind, secret: impl Into<String>) -> Self {
        let secret = secret.into().trim().to_string();
        let format_valid = kind.accepts(&secret);
        Self {
            kind,
            secret,
            format_valid,
        }
    }

    pub fn family(&self) -> ProviderFamily {
        self.kind.family()
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Replace every occurrence of the secret in `text`, plus any token that
    /// starts with its first few characters (masked or truncated echoes).
    /// Upstream bodies and transport errors pass through here before being
    /// logged or returned.
    pub fn scrub(&self, text: &str) -> String {
        if self.secret.is_empty() {
            return text.to_string();
        }
        let scrubbed = text.replace(&self.secret, REDACTED);
        match self.secret.char_indices().nth(PARTIAL_SECRET_CHARS) {
            Some((cut, _)) => redact_tokens_with_prefix(&scrubbed, &self.secret[..cut]),
            None => scrubbed,
        }
    }
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("kind", &self.kind)
            .field("secret", &REDACTED)
            .field("format_valid", &self.format_valid)
            .finish()
    }
}

fn redact_tokens_with_prefix(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(prefix) {
        out.push_str(&rest[..at]);
        out.push_str(REDACTED);
        let token = &rest[at..];
        let end = token[prefix.len()..]
            .find(|c: char| c.is_whitespace() || "\"'`,;()[]{}<>".contains(c))
            .map_or(token.len(), |i| prefix.len() + i);
        rest = &token[end..];
    }
    out.push_str(rest);
    out
}

/// Pick the first configured credential: DeepSeek key, then Hugging Face token,
/// then Hugging Face key. A malformed DeepSeek key still wins over a well-formed
/// Hugging Face credential.
pub fn resolve(credentials: &Credentials) -> Result<ProviderCredential, PipelineError> {
    CredentialKind::PRIORITY
        .iter()
        .find_map(|kind| {
            kind.lookup(credentials)
                .map(|secret| ProviderCredential::new(*kind, secret))
        })
        .ok_or(PipelineError::NoCredential)
}
