//! Credential resolution and configuration loading.

use std::collections::HashMap;
use std::time::Duration;

use appforge::config::{
    Config, Credentials, DEEPSEEK_KEY_VAR, HUGGINGFACE_KEY_VAR, HUGGINGFACE_TOKEN_VAR,
};
use appforge::credential::{self, CredentialKind, ProviderFamily};
use appforge::dispatch::registry::{ApiFormat, DEEPSEEK_BASE_URL, HUGGINGFACE_DEFAULT_MODEL};
use appforge::error::PipelineError;

fn creds(deepseek: Option<&str>, token: Option<&str>, key: Option<&str>) -> Credentials {
    Credentials {
        deepseek_key: deepseek.map(String::from),
        huggingface_token: token.map(String::from),
        huggingface_key: key.map(String::from),
    }
}

// ---------------------------------------------------------------------------
// Priority order
// ---------------------------------------------------------------------------

#[test]
fn deepseek_key_wins_when_present() {
    let c = credential::resolve(&creds(Some("sk-abc"), Some("hf_tok"), Some("hf_key"))).unwrap();
    assert_eq!(c.kind, CredentialKind::DeepSeekKey);
    assert_eq!(c.family(), ProviderFamily::DeepSeek);
    assert!(c.format_valid);
}

#[test]
fn only_huggingface_token_resolves_to_huggingface() {
    let c = credential::resolve(&creds(None, Some("hf_tok"), None)).unwrap();
    assert_eq!(c.kind, CredentialKind::HuggingFaceToken);
    assert_eq!(c.family(), ProviderFamily::HuggingFace);
    assert_eq!(c.family().as_str(), "huggingface");
    assert_ne!(c.family(), ProviderFamily::DeepSeek);
}

#[test]
fn token_wins_over_key() {
    let c = credential::resolve(&creds(None, Some("hf_tok"), Some("hf_key"))).unwrap();
    assert_eq!(c.kind, CredentialKind::HuggingFaceToken);
    assert_eq!(c.secret(), "hf_tok");
}

#[test]
fn huggingface_key_is_last_resort() {
    let c = credential::resolve(&creds(None, None, Some("hf_key"))).unwrap();
    assert_eq!(c.kind, CredentialKind::HuggingFaceKey);
    assert_eq!(c.family(), ProviderFamily::HuggingFace);
}

#[test]
fn nothing_configured_is_no_credential() {
    let err = credential::resolve(&creds(None, None, None)).unwrap_err();
    assert!(matches!(err, PipelineError::NoCredential));
}

#[test]
fn blank_values_count_as_absent() {
    let c = credential::resolve(&creds(Some("   "), Some(""), Some("hf_key"))).unwrap();
    assert_eq!(c.kind, CredentialKind::HuggingFaceKey);
}

#[test]
fn malformed_deepseek_key_is_still_preferred_but_flagged() {
    let c = credential::resolve(&creds(Some("ds-wrong-prefix"), Some("hf_tok"), None)).unwrap();
    assert_eq!(c.kind, CredentialKind::DeepSeekKey);
    assert!(!c.format_valid);
}

#[test]
fn secret_is_redacted_in_debug_output() {
    let c = credential::resolve(&creds(Some("sk-very-secret"), None, None)).unwrap();
    let debug = format!("{c:?}");
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("[REDACTED]"));

    let debug = format!("{:?}", creds(Some("sk-very-secret"), None, None));
    assert!(!debug.contains("sk-very-secret"));
}

#[test]
fn scrub_replaces_every_occurrence() {
    let c = credential::resolve(&creds(Some("sk-xyz"), None, None)).unwrap();
    assert_eq!(c.scrub("a sk-xyz b sk-xyz"), "a [REDACTED] b [REDACTED]");
}

#[test]
fn scrub_catches_masked_and_truncated_echoes() {
    let c = credential::resolve(&creds(Some("sk-abc123def456ghi789"), None, None)).unwrap();
    assert_eq!(
        c.scrub(r#"{"error":"invalid key sk-abc1…, check it"}"#),
        r#"{"error":"invalid key [REDACTED], check it"}"#
    );
    assert_eq!(
        c.scrub("key sk-abc123****i789 rejected"),
        "key [REDACTED] rejected"
    );
    assert_eq!(c.scrub("prefix sk-ab only"), "prefix sk-ab only");
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn credentials_from_lookup_reads_the_three_names() {
    let vars: HashMap<&str, &str> = [
        (DEEPSEEK_KEY_VAR, "sk-1"),
        (HUGGINGFACE_TOKEN_VAR, " "),
        (HUGGINGFACE_KEY_VAR, "hf_2"),
    ]
    .into_iter()
    .collect();
    let c = Credentials::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
    assert_eq!(c.deepseek_key.as_deref(), Some("sk-1"));
    assert_eq!(c.huggingface_token, None);
    assert_eq!(c.huggingface_key.as_deref(), Some("hf_2"));
}

#[test]
fn defaults() {
    let config = Config::default();
    assert!(config.credentials.is_empty());
    assert_eq!(config.generation.timeout, Duration::from_secs(150));
    assert_eq!(config.generation.max_tokens, 4000);
    assert_eq!(config.endpoints.deepseek.base_url, DEEPSEEK_BASE_URL);
    assert_eq!(config.endpoints.huggingface.model, HUGGINGFACE_DEFAULT_MODEL);
}

#[test]
fn toml_overlay_overrides_endpoints_and_limits() {
    let mut config = Config::default();
    config
        .apply_toml(
            r#"
            [providers.huggingface]
            base_url = "https://api-inference.huggingface.co/models/{model}"
            model = "bigcode/starcoder2-15b"
            api_format = "text_generation"

            [generation]
            timeout_secs = 5000
            max_tokens = 8000
            "#,
        )
        .unwrap();

    assert_eq!(config.endpoints.huggingface.api_format, ApiFormat::TextGeneration);
    assert_eq!(config.endpoints.huggingface.model, "bigcode/starcoder2-15b");
    assert_eq!(
        config.endpoints.huggingface.url_for("bigcode/starcoder2-15b"),
        "https://api-inference.huggingface.co/models/bigcode/starcoder2-15b"
    );
    // Untouched section keeps defaults.
    assert_eq!(config.endpoints.deepseek.base_url, DEEPSEEK_BASE_URL);
    // Clamped to the ceiling.
    assert_eq!(config.generation.timeout, Duration::from_secs(600));
    assert_eq!(config.generation.max_tokens, 8000);
}

#[test]
fn toml_cannot_carry_secrets() {
    let mut config = Config::default();
    let err = config.apply_toml(
        r#"
        [providers.deepseek]
        api_key = "sk-should-not-be-here"
        "#,
    );
    assert!(err.is_err());
    assert!(config.credentials.is_empty());
}
