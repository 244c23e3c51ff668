//! Error classifier: tag, status code and message for every failure shape.

use appforge::classify::{ErrorKind, classify};
use appforge::credential::{CredentialKind, ProviderCredential};
use appforge::error::PipelineError;

fn deepseek(secret: &str) -> ProviderCredential {
    ProviderCredential::new(CredentialKind::DeepSeekKey, secret)
}

#[test]
fn taxonomy_status_codes() {
    assert_eq!(ErrorKind::Authentication.status_code(), 401);
    assert_eq!(ErrorKind::RateLimit.status_code(), 429);
    assert_eq!(ErrorKind::Timeout.status_code(), 504);
    assert_eq!(ErrorKind::Unknown.status_code(), 500);
    assert_eq!(
        serde_json::to_value(ErrorKind::RateLimit).unwrap(),
        serde_json::json!("rate_limit")
    );
}

#[test]
fn rate_limit_ignores_message_text() {
    // Provider names that look like credential words must not change the tag.
    for provider in ["deepseek", "auth-proxy", "credential-gateway", "permission-denied"] {
        let err = PipelineError::RateLimited {
            provider: provider.to_string(),
        };
        let c = classify(&err, None);
        assert_eq!(c.kind, ErrorKind::RateLimit);
        assert_eq!(c.status, 429);
    }
}

#[test]
fn auth_failure_keeps_tag() {
    let err = PipelineError::AuthFailed {
        provider: "huggingface".to_string(),
        message: "403 Forbidden".to_string(),
        status: 403,
    };
    let c = classify(&err, Some(&ProviderCredential::new(CredentialKind::HuggingFaceToken, "hf_x")));
    assert_eq!(c.kind, ErrorKind::Authentication);
    assert_eq!(c.status, 401);
    assert!(c.message.contains("verify"));
}

#[test]
fn malformed_deepseek_key_gets_specific_message() {
    let err = PipelineError::AuthFailed {
        provider: "deepseek".to_string(),
        message: "401 Unauthorized".to_string(),
        status: 401,
    };
    let bad = classify(&err, Some(&deepseek("ds-abc")));
    assert!(bad.message.contains("\"sk-\""), "{}", bad.message);

    let good = classify(&err, Some(&deepseek("sk-abc")));
    assert!(!good.message.contains("\"sk-\""));
    assert_eq!(good.kind, ErrorKind::Authentication);
}

#[test]
fn no_credential_is_authentication() {
    let c = classify(&PipelineError::NoCredential, None);
    assert_eq!(c.kind, ErrorKind::Authentication);
    assert_eq!(c.status, 401);
    assert!(c.message.contains("DEEPSEEK_API_KEY"));
}

#[test]
fn timeout_is_504() {
    let c = classify(&PipelineError::Timeout(150_000), None);
    assert_eq!(c.kind, ErrorKind::Timeout);
    assert_eq!(c.status, 504);
}

#[test]
fn credential_keywords_classify_untagged_failures() {
    for msg in [
        "Authorization header malformed",
        "invalid CREDENTIAL supplied",
        "no permission for model",
    ] {
        let c = classify(&PipelineError::Decode(msg.to_string()), None);
        assert_eq!(c.kind, ErrorKind::Authentication, "{msg}");
        assert_eq!(c.status, 401);
        assert!(c.message.contains("format and"));
    }
}

#[test]
fn upstream_without_status_uses_keywords() {
    let err = PipelineError::Upstream {
        provider: "huggingface".to_string(),
        message: "Authorization header is correct, but the token seems invalid".to_string(),
        status: None,
    };
    assert_eq!(classify(&err, None).kind, ErrorKind::Authentication);
}

#[test]
fn upstream_http_error_is_unknown_with_detail() {
    let err = PipelineError::Upstream {
        provider: "deepseek".to_string(),
        message: "503 Service Unavailable: overloaded".to_string(),
        status: Some(503),
    };
    let c = classify(&err, None);
    assert_eq!(c.kind, ErrorKind::Unknown);
    assert_eq!(c.status, 500);
    assert!(c.message.contains("overloaded"));
}

#[test]
fn malformed_envelope_is_unknown() {
    let c = classify(&PipelineError::SchemaParse("missing field `choices`".to_string()), None);
    assert_eq!(c.kind, ErrorKind::Unknown);
    assert!(c.message.contains("choices"));
}

#[test]
fn everything_else_is_unknown_with_original_text() {
    let c = classify(&PipelineError::Decode("decoder panicked".to_string()), None);
    assert_eq!(c.kind, ErrorKind::Unknown);
    assert_eq!(c.status, 500);
    assert!(c.message.contains("decoder panicked"));
}

#[test]
fn secret_never_appears_in_message() {
    let secret = "sk-live-0123456789abcdef";
    let cred = deepseek(secret);
    let errors = [
        PipelineError::Decode(format!("failure with {secret} inside")),
        PipelineError::Decode(format!("auth rejected {secret}")),
        PipelineError::Upstream {
            provider: "deepseek".to_string(),
            message: format!("400: echoed {secret}"),
            status: Some(400),
        },
    ];
    for err in &errors {
        let c = classify(err, Some(&cred));
        assert!(!c.message.contains(secret), "leaked in {:?}", c.message);
        assert!(!c.message.trim().is_empty());
    }
}

#[test]
fn long_detail_is_truncated() {
    let c = classify(&PipelineError::Decode("x".repeat(5000)), None);
    assert!(c.message.chars().count() < 600);
    assert!(c.message.ends_with("..."));
}

#[test]
fn empty_message_is_replaced() {
    let c = classify(&PipelineError::Decode(String::new()), None);
    assert!(!c.message.is_empty());
}
