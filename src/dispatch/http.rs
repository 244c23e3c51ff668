use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::credential::ProviderCredential;
use crate::dispatch::registry::{ApiFormat, ProviderEndpoint};
use crate::dispatch::{ProviderRequest, ProviderResult};
use crate::error::PipelineError;

pub const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Upstream error bodies are kept for diagnostics but capped in messages.
const MAX_ERROR_PREVIEW_CHARS: usize = 500;

pub struct HttpDispatch {
    client: Client,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

/// Hugging Face text-generation replies come as a list, a bare object, or an error object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextGenerationReply {
    Batch(Vec<GeneratedText>),
    Error { error: Value },
    Single(GeneratedText),
}

impl Default for HttpDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDispatch {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {e}");
                Client::new()
            });

        Self { client }
    }

    pub async fn query_model(
        &self,
        req: &ProviderRequest,
        credential: &ProviderCredential,
        endpoint: &ProviderEndpoint,
    ) -> Result<ProviderResult, PipelineError> {
        let start = Instant::now();
        let timeout_ms = req.timeout.as_millis() as u64;

        // The request-level timeout covers headers and body; the outer one also
        // bounds anything reqwest does not account for.
        let text = tokio::time::timeout(req.timeout, self.exchange(req, credential, endpoint))
            .await
            .map_err(|_| PipelineError::Timeout(timeout_ms))?
            .map_err(|e| match e {
                PipelineError::Request(ref inner) if inner.is_timeout() => {
                    PipelineError::Timeout(timeout_ms)
                }
                other => other,
            })?;

        Ok(ProviderResult {
            text,
            model: req.model.clone(),
            provider: credential.family().to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn exchange(
        &self,
        req: &ProviderRequest,
        credential: &ProviderCredential,
        endpoint: &ProviderEndpoint,
    ) -> Result<String, PipelineError> {
        let provider = credential.family().as_str();
        let url = endpoint.url_for(&req.model);
        let body = request_body(req, endpoint.api_format);

        tracing::debug!(
            provider,
            model = %req.model,
            url = %url,
            max_tokens = req.max_tokens,
            "dispatching generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", credential.secret()))
            .header("Content-Type", "application/json")
            .timeout(req.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Auth and throttling are decided by the status line alone; the body may be
        // oversized, truncated or absent.
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        ) {
            tracing::debug!(provider, status = status.as_u16(), "provider refused request");
            return Err(classify_status(provider, status, ""));
        }

        if !status.is_success() {
            let error_bytes = response.bytes().await.unwrap_or_default();
            let truncated = &error_bytes[..error_bytes.len().min(MAX_RESPONSE_BYTES)];
            let raw = credential.scrub(&String::from_utf8_lossy(truncated));
            tracing::debug!(
                provider,
                status = status.as_u16(),
                body = %raw,
                "provider returned error status"
            );
            return Err(classify_status(provider, status, &raw));
        }

        // Cap body reads to MAX_RESPONSE_BYTES to prevent memory exhaustion
        if let Some(len) = response.content_length()
            && len as usize > MAX_RESPONSE_BYTES
        {
            return Err(PipelineError::Upstream {
                provider: provider.to_string(),
                message: format!("response too large: {len} bytes (max {MAX_RESPONSE_BYTES})"),
                status: None,
            });
        }

        let bytes = response.bytes().await?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(PipelineError::Upstream {
                provider: provider.to_string(),
                message: format!(
                    "response too large: {} bytes (max {})",
                    bytes.len(),
                    MAX_RESPONSE_BYTES
                ),
                status: None,
            });
        }

        let text = match endpoint.api_format {
            ApiFormat::ChatCompletions => parse_chat_completion(provider, &bytes)?,
            ApiFormat::TextGeneration => parse_text_generation(provider, &bytes)?,
        };

        if text.trim().is_empty() {
            return Err(PipelineError::Upstream {
                provider: provider.to_string(),
                message: "provider returned empty content".to_string(),
                status: None,
            });
        }

        Ok(text)
    }
}

fn request_body(req: &ProviderRequest, format: ApiFormat) -> Value {
    match format {
        ApiFormat::ChatCompletions => {
            let mut messages = Vec::new();
            if !req.system_prompt.is_empty() {
                messages.push(json!({"role": "system", "content": req.system_prompt}));
            }
            messages.push(json!({"role": "user", "content": req.prompt}));
            json!({
                "model": req.model,
                "messages": messages,
                "temperature": req.temperature,
                "top_p": req.top_p,
                "max_tokens": req.max_tokens,
                "stream": false,
            })
        }
        ApiFormat::TextGeneration => {
            let inputs = if req.system_prompt.is_empty() {
                req.prompt.clone()
            } else {
                format!("{}\n\n{}", req.system_prompt, req.prompt)
            };
            json!({
                "inputs": inputs,
                "parameters": {
                    "temperature": req.temperature,
                    "top_p": req.top_p,
                    "max_new_tokens": req.max_tokens,
                    "return_full_text": false,
                },
            })
        }
    }
}

/// Map a non-2xx status onto the invoker's failure variants.
fn classify_status(provider: &str, status: StatusCode, body: &str) -> PipelineError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PipelineError::AuthFailed {
            provider: provider.to_string(),
            message: format!("{status}"),
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => PipelineError::RateLimited {
            provider: provider.to_string(),
        },
        _ => {
            let preview: String = body.chars().take(MAX_ERROR_PREVIEW_CHARS).collect();
            let message = if preview.trim().is_empty() {
                format!("{status}")
            } else {
                format!("{status}: {}", preview.trim())
            };
            PipelineError::Upstream {
                provider: provider.to_string(),
                message,
                status: Some(status.as_u16()),
            }
        }
    }
}

fn parse_chat_completion(provider: &str, bytes: &[u8]) -> Result<String, PipelineError> {
    let completion: ChatCompletion = serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::SchemaParse(format!("failed to parse response: {e}")))?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| PipelineError::Upstream {
            provider: provider.to_string(),
            message: "empty choices or null content".to_string(),
            status: None,
        })
}

fn parse_text_generation(provider: &str, bytes: &[u8]) -> Result<String, PipelineError> {
    let reply: TextGenerationReply = serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::SchemaParse(format!("failed to parse response: {e}")))?;

    let generated = match reply {
        TextGenerationReply::Batch(items) => items.into_iter().next(),
        TextGenerationReply::Single(item) => Some(item),
        TextGenerationReply::Error { error } => {
            let message = match error {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(PipelineError::Upstream {
                provider: provider.to_string(),
                message,
                status: None,
            });
        }
    };

    generated
        .and_then(|g| g.generated_text)
        .ok_or_else(|| PipelineError::Upstream {
            provider: provider.to_string(),
            message: "missing generated_text".to_string(),
            status: None,
        })
}
