use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::classify::{self, ClassifiedError};
use crate::config::Config;
use crate::credential::{self, CredentialKind, ProviderCredential, ProviderFamily};
use crate::decode::{self, GenerationResult};
use crate::dispatch::http::HttpDispatch;
use crate::dispatch::{ProviderRequest, ProviderResult, TEMPERATURE, TOP_P};
use crate::error::PipelineError;
use crate::prompt;
use crate::tools::generate::GenerationRequest;

/// Where a request is in the pipeline. Transitions are strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    ResolvingCredential,
    BuildingPrompt,
    Invoking,
    Decoding,
    Succeeded,
    Failed,
}

/// Non-secret context attached to a failure so operators can tell a bad
/// configuration from a flaky provider.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// State the pipeline was in when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<CredentialKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_format_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

#[derive(Debug)]
pub struct GenerationSuccess {
    pub result: GenerationResult,
    pub provider: ProviderFamily,
    pub model: String,
    pub latency_ms: u64,
}

#[derive(Debug)]
pub struct GenerationFailure {
    pub error: ClassifiedError,
    pub diagnostics: Diagnostics,
}

pub type GenerationOutcome = Result<GenerationSuccess, GenerationFailure>;

/// Runs credential resolution, prompt building, the provider call and decoding
/// for one request at a time. Holds only read-only configuration and a pooled
/// HTTP client, so one instance serves concurrent requests.
pub struct Generator {
    config: Arc<Config>,
    http: HttpDispatch,
}

/// Per-request progress, so a failure can report how far it got.
struct Run {
    state: PipelineState,
    diagnostics: Diagnostics,
    credential: Option<ProviderCredential>,
}

impl Run {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            diagnostics: Diagnostics::default(),
            credential: None,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?next, "pipeline transition");
        self.state = next;
    }

    fn fail(mut self, err: PipelineError) -> GenerationFailure {
        let error = classify::classify(&err, self.credential.as_ref());
        self.diagnostics.stage = Some(self.state);
        self.diagnostics.http_status = err.http_status();
        self.enter(PipelineState::Failed);
        tracing::warn!(
            kind = %error.kind,
            stage = ?self.diagnostics.stage,
            provider = ?self.diagnostics.provider,
            "generation failed: {}",
            error.message
        );
        GenerationFailure {
            error,
            diagnostics: self.diagnostics,
        }
    }
}

impl Generator {
    pub fn new(config: Config) -> Self {
        Self::from_shared(Arc::new(config))
    }

    pub fn from_shared(config: Arc<Config>) -> Self {
        Self {
            config,
            http: HttpDispatch::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline. Produces either a result or a classified error,
    /// never both; nothing is retried.
    pub async fn generate(&self, req: &GenerationRequest) -> GenerationOutcome {
        let mut run = Run::new();

        if let Err(msg) = req.validate() {
            return Err(run.fail(PipelineError::InvalidRequest(msg)));
        }

        run.enter(PipelineState::ResolvingCredential);
        let credential = match credential::resolve(&self.config.credentials) {
            Ok(c) => c,
            Err(e) => return Err(run.fail(e)),
        };
        let family = credential.family();
        run.diagnostics.provider = Some(family);
        run.diagnostics.credential = Some(credential.kind);
        run.diagnostics.credential_format_valid = Some(credential.format_valid);
        if !credential.format_valid {
            tracing::warn!(
                credential = credential.kind.as_str(),
                "credential failed local format check, using it anyway"
            );
        }
        run.credential = Some(credential.clone());

        run.enter(PipelineState::BuildingPrompt);
        let endpoint = self.config.endpoints.get(family);
        let model = req.model_override().unwrap_or(endpoint.model.as_str()).to_string();
        run.diagnostics.model = Some(model.clone());
        let bundle = prompt::build_prompt(req, family);
        let provider_req = ProviderRequest {
            system_prompt: bundle.system,
            prompt: bundle.user,
            model,
            max_tokens: req.max_tokens_or(self.config.generation.max_tokens),
            temperature: TEMPERATURE,
            top_p: TOP_P,
            timeout: self.config.generation.timeout,
        };

        run.enter(PipelineState::Invoking);
        let start = Instant::now();
        let ProviderResult {
            text,
            model,
            latency_ms,
            ..
        } = match self.http.query_model(&provider_req, &credential, endpoint).await {
            Ok(r) => r,
            Err(e) => return Err(run.fail(e)),
        };

        run.enter(PipelineState::Decoding);
        let result = match catch_unwind(AssertUnwindSafe(|| decode::decode(&text))) {
            Ok(r) => r,
            Err(_) => {
                return Err(run.fail(PipelineError::Decode(
                    "decoder panicked on provider output".to_string(),
                )));
            }
        };

        run.enter(PipelineState::Succeeded);
        tracing::info!(
            provider = %family,
            model = %model,
            files = result.files.len(),
            latency_ms,
            total_ms = start.elapsed().as_millis() as u64,
            "generation succeeded"
        );

        Ok(GenerationSuccess {
            result,
            provider: family,
            model,
            latency_ms,
        })
    }
}
