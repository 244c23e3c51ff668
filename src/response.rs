use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::classify::ErrorKind;
use crate::decode::GeneratedFile;
use crate::pipeline::{Diagnostics, GenerationOutcome};

/// Outbound JSON for one generation request, success or failure.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    Success(SuccessBody),
    Failure(FailureBody),
}

#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub ok: bool,
    pub files: Vec<GeneratedFile>,
    pub generated_text: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub ok: bool,
    pub error_type: ErrorKind,
    pub message: String,
    /// HTTP-style status the web layer should answer with.
    pub status: u16,
    #[serde(flatten)]
    pub diagnostics: Diagnostics,
}

impl From<GenerationOutcome> for GenerationResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        match outcome {
            Ok(success) => Self::Success(SuccessBody {
                ok: true,
                files: success.result.files,
                generated_text: success.result.generated_text,
                provider: success.provider.to_string(),
                model: success.model,
                latency_ms: success.latency_ms,
            }),
            Err(failure) => Self::Failure(FailureBody {
                ok: false,
                error_type: failure.error.kind,
                message: failure.error.message,
                status: failure.error.status,
                diagnostics: failure.diagnostics,
            }),
        }
    }
}

impl GenerationResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// HTTP-style status: 200 on success, the classified code otherwise.
    pub fn status(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Failure(f) => f.status,
        }
    }

    /// Always a transport-level success; errors live in the JSON payload
    /// (`"ok": false`) so one failed call does not poison sibling calls.
    pub fn into_call_tool_result(self) -> CallToolResult {
        to_call_tool_result(&self)
    }
}

/// Serialize any tool payload as a single text content block.
pub fn to_call_tool_result<T: Serialize>(payload: &T) -> CallToolResult {
    match serde_json::to_string(payload) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => {
            let escaped = e.to_string().replace('\\', "\\\\").replace('"', "\\\"");
            CallToolResult::success(vec![Content::text(format!(
                r#"{{"ok":false,"errorType":"unknown","message":"serialization failed: {escaped}","status":500}}"#
            ))])
        }
    }
}
