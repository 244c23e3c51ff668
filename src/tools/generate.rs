use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TECHNOLOGY: &str = "web development";
pub const DEFAULT_APP_TYPE: &str = "application";

/// Inbound generation request. Field names follow the JSON body the web layer sends.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Natural-language description of the application to generate.
    pub prompt: String,
    /// Target technology, e.g. "react", "python", "html". Defaults to "web development".
    pub technology: Option<String>,
    /// Kind of application, e.g. "dashboard", "game". Defaults to "application".
    pub app_type: Option<String>,
    /// Features the generated project must implement, in order.
    pub features: Option<Vec<String>>,
    /// Explicit provider model id. Defaults to the provider's configured model.
    pub model_id: Option<String>,
    /// Maximum tokens to generate. Defaults to the configured limit (4000).
    pub max_length: Option<u64>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("prompt must not be empty".to_string());
        }
        Ok(())
    }

    pub fn technology_or_default(&self) -> &str {
        non_blank(self.technology.as_deref()).unwrap_or(DEFAULT_TECHNOLOGY)
    }

    pub fn app_type_or_default(&self) -> &str {
        non_blank(self.app_type.as_deref()).unwrap_or(DEFAULT_APP_TYPE)
    }

    /// Non-blank feature labels, trimmed, in request order.
    pub fn features(&self) -> Vec<&str> {
        self.features
            .iter()
            .flatten()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect()
    }

    pub fn model_override(&self) -> Option<&str> {
        non_blank(self.model_id.as_deref())
    }

    pub fn max_tokens_or(&self, default: u64) -> u64 {
        self.max_length.filter(|n| *n > 0).unwrap_or(default)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
