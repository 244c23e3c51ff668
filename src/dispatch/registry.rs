use serde::{Deserialize, Serialize};

use crate::credential::ProviderFamily;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/chat/completions";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

pub const HUGGINGFACE_BASE_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const HUGGINGFACE_DEFAULT_MODEL: &str = "Qwen/Qwen2.5-Coder-32B-Instruct";

/// Placeholder in a base URL replaced with the resolved model id.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Wire format spoken by an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFormat {
    /// OpenAI-compatible chat completions (DeepSeek, Hugging Face router).
    #[default]
    ChatCompletions,
    /// Hugging Face serverless text-generation (`inputs` / `generated_text`).
    TextGeneration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub model: String,
    pub api_format: ApiFormat,
}

impl ProviderEndpoint {
    /// Base URL with `{model}` substituted.
    pub fn url_for(&self, model: &str) -> String {
        self.base_url.replace(MODEL_PLACEHOLDER, model)
    }
}

/// Endpoint per provider family. Both Hugging Face credential kinds share one entry.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    pub deepseek: ProviderEndpoint,
    pub huggingface: ProviderEndpoint,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self {
            deepseek: ProviderEndpoint {
                base_url: DEEPSEEK_BASE_URL.to_string(),
                model: DEEPSEEK_DEFAULT_MODEL.to_string(),
                api_format: ApiFormat::ChatCompletions,
            },
            huggingface: ProviderEndpoint {
                base_url: HUGGINGFACE_BASE_URL.to_string(),
                model: HUGGINGFACE_DEFAULT_MODEL.to_string(),
                api_format: ApiFormat::ChatCompletions,
            },
        }
    }
}

impl EndpointRegistry {
    pub fn get(&self, family: ProviderFamily) -> &ProviderEndpoint {
        match family {
            ProviderFamily::DeepSeek => &self.deepseek,
            ProviderFamily::HuggingFace => &self.huggingface,
        }
    }

    /// Point every family at one URL. Used to aim the pipeline at a local stand-in.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.deepseek.base_url = base_url.to_string();
        self.huggingface.base_url = base_url.to_string();
        self
    }
}
