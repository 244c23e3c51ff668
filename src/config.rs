use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::dispatch::registry::{ApiFormat, EndpointRegistry, ProviderEndpoint};

pub const DEEPSEEK_KEY_VAR: &str = "DEEPSEEK_API_KEY";
pub const HUGGINGFACE_TOKEN_VAR: &str = "HUGGINGFACE_TOKEN";
pub const HUGGINGFACE_KEY_VAR: &str = "HUGGINGFACE_API_KEY";

/// Env var naming an explicit TOML config file.
pub const CONFIG_PATH_VAR: &str = "APPFORGE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "appforge.toml";

/// Generation is slow; the bound is minutes, not seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 150;
pub const MIN_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 600;

pub const DEFAULT_MAX_TOKENS: u64 = 4000;

/// The three provider secrets, read once at startup and never mutated.
#[derive(Clone, Default)]
pub struct Credentials {
    pub deepseek_key: Option<String>,
    pub huggingface_token: Option<String>,
    pub huggingface_key: Option<String>,
}

impl Credentials {
    /// Build from an arbitrary variable lookup. Empty or whitespace-only values
    /// count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            deepseek_key: read(DEEPSEEK_KEY_VAR),
            huggingface_token: read(HUGGINGFACE_TOKEN_VAR),
            huggingface_key: read(HUGGINGFACE_KEY_VAR),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deepseek_key.is_none()
            && self.huggingface_token.is_none()
            && self.huggingface_key.is_none()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "[REDACTED]" } else { "unset" };
        f.debug_struct("Credentials")
            .field("deepseek_key", &mask(&self.deepseek_key))
            .field("huggingface_token", &mask(&self.huggingface_token))
            .field("huggingface_key", &mask(&self.huggingface_key))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Upper bound on the single provider call.
    pub timeout: Duration,
    /// Used when the request carries no `maxLength`.
    pub max_tokens: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoints: EndpointRegistry,
    pub generation: GenerationConfig,
}

// --- TOML overlay ---

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    providers: FileProviders,
    #[serde(default)]
    generation: FileGeneration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileProviders {
    deepseek: Option<FileEndpoint>,
    huggingface: Option<FileEndpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileEndpoint {
    base_url: Option<String>,
    model: Option<String>,
    api_format: Option<ApiFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileGeneration {
    timeout_secs: Option<u64>,
    max_tokens: Option<u64>,
}

impl FileEndpoint {
    fn apply(self, endpoint: &mut ProviderEndpoint) {
        if let Some(url) = self.base_url.filter(|u| !u.trim().is_empty()) {
            endpoint.base_url = url;
        }
        if let Some(model) = self.model.filter(|m| !m.trim().is_empty()) {
            endpoint.model = model;
        }
        if let Some(format) = self.api_format {
            endpoint.api_format = format;
        }
    }
}

impl Config {
    /// Credentials from the process environment, endpoints and limits at defaults.
    pub fn from_env() -> Self {
        let credentials = Credentials::from_lookup(|name| env::var(name).ok());

        if credentials.deepseek_key.is_none() {
            tracing::warn!("{DEEPSEEK_KEY_VAR} not set, deepseek unavailable");
        }
        if credentials.huggingface_token.is_none() && credentials.huggingface_key.is_none() {
            tracing::warn!(
                "{HUGGINGFACE_TOKEN_VAR} and {HUGGINGFACE_KEY_VAR} not set, huggingface unavailable"
            );
        }
        if credentials.is_empty() {
            tracing::error!("no provider credentials configured, every generation will fail");
        }

        Config {
            credentials,
            ..Default::default()
        }
    }

    /// Environment plus the optional TOML file. A broken file is logged and ignored
    /// so the server still starts with defaults.
    pub fn load() -> Self {
        let mut config = Self::from_env();
        let path = env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        if let Err(e) = config.apply_file(&path) {
            tracing::warn!("ignoring config file {}: {e}", path.display());
        }
        config
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), String> {
        if !path.exists() {
            return Ok(());
        }
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        self.apply_toml(&text).map_err(|e| e.to_string())?;
        tracing::info!("loaded config overrides from {}", path.display());
        Ok(())
    }

    /// Overlay endpoint and generation settings from TOML text. Secrets are only
    /// ever taken from the environment.
    pub fn apply_toml(&mut self, text: &str) -> Result<(), toml::de::Error> {
        let file: FileConfig = toml::from_str(text)?;

        if let Some(ep) = file.providers.deepseek {
            ep.apply(&mut self.endpoints.deepseek);
        }
        if let Some(ep) = file.providers.huggingface {
            ep.apply(&mut self.endpoints.huggingface);
        }
        if let Some(secs) = file.generation.timeout_secs {
            self.generation.timeout =
                Duration::from_secs(secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS));
        }
        if let Some(tokens) = file.generation.max_tokens.filter(|t| *t > 0) {
            self.generation.max_tokens = tokens;
        }
        Ok(())
    }
}
