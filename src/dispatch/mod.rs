pub mod http;
pub mod registry;

use std::time::Duration;

/// Sampling temperature for code generation.
pub const TEMPERATURE: f64 = 0.7;

/// Nucleus sampling threshold.
pub const TOP_P: f64 = 0.95;

/// Everything the invoker sends to a provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
    pub top_p: f64,
    /// Bound on the whole call, headers and body included.
    pub timeout: Duration,
}

/// Generated text extracted from the provider envelope.
#[derive(Debug)]
pub struct ProviderResult {
    pub text: String,
    pub model: String,
    pub provider: String,
    pub latency_ms: u64,
}
