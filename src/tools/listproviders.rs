use serde::Serialize;

use crate::config::Config;
use crate::credential::{self, CredentialKind};
use crate::dispatch::registry::ApiFormat;

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub credential: CredentialKind,
    pub provider: String,
    pub configured: bool,
    /// `None` when the credential is not configured.
    pub format_valid: Option<bool>,
    pub endpoint: String,
    pub default_model: String,
    pub api_format: ApiFormat,
}

#[derive(Debug, Serialize)]
pub struct ListProvidersResponse {
    /// Credential kinds in resolution priority order.
    pub providers: Vec<ProviderInfo>,
    /// The credential a generation request would use right now.
    pub active: Option<CredentialKind>,
}

impl From<&Config> for ListProvidersResponse {
    fn from(config: &Config) -> Self {
        let providers = CredentialKind::PRIORITY
            .iter()
            .map(|kind| {
                let secret = kind.lookup(&config.credentials);
                let endpoint = config.endpoints.get(kind.family());
                ProviderInfo {
                    credential: *kind,
                    provider: kind.family().to_string(),
                    configured: secret.is_some(),
                    format_valid: secret
                        .map(|s| credential::ProviderCredential::new(*kind, s).format_valid),
                    endpoint: endpoint.base_url.clone(),
                    default_model: endpoint.model.clone(),
                    api_format: endpoint.api_format,
                }
            })
            .collect();

        let active = credential::resolve(&config.credentials)
            .ok()
            .map(|c| c.kind);

        Self { providers, active }
    }
}
