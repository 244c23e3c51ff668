use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use crate::config::Config;
use crate::pipeline::Generator;
use crate::response::{self, GenerationResponse};
use crate::tools::generate::GenerationRequest;
use crate::tools::listproviders::ListProvidersResponse;

#[derive(Clone)]
pub struct AppForgeServer {
    generator: Arc<Generator>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AppForgeServer {
    pub fn new(config: Config) -> Self {
        Self {
            generator: Arc::new(Generator::new(config)),
            tool_router: Self::tool_router(),
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    #[tool(
        name = "generate",
        description = "Generate a multi-file project from a natural-language app description. Returns JSON with `ok`, `files` [{name, content, language}], `generated_text` and `provider`, or `ok: false` with `errorType` and `message`.",
        annotations(read_only_hint = true)
    )]
    async fn generate(
        &self,
        Parameters(req): Parameters<GenerationRequest>,
    ) -> Result<CallToolResult, McpError> {
        req.validate()
            .map_err(|msg| McpError::invalid_params(msg, None))?;

        let response = GenerationResponse::from(self.generator.generate(&req).await);
        if !response.is_ok() {
            tracing::debug!(status = response.status(), "generate returned a failure payload");
        }
        Ok(response.into_call_tool_result())
    }

    #[tool(
        name = "listproviders",
        description = "List provider credentials in resolution order with whether each is configured and well-formed. Never returns secrets.",
        annotations(read_only_hint = true)
    )]
    async fn listproviders(&self) -> Result<CallToolResult, McpError> {
        let list = ListProvidersResponse::from(self.generator.config());
        Ok(response::to_call_tool_result(&list))
    }
}

#[tool_handler]
impl ServerHandler for AppForgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "appforge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "AppForge: turns an app description into a set of source files.\n\n\
                 1. Call `listproviders` to check which credential will be used.\n\
                 2. Call `generate` with `prompt` and optionally `technology`, `appType`, \
                    `features`, `modelId`, `maxLength`.\n\
                 3. On `ok: false`, `errorType` is one of authentication, rate_limit, timeout, unknown. \
                    Nothing is retried server-side."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
