use super::envelope::RpcRequest;
use super::ToolError;
use serde_json::Value;
use std::time::Duration;

const ENDPOINT_PATH: &str = "mcp";

/// Bearer-authenticated JSON POST transport against `<base_url>/mcp`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    auth_token: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str, auth_token: &str, timeout: Duration) -> Result<Self, ToolError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ToolError::Configuration(
                "tool endpoint url must be non-empty".to_string(),
            ));
        }
        if auth_token.trim().is_empty() {
            return Err(ToolError::Configuration(
                "tool endpoint token must be non-empty".to_string(),
            ));
        }
        Ok(Self {
            endpoint: format!("{base_url}/{ENDPOINT_PATH}"),
            auth_token: auth_token.to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn post(&self, request: &RpcRequest) -> Result<Value, ToolError> {
        let body = serde_json::to_string(request)
            .map_err(|err| ToolError::Transport(format!("failed to encode request: {err}")))?;
        let response = match self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.auth_token))
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(response) => response,
            // Error statuses may still carry a JSON-RPC error envelope.
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => {
                return Err(ToolError::Transport(format!(
                    "request to {} failed: {err}",
                    self.endpoint
                )))
            }
        };
        let text = response
            .into_string()
            .map_err(|err| ToolError::Transport(format!("failed to read response body: {err}")))?;
        serde_json::from_str(&text).map_err(|_| {
            ToolError::Transport(format!("non-JSON response from tool server: {text}"))
        })
    }
}
