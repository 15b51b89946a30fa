//! Client for the remote tool-serving endpoint.
//!
//! Every operation funnels through [`ToolClient::execute`], which either posts a
//! JSON-RPC envelope over HTTP or replays a recorded fixture.

pub mod envelope;
pub mod fixtures;
pub mod transport;

use crate::config::{Settings, ToolMode};
use envelope::{first_content_text, response_error, RpcRequest};
use fixtures::{simulation_key, FixtureSet};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::Duration;
use transport::HttpTransport;

pub const DEFAULT_PROTOCOL_VERSION: &str = "1.0";
pub const TOOLS_LIST_METHOD: &str = "tools/list";
pub const TOOLS_CALL_METHOD: &str = "tools/call";
pub const INITIALIZE_METHOD: &str = "initialize";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool client configuration error: {0}")]
    Configuration(String),
    #[error("tool transport error: {0}")]
    Transport(String),
    #[error("tool protocol error: {0}")]
    Protocol(String),
    #[error("no simulation fixture for method `{method}` with params key `{key}`")]
    FixtureNotFound { method: String, key: String },
    #[error("missing required tools: {}", missing.join(", "))]
    MissingCapability { missing: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self::new("relaycrew", env!("CARGO_PKG_VERSION"))
    }
}

/// Tool descriptor as listed by the endpoint; schema fields are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub schema: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub method: String,
    pub payload: Value,
}

impl ToolResponse {
    pub fn result(&self) -> Result<&Value, ToolError> {
        self.payload.get("result").ok_or_else(|| {
            ToolError::Protocol(format!("no result field present in response: {}", self.payload))
        })
    }

    pub fn into_result(self) -> Result<Value, ToolError> {
        match self.payload {
            Value::Object(mut map) if map.contains_key("result") => {
                Ok(map.remove("result").unwrap_or(Value::Null))
            }
            payload => Err(ToolError::Protocol(format!(
                "no result field present in response: {payload}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Real(HttpTransport),
    Simulation(FixtureSet),
}

#[derive(Debug, Clone)]
pub struct ToolClient {
    backend: Backend,
}

/// What the orchestration engine needs from a tool client.
pub trait ToolInvoker {
    fn call_tool_text(&self, name: &str, arguments: &Map<String, Value>)
        -> Result<String, ToolError>;
}

impl ToolInvoker for ToolClient {
    fn call_tool_text(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        ToolClient::call_tool_text(self, name, arguments)
    }
}

impl ToolClient {
    pub fn real(base_url: &str, auth_token: &str, timeout: Duration) -> Result<Self, ToolError> {
        Ok(Self {
            backend: Backend::Real(HttpTransport::new(base_url, auth_token, timeout)?),
        })
    }

    /// Fails immediately when the fixture file is absent or unreadable.
    pub fn simulation(fixtures: Option<&Path>) -> Result<Self, ToolError> {
        let path = fixtures.filter(|path| path.exists()).ok_or_else(|| {
            ToolError::Configuration(
                "simulation mode requires a valid fixture file via RELAYCREW_TOOLS_FIXTURES"
                    .to_string(),
            )
        })?;
        Ok(Self {
            backend: Backend::Simulation(FixtureSet::from_path(path)?),
        })
    }

    pub fn from_fixture_set(fixtures: FixtureSet) -> Self {
        Self {
            backend: Backend::Simulation(fixtures),
        }
    }

    /// `Ok(None)` when no endpoint URL and token are configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, ToolError> {
        let tools = &settings.tools;
        if !tools.is_configured() {
            return Ok(None);
        }
        let client = match tools.mode {
            ToolMode::Real => Self::real(
                tools.url.as_deref().unwrap_or_default(),
                tools.token.as_deref().unwrap_or_default(),
                Duration::from_secs(tools.timeout_seconds),
            )?,
            ToolMode::Simulation => Self::simulation(settings.fixtures_path().as_deref())?,
        };
        Ok(Some(client))
    }

    pub fn mode(&self) -> ToolMode {
        match self.backend {
            Backend::Real(_) => ToolMode::Real,
            Backend::Simulation(_) => ToolMode::Simulation,
        }
    }

    pub fn initialize(&self, client_info: Option<ClientInfo>) -> Result<ToolResponse, ToolError> {
        let params = json!({
            "protocolVersion": DEFAULT_PROTOCOL_VERSION,
            "clientInfo": client_info.unwrap_or_default(),
        });
        self.execute(INITIALIZE_METHOD, Some(params))
    }

    pub fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        let result = self.execute(TOOLS_LIST_METHOD, None)?.into_result()?;
        let tools = result.get("tools").cloned().unwrap_or(Value::Array(Vec::new()));
        serde_json::from_value(tools)
            .map_err(|err| ToolError::Protocol(format!("malformed tools/list result: {err}")))
    }

    pub fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let params = json!({
            "name": name,
            "arguments": arguments,
        });
        self.execute(TOOLS_CALL_METHOD, Some(params))?.into_result()
    }

    /// Unwraps the first content entry: its text when text-typed, pretty JSON otherwise,
    /// empty when there is no content.
    pub fn call_tool_text(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        let result = self.call_tool(name, arguments)?;
        Ok(first_content_text(&result))
    }

    pub fn has_tool(&self, name: &str) -> Result<bool, ToolError> {
        Ok(self.list_tools()?.iter().any(|tool| tool.name == name))
    }

    pub fn require_tools<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ToolError> {
        let available = self
            .list_tools()?
            .into_iter()
            .map(|tool| tool.name)
            .collect::<std::collections::BTreeSet<_>>();
        let missing = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !available.contains(*name))
            .map(str::to_string)
            .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ToolError::MissingCapability { missing })
        }
    }

    pub fn create_workflow(
        &self,
        name: &str,
        nodes: Vec<Value>,
        connections: Map<String, Value>,
        settings: Option<Map<String, Value>>,
    ) -> Result<Value, ToolError> {
        let mut args = Map::new();
        args.insert("name".to_string(), Value::String(name.to_string()));
        args.insert("nodes".to_string(), Value::Array(nodes));
        args.insert("connections".to_string(), Value::Object(connections));
        if let Some(settings) = settings.filter(|s| !s.is_empty()) {
            args.insert("settings".to_string(), Value::Object(settings));
        }
        self.call_tool("n8n_create_workflow", &args)
    }

    pub fn get_workflow(&self, workflow_id: &str) -> Result<Value, ToolError> {
        self.call_tool("n8n_get_workflow", &id_argument(workflow_id))
    }

    pub fn get_workflow_details(&self, workflow_id: &str) -> Result<Value, ToolError> {
        self.call_tool("n8n_get_workflow_details", &id_argument(workflow_id))
    }

    pub fn update_partial_workflow(
        &self,
        workflow_id: &str,
        operations: Vec<Value>,
        validate_only: bool,
    ) -> Result<Value, ToolError> {
        let mut args = id_argument(workflow_id);
        args.insert("operations".to_string(), Value::Array(operations));
        args.insert("validateOnly".to_string(), Value::Bool(validate_only));
        self.call_tool("n8n_update_partial_workflow", &args)
    }

    /// Single seam for every remote call.
    pub fn execute(&self, method: &str, params: Option<Value>) -> Result<ToolResponse, ToolError> {
        let payload = match &self.backend {
            Backend::Simulation(fixtures) => {
                let key = simulation_key(method, params.as_ref());
                fixtures
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| ToolError::FixtureNotFound {
                        method: method.to_string(),
                        key,
                    })?
            }
            Backend::Real(transport) => {
                let request = RpcRequest::new(method, params)?;
                transport.post(&request)?
            }
        };
        if let Some(error) = response_error(&payload) {
            return Err(ToolError::Protocol(error));
        }
        Ok(ToolResponse {
            method: method.to_string(),
            payload,
        })
    }
}

fn id_argument(workflow_id: &str) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("id".to_string(), Value::String(workflow_id.to_string()));
    args
}
