//! OpenAI-compatible chat completions backend

use crate::error::{OracleError, Result};
use crate::message::{AssistantReply, ChatMessage, ChatRequest, ToolCall, ToolSpec};
use crate::Oracle;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: model.into(),
            temperature: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

pub struct OpenAiOracle {
    config: OpenAiConfig,
    http_client: Client,
}

impl OpenAiOracle {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(OracleError::Config("model name is empty".to_string()));
        }

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OracleError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Wire body for a chat request
    pub fn request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": request.messages.iter().map(message_to_wire).collect::<Vec<_>>(),
        });

        if let Some(temperature) = self.config.temperature {
            body["temperature"] = json!(temperature);
        }
        if !request.tools.is_empty() {
            body["tools"] = json!(request.tools.iter().map(tool_to_wire).collect::<Vec<_>>());
        }

        body
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn chat(&self, request: &ChatRequest) -> Result<AssistantReply> {
        let mut http_request = self
            .http_client
            .post(self.endpoint())
            .json(&self.request_body(request));

        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Decode(e.to_string()))?;

        parse_response(&payload)
    }
}

fn message_to_wire(message: &ChatMessage) -> Value {
    let mut wire = json!({
        "role": message.role.as_str(),
        "content": message.content,
    });

    if let Some(name) = &message.name {
        wire["name"] = json!(sanitize_name(name));
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }
    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = json!(message
            .tool_calls
            .iter()
            .map(|call| json!({
                "id": call.id,
                "type": "function",
                "function": { "name": call.name, "arguments": call.arguments },
            }))
            .collect::<Vec<_>>());
    }

    wire
}

fn tool_to_wire(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        },
    })
}

/// The API only accepts `[a-zA-Z0-9_-]` in participant names
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Decode `choices[0].message` of a chat completion
pub fn parse_response(payload: &Value) -> Result<AssistantReply> {
    let message = payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| OracleError::Decode("response has no choices[0].message".to_string()))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string);

    let tool_calls = match message.get("tool_calls").and_then(Value::as_array) {
        Some(calls) => calls
            .iter()
            .map(parse_tool_call)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(AssistantReply {
        content,
        tool_calls,
    })
}

fn parse_tool_call(call: &Value) -> Result<ToolCall> {
    let id = call
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| OracleError::Decode("tool call without id".to_string()))?;
    let function = call
        .get("function")
        .ok_or_else(|| OracleError::Decode(format!("tool call {id} without function")))?;
    let name = function
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| OracleError::Decode(format!("tool call {id} without name")))?;
    let arguments = function
        .get("arguments")
        .and_then(Value::as_str)
        .unwrap_or("{}");

    Ok(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_text_reply() {
        let payload = json!({
            "choices": [{ "message": { "role": "assistant", "content": "[\"a.c\"]" } }]
        });
        let reply = parse_response(&payload).unwrap();
        assert_eq!(reply, AssistantReply::text("[\"a.c\"]"));
    }

    #[test]
    fn parses_tool_calls() {
        let payload = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "query_name", "arguments": "{\"name\":\"foo\"}" }
                    }]
                }
            }]
        });
        let reply = parse_response(&payload).unwrap();
        assert_eq!(reply.content, None);
        assert_eq!(
            reply.tool_calls,
            vec![ToolCall {
                id: "call_1".into(),
                name: "query_name".into(),
                arguments: "{\"name\":\"foo\"}".into(),
            }]
        );
    }

    #[test]
    fn missing_choices_is_decode_error() {
        let err = parse_response(&json!({ "error": "x" })).unwrap_err();
        assert!(matches!(err, OracleError::Decode(_)));
    }

    #[test]
    fn request_body_carries_tools_and_names() {
        let mut config = OpenAiConfig::new("gpt-4o");
        config.temperature = Some(0.0);
        let oracle = OpenAiOracle::new(config).unwrap();

        let request = ChatRequest::new(vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("check this").named("Init"),
            ChatMessage::assistant(None, vec![ToolCall::new("c1", "query_name", json!({"name": "f"}))]),
            ChatMessage::tool("c1", "int f(void);"),
        ])
        .with_tools(vec![ToolSpec {
            name: "query_name".into(),
            description: "Query function/macro/type definition".into(),
            parameters: json!({"type": "object"}),
        }]);

        let body = oracle.request_body(&request);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][1]["name"], "Init");
        assert_eq!(body["messages"][2]["tool_calls"][0]["function"]["name"], "query_name");
        assert_eq!(body["messages"][3]["tool_call_id"], "c1");
        assert_eq!(body["tools"][0]["function"]["name"], "query_name");
    }

    #[test]
    fn rejects_empty_model() {
        assert!(OpenAiOracle::new(OpenAiConfig::new(" ")).is_err());
    }
}
