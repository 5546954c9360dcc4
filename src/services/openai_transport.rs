//! OpenAI 兼容传输 - 业务能力层
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 调用 chat completions
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini OpenAI 端点, Doubao 等）
//!
//! 输出形状通过系统消息里的 schema 约束，结果仍由解析层校验

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::services::generation_client::{GenerationTransport, TransportError};
use crate::services::prompt_builder::GenerationRequest;

/// OpenAI 兼容接口传输
pub struct OpenAiTransport {
    base_url: String,
}

impl OpenAiTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn client(&self, credential: &str) -> Client<OpenAIConfig> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(credential)
            .with_api_base(&self.base_url);
        Client::with_config(openai_config)
    }
}

#[async_trait]
impl GenerationTransport for OpenAiTransport {
    async fn send(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, TransportError> {
        let system_message = format!(
            "{}\n\nThe JSON object must conform to this JSON Schema:\n{}",
            request.config.system_instruction,
            to_json_schema(&request.config.response_schema)
        );

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_message)
                    .build()
                    .map_err(invalid_request)?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.contents.as_str())
                    .build()
                    .map_err(invalid_request)?,
            ),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .build()
            .map_err(invalid_request)?;

        debug!("调用 chat completions: {}", self.base_url);

        let response = self
            .client(credential)
            .chat()
            .create(chat_request)
            .await
            .map_err(map_openai_error)?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

fn invalid_request(e: OpenAIError) -> TransportError {
    TransportError::InvalidRequest(e.to_string())
}

/// async-openai 不暴露 API 错误的状态码，按错误文本归类
fn map_openai_error(e: OpenAIError) -> TransportError {
    match e {
        OpenAIError::Reqwest(err) => {
            if err.is_timeout() {
                TransportError::Timeout
            } else if let Some(status) = err.status() {
                TransportError::Status {
                    status: status.as_u16(),
                    message: err.to_string(),
                }
            } else {
                TransportError::Network(err.to_string())
            }
        }
        OpenAIError::ApiError(api) => {
            let message = api.to_string();
            let lower = message.to_lowercase();
            let status = if lower.contains("rate limit") || lower.contains("quota") {
                429
            } else if lower.contains("api key")
                || lower.contains("unauthorized")
                || lower.contains("permission")
            {
                401
            } else if lower.contains("overloaded") || lower.contains("server error") {
                503
            } else {
                400
            };
            TransportError::Status { status, message }
        }
        err @ OpenAIError::JSONDeserialize(..) => TransportError::InvalidBody(err.to_string()),
        other => TransportError::Network(other.to_string()),
    }
}

/// Gemini 风格的大写类型名转成 JSON Schema 的小写
fn to_json_schema(schema: &JsonValue) -> JsonValue {
    match schema {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| match (key.as_str(), value) {
                    ("type", JsonValue::String(t)) => {
                        (key.clone(), JsonValue::String(t.to_lowercase()))
                    }
                    _ => (key.clone(), to_json_schema(value)),
                })
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(to_json_schema).collect()),
        other => other.clone(),
    }
}
