//! Gemini generateContent 传输 - 业务能力层
//!
//! `POST {base}/v1beta/models/{model}:generateContent`，凭证放在 `x-goog-api-key` 头

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::services::generation_client::{GenerationTransport, TransportError};
use crate::services::prompt_builder::GenerationRequest;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfigBody<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody<'a> {
    response_mime_type: &'a str,
    response_schema: &'a JsonValue,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Gemini 原生接口传输
pub struct GeminiTransport {
    http: Client,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn send(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, TransportError> {
        let body = GenerateContentBody {
            system_instruction: Content {
                role: None,
                parts: [Part {
                    text: &request.config.system_instruction,
                }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part {
                    text: &request.contents,
                }],
            }],
            generation_config: GenerationConfigBody {
                response_mime_type: &request.config.response_mime_type,
                response_schema: &request.config.response_schema,
            },
        };

        let url = self.endpoint(&request.model);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, credential)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: error_message(&text, status.canonical_reason()),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;

        Ok(first_candidate_text(parsed))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

/// 优先取 `{"error":{"message":...}}` 中的信息
fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| reason.unwrap_or("request failed").to_string())
}

/// 拼接第一个候选里的所有文本片段
fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
