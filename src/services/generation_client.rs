//! 结构化生成客户端 - 业务能力层
//!
//! 只负责"调用一次生成后端"能力：
//! - 调用前检查凭证，缺失时不发出任何请求
//! - 每次调用恰好一次网络请求，不做重试（重试由会话决定）
//! - 把传输层错误归类为 `GenerationError`
//!
//! ## 后端
//! - `GeminiTransport`：Gemini generateContent 原生接口（reqwest）
//! - `OpenAiTransport`：OpenAI 兼容接口（async-openai）

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, LlmProvider, API_KEY_VARS};
use crate::error::GenerationError;
use crate::services::gemini_transport::GeminiTransport;
use crate::services::openai_transport::OpenAiTransport;
use crate::services::prompt_builder::GenerationRequest;

/// 传输层错误（尚未归类）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// 后端返回非 2xx 状态
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// 传输层超时
    #[error("request timed out")]
    Timeout,
    /// 网络不可达、连接中断等
    #[error("network error: {0}")]
    Network(String),
    /// 响应外层结构无法读取
    #[error("unreadable response body: {0}")]
    InvalidBody(String),
    /// 请求无法构建
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// 生成后端传输
///
/// 成功时返回后端给出的文本；`None` 表示响应里没有文本
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn send(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, TransportError>;
}

/// 生成客户端
pub struct GenerationClient {
    transport: Arc<dyn GenerationTransport>,
    credential: Option<String>,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(
        transport: Arc<dyn GenerationTransport>,
        credential: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            credential,
            timeout,
        }
    }

    /// 按配置选择后端
    pub fn from_config(config: &Config) -> Self {
        let transport: Arc<dyn GenerationTransport> = match config.llm_provider {
            LlmProvider::Gemini => Arc::new(GeminiTransport::new(config.api_base_url())),
            LlmProvider::OpenAi => Arc::new(OpenAiTransport::new(config.api_base_url())),
        };
        Self::new(
            transport,
            config.llm_api_key.clone(),
            config.request_timeout(),
        )
    }

    /// 发送一次生成请求，返回原始文本
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let credential = self
            .credential
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                warn!("未配置 API Key，跳过生成请求");
                GenerationError::missing_credential(&API_KEY_VARS)
            })?;

        debug!(
            "调用生成后端，模型: {}，指令长度: {} 字符",
            request.model,
            request.contents.len()
        );

        let outcome = tokio::time::timeout(self.timeout, self.transport.send(credential, request)).await;

        let text = match outcome {
            Err(_) => {
                warn!("生成请求超时 ({:?})", self.timeout);
                return Err(GenerationError::transport(format!(
                    "request timed out after {:?}",
                    self.timeout
                )));
            }
            Ok(Err(e)) => {
                warn!("生成后端调用失败: {}", e);
                return Err(classify(e));
            }
            Ok(Ok(text)) => text,
        };

        match text {
            Some(text) if !text.trim().is_empty() => {
                debug!("生成后端调用成功，响应长度: {} 字符", text.len());
                Ok(text)
            }
            _ => {
                warn!("生成后端返回内容为空 (模型: {})", request.model);
                Err(GenerationError::empty_response(&request.model))
            }
        }
    }
}

/// 传输错误归类
///
/// - 401/403 → 凭证失败
/// - 429 → 频率限制
/// - 5xx → 服务过载
/// - 其他 → 传输失败
pub fn classify(error: TransportError) -> GenerationError {
    match error {
        TransportError::Status {
            status: status @ (401 | 403),
            message,
        } => GenerationError::credential_rejected(status, message),
        TransportError::Status { status: 429, message } => GenerationError::rate_limited(message),
        TransportError::Status { status, message } if (500..=599).contains(&status) => {
            GenerationError::server_overloaded(status, message)
        }
        TransportError::Status { status, message } => {
            GenerationError::transport(format!("HTTP {}: {}", status, message))
        }
        TransportError::Timeout => GenerationError::transport("request timed out"),
        TransportError::Network(message) => GenerationError::transport(message),
        TransportError::InvalidBody(message) => GenerationError::malformed(message),
        TransportError::InvalidRequest(message) => GenerationError::unknown(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCause;
    use crate::models::Topic;
    use crate::services::prompt_builder::PromptBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 固定返回同一结果并记录调用次数
    struct FixedTransport {
        result: Result<Option<String>, TransportError>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FixedTransport {
        fn new(result: Result<Option<String>, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenerationTransport for FixedTransport {
        async fn send(
            &self,
            _credential: &str,
            _request: &GenerationRequest,
        ) -> Result<Option<String>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result.clone()
        }
    }

    fn request() -> GenerationRequest {
        PromptBuilder::new("test-model").build_request(&Topic::new("English").unwrap())
    }

    fn client(transport: Arc<FixedTransport>, key: Option<&str>) -> GenerationClient {
        GenerationClient::new(transport, key.map(str::to_string), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        for key in [None, Some(""), Some("   ")] {
            let transport = FixedTransport::new(Ok(Some("{}".to_string())));
            let err = client(transport.clone(), key).generate(&request()).await.unwrap_err();
            assert_eq!(err.cause, ErrorCause::MissingCredential);
            assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_success_returns_text_with_one_call() {
        let transport = FixedTransport::new(Ok(Some("{\"questions\":[]}".to_string())));
        let text = client(transport.clone(), Some("key")).generate(&request()).await.unwrap();
        assert_eq!(text, "{\"questions\":[]}");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_payload() {
        for result in [Ok(None), Ok(Some(String::new())), Ok(Some("  \n".to_string()))] {
            let transport = FixedTransport::new(result);
            let err = client(transport, Some("key")).generate(&request()).await.unwrap_err();
            assert_eq!(err.cause, ErrorCause::EmptyResponse);
        }
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let transport = Arc::new(FixedTransport {
            result: Ok(Some("late".to_string())),
            delay: Some(Duration::from_millis(200)),
            calls: AtomicUsize::new(0),
        });
        let client = GenerationClient::new(transport, Some("key".to_string()), Duration::from_millis(20));
        let err = client.generate(&request()).await.unwrap_err();
        assert_eq!(err.cause, ErrorCause::TransportFailure);
        assert!(err.message.contains("timed out"));
    }

    #[test]
    fn test_classify_status_codes() {
        let status = |code: u16| TransportError::Status {
            status: code,
            message: "boom".to_string(),
        };
        assert_eq!(classify(status(403)).cause, ErrorCause::MissingCredential);
        assert_eq!(classify(status(401)).cause, ErrorCause::MissingCredential);
        assert_eq!(classify(status(429)).cause, ErrorCause::RateLimited);
        assert_eq!(classify(status(500)).cause, ErrorCause::ServerOverloaded);
        assert_eq!(classify(status(503)).cause, ErrorCause::ServerOverloaded);
        assert_eq!(classify(status(404)).cause, ErrorCause::TransportFailure);
        assert_eq!(classify(status(400)).cause, ErrorCause::TransportFailure);
    }

    #[test]
    fn test_classify_other_errors() {
        let err = classify(TransportError::Network("connection refused".to_string()));
        assert_eq!(err.cause, ErrorCause::TransportFailure);
        assert_eq!(err.message, "connection refused");

        assert_eq!(classify(TransportError::Timeout).cause, ErrorCause::TransportFailure);
        assert_eq!(
            classify(TransportError::InvalidBody("eof".to_string())).cause,
            ErrorCause::MalformedPayload
        );
        assert_eq!(
            classify(TransportError::InvalidRequest("bad".to_string())).cause,
            ErrorCause::Unknown
        );
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Status {
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 429: quota exceeded");
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert_eq!(
            TransportError::InvalidBody("eof".to_string()).to_string(),
            "unreadable response body: eof"
        );

        let boxed: Box<dyn std::error::Error> = Box::new(TransportError::Network("reset".to_string()));
        assert_eq!(boxed.to_string(), "network error: reset");
    }
}
