use std::path::PathBuf;

use thiserror::Error;

/// 生成失败的原因分类
///
/// 每个原因都对应一条面向用户的提示（见 `services::error_policy`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCause {
    /// 未配置凭证，或凭证被服务端拒绝（401/403）
    MissingCredential,
    /// 服务端返回了空内容
    EmptyResponse,
    /// 返回内容无法解析为题目集合
    MalformedPayload,
    /// 请求频率限制（429）
    RateLimited,
    /// 服务端过载或内部错误（5xx）
    ServerOverloaded,
    /// 网络不可达、超时、其他非 2xx 状态
    TransportFailure,
    /// 其他无法归类的错误
    Unknown,
}

impl ErrorCause {
    /// 稳定的机器可读名称（用于日志）
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCause::MissingCredential => "missing_credential",
            ErrorCause::EmptyResponse => "empty_response",
            ErrorCause::MalformedPayload => "malformed_payload",
            ErrorCause::RateLimited => "rate_limited",
            ErrorCause::ServerOverloaded => "server_overloaded",
            ErrorCause::TransportFailure => "transport_failure",
            ErrorCause::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 题目生成错误
///
/// 从提示词构建、生成调用、响应解析任一环节产生，在会话边界被转换为 `Failed` 阶段
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{cause}: {message}")]
pub struct GenerationError {
    pub cause: ErrorCause,
    pub message: String,
}

impl GenerationError {
    pub fn new(cause: ErrorCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
        }
    }

    /// 未配置凭证
    pub fn missing_credential(var_names: &[&str]) -> Self {
        Self::new(
            ErrorCause::MissingCredential,
            format!("no API key configured (set {})", var_names.join(" or ")),
        )
    }

    /// 凭证被拒绝
    pub fn credential_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCause::MissingCredential,
            format!("credential rejected by backend ({}): {}", status, message.into()),
        )
    }

    pub fn empty_response(model: &str) -> Self {
        Self::new(
            ErrorCause::EmptyResponse,
            format!("model {} returned no text", model),
        )
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCause::MalformedPayload, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCause::RateLimited, message)
    }

    pub fn server_overloaded(status: u16, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCause::ServerOverloaded,
            format!("backend error {}: {}", status, message.into()),
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCause::TransportFailure, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCause::Unknown, message)
    }
}

/// 本地任务存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("读取任务文件失败 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("写入任务文件失败 ({path}): {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("删除任务文件失败 ({path}): {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("任务文件格式错误 ({path}): {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("任务序列化失败: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_display_includes_cause() {
        let err = GenerationError::rate_limited("slow down");
        assert_eq!(err.to_string(), "rate_limited: slow down");
    }

    #[test]
    fn test_missing_credential_names_env_vars() {
        let err = GenerationError::missing_credential(&["GEMINI_API_KEY", "API_KEY"]);
        assert_eq!(err.cause, ErrorCause::MissingCredential);
        assert!(err.message.contains("GEMINI_API_KEY or API_KEY"));
    }

    #[test]
    fn test_app_error_from_generation_error() {
        let app_err: AppError = GenerationError::unknown("boom").into();
        assert!(matches!(app_err, AppError::Generation(_)));
    }
}
