//! 错误展示策略 - 业务能力层
//!
//! 把内部失败原因映射为稳定的用户可见分类与补救提示。
//! 不会把传输层的原始错误信息带给用户

use crate::error::{ErrorCause, GenerationError};

/// 面向用户的错误展示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPresentation {
    /// 稳定的分类字符串
    pub category: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    /// 补救提示
    pub hint: &'static str,
    /// 重试是否可能有帮助
    pub retryable: bool,
}

/// 按原因映射
pub fn present_cause(cause: ErrorCause) -> ErrorPresentation {
    match cause {
        ErrorCause::MissingCredential => ErrorPresentation {
            category: "configure credential",
            title: "AI service not configured",
            message: "The AI service key is missing or was rejected.",
            hint: "Set GEMINI_API_KEY (or API_KEY) to a valid key and try again.",
            retryable: false,
        },
        ErrorCause::EmptyResponse => ErrorPresentation {
            category: "empty response",
            title: "No questions received",
            message: "The AI service answered without any questions.",
            hint: "Retry to generate a new set.",
            retryable: true,
        },
        ErrorCause::MalformedPayload => ErrorPresentation {
            category: "invalid questions",
            title: "Could not read the questions",
            message: "The AI service returned questions in an unexpected format.",
            hint: "Retry to generate a new set.",
            retryable: true,
        },
        ErrorCause::RateLimited => ErrorPresentation {
            category: "retry shortly",
            title: "Too many requests",
            message: "The AI service is limiting requests right now.",
            hint: "Wait a minute before retrying.",
            retryable: true,
        },
        ErrorCause::ServerOverloaded => ErrorPresentation {
            category: "service busy",
            title: "AI service unavailable",
            message: "The AI service is overloaded or temporarily down.",
            hint: "Try again in a few minutes.",
            retryable: true,
        },
        ErrorCause::TransportFailure => ErrorPresentation {
            category: "check connection",
            title: "Connection problem",
            message: "Failed to generate AI questions. Check your connection.",
            hint: "Make sure you are online, then retry.",
            retryable: true,
        },
        ErrorCause::Unknown => ErrorPresentation {
            category: "unexpected error",
            title: "Oops!",
            message: "Something went wrong while preparing your test.",
            hint: "Retry, or close the session and start again.",
            retryable: true,
        },
    }
}

pub fn present(error: &GenerationError) -> ErrorPresentation {
    present_cause(error.cause)
}
