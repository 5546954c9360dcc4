//! 响应解析与修复 - 业务能力层
//!
//! 把生成后端返回的原始文本变成合法的 `QuestionSet`，任何问题都整批丢弃

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Number, Value as JsonValue};
use tracing::debug;

use crate::error::GenerationError;
use crate::models::{Question, QuestionSet};
use crate::utils::logging::truncate_text;

/// 后端返回的单道题（线上格式）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    question: String,
    options: Vec<String>,
    answer_index: Number,
    explanation: String,
}

/// 解析原始文本
///
/// 1. 先按原文解析 JSON，字符串里出现 ``` 也不受影响
/// 2. 失败后再去掉 markdown 代码块包裹重试
/// 3. 要求顶层 `questions` 为数组，逐题校验字段与不变式
pub fn parse(raw_text: &str) -> Result<QuestionSet, GenerationError> {
    let trimmed = raw_text.trim();

    let value: JsonValue = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(strip_code_fence(trimmed)).map_err(|e| {
            debug!("无法解析为 JSON: {}", truncate_text(raw_text, 120));
            GenerationError::malformed(format!("response is not valid JSON: {}", e))
        })?,
    };

    let items = value
        .get("questions")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| GenerationError::malformed("response has no \"questions\" array"))?;

    let questions = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_question(i, item))
        .collect::<Result<Vec<_>, _>>()?;

    QuestionSet::new(questions)
        .ok_or_else(|| GenerationError::malformed("response contains no questions"))
}

fn parse_question(index: usize, item: &JsonValue) -> Result<Question, GenerationError> {
    let position = index + 1;

    let raw = RawQuestion::deserialize(item).map_err(|e| {
        GenerationError::malformed(format!("question {} is malformed: {}", position, e))
    })?;

    let answer_index = answer_index(&raw.answer_index).ok_or_else(|| {
        GenerationError::malformed(format!(
            "question {} has invalid answerIndex {}",
            position, raw.answer_index
        ))
    })?;

    Question::new(raw.question, raw.options, answer_index, raw.explanation).map_err(|e| {
        GenerationError::malformed(format!("question {} is invalid: {}", position, e))
    })
}

/// 后端可能把整数写成 `2.0`
fn answer_index(number: &Number) -> Option<usize> {
    if let Some(n) = number.as_u64() {
        return usize::try_from(n).ok();
    }
    let f = number.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}

/// 整段回复就是一个代码块；贪婪匹配到最后一个 ```
fn wrapped_fence_regex() -> Option<&'static Regex> {
    static WRAPPED: OnceLock<Option<Regex>> = OnceLock::new();
    WRAPPED
        .get_or_init(|| Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*)```\s*\z").ok())
        .as_ref()
}

/// 代码块前后夹着说明文字
fn embedded_fence_regex() -> Option<&'static Regex> {
    static EMBEDDED: OnceLock<Option<Regex>> = OnceLock::new();
    EMBEDDED
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n```").ok())
        .as_ref()
}

fn fenced_body<'a>(re: Option<&Regex>, text: &'a str) -> Option<&'a str> {
    re?.captures(text)?.get(1).map(|inner| inner.as_str().trim())
}

/// 去掉 ```json ... ``` 包裹；没有代码块时原样返回（去首尾空白）
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.contains("```") {
        return trimmed;
    }

    fenced_body(wrapped_fence_regex(), trimmed)
        .or_else(|| fenced_body(embedded_fence_regex(), trimmed))
        .unwrap_or(trimmed)
}
