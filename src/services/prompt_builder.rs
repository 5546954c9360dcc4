//! 提示词构建 - 业务能力层
//!
//! 只负责把主题变成一次生成请求，不发送请求、不解析结果

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::models::{Topic, OPTION_COUNT, QUESTIONS_PER_REQUEST};

/// 结构化输出的 MIME 类型
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// 一次生成请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    /// 用户指令
    pub contents: String,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub system_instruction: String,
    pub response_mime_type: String,
    /// 后端用于约束输出形状的 schema，仅作优化，结果仍需校验
    pub response_schema: JsonValue,
}

/// 提示词构建器
///
/// 对同一主题总是产生相同的请求
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    model: String,
}

impl PromptBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 构建生成请求
    pub fn build_request(&self, topic: &Topic) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            contents: user_instruction(topic),
            config: GenerationConfig {
                system_instruction: system_instruction(),
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

/// 系统指令：考官角色、考试范围、输出约定
fn system_instruction() -> String {
    format!(
        r#"You are a senior examiner who sets papers for the Kerala Public Service Commission (PSC) Junior Project Assistant examination.
Write accurate, exam-relevant multiple choice questions that follow previous PSC question patterns.

Output contract:
- Respond with a single JSON object and nothing else.
- The object has exactly one top-level field "questions", an array.
- Every item has the fields "question" (string), "options" (array of exactly {OPTION_COUNT} strings), "answerIndex" (integer from 0 to {max_index}, the position of the correct option) and "explanation" (a brief string).
- Vary the position of the correct option across questions."#,
        max_index = OPTION_COUNT - 1,
    )
}

/// 用户指令：原样嵌入主题
fn user_instruction(topic: &Topic) -> String {
    format!(
        r#"Generate {QUESTIONS_PER_REQUEST} high-quality multiple choice questions in English for the Kerala Junior Project Assistant competitive exam specifically on the topic: "{topic}".
Include {OPTION_COUNT} options, the correct answer index (0-{max_index}), and a brief explanation for each.
Focus on previous PSC exam patterns."#,
        topic = topic.as_str(),
        max_index = OPTION_COUNT - 1,
    )
}

/// 结构化输出 schema
///
/// 对象 → questions 数组 → 带类型字段的对象
pub fn response_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "minItems": OPTION_COUNT,
                            "maxItems": OPTION_COUNT
                        },
                        "answerIndex": {
                            "type": "INTEGER",
                            "minimum": 0,
                            "maximum": OPTION_COUNT - 1
                        },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["question", "options", "answerIndex", "explanation"]
                }
            }
        },
        "required": ["questions"]
    })
}
