//! 测试题生成流程 - 流程层
//!
//! 流程顺序：
//! 1. 主题 → 生成请求（PromptBuilder）
//! 2. 一次后端调用（GenerationClient）
//! 3. 解析与校验（response_parser）
//!
//! 任一步失败都直接返回，不在这里重试

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::models::{QuestionSet, Topic};
use crate::services::response_parser;
use crate::services::{GenerationClient, PromptBuilder};
use crate::utils::logging::truncate_text;

/// 测试题生成器
///
/// - 不持有会话状态
/// - 每次 `generate` 恰好一次后端调用
pub struct QuizGenerator {
    builder: PromptBuilder,
    client: GenerationClient,
}

impl QuizGenerator {
    pub fn new(builder: PromptBuilder, client: GenerationClient) -> Self {
        Self { builder, client }
    }

    /// 按配置创建
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PromptBuilder::new(config.llm_model_name.clone()),
            GenerationClient::from_config(config),
        )
    }

    /// 为主题生成一组题目
    pub async fn generate(&self, topic: &Topic) -> Result<QuestionSet, GenerationError> {
        info!("📝 正在生成测试题: {}", topic);

        let request = self.builder.build_request(topic);
        let raw_text = self.client.generate(&request).await?;
        debug!("响应预览: {}", truncate_text(&raw_text, 200));

        match response_parser::parse(&raw_text) {
            Ok(set) => {
                info!("✓ 已生成 {} 道题: {}", set.len(), topic);
                Ok(set)
            }
            Err(e) => {
                warn!("⚠️ 响应无法解析 ({}): {}", topic, e);
                Err(e)
            }
        }
    }
}
