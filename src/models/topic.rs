use std::fmt::Display;

use crate::models::Category;

/// 测验主题
///
/// 不透明字符串（分类名、任务标题或固定标签），原样嵌入提示词
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// 仪表盘入口使用的综合主题
    pub const COMPREHENSIVE: &'static str = "Kerala General Knowledge";
    /// 每日练习入口使用的主题
    pub const DAILY_CHALLENGE: &'static str = "Daily General Challenge";

    /// 空白字符串返回 `None`
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn comprehensive() -> Self {
        Self(Self::COMPREHENSIVE.to_string())
    }

    pub fn daily_challenge() -> Self {
        Self(Self::DAILY_CHALLENGE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Category> for Topic {
    fn from(category: Category) -> Self {
        Self(category.label().to_string())
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
