use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// 凭证环境变量（按优先级）
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "ace_exam.toml";

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

/// 生成后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Gemini generateContent 原生接口
    Gemini,
    /// OpenAI 兼容的 chat completions 接口
    #[serde(alias = "openai-compatible")]
    OpenAi,
}

impl LlmProvider {
    /// 该后端的默认 API 地址
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Gemini => GEMINI_API_BASE_URL,
            LlmProvider::OpenAi => OPENAI_API_BASE_URL,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" | "openai-compatible" => Ok(LlmProvider::OpenAi),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_provider: LlmProvider,
    /// 为空表示未配置，生成时直接失败
    pub llm_api_key: Option<String>,
    /// 未设置时使用后端默认地址
    pub llm_api_base_url: Option<String>,
    pub llm_model_name: String,
    /// 单次生成请求的超时（秒）
    pub request_timeout_secs: u64,
    // --- 本地存储 ---
    pub tasks_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::Gemini,
            llm_api_key: None,
            llm_api_base_url: None,
            llm_model_name: "gemini-3-flash-preview".to_string(),
            request_timeout_secs: 30,
            tasks_file: PathBuf::from("ace_exam_jpa_tasks.json"),
            verbose_logging: false,
        }
    }
}

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    llm_provider: Option<LlmProvider>,
    llm_api_key: Option<String>,
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    request_timeout_secs: Option<u64>,
    tasks_file: Option<PathBuf>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 只从环境变量加载
    pub fn from_env() -> Self {
        Self::default().with_lookup(|name| std::env::var(name).ok())
    }

    /// 加载配置：默认值 ← 配置文件（若存在）← 环境变量
    ///
    /// 配置文件路径取 `ACE_EXAM_CONFIG`，未设置时为 `ace_exam.toml`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ACE_EXAM_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let base = if path.exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };

        Ok(base.with_lookup(|name| std::env::var(name).ok()))
    }

    /// 从 TOML 文件加载（未出现的字段取默认值）
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            llm_provider: file.llm_provider.unwrap_or(default.llm_provider),
            llm_api_key: normalize_key(file.llm_api_key),
            llm_api_base_url: file.llm_api_base_url.or(default.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(default.llm_model_name),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            tasks_file: file.tasks_file.unwrap_or(default.tasks_file),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    /// 用 `lookup` 提供的变量覆盖当前配置；无法解析的值保留原值
    pub fn with_lookup<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| normalize_key(lookup(name)))
            .or(self.llm_api_key);

        Self {
            llm_provider: parse_var(&lookup, "LLM_PROVIDER").unwrap_or(self.llm_provider),
            llm_api_key: api_key,
            llm_api_base_url: lookup("LLM_API_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .or(self.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(self.llm_model_name),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(self.request_timeout_secs),
            tasks_file: lookup("TASKS_FILE")
                .map(PathBuf::from)
                .unwrap_or(self.tasks_file),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }

    /// 实际使用的 API 地址
    pub fn api_base_url(&self) -> &str {
        self.llm_api_base_url
            .as_deref()
            .unwrap_or_else(|| self.llm_provider.default_base_url())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 空白凭证视为未配置
fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("环境变量 {} 的值 '{}' 无法解析，使用默认值", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::default().with_lookup(lookup_from(&[]));
        assert_eq!(config.llm_provider, LlmProvider::Gemini);
        assert!(config.llm_api_key.is_none());
        assert_eq!(config.llm_model_name, "gemini-3-flash-preview");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.api_base_url(), GEMINI_API_BASE_URL);
    }

    #[test]
    fn test_api_key_priority_and_blank_key() {
        let config = Config::default().with_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "   "),
            ("API_KEY", "secret"),
        ]));
        assert_eq!(config.llm_api_key.as_deref(), Some("secret"));

        let config = Config::default().with_lookup(lookup_from(&[("API_KEY", "")]));
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::default().with_lookup(lookup_from(&[
            ("REQUEST_TIMEOUT_SECS", "soon"),
            ("VERBOSE_LOGGING", "yes please"),
            ("LLM_PROVIDER", "skynet"),
        ]));
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.verbose_logging);
        assert_eq!(config.llm_provider, LlmProvider::Gemini);
    }

    #[test]
    fn test_openai_provider_uses_openai_base_url() {
        let config = Config::default().with_lookup(lookup_from(&[("LLM_PROVIDER", "openai")]));
        assert_eq!(config.llm_provider, LlmProvider::OpenAi);
        assert_eq!(config.api_base_url(), OPENAI_API_BASE_URL);
    }

    #[test]
    fn test_toml_then_env_override() {
        let config = Config::from_toml_str(
            r#"
            llm_provider = "openai"
            llm_model_name = "gpt-4o-mini"
            request_timeout_secs = 10
            "#,
        )
        .unwrap()
        .with_lookup(lookup_from(&[("LLM_MODEL_NAME", "gpt-4o")]));

        assert_eq!(config.llm_provider, LlmProvider::OpenAi);
        assert_eq!(config.llm_model_name, "gpt-4o");
        assert_eq!(config.request_timeout_secs, 10);
    }
}
