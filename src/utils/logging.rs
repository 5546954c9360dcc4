/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::models::Topic;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 日志写到 stderr，不干扰终端答题界面。重复调用时静默忽略
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - Kerala PSC JPA 模拟测试");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 生成后端: {:?} / 模型: {}", config.llm_provider, config.llm_model_name);
    info!("📁 任务文件: {}", config.tasks_file.display());
    if config.llm_api_key.is_none() {
        info!("⚠️ 未配置 API Key，模拟测试将无法生成题目");
    }
    info!("{}", "=".repeat(60));
}

/// 记录一次测试的成绩
pub fn log_quiz_result(topic: &Topic, score: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 测试完成: {}", topic);
    info!("📊 得分: {}/{}", score, total);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
