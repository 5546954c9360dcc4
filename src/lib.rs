//! # Ace Exam
//!
//! Kerala PSC Junior Project Assistant 备考工具：静态学习计划、任务进度，
//! 以及按主题由生成式 AI 出题的模拟测试
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - Topic / Question / QuestionSet / Task / 学习计划 / 分值分布
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个模块一种能力
//! - `PromptBuilder` - 主题 → 生成请求
//! - `GenerationClient` - 单次后端调用与错误归类（Gemini / OpenAI 兼容）
//! - `response_parser` - 原始文本 → 校验过的 QuestionSet
//! - `error_policy` - 失败原因 → 用户可见提示
//! - `TaskStore` / `progress` - 本地任务文件与进度统计
//!
//! ### ③ 流程层（Workflow）
//! - `QuizGenerator` - 流程编排（prompt → client → parser）
//! - `QuizSession` - 答题会话状态机
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/quiz_view` - 持有会话，后台生成，丢弃过期结果
//! - `orchestrator/app` - 应用根状态
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ErrorCause, GenerationError};
pub use models::{Question, QuestionSet, Topic};
pub use orchestrator::{AppState, QuizView, Tab};
pub use workflow::{Phase, QuizGenerator, QuizSession, Transition};
