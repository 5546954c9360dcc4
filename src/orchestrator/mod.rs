//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 持有会话和界面状态，负责异步调度，不做具体业务判断。
//!
//! ## 模块划分
//!
//! ### `app` - 应用根状态
//! - 当前标签页、深色模式
//! - 任务列表与进度统计
//! - 当前打开的测试主题
//!
//! ### `quiz_view` - 测试视图
//! - 独占一个 `QuizSession`
//! - 在后台任务中调用 `QuizGenerator`
//! - 通过 watch 通道发布快照
//! - 关闭时中止在途任务并丢弃迟到结果
//!
//! ## 层次关系
//!
//! ```text
//! app (AppState: 标签页 / 任务 / 打开的测试)
//!     ↓
//! quiz_view (QuizView: 一个会话 + 后台生成)
//!     ↓
//! workflow (QuizSession 状态机 / QuizGenerator 流程)
//!     ↓
//! services (能力层：prompt / client / parser / store)
//! ```

pub mod app;
pub mod quiz_view;

// 重新导出主要类型
pub use app::{AppState, Tab};
pub use quiz_view::QuizView;
