//! 应用根状态 - 编排层
//!
//! 界面状态（当前标签页、深色模式、任务列表、打开的测试）集中在这里，
//! 由入口持有并向下传递

use tracing::{debug, info};

use crate::models::{Category, Task, Topic};
use crate::services::progress::{self, CategoryStats};

/// 标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    StudyPlan,
    DailyFocus,
    Syllabus,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::StudyPlan, Tab::DailyFocus, Tab::Syllabus];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::StudyPlan => "Study Plan",
            Tab::DailyFocus => "Daily Focus",
            Tab::Syllabus => "Syllabus",
        }
    }

    /// 该标签页的测试入口主题
    pub fn quiz_topic(self) -> Option<Topic> {
        match self {
            Tab::Dashboard => Some(Topic::comprehensive()),
            Tab::DailyFocus => Some(Topic::daily_challenge()),
            Tab::StudyPlan | Tab::Syllabus => None,
        }
    }
}

/// 应用根状态
#[derive(Debug, Clone, Default)]
pub struct AppState {
    tab: Tab,
    dark_mode: bool,
    tasks: Vec<Task>,
    active_quiz: Option<Topic>,
}

impl AppState {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        debug!("切换标签页: {:?} → {:?}", self.tab, tab);
        self.tab = tab;
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_for_week(&self, week: u32) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.week == week)
    }

    /// 切换任务完成状态，返回新状态；找不到该任务时返回 `None`
    pub fn toggle_task(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.toggle();
        debug!("任务 {} 完成状态: {}", task.id, task.is_completed);
        Some(task.is_completed)
    }

    /// 打开测试；已有测试时替换
    pub fn open_quiz(&mut self, topic: Topic) {
        info!("打开测试: {}", topic);
        self.active_quiz = Some(topic);
    }

    /// 按任务标题打开测试
    pub fn open_quiz_for_task(&mut self, id: &str) -> Option<&Topic> {
        let topic = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| Topic::new(t.title.as_str()))?;
        self.open_quiz(topic);
        self.active_quiz.as_ref()
    }

    pub fn open_quiz_for_category(&mut self, category: Category) {
        self.open_quiz(Topic::from(category));
    }

    pub fn close_quiz(&mut self) -> Option<Topic> {
        self.active_quiz.take()
    }

    pub fn active_quiz(&self) -> Option<&Topic> {
        self.active_quiz.as_ref()
    }

    pub fn overall_progress(&self) -> f64 {
        progress::overall_progress(&self.tasks)
    }

    pub fn category_stats(&self) -> Vec<CategoryStats> {
        progress::stats_by_category(&self.tasks)
    }
}
