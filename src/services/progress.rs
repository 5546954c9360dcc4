//! 学习进度统计 - 业务能力层

use crate::models::{Category, Task, MARK_DISTRIBUTION};

/// 单个分类的进度
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub category: Category,
    /// 该分类在考试中的分值
    pub marks: u32,
    pub color: &'static str,
    pub total: usize,
    pub completed: usize,
    /// 完成百分比 (0-100)
    pub progress: f64,
}

fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

/// 总体完成百分比，没有任务时为 0
pub fn overall_progress(tasks: &[Task]) -> f64 {
    let completed = tasks.iter().filter(|t| t.is_completed).count();
    percentage(completed, tasks.len())
}

/// 按分值分布统计各分类进度
pub fn stats_by_category(tasks: &[Task]) -> Vec<CategoryStats> {
    MARK_DISTRIBUTION
        .iter()
        .map(|share| {
            let (total, completed) = tasks
                .iter()
                .filter(|t| t.category == share.category)
                .fold((0, 0), |(total, completed), t| {
                    (total + 1, completed + usize::from(t.is_completed))
                });
            CategoryStats {
                category: share.category,
                marks: share.marks,
                color: share.color,
                total,
                completed,
                progress: percentage(completed, total),
            }
        })
        .collect()
}
