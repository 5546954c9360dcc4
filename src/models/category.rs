use serde::{Deserialize, Serialize};

/// 考试科目分类
///
/// 序列化为完整的展示名称，与本地任务文件保持一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Computer Application")]
    Computer,
    #[serde(rename = "Current Affairs")]
    CurrentAffairs,
    #[serde(rename = "Maths & Mental Ability")]
    Maths,
    #[serde(rename = "English")]
    English,
    #[serde(rename = "Regional Language")]
    Language,
    #[serde(rename = "General Knowledge")]
    GeneralKnowledge,
    #[serde(rename = "Mock Test")]
    MockTest,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Computer,
        Category::CurrentAffairs,
        Category::Maths,
        Category::English,
        Category::Language,
        Category::GeneralKnowledge,
        Category::MockTest,
    ];

    /// 展示名称
    pub fn label(self) -> &'static str {
        match self {
            Category::Computer => "Computer Application",
            Category::CurrentAffairs => "Current Affairs",
            Category::Maths => "Maths & Mental Ability",
            Category::English => "English",
            Category::Language => "Regional Language",
            Category::GeneralKnowledge => "General Knowledge",
            Category::MockTest => "Mock Test",
        }
    }

    /// 按展示名称精确查找
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 单个科目的分值占比
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkShare {
    pub category: Category,
    pub marks: u32,
    /// 展示用颜色
    pub color: &'static str,
}

/// 考试分值分布（共 100 分）
pub const MARK_DISTRIBUTION: [MarkShare; 6] = [
    MarkShare { category: Category::GeneralKnowledge, marks: 40, color: "#6366f1" },
    MarkShare { category: Category::Computer, marks: 20, color: "#f59e0b" },
    MarkShare { category: Category::CurrentAffairs, marks: 10, color: "#ef4444" },
    MarkShare { category: Category::Maths, marks: 10, color: "#10b981" },
    MarkShare { category: Category::English, marks: 10, color: "#8b5cf6" },
    MarkShare { category: Category::Language, marks: 10, color: "#ec4899" },
];
