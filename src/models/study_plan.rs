//! 静态学习计划
//!
//! 四周计划，首次启动且本地没有任务记录时展开为 `Task` 列表

use crate::models::{Category, Priority, Task};

/// 计划中的一项任务
#[derive(Debug, Clone, Copy)]
pub struct PlannedTask {
    pub category: Category,
    pub title: &'static str,
    pub description: Option<&'static str>,
    pub resource_link: Option<&'static str>,
}

/// 一周的计划
#[derive(Debug, Clone, Copy)]
pub struct StudyWeek {
    pub week: u32,
    pub title: &'static str,
    pub tasks: &'static [PlannedTask],
}

const fn task(
    category: Category,
    title: &'static str,
    description: Option<&'static str>,
    resource_link: &'static str,
) -> PlannedTask {
    PlannedTask {
        category,
        title,
        description,
        resource_link: Some(resource_link),
    }
}

pub const STUDY_PLAN: [StudyWeek; 4] = [
    StudyWeek {
        week: 1,
        title: "Strong Base + Polity Start",
        tasks: &[
            task(Category::GeneralKnowledge, "Kerala History", Some("Europeans arrival"), "https://www.youtube.com/results?search_query=kerala+history+european+arrival+psc"),
            task(Category::GeneralKnowledge, "Travancore Rulers", Some("Marthanda Varma to Sree Chithira Thirunal"), "https://www.youtube.com/results?search_query=travancore+history+marthanda+varma+psc"),
            task(Category::GeneralKnowledge, "Constitution Basics", Some("Preamble, Rights, DPSP"), "https://www.youtube.com/results?search_query=indian+constitution+basics+psc"),
            task(Category::Computer, "Hardware/Software Basics", Some("I/O devices, Memory"), "https://www.youtube.com/results?search_query=computer+hardware+software+basics+psc"),
            task(Category::Maths, "Numbers & Operations", Some("Basic series"), "https://www.youtube.com/results?search_query=psc+maths+number+series"),
            task(Category::English, "Parts of Speech", Some("Articles"), "https://www.youtube.com/results?search_query=psc+english+grammar+articles"),
            task(Category::Language, "Word Purity", Some("Sentence correctness"), "https://www.youtube.com/results?search_query=kerala+psc+malayalam+sentence+correction"),
        ],
    },
    StudyWeek {
        week: 2,
        title: "Geography + Kerala Governance",
        tasks: &[
            task(Category::GeneralKnowledge, "Physical Geography", Some("Earth structure, Atmosphere"), "https://www.youtube.com/results?search_query=physical+geography+for+psc"),
            task(Category::GeneralKnowledge, "Kerala Governance", Some("Civil service, Welfare schemes"), "https://www.youtube.com/results?search_query=kerala+governance+schemes+psc"),
            task(Category::Computer, "Internet Basics", Some("WWW, IP, URL, DNS"), "https://www.youtube.com/results?search_query=internet+basics+computer+psc"),
            task(Category::Maths, "Percentage basics", Some("Fractions & Decimals"), "https://www.youtube.com/results?search_query=percentage+problems+psc+maths"),
            task(Category::English, "Tenses & Prepositions", None, "https://www.youtube.com/results?search_query=psc+english+tenses+prepositions"),
        ],
    },
    StudyWeek {
        week: 3,
        title: "Indian History + Freedom Movement",
        tasks: &[
            task(Category::GeneralKnowledge, "British Rule & 1857 War", None, "https://www.youtube.com/results?search_query=indian+history+1857+revolt+psc"),
            task(Category::Computer, "MS Word Basics", Some("Formatting, Templates"), "https://www.youtube.com/results?search_query=ms+word+basics+for+psc+exam"),
            task(Category::Maths, "Ratio & Proportion", None, "https://www.youtube.com/results?search_query=ratio+and+proportion+psc+maths"),
            task(Category::English, "Active/Passive Voice", None, "https://www.youtube.com/results?search_query=active+passive+voice+psc+english"),
        ],
    },
    StudyWeek {
        week: 4,
        title: "Economics + Indian Polity Deep",
        tasks: &[
            task(Category::GeneralKnowledge, "Economic Planning", Some("NITI Aayog"), "https://www.youtube.com/results?search_query=niti+aayog+five+year+plans+psc"),
            task(Category::GeneralKnowledge, "Polity Amendments", Some("Important amendments"), "https://www.youtube.com/results?search_query=important+amendments+indian+constitution+psc"),
            task(Category::Computer, "MS Excel Start", Some("Formulas, Filtering"), "https://www.youtube.com/results?search_query=ms+excel+formulas+psc"),
            task(Category::Maths, "Profit & Loss", None, "https://www.youtube.com/results?search_query=profit+and+loss+psc+maths"),
        ],
    },
];

/// 每周前三项为高优先级
const HIGH_PRIORITY_PER_WEEK: usize = 3;

/// 把静态计划展开为初始任务列表（全部未完成）
pub fn initial_tasks() -> Vec<Task> {
    STUDY_PLAN
        .iter()
        .flat_map(|week| {
            week.tasks.iter().enumerate().map(move |(i, planned)| Task {
                id: format!("w{}-t{}", week.week, i),
                week: week.week,
                category: planned.category,
                title: planned.title.to_string(),
                description: planned.description.map(str::to_string),
                is_completed: false,
                priority: if i < HIGH_PRIORITY_PER_WEEK {
                    Priority::High
                } else {
                    Priority::Medium
                },
                resource_link: planned.resource_link.map(str::to_string),
            })
        })
        .collect()
}
