pub mod category;
pub mod question;
pub mod study_plan;
pub mod task;
pub mod topic;

pub use category::{Category, MarkShare, MARK_DISTRIBUTION};
pub use question::{InvalidQuestion, Question, QuestionSet, OPTION_COUNT, QUESTIONS_PER_REQUEST};
pub use study_plan::{initial_tasks, PlannedTask, StudyWeek, STUDY_PLAN};
pub use task::{Priority, Task};
pub use topic::Topic;
