use thiserror::Error;

/// 每道题的选项数量
pub const OPTION_COUNT: usize = 4;

/// 每次生成请求的题目数量
pub const QUESTIONS_PER_REQUEST: usize = 5;

/// 单选题
///
/// 不变式：题干非空、恰好 4 个选项、`correct_answer_index < 4`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_answer_index: usize,
    explanation: String,
}

/// 违反题目不变式
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuestion {
    #[error("question text is empty")]
    EmptyPrompt,
    #[error("expected 4 options, got {0}")]
    OptionCount(usize),
    #[error("answer index {0} is outside 0..4")]
    AnswerOutOfRange(usize),
}

impl Question {
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer_index: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, InvalidQuestion> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(InvalidQuestion::EmptyPrompt);
        }

        let count = options.len();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| InvalidQuestion::OptionCount(count))?;

        if correct_answer_index >= OPTION_COUNT {
            return Err(InvalidQuestion::AnswerOutOfRange(correct_answer_index));
        }

        Ok(Self {
            prompt,
            options,
            correct_answer_index,
            explanation: explanation.into(),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer_index(&self) -> usize {
        self.correct_answer_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer_index]
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_answer_index
    }
}

/// 一次生成得到的题目集合（非空，保持顺序）
///
/// 数量可能少于请求的 5 道，只要每道题都合法即可
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// 空列表返回 `None`
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            None
        } else {
            Some(Self { questions })
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}
