//! 答题会话状态机 - 流程层
//!
//! 纯同步状态机，不发起任何调用：
//! - `begin_generation` / `retry` 发出生成票据，进入 Loading
//! - 生成结果通过 `apply_generation` 回填，票据过期的结果直接丢弃
//!
//! 阶段流转：Loading → Ready ⇄ AnswerRevealed → Finished，
//! 生成失败进入 Failed，Finished / Failed 可以 retry 回到 Loading

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::error::GenerationError;
use crate::models::{Question, QuestionSet, Topic, OPTION_COUNT};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 等待生成结果
    Loading,
    /// 当前题目等待作答
    Ready,
    /// 当前题目已作答，显示正确答案与解析
    AnswerRevealed,
    Finished,
    Failed,
}

/// 一次状态迁移调用的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// 当前阶段不允许该操作，状态未改变
    Ignored,
    /// 生成结果已过期（会话已关闭或已重新发起），被丢弃
    Stale,
}

/// 生成票据
///
/// 只有与会话当前 epoch 相同的票据才能回填结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    session_id: u64,
    epoch: u64,
    topic: Topic,
}

impl GenerationTicket {
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }
}

/// 会话快照，供界面渲染
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: u64,
    pub topic: Topic,
    pub phase: Phase,
    pub current_index: usize,
    pub total: usize,
    pub question: Option<Question>,
    pub selected_answer: Option<usize>,
    pub score: usize,
    pub error: Option<GenerationError>,
    pub closed: bool,
}

/// 一次测试会话
#[derive(Debug)]
pub struct QuizSession {
    id: u64,
    topic: Topic,
    epoch: u64,
    in_flight: bool,
    phase: Phase,
    questions: Option<QuestionSet>,
    current_index: usize,
    selected_answer: Option<usize>,
    score: usize,
    error: Option<GenerationError>,
    closed: bool,
}

impl QuizSession {
    /// 新会话处于 Loading，尚未发出票据
    pub fn new(topic: Topic) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            topic,
            epoch: 0,
            in_flight: false,
            phase: Phase::Loading,
            questions: None,
            current_index: 0,
            selected_answer: None,
            score: 0,
            error: None,
            closed: false,
        }
    }

    /// 发起生成
    ///
    /// 已有请求在途、会话已关闭或正在答题时返回 `None`
    pub fn begin_generation(&mut self) -> Option<GenerationTicket> {
        if self.closed || self.in_flight {
            debug!("[会话 {}] 忽略生成请求：已关闭或已有请求在途", self.id);
            return None;
        }
        if matches!(self.phase, Phase::Ready | Phase::AnswerRevealed) {
            debug!("[会话 {}] 忽略生成请求：答题进行中", self.id);
            return None;
        }

        self.epoch += 1;
        self.in_flight = true;
        self.questions = None;
        self.current_index = 0;
        self.selected_answer = None;
        self.score = 0;
        self.error = None;
        self.set_phase(Phase::Loading);

        Some(GenerationTicket {
            session_id: self.id,
            epoch: self.epoch,
            topic: self.topic.clone(),
        })
    }

    /// 用同一主题重新生成，只在 Finished / Failed 时有效
    pub fn retry(&mut self) -> Option<GenerationTicket> {
        if !matches!(self.phase, Phase::Finished | Phase::Failed) {
            debug!("[会话 {}] 当前阶段 {:?} 不能重试", self.id, self.phase);
            return None;
        }
        self.begin_generation()
    }

    /// 回填生成结果
    pub fn apply_generation(
        &mut self,
        ticket: &GenerationTicket,
        result: Result<QuestionSet, GenerationError>,
    ) -> Transition {
        let current = !self.closed
            && self.in_flight
            && self.phase == Phase::Loading
            && ticket.session_id == self.id
            && ticket.epoch == self.epoch;
        if !current {
            info!(
                "[会话 {}] 丢弃过期的生成结果 (票据 epoch {}，当前 epoch {})",
                self.id, ticket.epoch, self.epoch
            );
            return Transition::Stale;
        }

        self.in_flight = false;
        match result {
            Ok(questions) => {
                self.questions = Some(questions);
                self.current_index = 0;
                self.selected_answer = None;
                self.score = 0;
                self.set_phase(Phase::Ready);
            }
            Err(error) => {
                debug!("[会话 {}] 生成失败: {}", self.id, error);
                self.error = Some(error);
                self.set_phase(Phase::Failed);
            }
        }
        Transition::Applied
    }

    /// 作答当前题目
    ///
    /// 每题只能作答一次，之后的选择被忽略
    pub fn select_answer(&mut self, index: usize) -> Transition {
        if self.closed || self.phase != Phase::Ready || self.selected_answer.is_some() {
            return Transition::Ignored;
        }
        if index >= OPTION_COUNT {
            debug!("[会话 {}] 选项 {} 超出范围", self.id, index);
            return Transition::Ignored;
        }
        let Some(question) = self.current_question() else {
            return Transition::Ignored;
        };

        if question.is_correct(index) {
            self.score += 1;
        }
        self.selected_answer = Some(index);
        self.set_phase(Phase::AnswerRevealed);
        Transition::Applied
    }

    /// 进入下一题；最后一题时结束
    pub fn advance(&mut self) -> Transition {
        if self.closed || self.phase != Phase::AnswerRevealed {
            return Transition::Ignored;
        }

        if self.is_last_question() {
            self.set_phase(Phase::Finished);
        } else {
            self.current_index += 1;
            self.selected_answer = None;
            self.set_phase(Phase::Ready);
        }
        Transition::Applied
    }

    /// 关闭会话，之后的所有操作和在途结果都被忽略
    pub fn close(&mut self) -> Transition {
        if self.closed {
            return Transition::Ignored;
        }
        self.closed = true;
        self.in_flight = false;
        debug!("[会话 {}] 已关闭 (阶段 {:?})", self.id, self.phase);
        Transition::Applied
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!("[会话 {}] {:?} → {:?}", self.id, self.phase, phase);
        self.phase = phase;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 是否有生成请求在途
    pub fn is_generating(&self) -> bool {
        self.in_flight
    }

    pub fn questions(&self) -> Option<&QuestionSet> {
        self.questions.as_ref()
    }

    pub fn total(&self) -> usize {
        self.questions.as_ref().map_or(0, QuestionSet::len)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.as_ref()?.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.questions
            .as_ref()
            .is_some_and(|set| self.current_index == set.last_index())
    }

    pub fn selected_answer(&self) -> Option<usize> {
        self.selected_answer
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn error(&self) -> Option<&GenerationError> {
        self.error.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            topic: self.topic.clone(),
            phase: self.phase,
            current_index: self.current_index,
            total: self.total(),
            question: self.current_question().cloned(),
            selected_answer: self.selected_answer,
            score: self.score,
            error: self.error.clone(),
            closed: self.closed,
        }
    }
}
