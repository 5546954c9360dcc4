//! 测试视图 - 编排层
//!
//! 持有唯一的答题会话，负责：
//! - 在 tokio 运行时上发起生成，不阻塞其他视图
//! - 通过 watch 通道发布会话快照
//! - 关闭时中止在途任务，迟到的结果被状态机丢弃

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::models::Topic;
use crate::utils::logging::log_quiz_result;
use crate::workflow::{GenerationTicket, Phase, QuizGenerator, QuizSession, SessionSnapshot, Transition};

/// 在途的生成任务
struct InFlight {
    generation: AbortHandle,
    applier: JoinHandle<()>,
}

impl InFlight {
    fn abort(&self) {
        self.generation.abort();
        self.applier.abort();
    }
}

/// 测试视图
pub struct QuizView {
    session: Arc<Mutex<QuizSession>>,
    generator: Arc<QuizGenerator>,
    snapshots: watch::Sender<SessionSnapshot>,
    in_flight: Option<InFlight>,
}

impl QuizView {
    /// 为主题打开测试视图并立即开始生成
    pub fn open(generator: Arc<QuizGenerator>, topic: Topic) -> Self {
        let mut session = QuizSession::new(topic);
        let ticket = session.begin_generation();
        let (snapshots, _) = watch::channel(session.snapshot());

        info!("[会话 {}] 打开模拟测试: {}", session.id(), session.topic());

        let mut view = Self {
            session: Arc::new(Mutex::new(session)),
            generator,
            snapshots,
            in_flight: None,
        };
        if let Some(ticket) = ticket {
            view.spawn_generation(ticket);
        }
        view
    }

    /// 订阅会话快照
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// 当前快照
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// 等待生成结束（Loading 以外的阶段或会话关闭）
    pub async fn settled(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        rx.wait_for(|s| s.closed || s.phase != Phase::Loading)
            .await
            .map(|snapshot| snapshot.clone())
            .unwrap_or_else(|_| self.snapshot())
    }

    pub async fn select_answer(&self, index: usize) -> Transition {
        let mut session = self.session.lock().await;
        let outcome = session.select_answer(index);
        self.publish(&session, outcome);
        outcome
    }

    pub async fn advance(&self) -> Transition {
        let mut session = self.session.lock().await;
        let outcome = session.advance();
        if outcome == Transition::Applied && session.phase() == Phase::Finished {
            log_quiz_result(session.topic(), session.score(), session.total());
        }
        self.publish(&session, outcome);
        outcome
    }

    /// 用同一主题重新生成
    pub async fn retry(&mut self) -> Transition {
        let ticket = {
            let mut session = self.session.lock().await;
            let ticket = session.retry();
            if ticket.is_some() {
                self.snapshots.send_replace(session.snapshot());
            }
            ticket
        };

        match ticket {
            Some(ticket) => {
                info!("[会话 {}] 🔄 重新生成: {}", ticket.session_id(), ticket.topic());
                self.spawn_generation(ticket);
                Transition::Applied
            }
            None => Transition::Ignored,
        }
    }

    /// 关闭视图，丢弃在途结果
    pub async fn close(&mut self) -> Transition {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
        let mut session = self.session.lock().await;
        let outcome = session.close();
        if outcome == Transition::Applied {
            info!("[会话 {}] 关闭模拟测试", session.id());
        }
        self.publish(&session, outcome);
        outcome
    }

    fn publish(&self, session: &QuizSession, outcome: Transition) {
        if outcome == Transition::Applied {
            self.snapshots.send_replace(session.snapshot());
        }
    }

    fn spawn_generation(&mut self, ticket: GenerationTicket) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let generator = Arc::clone(&self.generator);
        let topic = ticket.topic().clone();
        let generation = tokio::spawn(async move { generator.generate(&topic).await });
        let abort_handle = generation.abort_handle();

        let session = Arc::clone(&self.session);
        let snapshots = self.snapshots.clone();
        let applier = tokio::spawn(async move {
            let result = match generation.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => {
                    debug!("生成任务已取消 (epoch {})", ticket.epoch());
                    return;
                }
                Err(e) => {
                    warn!("生成任务异常退出: {}", e);
                    Err(GenerationError::unknown(format!("generation task failed: {}", e)))
                }
            };

            let mut session = session.lock().await;
            if session.apply_generation(&ticket, result) == Transition::Applied {
                snapshots.send_replace(session.snapshot());
            }
        });

        self.in_flight = Some(InFlight {
            generation: abort_handle,
            applier,
        });
    }
}

impl Drop for QuizView {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
        if let Ok(mut session) = self.session.try_lock() {
            session.close();
        }
    }
}
