use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use ace_exam::error::ErrorCause;
use ace_exam::models::{Category, Topic, OPTION_COUNT, STUDY_PLAN};
use ace_exam::orchestrator::{AppState, QuizView, Tab};
use ace_exam::services::error_policy;
use ace_exam::services::TaskStore;
use ace_exam::utils::logging;
use ace_exam::workflow::{Phase, QuizGenerator, Transition};
use ace_exam::Config;

type Input = Lines<BufReader<Stdin>>;

const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::from_env(), Some(e)),
    };

    // 初始化日志
    logging::init(config.verbose_logging);
    if let Some(e) = config_error {
        warn!("配置文件无效，使用环境变量和默认值: {}", e);
    }
    logging::log_startup(&config);

    let store = TaskStore::new(config.tasks_file.clone());
    let tasks = store
        .load_or_seed()
        .await
        .context("无法加载任务列表")?;

    let mut state = AppState::new(tasks);
    let generator = Arc::new(QuizGenerator::from_config(&config));
    let mut input = BufReader::new(stdin()).lines();

    loop {
        print_menu(&state);
        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "1" => state.open_quiz(Topic::comprehensive()),
            "2" => {
                state.select_tab(Tab::DailyFocus);
                if let Some(topic) = Tab::DailyFocus.quiz_topic() {
                    state.open_quiz(topic);
                }
            }
            "3" => {
                if let Some(category) = choose_category(&mut input).await? {
                    state.open_quiz_for_category(category);
                }
            }
            "4" => {
                state.select_tab(Tab::StudyPlan);
                print_study_plan(&state);
            }
            "q" | "Q" | "quit" => break,
            other => {
                if let Some(id) = other.strip_prefix("t ") {
                    match state.toggle_task(id.trim()) {
                        Some(done) => {
                            store.save(state.tasks()).await.context("无法保存任务列表")?;
                            println!("✓ {} {}", id.trim(), if done { "completed" } else { "reopened" });
                        }
                        None => println!("No task with id {}", id.trim()),
                    }
                } else if let Some(id) = other.strip_prefix("m ") {
                    if state.open_quiz_for_task(id.trim()).is_none() {
                        println!("No task with id {}", id.trim());
                    }
                } else if !other.is_empty() {
                    println!("Unknown choice: {}", other);
                }
            }
        }

        if let Some(topic) = state.active_quiz().cloned() {
            let keep_going = run_quiz(Arc::clone(&generator), topic, &mut input).await?;
            state.close_quiz();
            state.select_tab(Tab::Dashboard);
            if !keep_going {
                break;
            }
        }
    }

    Ok(())
}

fn print_menu(state: &AppState) {
    println!();
    println!("{}", "=".repeat(60));
    println!("Kerala PSC JPA Prep  |  Overall progress: {:.0}%", state.overall_progress());
    for stat in state.category_stats() {
        println!(
            "  {:<24} {:>3}%  ({}/{} tasks, {} marks)",
            stat.category.label(),
            stat.progress.round(),
            stat.completed,
            stat.total,
            stat.marks
        );
    }
    println!("{}", "=".repeat(60));
    println!("1) Comprehensive mock test ({})", Topic::COMPREHENSIVE);
    println!("2) Daily challenge ({})", Topic::DAILY_CHALLENGE);
    println!("3) Mock test by category");
    println!("4) Show study plan");
    println!("t <id>) Toggle task    m <id>) Mock test for task    q) Quit");
}

fn print_study_plan(state: &AppState) {
    for week in &STUDY_PLAN {
        println!("\nWeek {}: {}", week.week, week.title);
        for task in state.tasks_for_week(week.week) {
            println!(
                "  [{}] {:<6} {:<28} {:?} · {}",
                if task.is_completed { "x" } else { " " },
                task.id,
                task.title,
                task.priority,
                task.category
            );
        }
    }
}

async fn choose_category(input: &mut Input) -> Result<Option<Category>> {
    let categories: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|c| *c != Category::MockTest)
        .collect();
    for (i, category) in categories.iter().enumerate() {
        println!("  {}) {}", i + 1, category);
    }

    let Some(line) = input.next_line().await? else {
        return Ok(None);
    };
    Ok(line
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| categories.get(i).copied()))
}

/// 运行一次测试；返回 `false` 表示输入已结束
async fn run_quiz(generator: Arc<QuizGenerator>, topic: Topic, input: &mut Input) -> Result<bool> {
    println!("\n⏳ Generating questions on \"{}\"...", topic);
    let mut view = QuizView::open(generator, topic);

    loop {
        let snapshot = view.settled().await;
        if snapshot.closed {
            return Ok(true);
        }

        match snapshot.phase {
            Phase::Loading => continue,
            Phase::Ready => {
                let Some(question) = snapshot.question.as_ref() else {
                    view.close().await;
                    return Ok(true);
                };
                println!(
                    "\nQuestion {}/{}  (score {})",
                    snapshot.current_index + 1,
                    snapshot.total,
                    snapshot.score
                );
                println!("{}", question.prompt());
                for (label, option) in OPTION_LABELS.iter().zip(question.options()) {
                    println!("  {}) {}", label, option);
                }

                let Some(line) = input.next_line().await? else {
                    view.close().await;
                    return Ok(false);
                };
                match parse_option(&line) {
                    Some(choice) => {
                        view.select_answer(choice).await;
                    }
                    None => println!("Choose one of A, B, C or D."),
                }
            }
            Phase::AnswerRevealed => {
                if let (Some(question), Some(selected)) =
                    (snapshot.question.as_ref(), snapshot.selected_answer)
                {
                    if question.is_correct(selected) {
                        println!("✅ Correct!");
                    } else {
                        println!(
                            "❌ Incorrect. Answer: {}) {}",
                            OPTION_LABELS[question.correct_answer_index()],
                            question.correct_option()
                        );
                    }
                    println!("💡 {}", question.explanation());
                }

                let last = snapshot.current_index + 1 == snapshot.total;
                println!("[Enter] {}", if last { "Finish" } else { "Next question" });
                if input.next_line().await?.is_none() {
                    view.close().await;
                    return Ok(false);
                }
                view.advance().await;
            }
            Phase::Finished => {
                println!("\n🏁 Test complete! Score: {}/{}", snapshot.score, snapshot.total);
                println!("[r] Retake with new questions    [c] Close");
                match retry_or_close(&mut view, input, true).await? {
                    AfterQuiz::Retried => {}
                    AfterQuiz::Closed => return Ok(true),
                    AfterQuiz::EndOfInput => return Ok(false),
                }
            }
            Phase::Failed => {
                let shown = snapshot
                    .error
                    .as_ref()
                    .map(error_policy::present)
                    .unwrap_or_else(|| error_policy::present_cause(ErrorCause::Unknown));
                println!("\n⚠️ {}", shown.title);
                println!("{}", shown.message);
                println!("{}", shown.hint);
                if shown.retryable {
                    println!("[r] Retry    [c] Close");
                } else {
                    println!("[c] Close");
                }
                match retry_or_close(&mut view, input, shown.retryable).await? {
                    AfterQuiz::Retried => {}
                    AfterQuiz::Closed => return Ok(true),
                    AfterQuiz::EndOfInput => return Ok(false),
                }
            }
        }
    }
}

enum AfterQuiz {
    Retried,
    Closed,
    EndOfInput,
}

/// 只有提示了 `[r]` 时才接受重试
async fn retry_or_close(view: &mut QuizView, input: &mut Input, retryable: bool) -> Result<AfterQuiz> {
    let Some(line) = input.next_line().await? else {
        view.close().await;
        return Ok(AfterQuiz::EndOfInput);
    };
    if wants_retry(&line, retryable) && view.retry().await == Transition::Applied {
        println!("\n⏳ Generating new questions...");
        return Ok(AfterQuiz::Retried);
    }
    view.close().await;
    Ok(AfterQuiz::Closed)
}

fn parse_option(line: &str) -> Option<usize> {
    let c = line.trim().chars().next()?.to_ascii_uppercase();
    OPTION_LABELS.iter().position(|label| *label == c)
}

fn wants_retry(line: &str, retryable: bool) -> bool {
    retryable && line.trim().eq_ignore_ascii_case("r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_only_when_offered() {
        assert!(wants_retry("r", true));
        assert!(wants_retry(" R \n", true));
        assert!(!wants_retry("c", true));
        assert!(!wants_retry("r", false));
        assert!(!wants_retry("R", false));
    }

    #[test]
    fn test_parse_option_labels() {
        assert_eq!(parse_option("a"), Some(0));
        assert_eq!(parse_option(" D"), Some(3));
        assert_eq!(parse_option("e"), None);
        assert_eq!(parse_option(""), None);
    }
}
