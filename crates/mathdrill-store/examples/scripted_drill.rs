//! Plays two scripted quizzes against a JSON history in a temporary directory.
//!
//! Run with `RUST_LOG=debug` to see allocation and persistence decisions.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use mathdrill_core::clock::SystemClock;
use mathdrill_core::engine::{QuizEngine, QuizEngineConfig};
use mathdrill_core::model::{format_number, Operation, OperationSet};
use mathdrill_core::session::{parse_answer, Outcome};
use mathdrill_core::summary::{recent_days, TestDetail};
use mathdrill_store::paths::DataDir;
use mathdrill_store::{load_settings, save_settings, JsonHistoryStore};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mathdrill_core=info".parse()?))
        .init();

    let tmp = tempfile::tempdir()?;
    let dir = DataDir::new(tmp.path());

    let mut config = load_settings(&dir.settings_path());
    config.total_questions = 5;
    config.operations = OperationSet::new([Operation::Add, Operation::Multiply]);
    save_settings(&dir.settings_path(), &config)?;

    let mut engine = QuizEngine::new(
        Box::new(JsonHistoryStore::open(&dir)),
        Arc::new(SystemClock),
        QuizEngineConfig::default(),
    );

    for round in 1..=2 {
        let quiz = engine.start(&config)?;
        println!("round {round}: {} questions", quiz.len());

        let questions = quiz.questions();
        let mut state = quiz.start_session();
        while let Some(question) = state.current_question(questions) {
            // Get the odd-numbered questions wrong on the first round.
            let typed = if round == 1 && state.index() % 2 == 0 {
                "-1".to_string()
            } else {
                format_number(question.correct_answer)
            };
            let value = parse_answer(&typed)?;
            let (next, outcome) = state.submit(questions, value)?;
            state = match outcome {
                Outcome::Correct { attempt, .. } => {
                    println!("  {}  {typed}  correct (try {attempt})", question.text);
                    next.advance()?
                }
                Outcome::TryAgain => next,
                Outcome::Revealed { correct_answer } => {
                    println!("  {}  answer was {}", question.text, format_number(correct_answer));
                    let (acked, _) = next.submit(questions, correct_answer)?;
                    acked.advance()?
                }
                Outcome::Acknowledged | Outcome::AcknowledgementRejected { .. } => next,
            };
        }

        let result = engine.complete(&quiz, &state)?;
        let detail = TestDetail::from_result(&result);
        println!(
            "  score {}/{} ({}%) {}",
            detail.score,
            detail.max_score,
            detail.percentage,
            if detail.passed { "passed" } else { "failed" }
        );
    }

    let history = engine.history().all()?;
    for day in recent_days(&history, chrono::Utc::now(), &chrono::Local) {
        println!(
            "{}: {} run(s), {}",
            day.date,
            day.run_count(),
            if day.passed { "passed" } else { "not passed" }
        );
    }
    Ok(())
}
