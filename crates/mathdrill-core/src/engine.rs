//! Quiz orchestrator.
//!
//! Reads the history, plans the split between recycled and fresh questions,
//! builds the batch, and records the result once the session completes.

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::allocator::{build_question_set, collect_failed_pools, plan_from_pools, AllocationPlan};
use crate::clock::Clock;
use crate::config::QuizConfig;
use crate::error::{ConfigError, SessionError};
use crate::generator::{FactGenerator, DEFAULT_MAX_ATTEMPTS};
use crate::history::HistoryStore;
use crate::model::{Question, TestResult};
use crate::session::SessionState;

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct QuizEngineConfig {
    /// Rejection-sampling cap per fresh question.
    pub max_generation_attempts: u32,
    /// Fixed RNG seed for reproducible batches. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for QuizEngineConfig {
    fn default() -> Self {
        Self {
            max_generation_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

/// One generated test, ready to be played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    id: Uuid,
    questions: Vec<Question>,
    plan: AllocationPlan,
}

impl Quiz {
    /// Identifier shared with the resulting [`TestResult`].
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn plan(&self) -> &AllocationPlan {
        &self.plan
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Initial session state for this quiz.
    pub fn start_session(&self) -> SessionState {
        SessionState::start(&self.questions)
    }
}

/// The central quiz engine.
pub struct QuizEngine {
    history: Box<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    generator: FactGenerator,
    rng: ChaCha8Rng,
}

impl QuizEngine {
    pub fn new(
        history: Box<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
        config: QuizEngineConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            history,
            clock,
            generator: FactGenerator::new().with_max_attempts(config.max_generation_attempts),
            rng,
        }
    }

    /// Read access to the underlying store.
    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    /// Validate `config` and generate a quiz.
    ///
    /// An unreadable history is treated as empty, so every question is fresh.
    pub fn start(&mut self, config: &QuizConfig) -> Result<Quiz, ConfigError> {
        config.validate()?;

        let history = self.history.all().unwrap_or_else(|e| {
            tracing::warn!("history unavailable, generating fresh questions only: {e:#}");
            Vec::new()
        });
        let now = self.clock.now();

        let pools = collect_failed_pools(&history, &config.operations, now);
        let plan = plan_from_pools(config.total_questions, &pools);
        tracing::info!(
            total = config.total_questions,
            yesterday = plan.from_yesterday,
            seven_day = plan.from_seven_day,
            thirty_day = plan.from_thirty_day,
            new = plan.from_new,
            failed_available = pools.total(),
            "planned quiz"
        );

        let questions =
            build_question_set(&mut self.rng, &self.generator, config, &pools, &plan);

        Ok(Quiz {
            id: Uuid::new_v4(),
            questions,
            plan,
        })
    }

    /// Record a completed session and return its result.
    ///
    /// The result carries the quiz id, so completing the same quiz twice
    /// stores it once. A session played over a different quiz is refused.
    pub fn complete(&mut self, quiz: &Quiz, state: &SessionState) -> Result<TestResult> {
        if state.total() != quiz.len() {
            return Err(SessionError::QuizMismatch {
                expected: quiz.len(),
                actual: state.total(),
            }
            .into());
        }
        let result = state.to_result(quiz.id.to_string(), self.clock.now())?;
        self.history
            .append(result.clone())
            .with_context(|| format!("failed to record result {}", result.id))?;
        tracing::info!(
            id = %result.id,
            score = result.score,
            percentage = result.percentage,
            passed = result.passed,
            failed = result.failed_questions.len(),
            "quiz completed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::history::MemoryHistory;
    use crate::model::{Operation, OperationSet, Range};
    use chrono::{TimeZone, Utc};

    struct BrokenHistory;

    impl HistoryStore for BrokenHistory {
        fn append(&mut self, _: TestResult) -> Result<()> {
            anyhow::bail!("disk full")
        }

        fn all(&self) -> Result<Vec<TestResult>> {
            anyhow::bail!("corrupt history")
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        ))
    }

    fn seeded() -> QuizEngineConfig {
        QuizEngineConfig {
            seed: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_generates_nothing() {
        let clock = clock();
        let mut engine = QuizEngine::new(
            Box::new(MemoryHistory::new(clock.clone())),
            clock,
            seeded(),
        );
        let config = QuizConfig {
            range_x: Range::new(10, 1),
            ..Default::default()
        };
        assert_eq!(
            engine.start(&config),
            Err(ConfigError::InvalidRangeX { min: 10, max: 1 })
        );
    }

    #[test]
    fn unreadable_history_degrades_to_fresh_questions() {
        let mut engine = QuizEngine::new(Box::new(BrokenHistory), clock(), seeded());
        let config = QuizConfig {
            total_questions: 5,
            operations: OperationSet::new([Operation::Add]),
            ..Default::default()
        };
        let quiz = engine.start(&config).unwrap();
        assert_eq!(quiz.len(), 5);
        assert_eq!(*quiz.plan(), AllocationPlan::all_new(5));
    }

    #[test]
    fn complete_requires_finished_session() {
        let clock = clock();
        let mut engine = QuizEngine::new(
            Box::new(MemoryHistory::new(clock.clone())),
            clock,
            seeded(),
        );
        let quiz = engine.start(&QuizConfig::default()).unwrap();
        let state = quiz.start_session();
        assert!(engine.complete(&quiz, &state).is_err());
        assert!(engine.history().all().unwrap().is_empty());
    }

    #[test]
    fn complete_refuses_state_from_another_quiz() {
        let clock = clock();
        let mut engine = QuizEngine::new(
            Box::new(MemoryHistory::new(clock.clone())),
            clock,
            seeded(),
        );
        let small = engine
            .start(&QuizConfig {
                total_questions: 1,
                ..Default::default()
            })
            .unwrap();
        let large = engine.start(&QuizConfig::default()).unwrap();

        let questions = small.questions();
        let (state, _) = small
            .start_session()
            .submit(questions, questions[0].correct_answer)
            .unwrap();
        let state = state.advance().unwrap();
        assert!(state.is_complete());

        let err = engine.complete(&large, &state).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SessionError>(),
            Some(&SessionError::QuizMismatch {
                expected: 10,
                actual: 1
            })
        );
        assert!(engine.history().all().unwrap().is_empty());

        engine.complete(&small, &state).unwrap();
        assert_eq!(engine.history().all().unwrap().len(), 1);
    }

    #[test]
    fn same_seed_same_questions() {
        let config = QuizConfig::default();
        let a = QuizEngine::new(Box::new(BrokenHistory), clock(), seeded())
            .start(&config)
            .unwrap();
        let b = QuizEngine::new(Box::new(BrokenHistory), clock(), seeded())
            .start(&config)
            .unwrap();
        assert_eq!(a.questions(), b.questions());
        assert_ne!(a.id(), b.id());
    }
}
