//! Answer verification and the two-try state machine.
//!
//! ```text
//! AwaitingFirstAttempt --correct--> Advancing
//! AwaitingFirstAttempt --wrong----> AwaitingSecondAttempt
//! AwaitingSecondAttempt --correct-> Advancing
//! AwaitingSecondAttempt --wrong---> Revealed
//! Revealed --correct value typed--> Advancing
//! Advancing --advance-------------> AwaitingFirstAttempt | Completed
//! ```
//!
//! [`SessionState`] is a plain value. Every transition borrows the current
//! state and returns the next one, so a refused transition leaves the caller
//! holding a state that is still valid.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{FailedQuestionRecord, Question, TestResult, POINTS_PER_QUESTION};

/// Absolute tolerance for comparing answers.
pub const ANSWER_TOLERANCE: f64 = 0.001;

/// Where the current question stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingFirstAttempt,
    AwaitingSecondAttempt,
    /// Both attempts failed; the correct answer must be typed to continue.
    Revealed,
    /// The question is settled and the session can move on.
    Advancing,
    /// Every question has been settled.
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingFirstAttempt => write!(f, "awaiting first attempt"),
            Phase::AwaitingSecondAttempt => write!(f, "awaiting second attempt"),
            Phase::Revealed => write!(f, "answer revealed"),
            Phase::Advancing => write!(f, "advancing"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

/// What a submission did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Answered correctly on `attempt` (1 or 2).
    Correct { attempt: u8, points: u32 },
    /// First attempt was wrong; one more try.
    TryAgain,
    /// Second attempt was wrong; the answer is shown and the question is logged as failed.
    Revealed { correct_answer: f64 },
    /// The revealed answer was typed back.
    Acknowledged,
    /// The value typed at the reveal gate was not the correct answer.
    AcknowledgementRejected { correct_answer: f64 },
}

/// Progress through one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    index: usize,
    total: usize,
    phase: Phase,
    score: u32,
    failed_questions: Vec<FailedQuestionRecord>,
}

impl SessionState {
    /// State for the first question of `questions`.
    pub fn start(questions: &[Question]) -> Self {
        Self {
            index: 0,
            total: questions.len(),
            phase: if questions.is_empty() {
                Phase::Completed
            } else {
                Phase::AwaitingFirstAttempt
            },
            score: 0,
            failed_questions: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Zero-based index of the current question.
    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based position for display, capped at the total.
    pub fn question_number(&self) -> usize {
        (self.index + 1).min(self.total)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Questions not yet settled.
    pub fn remaining(&self) -> usize {
        let settled = match self.phase {
            Phase::Advancing | Phase::Completed => self.index + 1,
            _ => self.index,
        };
        self.total.saturating_sub(settled)
    }

    pub fn failed_questions(&self) -> &[FailedQuestionRecord] {
        &self.failed_questions
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// The question currently being asked, if any.
    pub fn current_question<'a>(&self, questions: &'a [Question]) -> Option<&'a Question> {
        if self.is_complete() {
            return None;
        }
        questions.get(self.index)
    }

    /// Submit an answer for the current question.
    ///
    /// In the [`Phase::Revealed`] phase the value is checked as the
    /// acknowledgement instead of as an attempt. NaN and infinities are
    /// rejected without consuming an attempt.
    pub fn submit(
        &self,
        questions: &[Question],
        value: f64,
    ) -> Result<(SessionState, Outcome), SessionError> {
        if !value.is_finite() {
            return Err(SessionError::NotANumber(value.to_string()));
        }
        let question = questions
            .get(self.index)
            .ok_or(SessionError::NoQuestion(self.index))?;
        let correct = is_correct(value, question.correct_answer);
        let mut next = self.clone();

        let outcome = match self.phase {
            Phase::AwaitingFirstAttempt | Phase::AwaitingSecondAttempt if correct => {
                next.score = next.score.saturating_add(POINTS_PER_QUESTION);
                next.phase = Phase::Advancing;
                Outcome::Correct {
                    attempt: if self.phase == Phase::AwaitingFirstAttempt {
                        1
                    } else {
                        2
                    },
                    points: POINTS_PER_QUESTION,
                }
            }
            Phase::AwaitingFirstAttempt => {
                next.phase = Phase::AwaitingSecondAttempt;
                Outcome::TryAgain
            }
            Phase::AwaitingSecondAttempt => {
                next.failed_questions.push(FailedQuestionRecord {
                    question_text: question.text.clone(),
                    user_answer: value,
                    correct_answer: question.correct_answer,
                });
                next.phase = Phase::Revealed;
                Outcome::Revealed {
                    correct_answer: question.correct_answer,
                }
            }
            Phase::Revealed if correct => {
                next.phase = Phase::Advancing;
                Outcome::Acknowledged
            }
            Phase::Revealed => Outcome::AcknowledgementRejected {
                correct_answer: question.correct_answer,
            },
            phase @ (Phase::Advancing | Phase::Completed) => {
                return Err(SessionError::WrongPhase {
                    action: "submit an answer",
                    phase,
                })
            }
        };

        tracing::debug!(
            question = self.index + 1,
            text = %question.text,
            ?outcome,
            "answer submitted"
        );
        Ok((next, outcome))
    }

    /// Move past a settled question.
    pub fn advance(&self) -> Result<SessionState, SessionError> {
        if self.phase != Phase::Advancing {
            return Err(SessionError::WrongPhase {
                action: "advance",
                phase: self.phase,
            });
        }
        let mut next = self.clone();
        if self.index + 1 >= self.total {
            next.phase = Phase::Completed;
        } else {
            next.index += 1;
            next.phase = Phase::AwaitingFirstAttempt;
        }
        Ok(next)
    }

    /// Build the test result for a completed session.
    pub fn to_result(
        &self,
        id: impl Into<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<TestResult, SessionError> {
        if !self.is_complete() {
            let answered = if self.phase == Phase::Advancing {
                self.index + 1
            } else {
                self.index
            };
            return Err(SessionError::NotComplete {
                answered,
                total: self.total,
            });
        }
        let total = u32::try_from(self.total).unwrap_or(u32::MAX);
        Ok(TestResult::new(
            id,
            completed_at,
            self.score,
            total,
            self.failed_questions.clone(),
        ))
    }
}

/// `abs(user - correct) < 0.001`.
pub fn is_correct(user_answer: f64, correct_answer: f64) -> bool {
    (user_answer - correct_answer).abs() < ANSWER_TOLERANCE
}

/// Parse raw answer text. Rejected input consumes no attempt.
pub fn parse_answer(input: &str) -> Result<f64, SessionError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SessionError::NotANumber(input.to_string())),
    }
}
