//! Error types for configuration and session handling.
//!
//! Both are reported to the caller; neither is fatal. A configuration error
//! means no questions were generated, a session error means the transition
//! was refused and the previous state is still valid.

use thiserror::Error;

use crate::session::Phase;

/// Validation failures for a quiz configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The X range does not satisfy `min < max`.
    #[error("x range is invalid: min {min} must be less than max {max}")]
    InvalidRangeX { min: i32, max: i32 },

    /// The Y range does not satisfy `min < max`.
    #[error("y range is invalid: min {min} must be less than max {max}")]
    InvalidRangeY { min: i32, max: i32 },

    /// Fewer than one question requested.
    #[error("total questions must be at least 1")]
    NoQuestions,

    /// No operations selected.
    #[error("at least one operation must be selected")]
    NoOperations,

    /// A form field did not contain an integer.
    #[error("{field} is not a valid number: '{value}'")]
    NotANumber { field: &'static str, value: String },

    /// An operation name could not be recognized.
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),
}

/// Refused session transitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The submitted answer is not numeric. No attempt was consumed.
    #[error("answer is not a valid number: '{0}'")]
    NotANumber(String),

    /// The transition is not allowed in the current phase.
    #[error("cannot {action} while {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    /// The session has no question at the current position.
    #[error("no question at position {0}")]
    NoQuestion(usize),

    /// A result was requested before every question was answered.
    #[error("session is not complete ({answered} of {total} questions done)")]
    NotComplete { answered: usize, total: usize },

    /// The session was played over a different number of questions than
    /// the quiz being completed.
    #[error("session has {actual} questions but the quiz has {expected}")]
    QuizMismatch { expected: usize, actual: usize },
}
