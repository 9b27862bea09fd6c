//! Core data model types for mathdrill.
//!
//! These are the types shared by the generator, the allocator, the session
//! state machine, and the history stores.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points awarded for a question answered correctly on the first or second try.
pub const POINTS_PER_QUESTION: u32 = 10;

/// Minimum percentage required to pass a test.
pub const PASS_PERCENTAGE: f64 = 80.0;

/// The four supported arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// All operations in canonical order.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// The operator symbol used when rendering question text.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }

    /// Detect the operation embedded in a rendered question such as `"7 × 8 = ?"`.
    ///
    /// The operator is the second whitespace-separated token, which keeps
    /// negative operands (`"-3 - -5 = ?"`) unambiguous. ASCII `*` and `/` are
    /// accepted for records written by older versions.
    pub fn from_question_text(text: &str) -> Option<Operation> {
        let mut tokens = text.split_whitespace();
        tokens.next()?;
        let op = tokens.next()?;
        match op {
            "+" => Some(Operation::Add),
            "-" => Some(Operation::Subtract),
            "×" | "*" => Some(Operation::Multiply),
            "÷" | "/" => Some(Operation::Divide),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => write!(f, "add"),
            Operation::Subtract => write!(f, "subtract"),
            Operation::Multiply => write!(f, "multiply"),
            Operation::Divide => write!(f, "divide"),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" | "addition" | "+" => Ok(Operation::Add),
            "subtract" | "subtraction" | "sub" | "-" => Ok(Operation::Subtract),
            "multiply" | "multiplication" | "mul" | "×" | "*" => Ok(Operation::Multiply),
            "divide" | "division" | "div" | "÷" | "/" => Ok(Operation::Divide),
            other => Err(format!("unknown operation: {other}")),
        }
    }
}

/// Inclusive integer bounds for one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i32,
    pub max: i32,
}

impl Range {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Returns `true` when `min < max`.
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        i64::from(self.min) <= value && value <= i64::from(self.max)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

/// The set of operations a quiz draws from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationSet(BTreeSet<Operation>);

impl OperationSet {
    pub fn new(ops: impl IntoIterator<Item = Operation>) -> Self {
        Self(ops.into_iter().collect())
    }

    /// Every operation.
    pub fn all() -> Self {
        Self::new(Operation::ALL)
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.0.contains(&op)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.0.iter().copied()
    }

    /// Operations as a vector, in canonical order.
    pub fn to_vec(&self) -> Vec<Operation> {
        self.iter().collect()
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Where a question in a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Recycled from a previously failed question.
    History,
    /// Freshly generated for this test.
    New,
}

/// A single question presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Rendered text, e.g. `"12 ÷ 3 = ?"`.
    pub text: String,
    /// The expected answer.
    pub correct_answer: f64,
    pub operation: Operation,
    pub operand_x: i64,
    pub operand_y: i64,
    pub origin: Origin,
}

/// A question the user never answered correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedQuestionRecord {
    #[serde(alias = "question")]
    pub question_text: String,
    /// The value submitted on the final allowed attempt.
    pub user_answer: f64,
    pub correct_answer: f64,
}

/// The outcome of one completed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Opaque unique identifier.
    pub id: String,
    /// When the test was completed.
    #[serde(alias = "datetime")]
    pub completed_at: DateTime<Utc>,
    pub passed: bool,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    #[serde(default)]
    pub failed_questions: Vec<FailedQuestionRecord>,
}

impl TestResult {
    /// Build a result, deriving `percentage` and `passed` from the score.
    pub fn new(
        id: impl Into<String>,
        completed_at: DateTime<Utc>,
        score: u32,
        total_questions: u32,
        failed_questions: Vec<FailedQuestionRecord>,
    ) -> Self {
        let percentage = percentage(score, total_questions);
        Self {
            id: id.into(),
            completed_at,
            passed: percentage >= PASS_PERCENTAGE,
            score,
            total_questions,
            percentage,
            failed_questions,
        }
    }

    /// Highest score achievable for this test, saturating at `u32::MAX`.
    pub fn max_score(&self) -> u32 {
        self.total_questions.saturating_mul(POINTS_PER_QUESTION)
    }
}

/// `score / (total * 10) * 100`, or 0 for an empty test.
pub fn percentage(score: u32, total_questions: u32) -> f64 {
    let max = f64::from(total_questions) * f64::from(POINTS_PER_QUESTION);
    if max == 0.0 {
        return 0.0;
    }
    f64::from(score) / max * 100.0
}

/// Format an answer without a trailing `.0` when it is integral.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_display_and_parse() {
        assert_eq!(Operation::Multiply.to_string(), "multiply");
        assert_eq!("add".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!("Division".parse::<Operation>().unwrap(), Operation::Divide);
        assert_eq!("×".parse::<Operation>().unwrap(), Operation::Multiply);
        assert_eq!("-".parse::<Operation>().unwrap(), Operation::Subtract);
        assert!("modulo".parse::<Operation>().is_err());
    }

    #[test]
    fn operation_from_question_text() {
        assert_eq!(
            Operation::from_question_text("3 + 4 = ?"),
            Some(Operation::Add)
        );
        assert_eq!(
            Operation::from_question_text("-3 - -5 = ?"),
            Some(Operation::Subtract)
        );
        assert_eq!(
            Operation::from_question_text("56 ÷ 7 = ?"),
            Some(Operation::Divide)
        );
        assert_eq!(
            Operation::from_question_text("6 * 7 = ?"),
            Some(Operation::Multiply)
        );
        assert_eq!(Operation::from_question_text("garbage"), None);
        assert_eq!(Operation::from_question_text(""), None);
    }

    #[test]
    fn operation_set_serializes_as_list() {
        let set = OperationSet::new([Operation::Divide, Operation::Add]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["add","divide"]"#);
    }

    #[test]
    fn test_result_pass_threshold() {
        let now = Utc::now();
        let passed = TestResult::new("a", now, 80, 10, vec![]);
        assert!(passed.passed);
        assert!((passed.percentage - 80.0).abs() < f64::EPSILON);

        let failed = TestResult::new("b", now, 70, 10, vec![]);
        assert!(!failed.passed);
        assert_eq!(failed.max_score(), 100);
    }

    #[test]
    fn test_result_reads_legacy_field_names() {
        let json = r#"{
            "id": "1697040000000abc123xyz",
            "datetime": "2026-10-17T09:30:00.000Z",
            "passed": false,
            "score": 10,
            "totalQuestions": 2,
            "percentage": 50,
            "failedQuestions": [
                {"question": "7 × 8 = ?", "userAnswer": 54, "correctAnswer": 56}
            ]
        }"#;
        let result: TestResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.failed_questions.len(), 1);
        assert_eq!(result.failed_questions[0].question_text, "7 × 8 = ?");
    }

    #[test]
    fn max_score_saturates_for_huge_totals() {
        let at = Utc::now();
        assert_eq!(TestResult::new("r", at, 70, 10, vec![]).max_score(), 100);
        let huge = TestResult::new("big", at, 0, 500_000_000, vec![]);
        assert_eq!(huge.max_score(), u32::MAX);
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(56.0), "56");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
