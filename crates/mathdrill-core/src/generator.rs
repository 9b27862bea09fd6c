//! Arithmetic fact generation.
//!
//! Draws operands uniformly from the configured ranges and renders them into
//! a question, rejecting candidates whose text is already in the batch.

use std::collections::HashSet;

use rand::Rng;

use crate::model::{Operation, Origin, Question, Range};

/// Default cap on rejection-sampling attempts per question.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Generates fresh questions for one operation at a time.
#[derive(Debug, Clone, Copy)]
pub struct FactGenerator {
    max_attempts: u32,
}

impl Default for FactGenerator {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl FactGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the retry cap. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate one question whose text is not in `existing`.
    ///
    /// After `max_attempts` rejected draws the last candidate is returned even
    /// though it duplicates an existing text; a range too narrow to produce a
    /// novel question would otherwise never terminate.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        operation: Operation,
        range_x: Range,
        range_y: Range,
        existing: &HashSet<String>,
    ) -> Question {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let x = match operation {
                Operation::Divide => draw_nonzero(rng, range_x),
                _ => draw(rng, range_x),
            };
            let y = draw(rng, range_y);
            let question = build_question(operation, x, y);

            if !existing.contains(&question.text) {
                return question;
            }
            if attempts >= self.max_attempts {
                tracing::warn!(
                    text = %question.text,
                    attempts,
                    "no novel {operation} question found, accepting duplicate"
                );
                return question;
            }
        }
    }
}

/// Render a fresh question from already-drawn operands.
///
/// Subtraction swaps the operands so the answer is never negative. Division
/// presents `x*y ÷ x` so the answer is always the integer `y`.
pub fn build_question(operation: Operation, x: i64, y: i64) -> Question {
    let (text, answer, x, y) = match operation {
        Operation::Add => (format!("{x} + {y} = ?"), x + y, x, y),
        Operation::Subtract => {
            let (x, y) = if x < y { (y, x) } else { (x, y) };
            (format!("{x} - {y} = ?"), x - y, x, y)
        }
        Operation::Multiply => (format!("{x} × {y} = ?"), x * y, x, y),
        Operation::Divide => {
            let product = x * y;
            (format!("{product} ÷ {x} = ?"), y, x, y)
        }
    };

    Question {
        text,
        correct_answer: answer as f64,
        operation,
        operand_x: x,
        operand_y: y,
        origin: Origin::New,
    }
}

/// Recover `(operation, operand_x, operand_y)` from a rendered question.
///
/// For division the text shows `product ÷ x`, so the returned operands are the
/// divisor and the quotient. Texts that do not divide evenly are rejected.
pub fn parse_question_text(text: &str) -> Option<(Operation, i64, i64)> {
    let mut tokens = text.split_whitespace();
    let left: i64 = tokens.next()?.parse().ok()?;
    let operation = Operation::from_question_text(text)?;
    tokens.next()?;
    let right: i64 = tokens.next()?.parse().ok()?;

    match operation {
        Operation::Divide => {
            if right == 0 || left % right != 0 {
                return None;
            }
            Some((operation, right, left / right))
        }
        _ => Some((operation, left, right)),
    }
}

/// Rebuild a question from a failed-question record so it can be asked again.
pub fn recycled_question(text: &str, correct_answer: f64) -> Option<Question> {
    let (operation, operand_x, operand_y) = parse_question_text(text)?;
    Some(Question {
        text: text.to_string(),
        correct_answer,
        operation,
        operand_x,
        operand_y,
        origin: Origin::History,
    })
}

fn bounds(range: Range) -> (i64, i64) {
    let (a, b) = (i64::from(range.min), i64::from(range.max));
    (a.min(b), a.max(b))
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: Range) -> i64 {
    let (lo, hi) = bounds(range);
    rng.gen_range(lo..=hi)
}

/// Uniform over the non-zero values of `range`.
fn draw_nonzero<R: Rng + ?Sized>(rng: &mut R, range: Range) -> i64 {
    let (lo, hi) = bounds(range);
    if lo > 0 || hi < 0 {
        return rng.gen_range(lo..=hi);
    }
    if lo == hi {
        // Only zero is available; validated configs never get here.
        return 1;
    }
    let v = rng.gen_range(lo..=hi - 1);
    if v >= 0 {
        v + 1
    } else {
        v
    }
}
