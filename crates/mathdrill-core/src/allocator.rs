//! Spaced-repetition allocation.
//!
//! Splits the upcoming test between questions recycled from recent failures
//! and freshly generated ones. Failures are bucketed by recency:
//!
//! | bucket     | window                    | share |
//! |------------|---------------------------|-------|
//! | yesterday  | `[now-1d, now]`           | 30%   |
//! | seven-day  | `[now-7d, now-1d)`        | 20%   |
//! | thirty-day | `[now-30d, now-7d)`       | 10%   |
//!
//! Each share is clamped to what the bucket actually holds, and whatever is
//! not recycled is generated fresh.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::QuizConfig;
use crate::generator::{recycled_question, FactGenerator};
use crate::model::{Operation, OperationSet, Question, TestResult};

/// Recency window a failed question falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Yesterday,
    SevenDay,
    ThirtyDay,
}

impl Bucket {
    /// Classify a result completed `age` before now.
    pub fn for_age(age: Duration) -> Option<Bucket> {
        if age < Duration::zero() {
            None
        } else if age <= Duration::days(1) {
            Some(Bucket::Yesterday)
        } else if age <= Duration::days(7) {
            Some(Bucket::SevenDay)
        } else if age <= Duration::days(30) {
            Some(Bucket::ThirtyDay)
        } else {
            None
        }
    }

    /// Share of the test this bucket may claim, as `floor(share * total)`.
    pub fn desired(&self, total: u32) -> u32 {
        let tenths: u64 = match self {
            Bucket::Yesterday => 3,
            Bucket::SevenDay => 2,
            Bucket::ThirtyDay => 1,
        };
        // At most `total`.
        u32::try_from(u64::from(total) * tenths / 10).unwrap_or(total)
    }
}

/// Previously failed questions, grouped by bucket, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailedPools {
    pub yesterday: Vec<Question>,
    pub seven_day: Vec<Question>,
    pub thirty_day: Vec<Question>,
}

impl FailedPools {
    pub fn get(&self, bucket: Bucket) -> &[Question] {
        match bucket {
            Bucket::Yesterday => &self.yesterday,
            Bucket::SevenDay => &self.seven_day,
            Bucket::ThirtyDay => &self.thirty_day,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Question> {
        match bucket {
            Bucket::Yesterday => &mut self.yesterday,
            Bucket::SevenDay => &mut self.seven_day,
            Bucket::ThirtyDay => &mut self.thirty_day,
        }
    }

    /// Failed questions across all buckets.
    pub fn total(&self) -> usize {
        self.yesterday.len() + self.seven_day.len() + self.thirty_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// How many questions come from each source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPlan {
    pub from_yesterday: u32,
    pub from_seven_day: u32,
    pub from_thirty_day: u32,
    pub from_new: u32,
}

impl AllocationPlan {
    /// A plan with no recycled questions.
    pub fn all_new(total: u32) -> Self {
        Self {
            from_new: total,
            ..Default::default()
        }
    }

    pub fn from_bucket(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::Yesterday => self.from_yesterday,
            Bucket::SevenDay => self.from_seven_day,
            Bucket::ThirtyDay => self.from_thirty_day,
        }
    }

    pub fn recycled(&self) -> u32 {
        self.from_yesterday + self.from_seven_day + self.from_thirty_day
    }

    pub fn total(&self) -> u32 {
        self.recycled() + self.from_new
    }
}

const BUCKETS: [Bucket; 3] = [Bucket::Yesterday, Bucket::SevenDay, Bucket::ThirtyDay];

/// Gather failed questions from the last 30 days, restricted to `operations`.
///
/// The operation is read from the operator in each question's text; records
/// whose text cannot be parsed are skipped.
pub fn collect_failed_pools(
    history: &[TestResult],
    operations: &OperationSet,
    now: DateTime<Utc>,
) -> FailedPools {
    let mut ordered: Vec<&TestResult> = history.iter().collect();
    ordered.sort_by_key(|r| r.completed_at);

    let mut pools = FailedPools::default();
    for result in ordered {
        let Some(bucket) = Bucket::for_age(now - result.completed_at) else {
            continue;
        };
        for failed in &result.failed_questions {
            let in_selection = Operation::from_question_text(&failed.question_text)
                .is_some_and(|op| operations.contains(op));
            if !in_selection {
                continue;
            }
            match recycled_question(&failed.question_text, failed.correct_answer) {
                Some(question) => pools.get_mut(bucket).push(question),
                None => tracing::debug!(
                    text = %failed.question_text,
                    "skipping unparseable failed question"
                ),
            }
        }
    }
    pools
}

/// Decide the split for a test of `total` questions given the failure pools.
pub fn plan_from_pools(total: u32, pools: &FailedPools) -> AllocationPlan {
    if pools.is_empty() {
        return AllocationPlan::all_new(total);
    }

    let clamp = |bucket: Bucket| {
        let available = u32::try_from(pools.get(bucket).len()).unwrap_or(u32::MAX);
        bucket.desired(total).min(available)
    };

    let from_yesterday = clamp(Bucket::Yesterday);
    let from_seven_day = clamp(Bucket::SevenDay);
    let from_thirty_day = clamp(Bucket::ThirtyDay);

    AllocationPlan {
        from_yesterday,
        from_seven_day,
        from_thirty_day,
        from_new: total - from_yesterday - from_seven_day - from_thirty_day,
    }
}

/// Collect pools from `history` and plan a test of `total` questions.
pub fn plan(
    total: u32,
    history: &[TestResult],
    operations: &OperationSet,
    now: DateTime<Utc>,
) -> AllocationPlan {
    plan_from_pools(total, &collect_failed_pools(history, operations, now))
}

/// Fill `plan` with recycled and fresh questions and shuffle the batch.
///
/// Recycled questions are sampled with replacement from their bucket. Fresh
/// questions never repeat a text already in the batch unless the generator
/// exhausts its retries. The result always holds `config.total_questions`
/// questions.
pub fn build_question_set<R: Rng + ?Sized>(
    rng: &mut R,
    generator: &FactGenerator,
    config: &QuizConfig,
    pools: &FailedPools,
    plan: &AllocationPlan,
) -> Vec<Question> {
    let total = config.total_questions as usize;
    let mut questions = Vec::with_capacity(total);

    for bucket in BUCKETS {
        let pool = pools.get(bucket);
        for _ in 0..plan.from_bucket(bucket) {
            if let Some(question) = pool.choose(rng) {
                questions.push(question.clone());
            }
        }
    }

    let mut texts: HashSet<String> = questions.iter().map(|q| q.text.clone()).collect();
    let operations = if config.operations.is_empty() {
        Operation::ALL.to_vec()
    } else {
        config.operations.to_vec()
    };
    let fresh = |rng: &mut R, texts: &mut HashSet<String>| {
        let operation = *operations.choose(rng).unwrap_or(&Operation::Add);
        let question = generator.generate(rng, operation, config.range_x, config.range_y, texts);
        texts.insert(question.text.clone());
        question
    };

    for _ in 0..plan.from_new {
        questions.push(fresh(&mut *rng, &mut texts));
    }

    if questions.len() < total {
        tracing::warn!(
            have = questions.len(),
            want = total,
            "question set short of plan, topping up with fresh questions"
        );
        while questions.len() < total {
            questions.push(fresh(&mut *rng, &mut texts));
        }
    }

    questions.shuffle(rng);
    questions
}
