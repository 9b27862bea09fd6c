//! Read-side views over the history: per-day summaries and test details.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{percentage, FailedQuestionRecord, TestResult};

/// Number of past calendar days covered by [`recent_days`], besides today.
pub const RECENT_DAYS: i64 = 7;

/// All tests taken on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// `true` if any run that day passed.
    pub passed: bool,
    /// Runs in the order they were taken.
    pub runs: Vec<TestResult>,
}

impl DaySummary {
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

/// Results since the start of the day [`RECENT_DAYS`] ago, grouped by day in
/// `tz`, most recent day first.
pub fn recent_days<Tz: TimeZone>(
    history: &[TestResult],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<DaySummary> {
    let first_day = now.with_timezone(tz).date_naive() - Duration::days(RECENT_DAYS);

    let mut by_day: BTreeMap<NaiveDate, Vec<TestResult>> = BTreeMap::new();
    for result in history {
        let day = result.completed_at.with_timezone(tz).date_naive();
        if day >= first_day {
            by_day.entry(day).or_default().push(result.clone());
        }
    }

    by_day
        .into_iter()
        .rev()
        .map(|(date, mut runs)| {
            runs.sort_by_key(|r| r.completed_at);
            DaySummary {
                date,
                passed: runs.iter().any(|r| r.passed),
                runs,
            }
        })
        .collect()
}

/// Everything shown for a single test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDetail {
    pub id: String,
    pub completed_at: DateTime<Utc>,
    pub passed: bool,
    pub score: u32,
    pub max_score: u32,
    /// Percentage rounded to the nearest integer.
    pub percentage: u32,
    pub failed_questions: Vec<FailedQuestionRecord>,
}

impl TestDetail {
    pub fn from_result(result: &TestResult) -> Self {
        Self {
            id: result.id.clone(),
            completed_at: result.completed_at,
            passed: result.passed,
            score: result.score,
            max_score: result.max_score(),
            percentage: percentage(result.score, result.total_questions).round() as u32,
            failed_questions: result.failed_questions.clone(),
        }
    }

    /// No question was failed.
    pub fn is_perfect(&self) -> bool {
        self.failed_questions.is_empty()
    }
}

/// Look up a result by id.
pub fn find_result<'a>(history: &'a [TestResult], id: &str) -> Option<&'a TestResult> {
    history.iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn result(id: &str, at: DateTime<Utc>, score: u32) -> TestResult {
        TestResult::new(id, at, score, 10, vec![])
    }

    #[test]
    fn groups_by_day_most_recent_first() {
        let history = vec![
            result("a", now() - Duration::hours(1), 50),
            result("b", now() - Duration::days(2), 90),
            result("c", now() - Duration::hours(3), 90),
            result("d", now() - Duration::days(2) - Duration::hours(1), 40),
        ];
        let days = recent_days(&history, now(), &Utc);
        assert_eq!(days.len(), 2);

        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert!(days[0].passed);
        let ids: Vec<&str> = days[0].runs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        assert_eq!(days[1].run_count(), 2);
        assert!(days[1].passed);
    }

    #[test]
    fn day_without_a_pass_is_failed() {
        let history = vec![result("a", now(), 10), result("b", now(), 70)];
        let days = recent_days(&history, now(), &Utc);
        assert_eq!(days.len(), 1);
        assert!(!days[0].passed);
    }

    #[test]
    fn window_starts_at_midnight_seven_days_ago() {
        let history = vec![
            // 00:30 on the first day of the window
            result("in", Utc.with_ymd_and_hms(2026, 10, 11, 0, 30, 0).unwrap(), 80),
            // 23:30 the day before
            result("out", Utc.with_ymd_and_hms(2026, 10, 10, 23, 30, 0).unwrap(), 80),
        ];
        let days = recent_days(&history, now(), &Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].runs[0].id, "in");
    }

    #[test]
    fn grouping_respects_time_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // 20:00 UTC on the 17th is already the 18th in Tokyo.
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 20, 0, 0).unwrap();
        let days = recent_days(&[result("a", at, 80)], now(), &tokyo);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    }

    #[test]
    fn detail_rounds_percentage() {
        let r = TestResult::new("x", now(), 20, 3, vec![]);
        let detail = TestDetail::from_result(&r);
        assert_eq!(detail.max_score, 30);
        assert_eq!(detail.percentage, 67);
        assert!(!detail.passed);
        assert!(detail.is_perfect());
    }

    #[test]
    fn detail_of_oversized_result() {
        let r = TestResult::new("big", now(), 0, 500_000_000, vec![]);
        let detail = TestDetail::from_result(&r);
        assert_eq!(detail.max_score, u32::MAX);
        assert_eq!(detail.percentage, 0);
    }

    #[test]
    fn find_by_id() {
        let history = vec![result("a", now(), 10), result("b", now(), 20)];
        assert_eq!(find_result(&history, "b").unwrap().score, 20);
        assert!(find_result(&history, "z").is_none());
    }
}
