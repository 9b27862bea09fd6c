//! Quiz configuration and validation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Operation, OperationSet, Range};

/// Settings for one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Bounds for the left operand (the divisor for division).
    #[serde(default)]
    pub range_x: Range,
    /// Bounds for the right operand (the quotient for division).
    #[serde(default)]
    pub range_y: Range,
    /// Number of questions in the quiz.
    #[serde(default = "default_total_questions")]
    pub total_questions: u32,
    /// Operations to draw questions from.
    #[serde(default = "OperationSet::all")]
    pub operations: OperationSet,
}

fn default_total_questions() -> u32 {
    10
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            range_x: Range::default(),
            range_y: Range::default(),
            total_questions: default_total_questions(),
            operations: OperationSet::all(),
        }
    }
}

impl QuizConfig {
    /// Check the configuration. The first violated rule is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.range_x.is_valid() {
            return Err(ConfigError::InvalidRangeX {
                min: self.range_x.min,
                max: self.range_x.max,
            });
        }
        if !self.range_y.is_valid() {
            return Err(ConfigError::InvalidRangeY {
                min: self.range_y.min,
                max: self.range_y.max,
            });
        }
        if self.total_questions < 1 {
            return Err(ConfigError::NoQuestions);
        }
        if self.operations.is_empty() {
            return Err(ConfigError::NoOperations);
        }
        Ok(())
    }
}

/// Raw form values, exactly as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ConfigForm {
    pub x_min: String,
    pub x_max: String,
    pub y_min: String,
    pub y_max: String,
    pub total_questions: String,
    pub operations: Vec<String>,
}

impl ConfigForm {
    /// Parse and validate the form into a [`QuizConfig`].
    pub fn parse(&self) -> Result<QuizConfig, ConfigError> {
        let x_min = parse_field("x_min", &self.x_min)?;
        let x_max = parse_field("x_max", &self.x_max)?;
        let y_min = parse_field("y_min", &self.y_min)?;
        let y_max = parse_field("y_max", &self.y_max)?;

        let total = self.total_questions.trim();
        let total_questions: i64 = total.parse().map_err(|_| ConfigError::NotANumber {
            field: "total_questions",
            value: self.total_questions.clone(),
        })?;
        if total_questions < 1 {
            return Err(ConfigError::NoQuestions);
        }
        let total_questions =
            u32::try_from(total_questions).map_err(|_| ConfigError::NotANumber {
                field: "total_questions",
                value: self.total_questions.clone(),
            })?;

        let operations = self
            .operations
            .iter()
            .map(|name| {
                name.parse::<Operation>()
                    .map_err(|_| ConfigError::UnknownOperation(name.clone()))
            })
            .collect::<Result<OperationSet, _>>()?;

        let config = QuizConfig {
            range_x: Range::new(x_min, x_max),
            range_y: Range::new(y_min, y_max),
            total_questions,
            operations,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<&QuizConfig> for ConfigForm {
    fn from(config: &QuizConfig) -> Self {
        Self {
            x_min: config.range_x.min.to_string(),
            x_max: config.range_x.max.to_string(),
            y_min: config.range_y.min.to_string(),
            y_max: config.range_y.max.to_string(),
            total_questions: config.total_questions.to_string(),
            operations: config.operations.iter().map(|op| op.to_string()).collect(),
        }
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<i32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(x: (&str, &str), y: (&str, &str), total: &str, ops: &[&str]) -> ConfigForm {
        ConfigForm {
            x_min: x.0.into(),
            x_max: x.1.into(),
            y_min: y.0.into(),
            y_max: y.1.into(),
            total_questions: total.into(),
            operations: ops.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = QuizConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_questions, 10);
        assert_eq!(config.operations.len(), 4);
    }

    #[test]
    fn rejects_inverted_or_empty_ranges() {
        let mut config = QuizConfig::default();
        config.range_x = Range::new(5, 5);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRangeX { min: 5, max: 5 })
        );

        let mut config = QuizConfig::default();
        config.range_y = Range::new(10, 1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRangeY { min: 10, max: 1 })
        );
    }

    #[test]
    fn rejects_zero_questions_and_no_operations() {
        let mut config = QuizConfig::default();
        config.total_questions = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoQuestions));

        let mut config = QuizConfig::default();
        config.operations = OperationSet::default();
        assert_eq!(config.validate(), Err(ConfigError::NoOperations));
    }

    #[test]
    fn form_parses_valid_input() {
        let config = form(("1", "12"), (" 2 ", "9"), "20", &["add", "×"])
            .parse()
            .unwrap();
        assert_eq!(config.range_x, Range::new(1, 12));
        assert_eq!(config.range_y, Range::new(2, 9));
        assert_eq!(config.total_questions, 20);
        assert!(config.operations.contains(Operation::Multiply));
        assert!(!config.operations.contains(Operation::Divide));
    }

    #[test]
    fn form_reports_non_numeric_fields() {
        let err = form(("one", "10"), ("1", "10"), "10", &["add"])
            .parse()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotANumber { field: "x_min", .. }));

        let err = form(("1", "10"), ("1", "10"), "lots", &["add"])
            .parse()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotANumber {
                field: "total_questions",
                ..
            }
        ));
    }

    #[test]
    fn form_reports_negative_total_and_unknown_operation() {
        let err = form(("1", "10"), ("1", "10"), "-3", &["add"])
            .parse()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoQuestions);

        let err = form(("1", "10"), ("1", "10"), "5", &["power"])
            .parse()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownOperation("power".into()));
    }

    #[test]
    fn form_roundtrips_through_config() {
        let config = QuizConfig::default();
        let parsed = ConfigForm::from(&config).parse().unwrap();
        assert_eq!(parsed, config);
    }
}
