//! Time suppression
//!
//! Decides whether an otherwise eligible task must wait: either because it is
//! due too far ahead, or because its content carries a `start=` directive
//! that has not been reached yet.
//!
//! Two directive forms are understood:
//! - `start=<DATE>` in the configured date format (default `%d-%m-%Y`)
//! - `start=due-<N>d` / `start=due-<N>w`, relative to the due date

use crate::error::DirectiveError;
use crate::tasks::Due;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Default format of absolute start dates
pub const DEFAULT_START_DATE_FORMAT: &str = "%d-%m-%Y";

const START_TOKEN: &str = "start=";
const RELATIVE_PREFIX: &str = "due-";

/// Why a task is held back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suppression {
    /// Due more than the hide-future threshold ahead
    FarFuture { due: NaiveDate },
    /// A start directive has not been reached
    NotStarted { start: NaiveDateTime },
}

/// Result of evaluating one task
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub suppression: Option<Suppression>,
    /// Directive problems, reported as warnings by the caller
    pub warnings: Vec<DirectiveError>,
}

impl Evaluation {
    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_some()
    }
}

/// Configured suppression thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionRules {
    /// Hide tasks due more than this many days ahead; 0 disables
    pub hide_future_days: u32,
    /// chrono format for `start=<DATE>`
    pub start_date_format: String,
}

impl Default for SuppressionRules {
    fn default() -> Self {
        Self {
            hide_future_days: 0,
            start_date_format: DEFAULT_START_DATE_FORMAT.to_string(),
        }
    }
}

impl SuppressionRules {
    /// Evaluate whether a task must be held back at `now`
    ///
    /// A malformed directive never suppresses; it is returned as a warning and
    /// the remaining rules still apply.
    ///
    /// # Arguments
    /// * `content` - Task content, searched for `start=` tokens
    /// * `due` - Due information of the task, if any
    /// * `now` - Current local time
    pub fn evaluate(&self, content: &str, due: Option<&Due>, now: NaiveDateTime) -> Evaluation {
        let mut evaluation = Evaluation::default();

        if let Some(due) = due
            && self.hides_future(due.date, now.date())
        {
            evaluation.suppression = Some(Suppression::FarFuture { due: due.date });
            return evaluation;
        }

        let directives: Vec<&str> = content
            .split_whitespace()
            .filter_map(|token| token.strip_prefix(START_TOKEN))
            .collect();

        let Some(first) = directives.first() else {
            return evaluation;
        };
        if directives.len() > 1 {
            evaluation
                .warnings
                .push(DirectiveError::Ambiguous(directives.len()));
        }

        match self.start_of(first, due) {
            Ok(start) if now < start => {
                evaluation.suppression = Some(Suppression::NotStarted { start });
            }
            Ok(_) => {}
            Err(e) => evaluation.warnings.push(e),
        }
        evaluation
    }

    /// Whether a due date lies beyond the hide-future threshold
    pub fn hides_future(&self, due: NaiveDate, today: NaiveDate) -> bool {
        self.hide_future_days > 0 && (due - today).num_days() > i64::from(self.hide_future_days)
    }

    /// Moment a `start=` directive value points at
    fn start_of(&self, value: &str, due: Option<&Due>) -> Result<NaiveDateTime, DirectiveError> {
        match value.strip_prefix(RELATIVE_PREFIX) {
            Some(offset) => {
                let offset = parse_offset(offset)
                    .ok_or_else(|| DirectiveError::BadRelativeStart(value.to_string()))?;
                let due = due.ok_or_else(|| DirectiveError::MissingDue(value.to_string()))?;
                Ok(due.moment() - offset)
            }
            None => NaiveDate::parse_from_str(value, &self.start_date_format)
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
                .map_err(|_| DirectiveError::BadStartDate {
                    text: value.to_string(),
                    format: self.start_date_format.clone(),
                }),
        }
    }
}

/// Parse `<N>d` or `<N>w`
fn parse_offset(text: &str) -> Option<Duration> {
    let unit = text.chars().last()?;
    let amount: i64 = text[..text.len() - unit.len_utf8()].parse().ok()?;
    if amount < 0 {
        return None;
    }
    match unit {
        'd' => Duration::try_days(amount),
        'w' => Duration::try_weeks(amount),
        _ => None,
    }
}
