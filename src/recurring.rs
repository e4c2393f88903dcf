//! End-of-day shift for recurring tasks
//!
//! Completing a daily recurring task after midnight but before the user's
//! own end of day makes the service jump the due date to tomorrow, skipping
//! today. With an end-of-day hour configured, such a jump is moved back to
//! today.

use crate::tasks::Due;
use chrono::{NaiveDate, NaiveDateTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfDayShift {
    /// Hour (1-24) at which the user's day ends
    pub hour: u32,
}

impl EndOfDayShift {
    pub fn new(hour: u32) -> Self {
        Self { hour }
    }

    /// Whether `now` is still inside the previous day
    pub fn before_end_of_day(&self, now: NaiveDateTime) -> bool {
        self.hour > now.hour()
    }

    /// Date to move a recurring task back to, if it needs shifting
    ///
    /// # Arguments
    /// * `stored` - Due date seen in the previous cycle
    /// * `due` - Due information fetched this cycle
    /// * `now` - Current local time
    ///
    /// # Returns
    /// `Some(today)` if the stored date was at least one day overdue and the
    /// new date is exactly tomorrow, while still before the end of day
    pub fn shifted_due(&self, stored: NaiveDate, due: &Due, now: NaiveDateTime) -> Option<NaiveDate> {
        if !due.is_recurring || due.date == stored || !self.before_end_of_day(now) {
            return None;
        }

        let today = now.date();
        let days_overdue = (today - stored).num_days();
        let days_ahead = (due.date - today).num_days();

        (days_overdue >= 1 && days_ahead == 1).then_some(today)
    }
}
