//! Cycle date evaluation: pure classification of a goal against "today".
//!
//! All comparisons are calendar-day only. Dates arrive as `%Y-%m-%d` strings
//! from storage; an unparseable date is an error for that record and the
//! caller skips it.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::types::{ReminderFrequency, GOAL_DATE_FORMAT};

/// Days before the cycle end at which the end-of-cycle reminder fires.
/// Fixed lookback, independent of the reminder frequency; a missed
/// window is not caught up on a later run.
pub const REMINDER_LOOKBACK_DAYS: i64 = 3;

/// What a goal needs on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleAction {
    /// The cycle closed yesterday; roll the goal over.
    CycleEnded,
    /// Fixed three-days-before-end reminder.
    ReminderDueThreeDaysPrior,
    /// Frequency-based periodic reminder.
    ReminderDuePeriodic,
    NoAction,
}

/// Parse a stored goal date, rejecting anything outside the fixed format.
pub fn parse_goal_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), GOAL_DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid goal date '{}': {}", raw, e))
}

/// Classify a goal against `today`.
///
/// Precedence: `CycleEnded`, then `ReminderDueThreeDaysPrior`, then the
/// periodic cadence. The date-bound cases always win over a cadence match
/// landing on the same day.
pub fn classify(
    today: NaiveDate,
    start_date: &str,
    end_date_utc: &str,
    frequency: ReminderFrequency,
) -> anyhow::Result<CycleAction> {
    let start = parse_goal_date(start_date)?;
    let end = parse_goal_date(end_date_utc)?;

    // The cycle closes the day after the stated end date.
    if end + Duration::days(1) == today {
        return Ok(CycleAction::CycleEnded);
    }

    if end - Duration::days(REMINDER_LOOKBACK_DAYS) == today {
        return Ok(CycleAction::ReminderDueThreeDaysPrior);
    }

    // Periodic reminders only fire inside the cycle.
    if today < start || today > end {
        return Ok(CycleAction::NoAction);
    }

    let due = match frequency {
        ReminderFrequency::Weekly => today.weekday() == Weekday::Mon,
        ReminderFrequency::Biweekly => today.day() == 1 || today.day() == 16,
        ReminderFrequency::Monthly => today.day() == start.day(),
        ReminderFrequency::Quarterly => {
            today.day() == start.day() && months_between(start, today) % 3 == 0
        }
    };

    if due {
        Ok(CycleAction::ReminderDuePeriodic)
    } else {
        Ok(CycleAction::NoAction)
    }
}

/// Whole months elapsed from `from`'s month to `to`'s month, ignoring days.
fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}
