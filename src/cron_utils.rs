//! Cron schedule parsing and next-run computation for the background jobs.

use chrono::{DateTime, Utc};
use croner::Cron;
use regex::Regex;

/// Parse a human-friendly schedule string into a 5-field cron expression.
/// Supports keyword shortcuts, `daily at`/`weekly on` forms, and raw cron
/// pass-through.
pub fn parse_schedule(input: &str) -> anyhow::Result<String> {
    let input = input.trim();

    // Simple keyword shortcuts
    match input.to_lowercase().as_str() {
        "hourly" => return Ok("0 * * * *".to_string()),
        "daily" => return Ok("0 0 * * *".to_string()),
        "weekly" => return Ok("0 0 * * 0".to_string()),
        "monthly" => return Ok("0 0 1 * *".to_string()),
        _ => {}
    }

    // "daily at 9am" / "daily at 14:30" / "daily at 2:30pm"
    let re_daily = Regex::new(r"(?i)^daily\s+at\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)?$")?;
    if let Some(caps) = re_daily.captures(input) {
        let (hour, minute) = parse_time_captures(&caps, 1, 2, 3)?;
        return Ok(format!("{} {} * * *", minute, hour));
    }

    // "weekly on sunday" / "weekly on monday at 9am"
    let re_weekly = Regex::new(
        r"(?i)^weekly\s+on\s+(sunday|monday|tuesday|wednesday|thursday|friday|saturday)(?:\s+at\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)?)?$",
    )?;
    if let Some(caps) = re_weekly.captures(input) {
        let dow = weekday_number(&caps[1]);
        let (hour, minute) = if caps.get(2).is_some() {
            parse_time_captures(&caps, 2, 3, 4)?
        } else {
            (0, 0)
        };
        return Ok(format!("{} {} * * {}", minute, hour, dow));
    }

    // Raw cron pass-through: validate with croner
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() == 5 {
        input
            .parse::<Cron>()
            .map_err(|e| anyhow::anyhow!("Invalid cron expression '{}': {}", input, e))?;
        return Ok(input.to_string());
    }

    anyhow::bail!(
        "Unrecognized schedule format '{}'. Use shortcuts (e.g. 'daily', 'weekly on sunday', 'daily at 9am') or a 5-field cron expression.",
        input
    )
}

fn weekday_number(name: &str) -> u32 {
    match name.to_ascii_lowercase().as_str() {
        "monday" => 1,
        "tuesday" => 2,
        "wednesday" => 3,
        "thursday" => 4,
        "friday" => 5,
        "saturday" => 6,
        _ => 0,
    }
}

/// Extract hour and minute from regex captures with optional AM/PM.
fn parse_time_captures(
    caps: &regex::Captures,
    hour_idx: usize,
    minute_idx: usize,
    ampm_idx: usize,
) -> anyhow::Result<(u32, u32)> {
    let mut hour: u32 = caps
        .get(hour_idx)
        .map_or(Ok(0), |m| m.as_str().parse())?;
    let minute: u32 = caps
        .get(minute_idx)
        .map_or(Ok(0), |m| m.as_str().parse())?;
    if let Some(ampm) = caps.get(ampm_idx) {
        let ampm = ampm.as_str().to_lowercase();
        if ampm == "pm" && hour < 12 {
            hour += 12;
        } else if ampm == "am" && hour == 12 {
            hour = 0;
        }
    }
    if hour > 23 {
        anyhow::bail!("Hour must be between 0 and 23");
    }
    if minute > 59 {
        anyhow::bail!("Minute must be between 0 and 59");
    }
    Ok((hour, minute))
}

/// Compute the next occurrence of a cron expression after now.
pub fn compute_next_run(cron_expr: &str) -> anyhow::Result<DateTime<Utc>> {
    compute_next_run_after(cron_expr, Utc::now())
}

/// Compute the next occurrence of a cron expression strictly after `after`.
pub fn compute_next_run_after(
    cron_expr: &str,
    after: DateTime<Utc>,
) -> anyhow::Result<DateTime<Utc>> {
    let cron: Cron = cron_expr
        .parse()
        .map_err(|e| anyhow::anyhow!("Failed to parse cron '{}': {}", cron_expr, e))?;

    cron.find_next_occurrence(&after, false)
        .map_err(|e| anyhow::anyhow!("No next occurrence for '{}': {}", cron_expr, e))
}
