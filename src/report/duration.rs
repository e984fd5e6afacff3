//! Human-readable duration strings for the report.

use chrono::TimeDelta;

const SECONDS_PER_DAY: i64 = 24 * 3600;
const DAYS_PER_YEAR: i64 = 365;

/// Which components a formatted duration carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFormat {
    /// `HHh MMm SSs`; hours keep counting past 24.
    Clock,
    /// `DDd HHh MMm SSs`
    Days,
    /// Like `Days`, prefixed with `Ny ` once the duration reaches a year.
    Years,
}

/// Format `duration` for display.
///
/// # Examples
///
/// ```text
/// 30 minutes, Days   -> "00d 00h 30m 00s"
/// 26 hours, Clock    -> "26h 00m 00s"
/// 400 days, Years    -> "1y 35d 00h 00m 00s"
/// ```
pub fn format_duration(duration: TimeDelta, format: DurationFormat) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs() as i64;

    let seconds = total % 60;
    let minutes = (total / 60) % 60;

    if format == DurationFormat::Clock {
        let hours = total / 3600;
        return format!("{}{:02}h {:02}m {:02}s", sign, hours, minutes, seconds);
    }

    let hours = (total % SECONDS_PER_DAY) / 3600;
    let mut days = total / SECONDS_PER_DAY;
    let clock = format!("{:02}h {:02}m {:02}s", hours, minutes, seconds);

    if format == DurationFormat::Years && days >= DAYS_PER_YEAR {
        let years = days / DAYS_PER_YEAR;
        days %= DAYS_PER_YEAR;
        return format!("{}{}y {:02}d {}", sign, years, days, clock);
    }
    format!("{}{:02}d {}", sign, days, clock)
}
