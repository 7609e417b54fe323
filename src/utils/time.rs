use std::path::PathBuf;

use chrono::{Datelike, Duration, NaiveDate};

/// Timestamp layout used by the session log read during analysis.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Clock layout used for the start/end columns of the session log.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Formats a duration as `H:MM:SS`. Whole days are split off in front, so 26 hours becomes
/// `1 day, 2:00:00`.
pub fn format_duration(v: Duration) -> String {
    let total = v.num_seconds();
    let (sign, total) = if total < 0 { ("-", -total) } else { ("", total) };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    match days {
        0 => format!("{sign}{hours}:{minutes:02}:{seconds:02}"),
        1 => format!("{sign}1 day, {hours}:{minutes:02}:{seconds:02}"),
        d => format!("{sign}{d} days, {hours}:{minutes:02}:{seconds:02}"),
    }
}

/// This is the standard way of converting a date to a string in reports.
pub fn date_to_day_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Relative directory used when logs are split by day, e.g. `2024/03/07`.
pub fn date_to_split_dir(date: NaiveDate) -> PathBuf {
    [
        format!("{:04}", date.year()),
        format!("{:02}", date.month()),
        format!("{:02}", date.day()),
    ]
    .iter()
    .collect()
}
