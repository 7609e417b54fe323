use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::utils::time::CLOCK_FORMAT;

/// One completed pomodoro as read back from a log. `duration` is the configured task duration,
/// not `end - start`: a session always counts for its nominal length no matter how long the
/// user took to confirm it.
#[derive(PartialEq, Eq, Debug, Serialize, Clone)]
pub struct SessionRecord {
    pub task: Arc<str>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(with = "duration_ser")]
    pub duration: Duration,
}

impl SessionRecord {
    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }
}

/// A finished session as the timer appends it to `pomo.log`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SessionLogEntry {
    pub label: Arc<str>,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl SessionLogEntry {
    /// Wall time actually spent, including the wait for the user to stop.
    pub fn elapsed(&self) -> Duration {
        self.end - self.start
    }

    /// `duration,label,startEpoch,endEpoch,HH:MM:SS,HH:MM:SS` terminated by a newline. The label
    /// is written as is, commas included.
    pub fn to_log_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}\n",
            self.elapsed().num_seconds(),
            self.label,
            self.start.timestamp(),
            self.end.timestamp(),
            self.start.format(CLOCK_FORMAT),
            self.end.format(CLOCK_FORMAT),
        )
    }
}

pub(crate) mod duration_ser {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, TimeZone};

    use super::SessionLogEntry;

    #[test]
    fn test_log_line_layout() {
        let start = Local.timestamp_opt(1_700_000_000, 0).unwrap();
        let entry = SessionLogEntry {
            label: "Write spec".into(),
            start,
            end: start + Duration::seconds(1530),
        };

        let line = entry.to_log_line();
        let fields = line.trim_end_matches('\n').split(',').collect::<Vec<_>>();

        assert!(line.ends_with('\n'));
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], "1530");
        assert_eq!(fields[1], "Write spec");
        assert_eq!(fields[2], "1700000000");
        assert_eq!(fields[3], "1700001530");
        assert_eq!(fields[4], start.format("%H:%M:%S").to_string());
        assert_eq!(
            fields[5],
            (start + Duration::seconds(1530)).format("%H:%M:%S").to_string()
        );
    }

    #[test]
    fn test_log_line_keeps_commas_in_label() {
        let start = Local.timestamp_opt(1_700_000_000, 0).unwrap();
        let entry = SessionLogEntry {
            label: "review, then merge".into(),
            start,
            end: start,
        };

        assert_eq!(entry.to_log_line().split(',').count(), 7);
    }
}
