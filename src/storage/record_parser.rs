use chrono::{Duration, NaiveDateTime};
use tracing::{debug, instrument, warn};

use crate::utils::time::LOG_TIMESTAMP_FORMAT;

use super::{entities::SessionRecord, error::LogError};

/// Every session takes exactly this many significant lines: task, start, end.
const LINES_PER_RECORD: usize = 3;

/// Describes the incomplete record dropped from the end of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub significant_lines: usize,
    pub discarded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLog {
    pub records: Vec<SessionRecord>,
    /// Set when the significant line count wasn't a multiple of 3. Parsing still succeeds, the
    /// trailing lines are ignored.
    pub truncation: Option<Truncation>,
}

/// Parses the whole content of a log.
pub fn parse_log(content: &str, task_duration: Duration) -> Result<ParsedLog, LogError> {
    parse_records(content.lines(), task_duration)
}

/// Turns raw lines into session records, in file order.
///
/// Lines are trimmed, blank lines and `#` comments are skipped anywhere. The remaining lines are
/// read in non-overlapping groups of 3. Any timestamp that doesn't follow
/// [LOG_TIMESTAMP_FORMAT] fails the whole parse.
#[instrument(skip(lines))]
pub fn parse_records<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    task_duration: Duration,
) -> Result<ParsedLog, LogError> {
    let significant = lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect::<Vec<_>>();

    let discarded = significant.len() % LINES_PER_RECORD;
    let truncation = if discarded != 0 {
        warn!(
            "Log file contains invalid number of lines ({}), ignoring the last {discarded}",
            significant.len()
        );
        Some(Truncation {
            significant_lines: significant.len(),
            discarded,
        })
    } else {
        None
    };

    let records = significant
        .chunks_exact(LINES_PER_RECORD)
        .map(|chunk| {
            let (_, task) = chunk[0];
            Ok(SessionRecord {
                task: task.into(),
                start: parse_timestamp(chunk[1])?,
                end: parse_timestamp(chunk[2])?,
                duration: task_duration,
            })
        })
        .collect::<Result<Vec<_>, LogError>>()?;

    debug!("Parsed {} records", records.len());

    Ok(ParsedLog {
        records,
        truncation,
    })
}

fn parse_timestamp((line, value): (usize, &str)) -> Result<NaiveDateTime, LogError> {
    NaiveDateTime::parse_from_str(value, LOG_TIMESTAMP_FORMAT).map_err(|source| {
        LogError::TimestampParse {
            line,
            value: value.to_owned(),
            source,
        }
    })
}
