use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a session log for analysis. Any of them aborts the whole report.
#[derive(Error, Debug)]
pub enum LogError {
    /// A start or end timestamp does not follow `YYYY/MM/DD HH:MM:SS`.
    #[error("Invalid timestamp {value:?} on line {line}, expected YYYY/MM/DD HH:MM:SS")]
    TimestampParse {
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Cannot load \"{}\" for analysis", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
