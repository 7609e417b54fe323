//!  Storage covers the two on-disk formats pomo deals with:
//!   - The session log written by the timer, one comma separated line per finished session
//!     ([session_log]).
//!   - The analysis log read by `--analyse`, three significant lines per session: task, start
//!     timestamp, end timestamp ([record_parser]).

pub mod entities;
pub mod error;
pub mod record_parser;
pub mod session_log;
