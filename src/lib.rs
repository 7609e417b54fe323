//! Pomodoro timer that keeps a log of finished sessions and can summarize a log into a report of
//! pomodoros per task, per day and in total.

pub mod cli;
pub mod session;
pub mod storage;
pub mod utils;
