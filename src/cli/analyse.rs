use std::{io::Write, path::Path};

use anyhow::Result;
use chrono::Duration;
use tracing::info;

use crate::{
    storage::{record_parser::parse_log, session_log::read_log},
    utils::clock::Clock,
};

use super::output::{analysis::aggregate, render_report, render_truncation_warning};

/// Command to process `--analyse`. Reads the log at `path` and writes a report of it into
/// `out`. Nothing is written when the log can't be read or contains an invalid timestamp.
pub async fn process_analyse_command(
    path: &Path,
    task_duration: Duration,
    json: bool,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let content = read_log(path).await?;
    let parsed = parse_log(&content, task_duration)?;

    let today = clock.today();
    let summary = aggregate(&parsed.records, today);
    info!(
        "Analysed {} sessions from {path:?} relative to {today}",
        parsed.records.len()
    );

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    if let Some(truncation) = &parsed.truncation {
        render_truncation_warning(truncation, out)?;
    }
    render_report(&summary, today, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
    use tempfile::{tempdir, NamedTempFile};
    use tokio::time::Instant;

    use crate::{storage::error::LogError, utils::clock::Clock};

    use super::process_analyse_command;

    const TASK_DURATION: Duration = Duration::seconds(1500);

    /// Always reports noon of a fixed day.
    struct FixedClock(NaiveDate);

    #[async_trait]
    impl Clock for FixedClock {
        fn time(&self) -> DateTime<Local> {
            Local
                .from_local_datetime(&self.0.and_hms_opt(12, 0, 0).unwrap())
                .earliest()
                .unwrap()
        }

        fn today(&self) -> NaiveDate {
            self.0
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    fn write_log(content: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    const LOG: &str = "\
# pomo history
Write spec
2024/01/01 09:00:00
2024/01/01 09:25:00

Write spec
2024/01/02 09:00:00
2024/01/02 09:25:00
";

    #[tokio::test]
    async fn test_analyse_text_report() -> Result<()> {
        let file = write_log(LOG)?;
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let mut out = Vec::new();
        process_analyse_command(file.path(), TASK_DURATION, false, &clock, &mut out).await?;
        let out = String::from_utf8(out)?;

        assert!(out.starts_with("Summary: all tasks [2 pomos]\n"));
        assert!(out.contains("Summary: today's tasks [1 pomos]\n"));
        assert!(out.contains("Total time for today: 0:25:00\n"));
        assert!(out.contains("Total time: 0:50:00\n"));
        assert!(out.ends_with("Longest task: Write spec at 0:50:00\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_analyse_uses_configured_duration() -> Result<()> {
        let file = write_log(LOG)?;
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let mut out = Vec::new();
        process_analyse_command(file.path(), Duration::seconds(60), false, &clock, &mut out)
            .await?;
        let out = String::from_utf8(out)?;

        assert!(out.contains("Total time: 0:02:00\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_analyse_warns_about_truncation() -> Result<()> {
        let file = write_log(&format!("{LOG}Half written\n"))?;
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let mut out = Vec::new();
        process_analyse_command(file.path(), TASK_DURATION, false, &clock, &mut out).await?;
        let out = String::from_utf8(out)?;

        assert!(out.starts_with(
            "Log file contains invalid number of lines (7, ignoring the last 1).\nTrying to proceed anyway.\nSummary: all tasks [2 pomos]\n"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_analyse_json() -> Result<()> {
        let file = write_log(LOG)?;
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let mut out = Vec::new();
        process_analyse_command(file.path(), TASK_DURATION, true, &clock, &mut out).await?;
        let value: serde_json::Value = serde_json::from_slice(&out)?;

        assert_eq!(value["all_tasks"][0]["task"], "Write spec");
        assert_eq!(value["all_tasks"][0]["count"], 2);
        assert_eq!(value["today_tasks"][0]["count"], 1);
        assert_eq!(value["total_today"], 1500);
        assert_eq!(value["grand_total"], 3000);
        assert_eq!(value["longest"]["name"], "Write spec");
        assert_eq!(value["longest"]["duration"], 3000);
        assert_eq!(value["last_days"]["0"], 1);
        assert_eq!(value["last_days"]["1"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_analyse_bad_timestamp_writes_nothing() -> Result<()> {
        let file = write_log("Write spec\n2024/01/01 9am\n2024/01/01 09:25:00\n")?;
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let mut out = Vec::new();
        let error = process_analyse_command(file.path(), TASK_DURATION, false, &clock, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<LogError>(),
            Some(LogError::TimestampParse { line: 2, .. })
        ));
        assert!(out.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_analyse_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pomo.log");
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let mut out = Vec::new();
        let error = process_analyse_command(&path, TASK_DURATION, false, &clock, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<LogError>(),
            Some(LogError::FileUnreadable { .. })
        ));
        assert!(format!("{error:#}")
            .starts_with(&format!("Cannot load \"{}\" for analysis: ", path.display())));
        assert!(out.is_empty());
        Ok(())
    }
}
