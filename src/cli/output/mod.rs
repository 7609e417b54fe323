pub mod analysis;

use std::io::{self, Write};

use chrono::{Duration, NaiveDate};

use crate::{
    storage::record_parser::Truncation,
    utils::time::{date_to_day_label, format_duration},
};

use self::analysis::{total_count, SessionAggregate, TaskCount, RECENT_DAYS};

/// Writes the text report: task summaries, recent days and time totals, in that order.
pub fn render_report(
    aggregate: &SessionAggregate,
    today: NaiveDate,
    out: &mut impl Write,
) -> io::Result<()> {
    render_tasks(out, &aggregate.all_tasks, "Summary: all tasks")?;
    render_tasks(out, &aggregate.today_tasks, "Summary: today's tasks")?;

    render_header(out, "Last 5 days")?;
    for days_ago in (0..=RECENT_DAYS).rev() {
        if let Some(count) = aggregate.last_days.get(&days_ago) {
            let date = today - Duration::days(days_ago as i64);
            writeln!(out, "{} [{count}]", date_to_day_label(date))?;
        }
    }

    writeln!(out)?;
    render_header(out, "Time summary")?;
    writeln!(
        out,
        "Total time for today: {}",
        format_duration(aggregate.total_today)
    )?;
    writeln!(out, "Total time: {}", format_duration(aggregate.grand_total))?;
    writeln!(
        out,
        "Longest task: {} at {}",
        aggregate.longest.name,
        format_duration(aggregate.longest.duration)
    )?;
    Ok(())
}

/// Tells the user that the end of the log was ignored.
pub fn render_truncation_warning(truncation: &Truncation, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "Log file contains invalid number of lines ({}, ignoring the last {}).",
        truncation.significant_lines, truncation.discarded
    )?;
    writeln!(out, "Trying to proceed anyway.")
}

fn render_tasks(out: &mut impl Write, tasks: &[TaskCount], title: &str) -> io::Result<()> {
    let header = format!("{title} [{} pomos]", total_count(tasks));
    render_header(out, &header)?;
    for task in tasks {
        writeln!(out, "{} [{}]", task.task, task.count)?;
    }
    writeln!(out)
}

fn render_header(out: &mut impl Write, header: &str) -> io::Result<()> {
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.chars().count()))
}
