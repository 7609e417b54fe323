use std::{collections::BTreeMap, sync::Arc};

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::storage::entities::{duration_ser, SessionRecord};

/// Reported as the longest task when no task has accumulated any time.
pub const NO_LONGEST_TASK: &str = "No task longer than 0 minutes";

/// Number of days before today covered by the recent activity view. Today is day 0.
pub const RECENT_DAYS: u32 = 5;

/// Number of sessions and accumulated time of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskUsage {
    pub count: u32,
    #[serde(with = "duration_ser")]
    pub total_time: Duration,
}

impl TaskUsage {
    fn new() -> Self {
        Self {
            count: 0,
            total_time: Duration::zero(),
        }
    }

    fn add_session(&mut self, duration: Duration) {
        self.count += 1;
        self.total_time += duration;
    }

    fn merge(&mut self, other: &TaskUsage) {
        self.count += other.count;
        self.total_time += other.total_time;
    }
}

/// Sessions grouped by task name and the date they ended, in first-occurrence order.
pub type DateTaskGroups = IndexMap<(Arc<str>, NaiveDate), TaskUsage>;

/// Sessions grouped by task name only, in first-occurrence order.
pub type TaskGroups = IndexMap<Arc<str>, TaskUsage>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCount {
    pub task: Arc<str>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestTask {
    pub name: Arc<str>,
    #[serde(with = "duration_ser")]
    pub duration: Duration,
}

/// Everything a report shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionAggregate {
    pub all_tasks: Vec<TaskCount>,
    pub today_tasks: Vec<TaskCount>,
    #[serde(with = "duration_ser")]
    pub total_today: Duration,
    #[serde(with = "duration_ser")]
    pub grand_total: Duration,
    pub longest: LongestTask,
    /// Number of sessions per day, keyed by how many days ago they ended. Only days
    /// `0..=RECENT_DAYS` with at least one session are present.
    pub last_days: BTreeMap<u32, u32>,
}

impl SessionAggregate {
    pub fn total_pomos(&self) -> u32 {
        total_count(&self.all_tasks)
    }

    pub fn today_pomos(&self) -> u32 {
        total_count(&self.today_tasks)
    }
}

pub fn total_count(tasks: &[TaskCount]) -> u32 {
    tasks.iter().map(|v| v.count).sum()
}

/// Computes all report views from records in log order. `today` is the reference date for the
/// date relative views.
#[instrument(skip(records))]
pub fn aggregate(records: &[SessionRecord], today: NaiveDate) -> SessionAggregate {
    let by_date = group_by_task_and_date(records);
    let by_task = fold_by_task(&by_date);

    let total_today = records
        .iter()
        .filter(|v| v.end_date() == today)
        .fold(Duration::zero(), |total, v| total + v.duration);

    let all_tasks = by_task
        .iter()
        .map(|(task, usage)| TaskCount {
            task: task.clone(),
            count: usage.count,
        })
        .collect();

    let today_tasks = by_date
        .iter()
        .filter(|((_, date), _)| *date == today)
        .map(|((task, _), usage)| TaskCount {
            task: task.clone(),
            count: usage.count,
        })
        .collect();

    let grand_total = by_task
        .values()
        .fold(Duration::zero(), |total, v| total + v.total_time);

    debug!(
        "Aggregated {} records into {} groups and {} tasks",
        records.len(),
        by_date.len(),
        by_task.len()
    );

    SessionAggregate {
        all_tasks,
        today_tasks,
        total_today,
        grand_total,
        longest: longest_task(&by_task),
        last_days: recent_activity(&by_date, today),
    }
}

pub fn group_by_task_and_date(records: &[SessionRecord]) -> DateTaskGroups {
    let mut groups = DateTaskGroups::new();
    for record in records {
        groups
            .entry((record.task.clone(), record.end_date()))
            .or_insert_with(TaskUsage::new)
            .add_session(record.duration);
    }
    groups
}

/// Combines the same task from different days.
pub fn fold_by_task(groups: &DateTaskGroups) -> TaskGroups {
    let mut tasks = TaskGroups::new();
    for ((task, _), usage) in groups {
        tasks
            .entry(task.clone())
            .or_insert_with(TaskUsage::new)
            .merge(usage);
    }
    tasks
}

/// Task with the most accumulated time. On a tie the task seen first wins.
pub fn longest_task(tasks: &TaskGroups) -> LongestTask {
    let mut longest = LongestTask {
        name: NO_LONGEST_TASK.into(),
        duration: Duration::zero(),
    };
    for (task, usage) in tasks {
        if usage.total_time > longest.duration {
            longest = LongestTask {
                name: task.clone(),
                duration: usage.total_time,
            };
        }
    }
    longest
}

/// Sums session counts per day for the last [RECENT_DAYS] days and today. Sessions outside of
/// that window, future dates included, are left out.
pub fn recent_activity(groups: &DateTaskGroups, today: NaiveDate) -> BTreeMap<u32, u32> {
    let mut days = BTreeMap::new();
    for ((_, date), usage) in groups {
        let days_ago = (today - *date).num_days();
        if (0..=RECENT_DAYS as i64).contains(&days_ago) {
            *days.entry(days_ago as u32).or_insert(0) += usage.count;
        }
    }
    days
}
