use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Result;
use chrono::Duration;
use tokio::{process::Command, select};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use self::{
    notify::{ConsoleNotifier, Notifier},
    prompt::{Prompter, StdinPrompter},
};
use crate::{
    storage::{entities::SessionLogEntry, session_log::SessionLog},
    utils::{
        clock::{Clock, DefaultClock},
        time::format_duration,
    },
};

pub mod notify;
pub mod prompt;
pub mod shutdown;

pub const DEFAULT_TASK_DURATION: Duration = Duration::seconds(1500);
pub const DEFAULT_BREAK_DURATION: Duration = Duration::seconds(300);

const TICK: std::time::Duration = std::time::Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub task: Arc<str>,
    pub task_duration: Duration,
    pub break_duration: Duration,
    /// Shell command executed once the work interval ends.
    pub on_done: Option<String>,
    pub continuous: bool,
    pub start_with_break: bool,
}

impl SessionConfig {
    pub fn new(task: Arc<str>) -> Self {
        Self {
            task,
            task_duration: DEFAULT_TASK_DURATION,
            break_duration: DEFAULT_BREAK_DURATION,
            on_done: None,
            continuous: false,
            start_with_break: false,
        }
    }
}

/// Represents the starting point for a timer run. Ctrl-C squishes the current pomodoro.
pub async fn start_session(config: SessionConfig, log: SessionLog) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let runner = SessionRunner::new(
        config,
        log,
        Box::new(DefaultClock),
        Box::new(ConsoleNotifier),
        Box::new(StdinPrompter),
        shutdown_token.clone(),
    );

    let (_, result) = tokio::join!(shutdown::detect_shutdown(shutdown_token.clone()), async {
        let result = runner.run().await;
        // Lets shutdown detection finish.
        shutdown_token.cancel();
        result
    });

    result
}

/// Runs work intervals and breaks, and logs every finished session.
pub struct SessionRunner {
    config: SessionConfig,
    log: SessionLog,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
    prompter: Box<dyn Prompter>,
    shutdown: CancellationToken,
}

impl SessionRunner {
    pub fn new(
        config: SessionConfig,
        log: SessionLog,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
        prompter: Box<dyn Prompter>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            log,
            clock,
            notifier,
            prompter,
            shutdown,
        }
    }

    /// Executes the session loop. Returns once a single session is done, or, in continuous
    /// mode, once the user cancels.
    pub async fn run(self) -> Result<()> {
        let mut after_break = self.config.start_with_break;
        loop {
            if after_break && !self.take_break().await {
                return Ok(());
            }

            let Some(entry) = self.work(after_break).await? else {
                return Ok(());
            };

            // A failed write shouldn't throw away the next pomodoro.
            if let Err(e) = self.log.append(&entry).await {
                error!("Failed to log session {e:?}");
                println!("{e}");
            }

            if !self.config.continuous {
                return Ok(());
            }
            after_break = true;
        }
    }

    /// Returns false when cancelled.
    async fn take_break(&self) -> bool {
        println!("taking a break...");
        let until = self.clock.instant() + to_std(self.config.break_duration);
        select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            _ = self.clock.sleep_until(until) => true,
        }
    }

    /// One work interval followed by the confirmation to stop. `None` means the session was
    /// cancelled and must not be logged.
    async fn work(&self, after_break: bool) -> Result<Option<SessionLogEntry>> {
        if after_break {
            self.notifier.notify(
                "Time to work!",
                &format!(
                    "{} minutes have passed",
                    self.config.break_duration.num_minutes()
                ),
            );
            if !self.confirm("Start working now?").await? {
                return Ok(None);
            }
        }

        let start = self.clock.time();
        self.notifier.notify(
            &format!(
                "Your {} minutes starts now",
                self.config.task_duration.num_minutes()
            ),
            &format!("Working on: {}", self.config.task),
        );
        info!("Started working on {:?}", self.config.task);

        if !self.count_down().await {
            self.notifier.notify("Squish!", "Tomato recycled...");
            info!("Squished {:?}", self.config.task);
            return Ok(None);
        }

        self.notifier.notify(
            "Time's up!",
            &format!(
                "Take a {} minute break...",
                self.config.break_duration.num_minutes()
            ),
        );
        if let Some(command) = &self.config.on_done {
            run_on_done(command).await;
        }

        if !self.confirm("Stop working now?").await? {
            return Ok(None);
        }

        Ok(Some(SessionLogEntry {
            label: self.config.task.clone(),
            start,
            end: self.clock.time(),
        }))
    }

    /// Shows the remaining time once a second. Returns false when cancelled.
    async fn count_down(&self) -> bool {
        let mut stdout = io::stdout();
        let mut tick = self.clock.instant();
        for remaining in (0..self.config.task_duration.num_seconds().max(0)).rev() {
            let left = format_duration(Duration::seconds(remaining));
            if let Err(e) = write!(stdout, "Time left: {left}\r").and_then(|_| stdout.flush()) {
                debug!("Can't display the remaining time {e:?}");
            }

            tick += TICK;
            select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    println!();
                    return false
                }
                _ = self.clock.sleep_until(tick) => ()
            }
        }
        println!();
        true
    }

    async fn confirm(&self, question: &str) -> Result<bool> {
        select! {
            biased;
            _ = self.shutdown.cancelled() => Ok(false),
            result = self.prompter.confirm(question) => result.map(|_| true),
        }
    }
}

async fn run_on_done(command: &str) {
    let mut process = if cfg!(windows) {
        let mut process = Command::new("cmd");
        process.arg("/C");
        process
    } else {
        let mut process = Command::new("sh");
        process.arg("-c");
        process
    };
    process.arg(command);

    match process.status().await {
        Ok(status) if status.success() => debug!("On done command {command:?} finished"),
        Ok(status) => warn!("On done command {command:?} exited with {status}"),
        Err(e) => error!("Failed to run on done command {command:?}: {e:?}"),
    }
}

fn to_std(duration: Duration) -> std::time::Duration {
    duration.to_std().unwrap_or(std::time::Duration::ZERO)
}
