pub mod analyse;
pub mod output;

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use self::analyse::process_analyse_command;
use anyhow::{anyhow, Result};
use chrono::Duration;
use clap::{CommandFactory, Parser};
use tracing::level_filters::LevelFilter;

use crate::{
    session::{start_session, SessionConfig, DEFAULT_TASK_DURATION},
    storage::session_log::SessionLog,
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "pomo", version, long_about = None)]
#[command(about = "Pomodoro timer", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "Description of task to work on")]
    message: Option<String>,
    #[arg(short, long, help = "Intended duration of task in seconds")]
    time: Option<u32>,
    #[arg(short, long, help = "Command to execute when the current task is done")]
    ondone: Option<String>,
    #[arg(
        short,
        long,
        help = "Directory where logs will be written. By default $XDG_STATE_HOME/pomo or $HOME/.local/state/pomo"
    )]
    directory: Option<PathBuf>,
    #[arg(short, long, help = "Split log files by day")]
    split: bool,
    #[arg(short, long, help = "Work on tasks continuously")]
    continuous: bool,
    #[arg(short = 'b', long, help = "Start a break before starting a task")]
    startbreak: bool,
    #[arg(short, long, value_name = "PATH", help = "Analyse the given pomo log")]
    analyse: Option<PathBuf>,
    #[arg(
        long,
        requires = "analyse",
        help = "Print the analysis as JSON instead of a text report"
    )]
    json: bool,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

impl Args {
    fn task_duration(&self) -> Duration {
        self.time
            .map(|v| Duration::seconds(v.into()))
            .unwrap_or(DEFAULT_TASK_DURATION)
    }
}

pub async fn run_cli() -> Result<ExitCode> {
    let args = Args::parse();
    execute(
        args,
        create_application_default_path(),
        &DefaultClock,
        &mut io::stdout(),
    )
    .await
}

/// Runs the parsed command. `app_dir` is only required by the timer, analysis reads the file it
/// is given and treats logging as optional.
async fn execute(
    args: Args,
    app_dir: Result<PathBuf>,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<ExitCode> {
    let task_duration = args.task_duration();

    if let Some(path) = &args.analyse {
        let logging = match &app_dir {
            Ok(dir) => setup_logging(args.log, dir),
            Err(e) => Err(anyhow!("{e:#}")),
        };
        if let Err(e) = logging {
            if args.log {
                eprintln!("Logging disabled: {e:#}");
            }
        }

        process_analyse_command(path, task_duration, args.json, clock, out).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(task) = args.message else {
        write!(out, "{}", Args::command().render_help())?;
        writeln!(out, "\nEither specify a task, or analyse a log file.")?;
        return Ok(ExitCode::FAILURE);
    };

    let app_dir = app_dir?;
    setup_logging(args.log, &app_dir)?;

    let config = SessionConfig {
        task_duration,
        on_done: args.ondone,
        continuous: args.continuous,
        start_with_break: args.startbreak,
        ..SessionConfig::new(task.into())
    };
    let log = SessionLog::new(args.directory.unwrap_or(app_dir), args.split);

    start_session(config, log).await?;
    Ok(ExitCode::SUCCESS)
}

fn setup_logging(log: bool, app_dir: &Path) -> Result<()> {
    let logging_level = if log { Some(LevelFilter::TRACE) } else { None };
    enable_logging(CLI_PREFIX, &app_dir.join("logs"), logging_level, log)
}
