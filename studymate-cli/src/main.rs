//! studymate - command-line front end for StudyMate
//!
//! Records focus sessions against the boss battle, shows progress and
//! daily totals, and keeps tutor/psych chat histories with the
//! "asked this before" recall check.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use studymate_common::config::{
    database_path, default_config_path, load_toml_config, LoggingConfig, RootFolderResolver,
    TomlConfig,
};
use studymate_common::db::init_database;
use studymate_common::focus_log;
use studymate_common::service::{ChatHistory, ProgressTracker};
use studymate_common::{EngineResult, RecallSettings, SessionKind, SystemClock};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sessions shown by `stats`
const RECENT_SESSIONS: usize = 5;

/// Width of the HP bar in characters
const HP_BAR_WIDTH: i64 = 20;

/// Command-line arguments for studymate
#[derive(Parser, Debug)]
#[command(name = "studymate")]
#[command(about = "Focus sessions, boss battles and tutor recall")]
#[command(version)]
struct Args {
    /// Data folder holding studymate.db
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// Config file (defaults to <config dir>/studymate/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a completed focus session and strike the boss
    Session {
        /// Focused minutes
        #[arg(allow_negative_numbers = true)]
        minutes: i64,

        /// Task the session was spent on
        #[arg(short, long, default_value = "Focus")]
        task: String,
    },

    /// Show the current boss without dealing damage
    Status,

    /// Today's minutes per task and the most recent sessions
    Stats,

    /// Ask a question; warns if a similar one was asked before
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        #[arg(short, long, default_value = "tutor")]
        kind: SessionKind,
    },

    /// Record an assistant reply
    Reply {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        #[arg(short, long, default_value = "tutor")]
        kind: SessionKind,
    },

    /// Print a chat history
    History {
        #[arg(short, long, default_value = "tutor")]
        kind: SessionKind,
    },

    /// Delete a chat history
    ClearHistory {
        #[arg(short, long, default_value = "tutor")]
        kind: SessionKind,
    },

    /// Write a chat history as JSON
    ExportHistory {
        #[arg(short, long, default_value = "tutor")]
        kind: SessionKind,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a chat history with the contents of a JSON export
    ImportHistory {
        file: PathBuf,

        #[arg(short, long, default_value = "tutor")]
        kind: SessionKind,
    },

    /// Start the boss battle over from level 1
    Reset {
        /// Also delete the focus-session log
        #[arg(long)]
        sessions: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => load_toml_config(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    init_tracing(&config.logging)?;

    debug!(
        "Starting studymate v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder.clone())
        .with_config(&config)
        .resolve();
    let db_path = database_path(&root_folder);
    debug!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let tracker = ProgressTracker::new(pool.clone(), Arc::new(SystemClock));
    let chat = ChatHistory::new(pool.clone());

    let outcome = run(args.command, &tracker, &chat, &config.recall).await;
    pool.close().await;
    outcome
}

/// Log to stderr, or append to the configured file. `RUST_LOG` overrides
/// the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "studymate={level},studymate_common={level}",
            level = logging.level
        ))
    });

    let (stderr_layer, file_layer) = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (Some(fmt::layer().with_writer(std::io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

async fn run(
    command: Command,
    tracker: &ProgressTracker,
    chat: &ChatHistory,
    recall: &RecallSettings,
) -> Result<()> {
    match command {
        Command::Session { minutes, task } => {
            let result = tracker
                .record_session(&task, minutes)
                .await
                .context("Failed to record session")?;
            print_boss(&result);
        }

        Command::Status => {
            let result = tracker.current_state().await?;
            print_boss(&result);
        }

        Command::Stats => {
            let totals = tracker.today_stats().await?;
            println!("Today:");
            if totals.is_empty() {
                println!("  no sessions yet");
            }
            for (task, minutes) in &totals {
                println!("  {:<24} {:>4} min", task, minutes);
            }

            let sessions = tracker.sessions().await?;
            println!("Recent sessions:");
            if sessions.is_empty() {
                println!("  no local records yet");
            }
            for session in focus_log::recent(&sessions, RECENT_SESSIONS) {
                println!(
                    "  [{}] {} - {} mins",
                    session
                        .recorded_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M"),
                    session.task_name,
                    session.duration_minutes
                );
            }
        }

        Command::Ask { text, kind } => {
            let text = text.join(" ");
            if kind == SessionKind::Tutor {
                match chat.check_recall(&text, recall).await? {
                    Some(earlier) => {
                        println!("You asked something similar before: \"{}\"", earlier);
                        println!("Want a hint, or the full answer again?");
                    }
                    None => println!("New question recorded."),
                }
            }
            chat.record(kind, &text, true).await?;
        }

        Command::Reply { text, kind } => {
            chat.record(kind, &text.join(" "), false).await?;
        }

        Command::History { kind } => {
            for entry in chat.history(kind).await? {
                let speaker = if entry.is_from_user { "you" } else { kind.as_str() };
                println!("{:>6}: {}", speaker, entry.text);
            }
        }

        Command::ClearHistory { kind } => {
            let removed = chat.clear(kind).await?;
            println!("Removed {} {} messages", removed, kind);
        }

        Command::ExportHistory { kind, output } => {
            let json = chat.export_json(kind).await?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
        }

        Command::ImportHistory { file, kind } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let count = chat
                .import_json(kind, &json)
                .await
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("Imported {} {} messages", count, kind);
        }

        Command::Reset { sessions } => {
            tracker.reset().await?;
            if sessions {
                tracker.clear_sessions().await?;
            }
            println!("Boss progress reset");
        }
    }

    Ok(())
}

fn print_boss(result: &EngineResult) {
    println!("Level {} - {}", result.level, result.name);
    println!(
        "HP {}/{} [{}]",
        result.current_hp,
        result.max_hp,
        hp_bar(result.current_hp, result.max_hp)
    );
    println!("{}", result.status_message);
}

fn hp_bar(current: i64, max: i64) -> String {
    let filled = if max > 0 {
        (current.clamp(0, max) as i128 * HP_BAR_WIDTH as i128 / max as i128) as i64
    } else {
        0
    };
    let mut bar = "#".repeat(filled as usize);
    bar.push_str(&".".repeat((HP_BAR_WIDTH - filled) as usize));
    bar
}
