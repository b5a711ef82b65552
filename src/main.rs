//! convo-stats CLI
//!
//! Commands:
//! - convo-stats [analyze]          # file size, first conversation, time and word reports
//! - convo-stats inspect [--brief]  # structure of the JSON document
//! - convo-stats first | times | words
//! - convo-stats convert [-o conversations.md]

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nu_ansi_term::{Color, Style};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use convo_stats::config::{DEFAULT_MAX_LIST_ITEMS, DEFAULT_TOP_WORDS};
use convo_stats::markdown::DEFAULT_OUTPUT;
use convo_stats::{
    LoadError, ReportConfig, ReportZone, export_markdown, load_export, locate_export, read_json,
    write_file_info, write_first_conversation, write_markdown_file, write_outline_report,
    write_structure, write_time_patterns, write_word_frequency,
};

const ERROR_COLOR: Color = Color::Rgb(217, 182, 203);
const DOT_ACTIVE_COLOR: Color = Color::Rgb(188, 205, 238);
const DOT_INACTIVE_COLOR: Color = Color::Rgb(90, 94, 104);
const PROGRESS_DOTS: usize = 6;

#[derive(Parser)]
#[command(name = "convo-stats")]
#[command(about = "Reports over an exported ChatGPT conversations.json")]
#[command(version)]
struct Cli {
    /// Export file, or a directory containing conversations.json
    #[arg(
        short,
        long,
        global = true,
        env = "CONVOS_EXPORT",
        default_value = "conversations.json"
    )]
    input: PathBuf,

    /// Bucket and display times in UTC instead of local time
    #[arg(long, global = true)]
    utc: bool,

    /// Print message bodies as raw text even on a terminal
    #[arg(long, global = true)]
    plain: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// File size, first conversation, time distribution and word frequency
    Analyze {
        /// Number of words to list
        #[arg(long, default_value_t = DEFAULT_TOP_WORDS)]
        top: usize,
    },

    /// Describe the structure of the JSON document
    Inspect {
        /// Only the first keys of each object, two levels deep
        #[arg(long)]
        brief: bool,

        /// Number of list elements whose type is shown
        #[arg(long, default_value_t = DEFAULT_MAX_LIST_ITEMS)]
        max_items: usize,
    },

    /// Show the first conversation in chronological order
    First,

    /// Distribution of conversation start times
    Times,

    /// Most frequent Chinese words in user messages
    Words {
        /// Number of words to list
        #[arg(long, default_value_t = DEFAULT_TOP_WORDS)]
        top: usize,
    },

    /// Convert every conversation into one Markdown file
    Convert {
        /// Output path
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        let message = describe(&err);
        if io::stderr().is_terminal() {
            eprintln!("{}", Style::new().fg(ERROR_COLOR).paint(message));
        } else {
            eprintln!("{message}");
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LoadError>() {
        Some(LoadError::NotFound(path)) => format!("错误：找不到文件 {}", path.display()),
        Some(LoadError::InvalidJson { .. }) => "错误：JSON 格式无效".to_string(),
        Some(LoadError::NotAnArray(path)) => {
            format!("错误：{} 的顶层不是对话列表", path.display())
        }
        Some(LoadError::Io { path, source }) => {
            format!("错误：无法读取文件 {}：{source}", path.display())
        }
        _ => format!("发生错误：{err:#}"),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ReportConfig {
        zone: if cli.utc {
            ReportZone::Utc
        } else {
            ReportZone::Local
        },
        styled: !cli.plain && io::stdout().is_terminal(),
        ..ReportConfig::default()
    };
    let command = cli.command.unwrap_or(Commands::Analyze {
        top: DEFAULT_TOP_WORDS,
    });
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Inspect { brief, max_items } => {
            config.max_list_items = max_items;
            let path = locate_export(&cli.input)?;
            let value = read_json(&path)?;
            if brief {
                write_outline_report(&mut out, &value)?;
            } else {
                write_structure(&mut out, &value, "", &config)?;
            }
        }
        Commands::Analyze { top } => {
            config.top_words = top;
            let export = load_export(&cli.input)?;
            write_file_info(&mut out, export.size_bytes)?;
            write_first_conversation(&mut out, &export.conversations, &config)?;
            write_time_patterns(&mut out, &export.conversations, config.zone)?;
            write_word_frequency(&mut out, &export.conversations, config.top_words)?;
        }
        Commands::First => {
            let export = load_export(&cli.input)?;
            write_first_conversation(&mut out, &export.conversations, &config)?;
        }
        Commands::Times => {
            let export = load_export(&cli.input)?;
            write_time_patterns(&mut out, &export.conversations, config.zone)?;
        }
        Commands::Words { top } => {
            let export = load_export(&cli.input)?;
            write_word_frequency(&mut out, &export.conversations, top)?;
        }
        Commands::Convert { output } => {
            let export = load_export(&cli.input)?;
            let show_progress = io::stderr().is_terminal();
            let markdown = export_markdown(&export.conversations, |done, total| {
                if show_progress {
                    draw_progress(done, total);
                }
            });
            if show_progress {
                eprintln!();
            }
            write_markdown_file(&output, &markdown)?;
            debug!(conversations = export.conversations.len(), "conversion finished");
            writeln!(out, "已写入 {}", output.display())?;
        }
    }

    out.flush().context("flushing stdout")
}

fn progress_dots(done: usize, total: usize) -> String {
    let filled = if total == 0 {
        PROGRESS_DOTS
    } else {
        done * PROGRESS_DOTS / total
    };
    (0..PROGRESS_DOTS)
        .map(|slot| {
            if slot < filled {
                Style::new().fg(DOT_ACTIVE_COLOR).bold().paint("●").to_string()
            } else {
                Style::new().fg(DOT_INACTIVE_COLOR).paint("○").to_string()
            }
        })
        .collect()
}

fn draw_progress(done: usize, total: usize) {
    let mut err = io::stderr().lock();
    let _ = write!(err, "\r转换进度 {} {done}/{total}", progress_dots(done, total));
    let _ = err.flush();
}
