//! convo-stats - reports over an exported ChatGPT `conversations.json`
//!
//! The library loads an export into lenient records and writes plain-text
//! reports to any [`std::io::Write`]: a structural outline of the JSON, the
//! first conversation in chronological order, the distribution of creation
//! times, the most frequent Chinese words in user messages, and a Markdown
//! conversion of the whole archive.
//!
//! # Examples
//!
//! ```no_run
//! use convo_stats::{ReportConfig, load_export, write_time_patterns};
//! use std::path::Path;
//!
//! let export = load_export(Path::new("conversations.json")).unwrap();
//! let config = ReportConfig::default();
//! write_time_patterns(&mut std::io::stdout(), &export.conversations, config.zone).unwrap();
//! ```

pub mod config;
pub mod distribution;
pub mod error;
pub mod inspect;
pub mod loader;
pub mod markdown;
pub mod render;
pub mod timeline;
pub mod types;
pub mod wordfreq;

pub use config::{ReportConfig, ReportZone};
pub use distribution::{TimeDistribution, write_time_patterns};
pub use error::LoadError;
pub use inspect::{write_outline_report, write_structure};
pub use loader::{Export, load_export, locate_export, read_json};
pub use markdown::{conversation_markdown, export_markdown, write_markdown_file};
pub use render::render_markdown;
pub use timeline::{TimelineMessage, extract_messages, write_file_info, write_first_conversation};
pub use types::{ConversationNode, ConversationRecord, MessageRecord};
pub use wordfreq::{WordCounter, count_user_words, write_word_frequency};

/// Format a byte size into a human-readable string with two decimals.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} TB")
}

/// Format an epoch timestamp for display, or `未知时间` when it is unset.
pub fn format_timestamp(ts: f64, zone: ReportZone) -> String {
    if ts == 0.0 {
        return "未知时间".to_string();
    }
    match zone.localize(ts) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => float_text(ts),
    }
}

/// Shortest round-trip text of a float, with a `.0` on integral values and a
/// signed two-digit exponent outside `1e-4..1e16`, so `1e300` reads `1e+300`.
fn float_text(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{value:e}");
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) => match exponent.strip_prefix('-') {
                Some(digits) => format!("{mantissa}e-{digits:0>2}"),
                None => format!("{mantissa}e+{exponent:0>2}"),
            },
            None => scientific,
        };
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
