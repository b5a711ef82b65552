//! Conversion of a whole export into one Markdown document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::types::{ConversationRecord, part_text};

pub const DEFAULT_OUTPUT: &str = "conversations.md";

fn capitalize(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn raw_create_time(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Markdown section for the `index`-th (1-based) conversation.
pub fn conversation_markdown(index: usize, conversation: &ConversationRecord) -> String {
    let mut md = format!(
        "## 对话 {index}\n### 标题: {}\n### 创建时间: {}\n\n",
        conversation.display_title(),
        raw_create_time(conversation.create_time.as_ref())
    );
    for message in conversation.messages() {
        let (Some(role), Some(first)) = (message.role(), message.first_part()) else {
            continue;
        };
        md.push_str(&format!("#### {}\n{}\n\n", capitalize(role), part_text(first)));
    }
    md
}

/// Render every conversation, reporting `(done, total)` after each one.
pub fn export_markdown<F>(conversations: &[ConversationRecord], mut progress: F) -> String
where
    F: FnMut(usize, usize),
{
    let total = conversations.len();
    let mut md = String::new();
    for (offset, conversation) in conversations.iter().enumerate() {
        md.push_str(&conversation_markdown(offset + 1, conversation));
        progress(offset + 1, total);
    }
    md
}

pub fn write_markdown_file(path: &Path, markdown: &str) -> Result<()> {
    fs::write(path, markdown).with_context(|| format!("writing `{}`", path.display()))?;
    info!(path = %path.display(), bytes = markdown.len(), "wrote markdown");
    Ok(())
}
