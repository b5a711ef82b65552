//! The first conversation of an export, listed chronologically.

use std::io::{self, Write};

use tracing::debug;

use crate::config::ReportConfig;
use crate::render::render_markdown;
use crate::types::{ConversationRecord, part_text};
use crate::{format_size, format_timestamp};

/// A message ready to be listed.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineMessage {
    pub role: String,
    pub content: String,
    /// Seconds since the epoch, `0.0` when the export has no usable time.
    pub create_time: f64,
}

impl TimelineMessage {
    pub fn speaker(&self) -> &'static str {
        if self.role == "user" { "用户" } else { "助手" }
    }
}

/// Collect every message with a role and at least one content part, ordered
/// by creation time. Messages with equal times keep their document order.
pub fn extract_messages(conversation: &ConversationRecord) -> Vec<TimelineMessage> {
    let mut messages: Vec<TimelineMessage> = conversation
        .messages()
        .filter_map(|message| {
            let role = message.role()?;
            let first = message.first_part()?;
            Some(TimelineMessage {
                role: role.to_string(),
                content: part_text(first),
                create_time: message.timestamp(),
            })
        })
        .collect();

    messages.sort_by(|a, b| a.create_time.total_cmp(&b.create_time));
    messages
}

/// Header with the export's file size.
pub fn write_file_info<W: Write>(out: &mut W, size_bytes: u64) -> io::Result<()> {
    writeln!(out, "=== conversations.json 文件信息 ===")?;
    writeln!(out, "文件大小: {}", format_size(size_bytes))
}

/// Metadata and chronological transcript of the first conversation.
pub fn write_first_conversation<W: Write>(
    out: &mut W,
    conversations: &[ConversationRecord],
    config: &ReportConfig,
) -> io::Result<()> {
    let Some(first) = conversations.first() else {
        return writeln!(out, "对话列表为空");
    };

    writeln!(out, "\n=== 第一个对话的信息 ===")?;
    writeln!(out, "标题: {}", first.display_title())?;
    writeln!(out, "创建时间: {}", format_timestamp(first.created(), config.zone))?;
    writeln!(out, "更新时间: {}", format_timestamp(first.updated(), config.zone))?;

    if first.mapping.is_empty() {
        return writeln!(out, "未找到对话内容");
    }

    let messages = extract_messages(first);
    debug!(count = messages.len(), "extracted first conversation");

    writeln!(out, "\n=== 对话内容 ===")?;
    for (ordinal, message) in messages.iter().enumerate() {
        writeln!(
            out,
            "\n[{}] {} ({}):",
            ordinal + 1,
            message.speaker(),
            format_timestamp(message.create_time, config.zone)
        )?;
        if config.styled {
            writeln!(out, "{}", render_markdown(&message.content))?;
        } else {
            writeln!(out, "{}", message.content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportZone;
    use serde_json::json;

    fn conversation(value: serde_json::Value) -> ConversationRecord {
        serde_json::from_value(value).unwrap()
    }

    fn utc() -> ReportConfig {
        ReportConfig {
            zone: ReportZone::Utc,
            ..ReportConfig::default()
        }
    }

    #[test]
    fn messages_are_sorted_by_time_with_stable_ties() {
        let convo = conversation(json!({
            "mapping": {
                "root": {"message": null},
                "b": {"message": {"author": {"role": "assistant"}, "create_time": 20.0,
                                  "content": {"parts": ["second"]}}},
                "sys": {"message": {"author": {"role": "system"}, "create_time": null,
                                    "content": {"parts": []}}},
                "a": {"message": {"author": {"role": "user"}, "create_time": 10,
                                  "content": {"parts": ["first", "ignored"]}}},
                "c": {"message": {"author": {"role": "tool"}, "create_time": 20,
                                  "content": {"parts": [{"k": 1}]}}},
                "z": {"message": {"author": {"role": "user"}, "create_time": "bad",
                                  "content": {"parts": ["untimed"]}}}
            }
        }));

        let messages = extract_messages(&convo);
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["untimed", "first", "second", r#"{"k":1}"#]);
        assert_eq!(messages[0].create_time, 0.0);
    }

    #[test]
    fn file_info_header() {
        let mut out = Vec::new();
        write_file_info(&mut out, 2048).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=== conversations.json 文件信息 ===\n文件大小: 2.00 KB\n"
        );
    }

    #[test]
    fn empty_export_is_reported() {
        let mut out = Vec::new();
        write_first_conversation(&mut out, &[], &utc()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "对话列表为空\n");
    }

    #[test]
    fn conversation_without_mapping_stops_after_metadata() {
        let convo = conversation(json!({"create_time": 1700000000}));
        let mut out = Vec::new();
        write_first_conversation(&mut out, &[convo], &utc()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\n=== 第一个对话的信息 ===\n标题: 无标题\n创建时间: 2023-11-14 22:13:20\n\
             更新时间: 未知时间\n未找到对话内容\n"
        );
    }

    #[test]
    fn transcript_lists_speakers_and_times() {
        let convo = conversation(json!({
            "title": "问候",
            "create_time": 1700000000.0,
            "update_time": 1700000060.0,
            "mapping": {
                "2": {"message": {"author": {"role": "assistant"}, "create_time": 1700000030,
                                  "content": {"parts": ["你好！"]}}},
                "1": {"message": {"author": {"role": "user"}, "create_time": 1700000010,
                                  "content": {"parts": ["你好"]}}}
            }
        }));
        let mut out = Vec::new();
        write_first_conversation(&mut out, &[convo], &utc()).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.contains("标题: 问候\n"));
        assert!(report.contains("更新时间: 2023-11-14 22:14:20\n"));
        assert!(report.ends_with(
            "\n=== 对话内容 ===\n\n[1] 用户 (2023-11-14 22:13:30):\n你好\n\
             \n[2] 助手 (2023-11-14 22:13:50):\n你好！\n"
        ));
    }
}
