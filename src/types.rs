//! Lenient records for the ChatGPT `conversations.json` schema.
//!
//! Exports in the wild are inconsistent: timestamps show up as floats, strings
//! or `null`, `mapping` can be missing, and message content is free-form. The
//! records here keep the loose parts as [`Value`] and expose small accessors
//! that apply one consistent interpretation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

/// One conversation of the export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationRecord {
    /// Usually a string, but any JSON value is accepted and printed.
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub create_time: Option<Value>,
    #[serde(default)]
    pub update_time: Option<Value>,
    /// Message nodes in document order.
    #[serde(default, deserialize_with = "ordered_mapping")]
    pub mapping: Vec<(String, ConversationNode)>,
}

/// A node of the conversation tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationNode {
    #[serde(default)]
    pub message: Option<MessageRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub author: Option<MessageAuthor>,
    #[serde(default)]
    pub create_time: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageAuthor {
    #[serde(default)]
    pub role: Option<String>,
}

impl ConversationRecord {
    /// Title as shown in reports; absent or null titles become `无标题`.
    pub fn display_title(&self) -> String {
        match self.title.as_ref() {
            None | Some(Value::Null) => "无标题".to_string(),
            Some(title) => part_text(title),
        }
    }

    /// Creation time in seconds since the epoch, `0.0` when unknown.
    pub fn created(&self) -> f64 {
        safe_timestamp(self.create_time.as_ref())
    }

    pub fn updated(&self) -> f64 {
        safe_timestamp(self.update_time.as_ref())
    }

    /// Messages carried by the mapping, in document order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageRecord> {
        self.mapping
            .iter()
            .filter_map(|(_, node)| node.message.as_ref())
    }
}

impl MessageRecord {
    /// Author role, if present and non-empty.
    pub fn role(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(|author| author.role.as_deref())
            .filter(|role| !role.is_empty())
    }

    /// First element of `content.parts`, when `content` is an object and
    /// `parts` a non-empty array.
    pub fn first_part(&self) -> Option<&Value> {
        match self.content.as_ref()? {
            Value::Object(map) => match map.get("parts")? {
                Value::Array(parts) => parts.first(),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn timestamp(&self) -> f64 {
        safe_timestamp(self.create_time.as_ref())
    }
}

/// Interpret a loosely typed timestamp field.
///
/// Numbers and numeric strings are taken as seconds since the epoch, booleans
/// as `1.0`/`0.0`; everything else (including non-finite values) is `0.0`.
pub fn safe_timestamp(value: Option<&Value>) -> f64 {
    let ts = match value {
        Some(Value::Number(num)) => num.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    if ts.is_finite() && ts != 0.0 { ts } else { 0.0 }
}

/// Render a message part as text: strings verbatim, anything else as JSON.
pub fn part_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Truthiness of a JSON value: empty strings, empty containers, zero, `false`
/// and `null` are all false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(num) => num.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Convert fractional epoch seconds into a UTC timestamp.
pub fn timestamp_from_f64(ts: f64) -> Option<DateTime<Utc>> {
    if !ts.is_finite() {
        return None;
    }
    let seconds = ts.floor() as i64;
    let fraction = (ts - seconds as f64).clamp(0.0, 0.999_999_999_9);
    let mut nanos = (fraction * 1_000_000_000.0).round() as u32;
    if nanos >= 1_000_000_000 {
        nanos = 999_999_999;
    }
    DateTime::<Utc>::from_timestamp(seconds, nanos)
}

fn ordered_mapping<'de, D>(deserializer: D) -> Result<Vec<(String, ConversationNode)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    let mut nodes = Vec::new();
    for (id, value) in raw.into_iter().flatten() {
        match ConversationNode::deserialize(value) {
            Ok(node) => nodes.push((id, node)),
            Err(err) => debug!(node = %id, error = %err, "skipping malformed mapping node"),
        }
    }
    Ok(nodes)
}
