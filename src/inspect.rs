//! Structural reports over arbitrary JSON.
//!
//! Two flavours are provided. [`write_structure`] walks every object key and
//! the first element of every array, naming the type of each value it sees.
//! [`write_outline`] is the quick look: the first three keys of each object,
//! two levels deep.

use std::io::{self, Write};

use serde_json::Value;

use crate::config::ReportConfig;

const OUTLINE_MAX_KEYS: usize = 3;
const OUTLINE_MAX_DEPTH: usize = 2;

/// Type name of a JSON value, spelled the way the reports print it.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(num) if num.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn scalar_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Detailed structure report of `value`, each line starting with `prefix`.
pub fn write_structure<W: Write>(
    out: &mut W,
    value: &Value,
    prefix: &str,
    config: &ReportConfig,
) -> io::Result<()> {
    let nested = format!("{prefix}  ");
    match value {
        Value::Object(map) => {
            writeln!(out, "{prefix}字典包含 {} 个键值对", map.len())?;
            for (key, child) in map {
                writeln!(out, "{prefix}键 '{key}' 的值类型是: {}", type_name(child))?;
                write_structure(out, child, &nested, config)?;
            }
        }
        Value::Array(items) => {
            writeln!(out, "{prefix}列表包含 {} 个元素", items.len())?;
            if let Some(first) = items.first() {
                let shown = config.max_list_items.min(items.len());
                writeln!(out, "{prefix}前 {shown} 个元素的类型是:")?;
                for (index, item) in items.iter().take(shown).enumerate() {
                    writeln!(out, "{prefix}  [{index}]: {}", type_name(item))?;
                }
                if first.is_object() || first.is_array() {
                    writeln!(out, "{prefix}第一个元素的详细结构:")?;
                    write_structure(out, first, &nested, config)?;
                }
            }
        }
        Value::String(text) => {
            writeln!(
                out,
                "{prefix}字符串值 (长度: {}): {}",
                text.chars().count(),
                preview(text, config.preview_chars)
            )?;
        }
        other => {
            writeln!(
                out,
                "{prefix}值类型: {}, 值: {}",
                type_name(other),
                scalar_repr(other)
            )?;
        }
    }
    Ok(())
}

/// Brief outline of `value` starting at indentation `level`.
pub fn write_outline<W: Write>(out: &mut W, value: &Value, level: usize) -> io::Result<()> {
    let indent = "  ".repeat(level);
    match value {
        Value::Object(map) => {
            writeln!(out, "{indent}字典包含 {} 个键:", map.len())?;
            for (key, child) in map.iter().take(OUTLINE_MAX_KEYS) {
                writeln!(out, "{indent}- {key}")?;
                if level < OUTLINE_MAX_DEPTH {
                    write_outline(out, child, level + 1)?;
                }
            }
        }
        Value::Array(items) => {
            writeln!(out, "{indent}列表包含 {} 个元素", items.len())?;
            if let Some(first) = items.first() {
                if level < OUTLINE_MAX_DEPTH {
                    writeln!(out, "{indent}第一个元素:")?;
                    write_outline(out, first, level + 1)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// The outline with its report header.
pub fn write_outline_report<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    writeln!(out, "=== JSON 文件基本结构 ===")?;
    write_outline(out, value, 0)
}
