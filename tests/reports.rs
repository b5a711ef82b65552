use std::fs;
use std::path::Path;

use convo_stats::{
    LoadError, ReportConfig, ReportZone, export_markdown, load_export, write_file_info,
    write_first_conversation, write_time_patterns, write_word_frequency,
};
use serde_json::json;
use tempfile::tempdir;

fn sample_export(dir: &Path) -> std::path::PathBuf {
    let body = json!([
        {
            "title": "学习计划",
            "create_time": 1700000000.0,
            "update_time": 1700000100.0,
            "mapping": {
                "root": {"message": null, "children": ["q1"]},
                "a1": {"message": {
                    "author": {"role": "assistant"},
                    "create_time": 1700000020.0,
                    "content": {"content_type": "text", "parts": ["可以先从基础语法开始。"]}
                }},
                "q1": {"message": {
                    "author": {"role": "user"},
                    "create_time": 1700000010.0,
                    "content": {"content_type": "text", "parts": ["我想学习编程，学习编程难吗"]}
                }}
            }
        },
        {
            "title": null,
            "create_time": 1700086400,
            "mapping": {
                "q": {"message": {
                    "author": {"role": "user"},
                    "content": {"parts": ["编程"]}
                }}
            }
        }
    ]);
    let path = dir.join("conversations.json");
    fs::write(&path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
    path
}

fn utc_config() -> ReportConfig {
    ReportConfig {
        zone: ReportZone::Utc,
        ..ReportConfig::default()
    }
}

#[test]
fn full_analysis_of_an_export_directory() {
    let dir = tempdir().unwrap();
    let path = sample_export(dir.path());
    let export = load_export(dir.path()).unwrap();
    assert_eq!(export.path, path);
    assert_eq!(export.conversations.len(), 2);

    let config = utc_config();
    let mut out = Vec::new();
    write_file_info(&mut out, export.size_bytes).unwrap();
    write_first_conversation(&mut out, &export.conversations, &config).unwrap();
    write_time_patterns(&mut out, &export.conversations, config.zone).unwrap();
    write_word_frequency(&mut out, &export.conversations, config.top_words).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.starts_with("=== conversations.json 文件信息 ===\n文件大小: "));
    assert!(report.contains("标题: 学习计划\n创建时间: 2023-11-14 22:13:20\n"));

    let user_at = report.find("[1] 用户 (2023-11-14 22:13:30):\n我想学习编程").unwrap();
    let reply_at = report.find("[2] 助手 (2023-11-14 22:13:40):\n可以先从基础语法开始。").unwrap();
    assert!(user_at < reply_at);

    assert!(report.contains("22:00 - 22:59: 2次\n"));
    assert!(report.contains("周二: 1次\n周三: 1次\n"));
    assert!(report.contains("14日: 1次\n15日: 1次\n"));

    assert!(report.contains("前50个最常见的中文词："));
    assert!(report.contains("编程: 3次\n"));
    assert!(!report.contains("基础: "));
}

#[test]
fn markdown_conversion_of_the_same_export() {
    let dir = tempdir().unwrap();
    sample_export(dir.path());
    let export = load_export(dir.path()).unwrap();

    let md = export_markdown(&export.conversations, |_, _| {});
    assert!(md.starts_with("## 对话 1\n### 标题: 学习计划\n### 创建时间: 1700000000.0\n\n"));
    let assistant = md.find("#### Assistant\n可以先从基础语法开始。\n\n").unwrap();
    let user = md.find("#### User\n我想学习编程，学习编程难吗\n\n").unwrap();
    assert!(assistant < user, "markdown keeps mapping order");
    assert!(md.contains("## 对话 2\n### 标题: 无标题\n### 创建时间: 1700086400\n\n#### User\n编程\n\n"));
}

#[test]
fn missing_export_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load_export(&dir.path().join("conversations.json")).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
}
