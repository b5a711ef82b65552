//! Locating and decoding `conversations.json`.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::types::ConversationRecord;

pub const EXPORT_FILE_NAME: &str = "conversations.json";

const MAX_SCAN_DEPTH: usize = 3;

/// A decoded export together with where it came from.
#[derive(Debug, Clone)]
pub struct Export {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub conversations: Vec<ConversationRecord>,
}

/// Resolve `root` to an export file.
///
/// A file path is used as given. A directory resolves to its own
/// `conversations.json`, otherwise to the first one found breadth-first
/// within three levels.
pub fn locate_export(root: &Path) -> Result<PathBuf, LoadError> {
    if root.is_file() {
        return Ok(root.to_path_buf());
    }
    if !root.is_dir() {
        return Err(LoadError::NotFound(root.to_path_buf()));
    }

    let direct = root.join(EXPORT_FILE_NAME);
    if direct.is_file() {
        return Ok(direct);
    }

    let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
    let mut visited = HashSet::new();
    queue.push_back((root.to_path_buf(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }

        let candidate = current.join(EXPORT_FILE_NAME);
        if current != root && candidate.is_file() {
            debug!(path = %candidate.display(), depth, "found export below root");
            return Ok(candidate);
        }

        if depth == MAX_SCAN_DEPTH {
            continue;
        }

        let entries = fs::read_dir(&current).map_err(|source| LoadError::io(&current, source))?;
        let mut children: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_dir())
            .collect();
        children.sort();
        queue.extend(children.into_iter().map(|path| (path, depth + 1)));
    }

    Err(LoadError::NotFound(root.join(EXPORT_FILE_NAME)))
}

/// Size of the file in bytes.
pub fn file_size(path: &Path) -> Result<u64, LoadError> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|source| LoadError::io(path, source))
}

/// Read and parse any JSON document.
pub fn read_json(path: &Path) -> Result<Value, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::io(path, source))?;
    let value = serde_json::from_str(&raw).map_err(|source| LoadError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = raw.len(), "parsed JSON document");
    Ok(value)
}

/// Locate, size and decode an export.
pub fn load_export(root: &Path) -> Result<Export, LoadError> {
    let path = locate_export(root)?;
    let size_bytes = file_size(&path)?;
    let json = read_json(&path)?;
    let Value::Array(items) = json else {
        return Err(LoadError::NotAnArray(path));
    };

    let conversations = decode_conversations(items);
    info!(
        path = %path.display(),
        conversations = conversations.len(),
        "loaded export"
    );
    Ok(Export {
        path,
        size_bytes,
        conversations,
    })
}

/// Decode each array element, skipping the ones that do not look like a
/// conversation object.
pub fn decode_conversations(items: Vec<Value>) -> Vec<ConversationRecord> {
    let mut conversations = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<ConversationRecord>(item) {
            Ok(record) => conversations.push(record),
            Err(err) => warn!(index, error = %err, "skipping undecodable conversation"),
        }
    }
    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn explicit_file_path_is_used_as_is() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("export.json");
        fs::write(&file, "[]").unwrap();

        assert_eq!(locate_export(&file).unwrap(), file);
    }

    #[test]
    fn nested_export_is_found_breadth_first() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("a").join("b").join("c");
        let shallow = dir.path().join("z");
        fs::create_dir_all(&deep).unwrap();
        fs::create_dir_all(&shallow).unwrap();
        fs::write(deep.join(EXPORT_FILE_NAME), "[]").unwrap();
        fs::write(shallow.join(EXPORT_FILE_NAME), "[]").unwrap();

        assert_eq!(
            locate_export(dir.path()).unwrap(),
            shallow.join(EXPORT_FILE_NAME)
        );
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let err = locate_export(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));

        let err = locate_export(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(EXPORT_FILE_NAME);
        fs::write(&file, "[{").unwrap();

        let err = load_export(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidJson { .. }));
    }

    #[test]
    fn top_level_must_be_an_array() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(EXPORT_FILE_NAME);
        fs::write(&file, r#"{"title": "x"}"#).unwrap();

        let err = load_export(&file).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray(_)));
    }

    #[test]
    fn load_reports_size_and_skips_garbage() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(EXPORT_FILE_NAME);
        let body = json!([{"title": "one"}, 7, {"title": "two", "mapping": {}}]).to_string();
        fs::write(&file, &body).unwrap();

        let export = load_export(dir.path()).unwrap();
        assert_eq!(export.size_bytes, body.len() as u64);
        let titles: Vec<_> = export
            .conversations
            .iter()
            .map(|c| c.display_title())
            .collect();
        assert_eq!(titles, ["one", "two"]);
    }

    #[test]
    fn loosely_typed_metadata_keeps_every_conversation() {
        let items = vec![
            json!({"title": 2024, "mapping": {}}),
            json!({"id": 7, "title": "second"}),
            json!({"title": "third"}),
        ];
        let conversations = decode_conversations(items);
        assert_eq!(conversations.len(), 3);
        assert_eq!(conversations[0].display_title(), "2024");
    }
}
