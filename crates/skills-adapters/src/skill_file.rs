//! The skill file store contract (spec §4.6): `read(path)`, `write(path,
//! text)`. Files are treated as UTF-8; unencodable characters are written
//! with replacement and a warning, never a hard failure, since a skill
//! file is a living document the operator edits by hand.

use std::fs;
use std::path::Path;

use crate::error::AdapterError;

pub trait SkillFileStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<String, AdapterError>;
    fn write(&self, path: &Path, text: &str) -> Result<(), AdapterError>;
}

pub struct FileSkillFileStore;

impl SkillFileStore for FileSkillFileStore {
    fn read(&self, path: &Path) -> Result<String, AdapterError> {
        let bytes = fs::read(path).map_err(|source| AdapterError::SkillFileIo {
            path: path.display().to_string(),
            source,
        })?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    "skill file contains invalid UTF-8; replacing unencodable bytes"
                );
                Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
            }
        }
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), AdapterError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| AdapterError::SkillFileIo {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| AdapterError::SkillFileIo {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_then_reads_back_identical_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skill.md").to_path_buf();
        let store = FileSkillFileStore;
        store.write(&path, "# Goal\nDo the thing.").unwrap();
        let read_back = store.read(&path).unwrap();
        assert_eq!(read_back, "# Goal\nDo the thing.");
    }

    #[test]
    fn missing_file_is_an_error() {
        let store = FileSkillFileStore;
        let result = store.read(Path::new("/nonexistent/skill.md"));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skill.md");
        fs::write(&path, [0x48, 0x69, 0xFF, 0xFE]).unwrap();
        let store = FileSkillFileStore;
        let content = store.read(&path).unwrap();
        assert!(content.starts_with("Hi"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("skill.md");
        let store = FileSkillFileStore;
        store.write(&path, "content").unwrap();
        assert!(path.exists());
    }
}
