//! JSON-file-backed paper library
//!
//! One file holds the whole library: a mapping from paper id to record plus
//! a `lastUpdated` stamp. Every mutation rewrites the file. There is no
//! locking; concurrent writers race and the last save wins, which is
//! acceptable for the single-user, single-process usage this targets.

use crate::domain::Paper;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LibraryData {
    #[serde(default)]
    papers: HashMap<String, Paper>,
    #[serde(default)]
    last_updated: i64,
}

pub struct LibraryStore {
    path: PathBuf,
    data: LibraryData,
}

impl LibraryStore {
    /// Open a library file, creating parent directories as needed. A missing
    /// file yields an empty library; an unreadable or malformed one is
    /// logged and also treated as empty rather than blocking startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "malformed library file, starting empty");
                        LibraryData::default()
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable library file, starting empty");
                    LibraryData::default()
                }
            }
        } else {
            LibraryData::default()
        };

        Ok(Self { path, data })
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.data.last_updated = chrono::Utc::now().timestamp_millis();
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Insert or replace a paper, keyed by its id
    pub fn add_paper(&mut self, paper: Paper) -> Result<(), StoreError> {
        self.data.papers.insert(paper.id.clone(), paper);
        self.save()
    }

    /// Remove a paper; returns whether it was present
    pub fn remove_paper(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.data.papers.remove(id).is_some() {
            self.save()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn get_paper(&self, id: &str) -> Option<&Paper> {
        self.data.papers.get(id)
    }

    pub fn all_papers(&self) -> Vec<Paper> {
        self.data.papers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.papers.is_empty()
    }

    /// Epoch milliseconds of the last successful save
    pub fn last_updated(&self) -> i64 {
        self.data.last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Highlight, Rect};

    fn sample_paper() -> Paper {
        let mut paper = Paper::new(
            "10.1234/abc".to_string(),
            "Stored Paper".to_string(),
            vec!["Jane Doe".to_string()],
        );
        paper.doi = Some("10.1234/abc".to_string());
        paper.tags = vec!["ml".to_string()];
        paper.notes = Some("read later".to_string());
        paper.enriched_at = Some(1_700_000_000_000);
        paper.annotations = vec![Highlight {
            page: 2,
            rects: vec![Rect::new(1.0, 2.0, 3.0, 4.0)],
            color: "#10b981".to_string(),
            note: None,
        }];
        paper
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LibraryStore::open(dir.path().join("library.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let mut store = LibraryStore::open(&path).unwrap();
        store.add_paper(sample_paper()).unwrap();
        drop(store);

        let reloaded = LibraryStore::open(&path).unwrap();
        let paper = reloaded.get_paper("10.1234/abc").unwrap();
        assert_eq!(*paper, sample_paper());
    }

    #[test]
    fn test_remove_paper() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LibraryStore::open(dir.path().join("library.json")).unwrap();
        store.add_paper(sample_paper()).unwrap();

        assert!(store.remove_paper("10.1234/abc").unwrap());
        assert!(!store.remove_paper("10.1234/abc").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_mutation_refreshes_last_updated() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LibraryStore::open(dir.path().join("library.json")).unwrap();
        assert_eq!(store.last_updated(), 0);

        store.add_paper(sample_paper()).unwrap();
        assert!(store.last_updated() > 0);
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        let store = LibraryStore::open(&path).unwrap();
        assert!(store.is_empty());
    }
}
