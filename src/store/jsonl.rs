//! File-backed claim store: one JSON Lines file per category.
//!
//! ```text
//! <root>/validated.jsonl
//! <root>/hypothesis.jsonl
//! ...
//! <root>/new_phenomenon.jsonl
//! ```
//!
//! Each line is `{"key": ..., "claim": {...}}`. Files are only ever opened
//! in append mode.
//!
//! Reads are strict: a malformed line is reported as [`Error::Store`].
//! Writes are not: the duplicate-key index skips lines it cannot parse, and
//! a torn final line (no trailing newline) is terminated before the next
//! record is written so that record stays intact.

use std::collections::hash_map::Entry;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::{ClaimCategory, ClaimStore};
use crate::claim::Claim;
use crate::{Error, Result};

#[derive(Serialize)]
struct LineRef<'a> {
    key: &'a str,
    claim: &'a Claim,
}

#[derive(Deserialize)]
struct Line {
    key: String,
    claim: Claim,
}

#[derive(Deserialize)]
struct KeyOnly {
    key: String,
}

/// Keys already written to one category file.
#[derive(Debug, Default)]
struct CategoryIndex {
    keys: FxHashSet<String>,
    /// The file ends mid-line.
    needs_newline: bool,
}

/// Append-only claim store persisted as JSON Lines.
///
/// The key index doubles as the writer lock: it serialises appends within
/// this process so the duplicate-key check and the write are atomic with
/// respect to each other. Each category file is scanned once, on its first
/// append.
#[derive(Debug)]
pub struct JsonlClaimStore {
    root: PathBuf,
    index: Mutex<FxHashMap<ClaimCategory, CategoryIndex>>,
}

impl JsonlClaimStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            index: Mutex::new(FxHashMap::default()),
        })
    }

    /// Directory holding the category files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `category`.
    #[must_use]
    pub fn path_for(&self, category: ClaimCategory) -> PathBuf {
        self.root.join(format!("{}.jsonl", category.as_str()))
    }

    /// All claims in `category`, in append order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds a malformed line.
    pub fn claims_in(&self, category: ClaimCategory) -> Result<Vec<Claim>> {
        Ok(self
            .read_lines(category)?
            .into_iter()
            .map(|line| line.claim)
            .collect())
    }

    fn read_lines(&self, category: ClaimCategory) -> Result<Vec<Line>> {
        let path = self.path_for(category);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut lines = Vec::new();
        for (number, raw) in reader.lines().enumerate() {
            let raw = raw?;
            if raw.trim().is_empty() {
                continue;
            }
            let line: Line = serde_json::from_str(&raw).map_err(|e| Error::Store {
                category: category.to_string(),
                message: format!("{}:{}: {e}", path.display(), number + 1),
            })?;
            lines.push(line);
        }
        Ok(lines)
    }

    fn load_index(&self, category: ClaimCategory) -> Result<CategoryIndex> {
        let path = self.path_for(category);
        let mut index = CategoryIndex::default();
        if !path.exists() {
            return Ok(index);
        }

        let mut file = File::open(&path)?;
        if file.seek(SeekFrom::End(0))? > 0 {
            file.seek(SeekFrom::End(-1))?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last)?;
            index.needs_newline = last[0] != b'\n';
            file.seek(SeekFrom::Start(0))?;
        }

        for (number, raw) in BufReader::new(file).lines().enumerate() {
            let raw = raw?;
            if raw.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<KeyOnly>(&raw) {
                Ok(line) => {
                    index.keys.insert(line.key);
                }
                Err(e) => tracing::warn!(
                    category = %category,
                    line = number + 1,
                    error = %e,
                    "skipping malformed claim line"
                ),
            }
        }
        Ok(index)
    }
}

impl ClaimStore for JsonlClaimStore {
    fn append(&self, category: ClaimCategory, key: &str, claim: &Claim) -> Result<()> {
        let mut indexes = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let index = match indexes.entry(category) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(self.load_index(category)?)
            }
        };

        if index.keys.contains(key) {
            return Err(Error::DuplicateClaim(format!("{category}/{key}")));
        }

        let mut encoded = String::new();
        if index.needs_newline {
            encoded.push('\n');
        }
        encoded.push_str(&serde_json::to_string(&LineRef { key, claim })?);
        encoded.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(category))?;
        // a failed write may leave a partial line behind; blank lines are skipped
        index.needs_newline = true;
        file.write_all(encoded.as_bytes())?;
        file.flush()?;

        index.needs_newline = false;
        index.keys.insert(key.to_string());
        Ok(())
    }

    fn get(&self, category: ClaimCategory, key: &str) -> Result<Option<Claim>> {
        Ok(self
            .read_lines(category)?
            .into_iter()
            .find(|line| line.key == key)
            .map(|line| line.claim))
    }

    fn count(&self, category: ClaimCategory) -> Result<usize> {
        Ok(self.read_lines(category)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::sample_claim;
    use chrono::Utc;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "claimcheck-jsonl-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_append_creates_category_file() {
        let dir = scratch("create");
        let store = JsonlClaimStore::open(&dir).unwrap();
        let claim = sample_claim("run-1", Utc::now());

        store.append(ClaimCategory::Improvement, "k1", &claim).unwrap();

        assert!(store.path_for(ClaimCategory::Improvement).exists());
        assert!(!store.path_for(ClaimCategory::Validated).exists());
        assert_eq!(store.get(ClaimCategory::Improvement, "k1").unwrap(), Some(claim));
        assert_eq!(store.count(ClaimCategory::Validated).unwrap(), 0);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_duplicate_rejected_and_file_untouched() {
        let dir = scratch("dup");
        let store = JsonlClaimStore::open(&dir).unwrap();
        let claim = sample_claim("run-1", Utc::now());

        store.append(ClaimCategory::Anomaly, "k", &claim).unwrap();
        let before = fs::read_to_string(store.path_for(ClaimCategory::Anomaly)).unwrap();
        assert!(matches!(
            store.append(ClaimCategory::Anomaly, "k", &claim),
            Err(Error::DuplicateClaim(_))
        ));
        let after = fs::read_to_string(store.path_for(ClaimCategory::Anomaly)).unwrap();

        assert_eq!(before, after);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_reopen_sees_previous_claims() {
        let dir = scratch("reopen");
        {
            let store = JsonlClaimStore::open(&dir).unwrap();
            store
                .append(ClaimCategory::Regression, "a", &sample_claim("run-a", Utc::now()))
                .unwrap();
            store
                .append(ClaimCategory::Regression, "b", &sample_claim("run-b", Utc::now()))
                .unwrap();
        }

        let store = JsonlClaimStore::open(&dir).unwrap();
        let runs: Vec<String> = store
            .claims_in(ClaimCategory::Regression)
            .unwrap()
            .iter()
            .map(|c| c.run_id().to_string())
            .collect();
        assert_eq!(runs, ["run-a", "run-b"]);
        assert_eq!(store.total().unwrap(), 2);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_malformed_line_is_store_error() {
        let dir = scratch("malformed");
        let store = JsonlClaimStore::open(&dir).unwrap();
        fs::write(store.path_for(ClaimCategory::Validated), "not json\n").unwrap();

        let err = store.count(ClaimCategory::Validated).unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
        assert!(err.to_string().contains("validated"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_torn_line_does_not_block_appends() {
        let dir = scratch("torn");
        let store = JsonlClaimStore::open(&dir).unwrap();
        let path = store.path_for(ClaimCategory::Regression);
        fs::write(
            &path,
            concat!(
                r#"{"key":"old","claim":"#,
                "\n",
                r#"{"key":"a","cla"#
            ),
        )
        .unwrap();

        store
            .append(ClaimCategory::Regression, "b", &sample_claim("run-b", Utc::now()))
            .unwrap();
        store
            .append(ClaimCategory::Regression, "c", &sample_claim("run-c", Utc::now()))
            .unwrap();
        assert!(matches!(
            store.append(ClaimCategory::Regression, "c", &sample_claim("run-c", Utc::now())),
            Err(Error::DuplicateClaim(_))
        ));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        let keys: Vec<String> = lines[2..]
            .iter()
            .map(|raw| serde_json::from_str::<KeyOnly>(raw).unwrap().key)
            .collect();
        assert_eq!(keys, ["b", "c"]);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_index_sees_keys_written_before_open() {
        let dir = scratch("index");
        {
            let store = JsonlClaimStore::open(&dir).unwrap();
            store
                .append(ClaimCategory::Anomaly, "k", &sample_claim("run-1", Utc::now()))
                .unwrap();
        }

        let store = JsonlClaimStore::open(&dir).unwrap();
        assert!(matches!(
            store.append(ClaimCategory::Anomaly, "k", &sample_claim("run-2", Utc::now())),
            Err(Error::DuplicateClaim(_))
        ));
        fs::remove_dir_all(dir).ok();
    }
}
