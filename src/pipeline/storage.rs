use std::cell::RefCell;
#[cfg(test)]
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};

use crate::model::VocabularyEntry;
use crate::util::write_json_pretty;

pub const STORE_FILE_NAME: &str = "vocabulary.json";
pub const LEGACY_FILE_NAME: &str = "legacy_kv.sqlite";

pub trait VocabStorage {
    fn load_all(&self) -> Result<Vec<VocabularyEntry>>;
    fn save_all(&self, entries: &[VocabularyEntry]) -> Result<()>;
}

/// JSON array of entries under a store root, replaced wholesale on save.
///
/// Until the JSON file exists, reads fall through to the legacy key/value
/// database next to it. Only `open_migrating` writes the migrated file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    legacy_path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store under `root` without touching the filesystem.
    pub fn open(root: &Path) -> Self {
        Self {
            path: root.join(STORE_FILE_NAME),
            legacy_path: root.join(LEGACY_FILE_NAME),
        }
    }

    /// Opens the store and, when only the legacy database exists, writes its
    /// pairs into the JSON file. An unreadable legacy database is left alone
    /// and nothing is written, so a later open retries.
    pub fn open_migrating(root: &Path) -> Result<Self> {
        let store = Self::open(root);
        if store.legacy_pending() {
            store.migrate_legacy()?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn legacy_path(&self) -> &Path {
        &self.legacy_path
    }

    /// True while the legacy database exists and has not been migrated.
    pub fn legacy_pending(&self) -> bool {
        !self.path.exists() && self.legacy_path.exists()
    }

    fn migrate_legacy(&self) -> Result<()> {
        let entries = match read_legacy_entries(&self.legacy_path) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(
                    path = %self.legacy_path.display(),
                    error = %error,
                    "legacy vocabulary store unreadable; migration postponed"
                );
                return Ok(());
            }
        };

        self.save_all(&entries)?;
        info!(
            from = %self.legacy_path.display(),
            to = %self.path.display(),
            entries = entries.len(),
            "migrated legacy vocabulary store"
        );
        Ok(())
    }
}

impl VocabStorage for JsonFileStore {
    fn load_all(&self) -> Result<Vec<VocabularyEntry>> {
        if !self.path.exists() {
            if self.legacy_path.exists() {
                return read_legacy_entries(&self.legacy_path);
            }
            return Ok(Vec::new());
        }

        let raw = fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let entries = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(entries)
    }

    fn save_all(&self, entries: &[VocabularyEntry]) -> Result<()> {
        write_json_pretty(&self.path, entries)
    }
}

/// Reads the legacy `vocabulary_kv` table. Rows with a NULL or blank term or
/// meaning are dropped one by one; only a failure to open or query the
/// database is an error.
fn read_legacy_entries(path: &Path) -> Result<Vec<VocabularyEntry>> {
    let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut statement = connection
        .prepare("SELECT term, meaning FROM vocabulary_kv ORDER BY rowid")
        .context("failed to prepare legacy vocabulary query")?;
    let pairs = statement
        .query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
            ))
        })
        .context("failed to query legacy vocabulary")?;

    let mut entries = Vec::new();
    let mut dropped = 0_usize;
    for pair in pairs {
        match pair {
            Ok((Some(term), Some(meaning)))
                if !term.trim().is_empty() && !meaning.trim().is_empty() =>
            {
                entries.push(VocabularyEntry::new(term.trim(), meaning.trim()));
            }
            Ok(_) => dropped += 1,
            Err(error) => {
                debug!(error = %error, "skipping unreadable legacy row");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(
            path = %path.display(),
            dropped,
            kept = entries.len(),
            "dropped incomplete legacy vocabulary rows"
        );
    }
    Ok(entries)
}

/// Reads through to a backing store and keeps saves in memory. Dry runs merge
/// into this so the backing store is never written.
pub struct StagedStore<'a> {
    backing: &'a dyn VocabStorage,
    staged: RefCell<Option<Vec<VocabularyEntry>>>,
}

impl<'a> StagedStore<'a> {
    pub fn over(backing: &'a dyn VocabStorage) -> Self {
        Self {
            backing,
            staged: RefCell::new(None),
        }
    }
}

impl VocabStorage for StagedStore<'_> {
    fn load_all(&self) -> Result<Vec<VocabularyEntry>> {
        match self.staged.borrow().as_ref() {
            Some(entries) => Ok(entries.clone()),
            None => self.backing.load_all(),
        }
    }

    fn save_all(&self, entries: &[VocabularyEntry]) -> Result<()> {
        *self.staged.borrow_mut() = Some(entries.to_vec());
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<Vec<VocabularyEntry>>,
    saves: Cell<usize>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_entries(entries: Vec<VocabularyEntry>) -> Self {
        Self {
            entries: RefCell::new(entries),
            saves: Cell::new(0),
        }
    }

    pub fn entries(&self) -> Vec<VocabularyEntry> {
        self.entries.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

#[cfg(test)]
impl VocabStorage for MemoryStore {
    fn load_all(&self) -> Result<Vec<VocabularyEntry>> {
        Ok(self.entries.borrow().clone())
    }

    fn save_all(&self, entries: &[VocabularyEntry]) -> Result<()> {
        *self.entries.borrow_mut() = entries.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_legacy(path: &Path, pairs: &[(&str, Option<&str>)]) {
        let connection = Connection::open(path).expect("open legacy db");
        connection
            .execute_batch("CREATE TABLE vocabulary_kv (term TEXT PRIMARY KEY, meaning TEXT);")
            .expect("create legacy table");
        for (term, meaning) in pairs {
            connection
                .execute(
                    "INSERT INTO vocabulary_kv (term, meaning) VALUES (?1, ?2)",
                    rusqlite::params![term, meaning],
                )
                .expect("insert legacy pair");
        }
    }

    #[test]
    fn json_store_round_trips_entries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::open(dir.path());
        assert!(store.load_all().expect("empty load").is_empty());

        let mut entry = VocabularyEntry::new("cat", "ネコ");
        entry.is_favorite = true;
        entry.illustration_scenario = Some("a cat on a mat".to_string());
        store.save_all(&[entry.clone()]).expect("save");

        let loaded = JsonFileStore::open(dir.path()).load_all().expect("load");
        assert_eq!(loaded, vec![entry]);
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(STORE_FILE_NAME), b"{not json").expect("write garbage");

        let store = JsonFileStore::open(dir.path());
        assert!(store.load_all().is_err());
    }

    #[test]
    fn open_migrating_moves_legacy_pairs_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_legacy(
            &dir.path().join(LEGACY_FILE_NAME),
            &[("apple", Some("りんご")), ("blank", Some("  ")), ("dog", Some("イヌ"))],
        );

        let store = JsonFileStore::open_migrating(dir.path()).expect("open store");
        assert!(!store.legacy_pending());
        let migrated = store.load_all().expect("load migrated");
        assert_eq!(migrated.len(), 2);
        assert_eq!(migrated[0].term, "apple");
        assert_eq!(migrated[0].importance_level, 3);
        assert_ne!(migrated[0].id, migrated[1].id);

        store.save_all(&migrated[..1]).expect("save subset");
        let reopened = JsonFileStore::open_migrating(dir.path()).expect("reopen");
        assert_eq!(reopened.load_all().expect("load").len(), 1);
    }

    #[test]
    fn null_legacy_meaning_drops_only_that_row() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_legacy(
            &dir.path().join(LEGACY_FILE_NAME),
            &[("apple", Some("りんご")), ("dog", Some("イヌ")), ("ghost", None)],
        );

        let store = JsonFileStore::open_migrating(dir.path()).expect("open store");
        let terms = store
            .load_all()
            .expect("load migrated")
            .into_iter()
            .map(|entry| entry.term)
            .collect::<Vec<String>>();
        assert_eq!(terms, vec!["apple", "dog"]);
        assert!(store.path().exists());
    }

    #[test]
    fn open_reads_legacy_pairs_without_writing() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_legacy(&dir.path().join(LEGACY_FILE_NAME), &[("cat", Some("ネコ"))]);

        let store = JsonFileStore::open(dir.path());
        assert!(store.legacy_pending());
        assert_eq!(store.load_all().expect("load legacy").len(), 1);
        assert!(!store.path().exists());
    }

    #[test]
    fn unreadable_legacy_store_is_not_shadowed() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(LEGACY_FILE_NAME), b"not a database").expect("write garbage");

        let store = JsonFileStore::open_migrating(dir.path()).expect("open store");
        assert!(!store.path().exists());
        assert!(store.legacy_pending());
        assert!(store.load_all().is_err());
    }

    #[test]
    fn staged_store_keeps_saves_out_of_the_backing_store() {
        let backing = MemoryStore::with_entries(vec![VocabularyEntry::new("cat", "ネコ")]);
        let staged = StagedStore::over(&backing);
        assert_eq!(staged.load_all().expect("read through").len(), 1);

        staged.save_all(&[]).expect("stage");
        assert!(staged.load_all().expect("staged").is_empty());
        assert_eq!(backing.entries().len(), 1);
        assert_eq!(backing.save_count(), 0);
    }
}
