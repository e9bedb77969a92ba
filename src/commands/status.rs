use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::VocabularyEntry;
use crate::pipeline::storage::{JsonFileStore, VocabStorage};

pub fn run(args: StatusArgs) -> Result<()> {
    info!(store_root = %args.store_root.display(), "status requested");

    let store = JsonFileStore::open(&args.store_root);
    let legacy_pending = store.legacy_pending();
    if !store.path().exists() && !legacy_pending {
        warn!(path = %store.path().display(), "vocabulary store missing");
        return Ok(());
    }

    let source = if legacy_pending {
        store.legacy_path()
    } else {
        store.path()
    };
    match store.load_all() {
        Ok(entries) => {
            let summary = StoreSummary::of(&entries);
            info!(
                path = %source.display(),
                entries = summary.entries,
                favorites = summary.favorites,
                illustrated = summary.illustrated,
                legacy_pending,
                "vocabulary store status"
            );
        }
        Err(error) => {
            warn!(path = %source.display(), error = %error, "vocabulary store unreadable");
        }
    }

    if legacy_pending {
        info!(
            path = %store.legacy_path().display(),
            "legacy store not migrated yet; the next import migrates it"
        );
    } else if store.legacy_path().exists() {
        info!(path = %store.legacy_path().display(), "legacy store present (already migrated)");
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct StoreSummary {
    entries: usize,
    favorites: usize,
    illustrated: usize,
}

impl StoreSummary {
    fn of(entries: &[VocabularyEntry]) -> Self {
        Self {
            entries: entries.len(),
            favorites: entries.iter().filter(|entry| entry.is_favorite).count(),
            illustrated: entries
                .iter()
                .filter(|entry| entry.illustration_image_ref.is_some())
                .count(),
        }
    }
}
