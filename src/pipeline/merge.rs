use anyhow::Result;
use tracing::{debug, warn};

use crate::model::{DuplicatePolicy, ImportRow, MergeOutcome, VocabularyEntry};
use crate::pipeline::storage::VocabStorage;

/// What one `import_rows` call did to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub outcome: MergeOutcome,
    pub entries_before: usize,
    pub entries_after: usize,
    /// Set when the existing store could not be read and the batch was merged
    /// into an empty baseline instead.
    pub baseline_warning: Option<String>,
}

/// Folds the resolved rows into the store as one batch and persists the
/// result with a single `save_all`. The store is read exactly once.
///
/// Assumes a single writer: concurrent calls against the same store race and
/// the last save wins.
pub fn import_rows(
    rows: &[ImportRow],
    storage: &dyn VocabStorage,
    policy: DuplicatePolicy,
) -> Result<MergeReport> {
    let (mut entries, baseline_warning) = match storage.load_all() {
        Ok(entries) => (entries, None),
        Err(error) => {
            warn!(error = %error, "vocabulary store unreadable; merging into an empty baseline");
            (
                Vec::new(),
                Some(format!("existing store unreadable, treated as empty: {error:#}")),
            )
        }
    };
    let entries_before = entries.len();

    let outcome = merge_into(&mut entries, rows, policy);
    storage.save_all(&entries)?;

    debug!(
        policy = policy.as_str(),
        added = outcome.added,
        skipped = outcome.skipped,
        entries = entries.len(),
        "merged import rows"
    );
    Ok(MergeReport {
        outcome,
        entries_before,
        entries_after: entries.len(),
        baseline_warning,
    })
}

pub fn merge_into(
    entries: &mut Vec<VocabularyEntry>,
    rows: &[ImportRow],
    policy: DuplicatePolicy,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for row in rows.iter().filter(|row| row.is_resolved()) {
        let term = row.term.trim();
        let meaning = row.meaning.trim();
        if term.is_empty() || meaning.is_empty() {
            continue;
        }

        let existing = entries
            .iter()
            .position(|entry| terms_match(&entry.term, term));

        match (existing, policy) {
            (None, _) | (Some(_), DuplicatePolicy::KeepBoth) => {
                entries.push(VocabularyEntry::new(term, meaning));
                outcome.added += 1;
            }
            (Some(index), DuplicatePolicy::Overwrite) => {
                entries[index].meaning = meaning.to_string();
                outcome.added += 1;
            }
            (Some(_), DuplicatePolicy::Skip) => {
                outcome.skipped += 1;
            }
        }
    }

    outcome
}

fn terms_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.to_lowercase()
}
