use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ReviewArgs;
use crate::pipeline::session::ImportSession;
use crate::util::write_json_pretty;

pub fn run(args: ReviewArgs) -> Result<()> {
    let mut session = load_session(&args.session)?;
    let action = &args.action;

    if action.reparse {
        if let Some(mode) = args.mode {
            session.set_mode(mode);
        }
        let discarded = session.reparse();
        if discarded > 0 {
            warn!(
                discarded_edits = discarded,
                mode = session.parse_mode.as_str(),
                "reparse discarded manual edits"
            );
        }
        info!(
            mode = session.parse_mode.as_str(),
            rows = session.rows.len(),
            "reparsed session"
        );
    } else if let Some(id) = &action.edit {
        let term = args.term.as_deref().unwrap_or_default();
        let meaning = args.meaning.as_deref().unwrap_or_default();
        let row = session
            .edit_row(id, term, meaning)
            .with_context(|| format!("failed to edit row in {}", args.session.display()))?;
        info!(row = %row.id, status = row.status.as_str(), "edited row");
    } else if let Some(id) = &action.confirm {
        let row = session
            .confirm_row(id)
            .with_context(|| format!("failed to confirm row in {}", args.session.display()))?;
        info!(row = %row.id, "confirmed row");
    } else if let Some(id) = &action.delete {
        let row = session
            .delete_row(id)
            .with_context(|| format!("failed to delete row in {}", args.session.display()))?;
        info!(row = %row.id, source_line = %row.source_line, "deleted row");
    } else {
        bail!("no review action given");
    }

    write_json_pretty(&args.session, &session)?;
    info!(
        path = %args.session.display(),
        resolved = session.confirmed_rows().len(),
        unclassified = session.unclassified_rows().len(),
        "saved session"
    );

    Ok(())
}

pub fn load_session(path: &Path) -> Result<ImportSession> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let session = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse session {}", path.display()))?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParseMode;

    #[test]
    fn load_session_reads_written_session() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.json");
        let session = ImportSession::create("apple - りんご\nloose", ParseMode::Auto);
        write_json_pretty(&path, &session).expect("write session");

        let loaded = load_session(&path).expect("load session");
        assert_eq!(loaded, session);
        assert_eq!(loaded.parse_mode, ParseMode::Auto);
    }
}
