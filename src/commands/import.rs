use anyhow::{Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::ImportArgs;
use crate::commands::review::load_session;
use crate::commands::source::load_source;
use crate::model::{ImportCounts, ImportPaths, ImportRunManifest};
use crate::pipeline::merge::import_rows;
use crate::pipeline::session::ImportSession;
use crate::pipeline::storage::{JsonFileStore, StagedStore, VocabStorage};
use crate::util::{
    ensure_directory, now_utc_string, sha256_text, utc_compact_string, write_json_pretty,
};

pub fn run(args: ImportArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("import-{}", utc_compact_string(started_ts));

    let (session, source_path) = match &args.session {
        Some(path) => (load_session(path)?, path.clone()),
        None => {
            if args.input.is_none() && args.fragments.is_none() {
                bail!("one of --session, --input or --fragments is required");
            }
            let source = load_source(
                args.input.as_deref(),
                args.fragments.as_deref(),
                &args.geometry.config(),
            )?;
            (
                ImportSession::create_with_config(
                    source.text,
                    args.mode,
                    args.auto_select.config(),
                ),
                source.path,
            )
        }
    };

    let store = if args.dry_run {
        JsonFileStore::open(&args.store_root)
    } else {
        ensure_directory(&args.store_root)?;
        let store = JsonFileStore::open_migrating(&args.store_root)?;
        if store.legacy_pending() {
            bail!(
                "legacy store {} could not be migrated; repair or move it before importing",
                store.legacy_path().display()
            );
        }
        store
    };

    info!(
        run_id = %run_id,
        store = %store.path().display(),
        policy = args.policy.as_str(),
        dry_run = args.dry_run,
        "starting import"
    );

    let staged = StagedStore::over(&store);
    let target: &dyn VocabStorage = if args.dry_run { &staged } else { &store };
    let merge = import_rows(&session.rows, target, args.policy)?;

    let mut warnings = Vec::new();
    warnings.extend(merge.baseline_warning.clone());
    if args.dry_run && store.legacy_pending() {
        warnings.push(format!(
            "legacy store {} read in place; it is migrated on the next import",
            store.legacy_path().display()
        ));
    }
    let unclassified = session.unclassified_rows().len();
    if unclassified > 0 {
        warnings.push(format!("{unclassified} unclassified rows were not imported"));
    }

    let report_path = args.report_path.clone().unwrap_or_else(|| {
        args.store_root
            .join("reports")
            .join(format!("import_run_{}.json", utc_compact_string(started_ts)))
    });

    let manifest = ImportRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: if args.dry_run { "dry_run" } else { "completed" }.to_string(),
        started_at,
        updated_at: now_utc_string(),
        parse_mode: session.parse_mode.as_str().to_string(),
        duplicate_policy: args.policy.as_str().to_string(),
        source_sha256: sha256_text(&session.source_text),
        paths: ImportPaths {
            store_root: args.store_root.display().to_string(),
            store_path: store.path().display().to_string(),
            source_path: source_path.display().to_string(),
        },
        counts: ImportCounts {
            rows_total: session.rows.len(),
            rows_resolved: session.confirmed_rows().len(),
            rows_unclassified: unclassified,
            entries_before: merge.entries_before,
            entries_after: merge.entries_after,
            added: merge.outcome.added,
            skipped: merge.outcome.skipped,
        },
        warnings,
    };

    write_json_pretty(&report_path, &manifest)?;

    info!(path = %report_path.display(), "wrote import report");
    info!(
        run_id = %run_id,
        added = merge.outcome.added,
        skipped = merge.outcome.skipped,
        entries = merge.entries_after,
        "import completed"
    );

    Ok(())
}
