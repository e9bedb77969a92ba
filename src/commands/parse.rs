use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ParseArgs;
use crate::commands::source::load_source;
use crate::model::ImportRow;
use crate::pipeline::session::ImportSession;
use crate::util::write_json_pretty;

pub fn run(args: ParseArgs) -> Result<()> {
    let source = load_source(
        args.source.input.as_deref(),
        args.source.fragments.as_deref(),
        &args.geometry.config(),
    )?;

    let session =
        ImportSession::create_with_config(source.text, args.mode, args.auto_select.config());

    info!(
        path = %source.path.display(),
        mode = args.mode.as_str(),
        rows = session.rows.len(),
        resolved = session.confirmed_rows().len(),
        unclassified = session.unclassified_rows().len(),
        "parsed vocabulary rows"
    );

    if let Some(path) = &args.session_out {
        write_json_pretty(path, &session)?;
        info!(path = %path.display(), "wrote import session");
    }

    if args.json {
        let rendered = serde_json::to_string_pretty(&session.rows)
            .context("failed to serialize parsed rows")?;
        println!("{rendered}");
    } else {
        print!("{}", render_rows(&session.rows));
    }

    Ok(())
}

pub fn render_rows(rows: &[ImportRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let detail = if row.is_resolved() {
            format!("{} => {}", row.term, row.meaning)
        } else {
            row.source_line.replace('\n', " / ")
        };
        out.push_str(&format!(
            "{}\t{:<12}\t{:.2}\t{}\n",
            row.id,
            row.status.as_str(),
            row.confidence,
            detail
        ));
    }
    out
}
