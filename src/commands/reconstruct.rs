use anyhow::Result;
use tracing::info;

use crate::cli::ReconstructArgs;
use crate::commands::source::read_fragments;
use crate::pipeline::reconstruct::reconstruct_lines;
use crate::util::write_atomic;

pub fn run(args: ReconstructArgs) -> Result<()> {
    let fragments = read_fragments(&args.fragments)?;
    let lines = reconstruct_lines(&fragments, &args.geometry.config());

    info!(
        path = %args.fragments.display(),
        fragments = fragments.len(),
        lines = lines.len(),
        "reconstructed reading order"
    );

    match args.output {
        Some(path) => {
            write_atomic(&path, lines.join("\n").as_bytes())?;
            info!(path = %path.display(), "wrote reconstructed text");
        }
        None => {
            for line in &lines {
                println!("{line}");
            }
        }
    }

    Ok(())
}
