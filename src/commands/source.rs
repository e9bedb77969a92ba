use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::model::TextFragment;
use crate::pipeline::reconstruct::{ReconstructConfig, reconstruct_text};

/// Raw text handed to the parser plus the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub text: String,
    pub path: PathBuf,
}

pub fn load_source(
    input: Option<&Path>,
    fragments: Option<&Path>,
    geometry: &ReconstructConfig,
) -> Result<LoadedSource> {
    match (input, fragments) {
        (Some(path), None) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "loaded text source");
            Ok(LoadedSource {
                text,
                path: path.to_path_buf(),
            })
        }
        (None, Some(path)) => {
            let fragments = read_fragments(path)?;
            let text = reconstruct_text(&fragments, geometry);
            info!(
                path = %path.display(),
                fragments = fragments.len(),
                lines = text.lines().count(),
                "reconstructed text from fragments"
            );
            Ok(LoadedSource {
                text,
                path: path.to_path_buf(),
            })
        }
        (Some(_), Some(_)) => bail!("--input and --fragments are mutually exclusive"),
        (None, None) => bail!("one of --input or --fragments is required"),
    }
}

pub fn read_fragments(path: &Path) -> Result<Vec<TextFragment>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let fragments = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse fragments from {}", path.display()))?;
    Ok(fragments)
}
