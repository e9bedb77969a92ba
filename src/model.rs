use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

/// One span of recognized text as reported by the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    #[serde(alias = "boundingBox")]
    pub bounding_box: BoundingBox,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Candidate,
    Unclassified,
    Confirmed,
}

impl RowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Unclassified => "unclassified",
            Self::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub id: String,
    pub term: String,
    pub meaning: String,
    pub confidence: f64,
    pub source_line: String,
    pub status: RowStatus,
}

impl ImportRow {
    pub fn candidate(
        id: String,
        term: &str,
        meaning: &str,
        confidence: f64,
        source_line: &str,
    ) -> Self {
        let term = term.trim();
        let meaning = meaning.trim();
        if term.is_empty() || meaning.is_empty() {
            return Self::unclassified(id, source_line, 0.2);
        }

        Self {
            id,
            term: term.to_string(),
            meaning: meaning.to_string(),
            confidence,
            source_line: source_line.to_string(),
            status: RowStatus::Candidate,
        }
    }

    pub fn unclassified(id: String, source_line: &str, confidence: f64) -> Self {
        Self {
            id,
            term: String::new(),
            meaning: String::new(),
            confidence,
            source_line: source_line.to_string(),
            status: RowStatus::Unclassified,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status != RowStatus::Unclassified
            && !self.term.trim().is_empty()
            && !self.meaning.trim().is_empty()
    }

    /// Applies a manual edit and re-derives the status from the new values.
    pub fn with_edit(&self, term: &str, meaning: &str) -> Self {
        let term = term.trim().to_string();
        let meaning = meaning.trim().to_string();
        let complete = !term.is_empty() && !meaning.is_empty();

        Self {
            id: self.id.clone(),
            term,
            meaning,
            confidence: if complete { 1.0 } else { self.confidence },
            source_line: self.source_line.clone(),
            status: if complete {
                RowStatus::Confirmed
            } else {
                RowStatus::Unclassified
            },
        }
    }

    /// Promotes a complete row to confirmed; `None` when a field is missing.
    pub fn confirmed(&self) -> Option<Self> {
        if self.term.trim().is_empty() || self.meaning.trim().is_empty() {
            return None;
        }

        Some(Self {
            status: RowStatus::Confirmed,
            ..self.clone()
        })
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ParseMode {
    #[default]
    Auto,
    Delimiter,
    Alternating,
    SingleLine,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Delimiter => "delimiter",
            Self::Alternating => "alternating",
            Self::SingleLine => "single-line",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    Overwrite,
    #[default]
    Skip,
    KeepBoth,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::KeepBoth => "keep-both",
        }
    }
}

pub const DEFAULT_IMPORTANCE_LEVEL: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: String,
    pub term: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration_scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration_image_ref: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default = "default_importance_level")]
    pub importance_level: u8,
}

impl VocabularyEntry {
    pub fn new(term: &str, meaning: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            term: term.to_string(),
            meaning: meaning.to_string(),
            illustration_scenario: None,
            illustration_image_ref: None,
            is_favorite: false,
            importance_level: DEFAULT_IMPORTANCE_LEVEL,
        }
    }
}

fn default_importance_level() -> u8 {
    DEFAULT_IMPORTANCE_LEVEL
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportPaths {
    pub store_root: String,
    pub store_path: String,
    pub source_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportCounts {
    pub rows_total: usize,
    pub rows_resolved: usize,
    pub rows_unclassified: usize,
    pub entries_before: usize,
    pub entries_after: usize,
    pub added: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub parse_mode: String,
    pub duplicate_policy: String,
    pub source_sha256: String,
    pub paths: ImportPaths,
    pub counts: ImportCounts,
    pub warnings: Vec<String>,
}
