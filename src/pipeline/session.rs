use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ImportRow, ParseMode};
use crate::pipeline::parser::{AutoSelectConfig, parse, parse_with_config};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no row with id {0} in this session")]
    RowNotFound(String),
    #[error("row {0} is missing a term or meaning and cannot be confirmed")]
    IncompleteRow(String),
}

/// One import attempt: the untouched source text, the mode and thresholds it
/// was parsed with, and the rows as the reviewer currently sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSession {
    pub source_text: String,
    pub parse_mode: ParseMode,
    #[serde(default)]
    pub auto_select: AutoSelectConfig,
    pub rows: Vec<ImportRow>,
    /// Ids of rows edited, confirmed or deleted since the last parse.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    touched_rows: BTreeSet<String>,
}

impl ImportSession {
    /// Parses with the default auto-selection thresholds.
    #[allow(dead_code)]
    pub fn create(source_text: impl Into<String>, mode: ParseMode) -> Self {
        let source_text = source_text.into();
        let rows = parse(&source_text, mode);
        Self {
            source_text,
            parse_mode: mode,
            auto_select: AutoSelectConfig::default(),
            rows,
            touched_rows: BTreeSet::new(),
        }
    }

    pub fn create_with_config(
        source_text: impl Into<String>,
        mode: ParseMode,
        auto_select: AutoSelectConfig,
    ) -> Self {
        let source_text = source_text.into();
        let rows = parse_with_config(&source_text, mode, &auto_select);
        Self {
            source_text,
            parse_mode: mode,
            auto_select,
            rows,
            touched_rows: BTreeSet::new(),
        }
    }

    pub fn set_mode(&mut self, mode: ParseMode) {
        self.parse_mode = mode;
    }

    /// Re-runs the parser over the stored source with the stored thresholds.
    /// Every manual change is discarded; returns how many rows had been
    /// edited, confirmed or deleted.
    pub fn reparse(&mut self) -> usize {
        let discarded = self.touched_rows.len();
        self.touched_rows.clear();
        self.rows = parse_with_config(&self.source_text, self.parse_mode, &self.auto_select);
        discarded
    }

    pub fn confirmed_rows(&self) -> Vec<&ImportRow> {
        self.rows.iter().filter(|row| row.is_resolved()).collect()
    }

    pub fn unclassified_rows(&self) -> Vec<&ImportRow> {
        self.rows.iter().filter(|row| !row.is_resolved()).collect()
    }

    pub fn edit_row(
        &mut self,
        id: &str,
        term: &str,
        meaning: &str,
    ) -> Result<&ImportRow, SessionError> {
        let row = find_row(&mut self.rows, id)?;
        *row = row.with_edit(term, meaning);
        self.touched_rows.insert(id.to_string());
        Ok(row)
    }

    pub fn confirm_row(&mut self, id: &str) -> Result<&ImportRow, SessionError> {
        let row = find_row(&mut self.rows, id)?;
        let confirmed = row
            .confirmed()
            .ok_or_else(|| SessionError::IncompleteRow(id.to_string()))?;
        *row = confirmed;
        self.touched_rows.insert(id.to_string());
        Ok(row)
    }

    pub fn delete_row(&mut self, id: &str) -> Result<ImportRow, SessionError> {
        let index = self
            .rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| SessionError::RowNotFound(id.to_string()))?;
        self.touched_rows.insert(id.to_string());
        Ok(self.rows.remove(index))
    }

}

fn find_row<'a>(rows: &'a mut [ImportRow], id: &str) -> Result<&'a mut ImportRow, SessionError> {
    rows.iter_mut()
        .find(|row| row.id == id)
        .ok_or_else(|| SessionError::RowNotFound(id.to_string()))
}
