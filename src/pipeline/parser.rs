use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ImportRow, ParseMode, RowStatus};
use crate::pipeline::normalize::normalize_lines;

const DELIMITERS: [&str; 7] = ["\t", " - ", " : ", ":", "：", "—", "–"];

const DELIMITER_CONFIDENCE: f64 = 0.9;
const ALTERNATING_CONFIDENCE: f64 = 0.6;
const SINGLE_LINE_CONFIDENCE: f64 = 0.3;
const UNCLASSIFIED_CONFIDENCE: f64 = 0.2;

const ENGLISH_LETTER_RATIO: f64 = 0.6;

/// Thresholds for the structural test that lets automatic mode pick the
/// alternating strategy without comparing resolved counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSelectConfig {
    pub sample_lines: usize,
    pub min_lines: usize,
    pub min_matching_pairs: usize,
}

impl Default for AutoSelectConfig {
    fn default() -> Self {
        Self {
            sample_lines: 6,
            min_lines: 4,
            min_matching_pairs: 2,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Strategy {
    Delimiter,
    Alternating,
}

pub fn parse(text: &str, mode: ParseMode) -> Vec<ImportRow> {
    parse_with_config(text, mode, &AutoSelectConfig::default())
}

pub fn parse_with_config(text: &str, mode: ParseMode, config: &AutoSelectConfig) -> Vec<ImportRow> {
    let lines = normalize_lines(text);
    parse_lines(&lines, mode, config)
}

pub fn parse_lines<S: AsRef<str>>(
    lines: &[S],
    mode: ParseMode,
    config: &AutoSelectConfig,
) -> Vec<ImportRow> {
    let mut ids = RowIds::default();
    match mode {
        ParseMode::Delimiter => parse_delimited(lines, &mut ids),
        ParseMode::Alternating => parse_alternating(lines, &mut ids),
        ParseMode::SingleLine => parse_single_lines(lines, &mut ids),
        ParseMode::Auto => parse_auto(lines, config),
    }
}

#[derive(Debug, Default)]
struct RowIds {
    next: usize,
}

impl RowIds {
    fn next(&mut self) -> String {
        self.next += 1;
        format!("row-{:04}", self.next)
    }
}

fn parse_delimited<S: AsRef<str>>(lines: &[S], ids: &mut RowIds) -> Vec<ImportRow> {
    lines
        .iter()
        .map(|line| {
            let line: &str = line.as_ref();
            match split_on_delimiter(line) {
                Some((term, meaning)) => {
                    ImportRow::candidate(ids.next(), term, meaning, DELIMITER_CONFIDENCE, line)
                }
                None => ImportRow::unclassified(ids.next(), line, UNCLASSIFIED_CONFIDENCE),
            }
        })
        .collect()
}

pub fn split_on_delimiter(line: &str) -> Option<(&str, &str)> {
    DELIMITERS.iter().find_map(|delimiter| {
        let (left, right) = line.split_once(delimiter)?;
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() || right.is_empty() {
            None
        } else {
            Some((left, right))
        }
    })
}

fn parse_alternating<S: AsRef<str>>(lines: &[S], ids: &mut RowIds) -> Vec<ImportRow> {
    let mut rows = Vec::new();
    let mut index = 0usize;

    while index < lines.len() {
        let current: &str = lines[index].as_ref();
        if let Some(next) = lines.get(index + 1) {
            let next: &str = next.as_ref();
            if is_term_meaning_pair(current, next) {
                let source_line = format!("{current}\n{next}");
                rows.push(ImportRow::candidate(
                    ids.next(),
                    current,
                    next,
                    ALTERNATING_CONFIDENCE,
                    &source_line,
                ));
                index += 2;
                continue;
            }
        }

        rows.push(ImportRow::unclassified(
            ids.next(),
            current,
            UNCLASSIFIED_CONFIDENCE,
        ));
        index += 1;
    }

    rows
}

fn parse_single_lines<S: AsRef<str>>(lines: &[S], ids: &mut RowIds) -> Vec<ImportRow> {
    lines
        .iter()
        .map(|line| {
            let line: &str = line.as_ref();
            ImportRow {
                id: ids.next(),
                term: line.trim().to_string(),
                meaning: String::new(),
                confidence: SINGLE_LINE_CONFIDENCE,
                source_line: line.to_string(),
                status: RowStatus::Unclassified,
            }
        })
        .collect()
}

fn parse_auto<S: AsRef<str>>(lines: &[S], config: &AutoSelectConfig) -> Vec<ImportRow> {
    let delimited = parse_delimited(lines, &mut RowIds::default());
    let alternating = parse_alternating(lines, &mut RowIds::default());

    let strategy = if looks_alternating(lines, config)
        || resolved_count(&alternating) > resolved_count(&delimited)
    {
        Strategy::Alternating
    } else {
        Strategy::Delimiter
    };

    debug!(
        lines = lines.len(),
        delimiter_resolved = resolved_count(&delimited),
        alternating_resolved = resolved_count(&alternating),
        strategy = ?strategy,
        "selected automatic parse strategy"
    );

    match strategy {
        Strategy::Delimiter => delimited,
        Strategy::Alternating => alternating,
    }
}

fn looks_alternating<S: AsRef<str>>(lines: &[S], config: &AutoSelectConfig) -> bool {
    if lines.len() < config.min_lines {
        return false;
    }

    let sample = &lines[..lines.len().min(config.sample_lines)];
    let matching_pairs = sample
        .chunks_exact(2)
        .filter(|pair| is_term_meaning_pair(pair[0].as_ref(), pair[1].as_ref()))
        .count();
    matching_pairs >= config.min_matching_pairs
}

fn resolved_count(rows: &[ImportRow]) -> usize {
    rows.iter().filter(|row| row.is_resolved()).count()
}

fn is_term_meaning_pair(term: &str, meaning: &str) -> bool {
    is_english_like(term) && is_japanese_like(meaning)
}

pub fn is_english_like(line: &str) -> bool {
    let (ascii, total) = line
        .chars()
        .filter(|character| character.is_alphabetic())
        .fold((0usize, 0usize), |(ascii, total), character| {
            if character.is_ascii_alphabetic() {
                (ascii + 1, total + 1)
            } else {
                (ascii, total + 1)
            }
        });

    total > 0 && ascii as f64 / total as f64 >= ENGLISH_LETTER_RATIO
}

pub fn is_japanese_like(line: &str) -> bool {
    line.chars().any(|character| {
        matches!(
            character,
            '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}'
        )
    })
}
