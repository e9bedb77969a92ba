use std::sync::LazyLock;

use regex::Regex;

const HEADER_PREFIXES: [&str; 6] = ["UNIT", "LESSON", "CHAPTER", "PAGE", "P.", "NO."];

static PAGE_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*/\s*\d+\s*$").expect("valid page fraction regex"));

/// Splits a raw text block into trimmed candidate lines, dropping blanks and
/// structural noise such as unit headings and page numbers.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line_is_header(line))
        .map(ToOwned::to_owned)
        .collect()
}

pub fn line_is_header(line: &str) -> bool {
    let upper = line.trim().to_uppercase();
    if HEADER_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
    {
        return true;
    }

    if !upper.is_empty() && upper.chars().all(|character| character.is_ascii_digit()) {
        return true;
    }

    PAGE_FRACTION.is_match(&upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lines_drops_headers_and_page_numbers() {
        let text = "UNIT 3\r\n12\n  3/10 \n\napple - りんご\r";
        assert_eq!(normalize_lines(text), vec!["apple - りんご".to_string()]);
    }

    #[test]
    fn normalize_lines_is_idempotent() {
        let text = "Lesson 4\n  dog\tイヌ \n\n cat : ネコ\n4 / 9\nbird";
        let once = normalize_lines(text);
        let twice = normalize_lines(&once.join("\n"));
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn line_is_header_matches_keywords_case_insensitively() {
        assert!(line_is_header("chapter 2 Animals"));
        assert!(line_is_header("p. 45"));
        assert!(line_is_header("No. 7"));
        assert!(!line_is_header("notebook ノート"));
        assert!(!line_is_header("3 apples"));
    }
}
