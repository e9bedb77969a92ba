use crate::model::{BoundingBox, DuplicatePolicy, ParseMode, RowStatus, TextFragment};
use crate::pipeline::merge::import_rows;
use crate::pipeline::parser::parse;
use crate::pipeline::reconstruct::{ReconstructConfig, reconstruct_text};
use crate::pipeline::session::ImportSession;
use crate::pipeline::storage::{JsonFileStore, VocabStorage};

const ALTERNATING_PAGE: &str = "happy\n幸せ\nbook\n本\nriver\n川";

#[test]
fn delimiter_mode_splits_tab_separated_line() {
    let rows = parse("dog\tイヌ", ParseMode::Delimiter);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].term, "dog");
    assert_eq!(rows[0].meaning, "イヌ");
    assert_eq!(rows[0].status, RowStatus::Candidate);
    assert_eq!(rows[0].confidence, 0.9);
}

#[test]
fn delimiter_mode_keeps_unmatched_lines_for_review() {
    let rows = parse("no delimiter here", ParseMode::Delimiter);
    assert_eq!(rows[0].status, RowStatus::Unclassified);
    assert_eq!(rows[0].confidence, 0.2);
    assert!(rows[0].term.is_empty());
    assert_eq!(rows[0].source_line, "no delimiter here");
}

#[test]
fn alternating_mode_pairs_english_with_japanese() {
    let rows = parse("happy\n幸せ", ParseMode::Alternating);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_resolved());
    assert_eq!(rows[0].term, "happy");
    assert_eq!(rows[0].meaning, "幸せ");
    assert_eq!(rows[0].confidence, 0.6);

    let rows = parse("happy\njoy", ParseMode::Alternating);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.status == RowStatus::Unclassified));
}

#[test]
fn auto_mode_selects_alternating_for_alternating_page() {
    let auto = parse(ALTERNATING_PAGE, ParseMode::Auto);
    let alternating = parse(ALTERNATING_PAGE, ParseMode::Alternating);
    let delimited = parse(ALTERNATING_PAGE, ParseMode::Delimiter);

    assert_eq!(auto, alternating);
    assert_ne!(auto, delimited);
    assert_eq!(auto.len(), 3);
}

#[test]
fn auto_mode_trusts_alternating_structure_over_delimiter_count() {
    let text = "happy\n幸せ\nbook\n本\na - あ\nb - い\nc - う\nd - え";
    let resolved = |mode| {
        parse(text, mode)
            .iter()
            .filter(|row| row.is_resolved())
            .count()
    };
    assert_eq!(resolved(ParseMode::Delimiter), 4);
    assert_eq!(resolved(ParseMode::Alternating), 2);

    assert_eq!(
        parse(text, ParseMode::Auto),
        parse(text, ParseMode::Alternating)
    );
}

#[test]
fn parse_is_deterministic() {
    let text = "UNIT 1\napple - りんご\nhappy\n幸せ\nloose line\n2/8";
    for mode in [
        ParseMode::Auto,
        ParseMode::Delimiter,
        ParseMode::Alternating,
        ParseMode::SingleLine,
    ] {
        assert_eq!(parse(text, mode), parse(text, mode));
    }
}

#[test]
fn candidate_rows_never_carry_empty_fields() {
    let text = "a -  \n - b\nterm : meaning\n：\nword\n語";
    for mode in [ParseMode::Auto, ParseMode::Delimiter, ParseMode::Alternating] {
        for row in parse(text, mode) {
            if row.status != RowStatus::Unclassified {
                assert!(!row.term.trim().is_empty());
                assert!(!row.meaning.trim().is_empty());
            }
        }
    }
}

#[test]
fn fragments_flow_through_to_the_store() {
    let fragment = |text: &str, x: f64, y: f64| TextFragment {
        text: text.to_string(),
        bounding_box: BoundingBox {
            x,
            y,
            width: 0.1,
            height: 0.02,
        },
    };
    let fragments = vec![
        fragment("Lesson 5", 0.05, 0.95),
        fragment("りんご", 0.40, 0.80),
        fragment("apple -", 0.05, 0.801),
        fragment("cat - ネコ", 0.05, 0.70),
        fragment("14", 0.50, 0.05),
    ];

    let text = reconstruct_text(&fragments, &ReconstructConfig::default());
    let session = ImportSession::create(text, ParseMode::Auto);
    assert_eq!(session.confirmed_rows().len(), 2);

    let dir = tempfile::tempdir().expect("temp dir");
    let store = JsonFileStore::open(dir.path());
    let outcome = import_rows(&session.rows, &store, DuplicatePolicy::Skip)
        .expect("merge")
        .outcome;
    assert_eq!(outcome.added, 2);

    let outcome = import_rows(&session.rows, &store, DuplicatePolicy::Skip)
        .expect("merge again")
        .outcome;
    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(store.load_all().expect("load").len(), 2);
}

#[test]
fn corrupt_store_is_replaced_by_merged_batch() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("vocabulary.json"), b"[{").expect("write garbage");

    let store = JsonFileStore::open(dir.path());
    let rows = parse("tree - 木", ParseMode::Delimiter);
    let outcome = import_rows(&rows, &store, DuplicatePolicy::Overwrite)
        .expect("merge")
        .outcome;

    assert_eq!(outcome.added, 1);
    let entries = store.load_all().expect("load");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].meaning, "木");
}
