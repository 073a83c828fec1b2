//! Section catalog: fixed partitions of the corpus and dated new-word sections

use log::info;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::corpus::{RowLayout, WordCorpus};
use crate::error::{QuizError, Result};
use crate::store::{QuizStore, SectionOrigin};

pub const FIXED_PREFIX: &str = "section_";
pub const NEW_WORDS_PREFIX: &str = "new_words";

/// `new_words_2025-08-10` -> `2025-08-10`
pub fn new_words_date(name: &str) -> Option<&str> {
    name.strip_prefix(NEW_WORDS_PREFIX)
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|date| !date.is_empty())
}

pub fn dated_section_name(date: &str) -> String {
    format!("{}_{}", NEW_WORDS_PREFIX, date.trim())
}

fn fixed_index(name: &str) -> Option<u32> {
    name.strip_prefix(FIXED_PREFIX)?.parse().ok()
}

/// Fixed sections by number first, then everything else by name
fn section_order(a: &String, b: &String) -> Ordering {
    match (fixed_index(a), fixed_index(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn list_sections<S: QuizStore>(store: &S) -> Result<Vec<String>> {
    let mut names = store.list_sections()?;
    names.sort_by(section_order);
    Ok(names)
}

/// Partition the corpus into `section_1..section_n` unless any fixed section
/// already exists. Returns how many sections were written.
pub fn ensure_fixed_sections<S: QuizStore>(
    store: &mut S,
    corpus: &WordCorpus,
    section_size: usize,
) -> Result<usize> {
    let existing = store.list_sections()?;
    if existing.iter().any(|n| n.starts_with(FIXED_PREFIX)) || corpus.is_empty() {
        return Ok(0);
    }

    let words: Vec<String> = corpus.words().cloned().collect();
    let mut created = 0;
    for (i, chunk) in words.chunks(section_size.max(1)).enumerate() {
        store.write_section(&format!("{}{}", FIXED_PREFIX, i + 1), chunk)?;
        created += 1;
    }

    info!("Created {} fixed sections from {} words", created, words.len());
    Ok(created)
}

/// Build `new_words_<date>` from the sheet named `date` of `source_path`.
pub fn create_dated_section<S: QuizStore>(
    store: &mut S,
    source_path: &str,
    date: &str,
    first_column_is_meaning: bool,
) -> Result<String> {
    let date = date.trim();
    if date.is_empty() {
        return Err(QuizError::NotFound("empty sheet date".to_string()));
    }

    let rows = store.sheet_rows(source_path, date)?;
    let layout = RowLayout::from_first_column_is_meaning(first_column_is_meaning);

    let words: BTreeSet<String> = rows.iter()
        .flat_map(|row| {
            let cells: &[String] = match layout {
                RowLayout::MeaningFirst => row.get(1..).unwrap_or(&[]),
                RowLayout::WordFirst => row.get(..1).unwrap_or(&[]),
            };
            cells.iter()
        })
        .filter(|w| !w.is_empty())
        .cloned()
        .collect();

    if words.is_empty() {
        return Err(QuizError::Empty(format!("sheet '{}' in {}", date, source_path)));
    }

    let name = dated_section_name(date);
    let words: Vec<String> = words.into_iter().collect();
    store.write_section(&name, &words)?;
    store.write_section_origin(&name, &SectionOrigin {
        source_path: source_path.to_string(),
        first_column_is_meaning,
    })?;
    info!("Created dated section {} with {} words", name, words.len());
    Ok(name)
}
