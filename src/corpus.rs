//! Word corpus: word -> meanings and meaning -> words (synonym groups)

use std::collections::{BTreeMap, BTreeSet};

use crate::excel::Row;

/// How a source row is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// `meaning, word, word, ...`
    MeaningFirst,
    /// `word, meaning, meaning, ...`
    WordFirst,
}

impl RowLayout {
    pub fn from_first_column_is_meaning(first_column_is_meaning: bool) -> Self {
        if first_column_is_meaning {
            RowLayout::MeaningFirst
        } else {
            RowLayout::WordFirst
        }
    }
}

/// Immutable mapping built once per source. Swapped wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordCorpus {
    word_to_meanings: BTreeMap<String, Vec<String>>,
    meaning_to_words: BTreeMap<String, Vec<String>>,
    all_meanings: BTreeSet<String>,
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

impl WordCorpus {
    pub fn from_rows(rows: &[Row], layout: RowLayout) -> Self {
        let mut corpus = WordCorpus::default();

        for row in rows {
            let Some((head, rest)) = row.split_first() else {
                continue;
            };
            if head.is_empty() {
                continue;
            }
            for cell in rest.iter().filter(|c| !c.is_empty()) {
                match layout {
                    RowLayout::MeaningFirst => corpus.add_pair(cell, head),
                    RowLayout::WordFirst => corpus.add_pair(head, cell),
                }
            }
        }

        corpus
    }

    /// Convenience constructor from `(meaning, words)` groups
    pub fn from_groups<'a, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let rows: Vec<Row> = groups.into_iter()
            .map(|(meaning, words)| {
                std::iter::once(meaning)
                    .chain(words.iter().copied())
                    .map(str::to_string)
                    .collect()
            })
            .collect();
        Self::from_rows(&rows, RowLayout::MeaningFirst)
    }

    fn add_pair(&mut self, word: &str, meaning: &str) {
        push_unique(self.word_to_meanings.entry(word.to_string()).or_default(), meaning);
        push_unique(self.meaning_to_words.entry(meaning.to_string()).or_default(), word);
        self.all_meanings.insert(meaning.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.word_to_meanings.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.word_to_meanings.len()
    }

    pub fn meaning_count(&self) -> usize {
        self.all_meanings.len()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word_to_meanings.contains_key(word)
    }

    /// Words in sorted order
    pub fn words(&self) -> impl Iterator<Item = &String> {
        self.word_to_meanings.keys()
    }

    pub fn all_meanings(&self) -> &BTreeSet<String> {
        &self.all_meanings
    }

    /// Meanings of `word`, empty when the word is unknown
    pub fn meanings_of(&self, word: &str) -> &[String] {
        self.word_to_meanings.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn words_for(&self, meaning: &str) -> &[String] {
        self.meaning_to_words.get(meaning).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every other word sharing at least one meaning group with `word`
    pub fn synonym_candidates(&self, word: &str) -> BTreeSet<String> {
        self.meanings_of(word)
            .iter()
            .flat_map(|m| self.words_for(m))
            .filter(|w| w.as_str() != word)
            .cloned()
            .collect()
    }
}
