//! Grading of submissions and the wrong-answer log format

use chrono::NaiveDate;
use log::warn;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::corpus::WordCorpus;
use crate::error::Result;
use crate::session::QuizSession;
use crate::store::QuizStore;

const LOG_PREFIX: &str = "wrong_log_";
const DATE_FORMAT: &str = "%Y-%m-%d";
const WORD_LINE: &str = "Word: ";
const SEPARATOR: &str = "---";

/// Outcome of one submission, lists sorted for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeOutcome {
    #[serde(rename = "result")]
    pub correct: bool,
    pub correct_meanings: Vec<String>,
    pub correct_synonyms: Vec<String>,
}

/// One block of a wrong-answer log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrongLogEntry {
    pub word: String,
    pub correct_meanings: Vec<String>,
    /// `None` in meanings-only rounds
    pub correct_synonyms: Option<Vec<String>>,
    pub your_meanings: Vec<String>,
    pub your_synonyms: Option<Vec<String>>,
}

impl WrongLogEntry {
    pub fn to_block(&self) -> String {
        let mut block = format!("{}{}\n", WORD_LINE, self.word);
        block.push_str(&format!("Correct meanings: {}\n", self.correct_meanings.join(", ")));
        if let Some(synonyms) = &self.correct_synonyms {
            block.push_str(&format!("Correct synonyms: {}\n", synonyms.join(", ")));
        }
        block.push_str(&format!("Your meanings: {}\n", self.your_meanings.join(", ")));
        if let Some(synonyms) = &self.your_synonyms {
            block.push_str(&format!("Your synonyms: {}\n", synonyms.join(", ")));
        }
        block.push_str(SEPARATOR);
        block.push('\n');
        block
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(", ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse every complete or trailing block of a log
pub fn parse_log(text: &str) -> Vec<WrongLogEntry> {
    let mut entries = Vec::new();
    let mut current: Option<WrongLogEntry> = None;

    for line in text.lines().map(str::trim_end) {
        if let Some(word) = line.strip_prefix(WORD_LINE) {
            entries.extend(current.take());
            current = Some(WrongLogEntry {
                word: word.trim().to_string(),
                correct_meanings: Vec::new(),
                correct_synonyms: None,
                your_meanings: Vec::new(),
                your_synonyms: None,
            });
            continue;
        }
        if line == SEPARATOR {
            entries.extend(current.take());
            continue;
        }
        let Some(entry) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key {
            "Correct meanings" => entry.correct_meanings = split_list(value),
            "Correct synonyms" => entry.correct_synonyms = Some(split_list(value)),
            "Your meanings" => entry.your_meanings = split_list(value),
            "Your synonyms" => entry.your_synonyms = Some(split_list(value)),
            _ => {}
        }
    }
    entries.extend(current);
    entries
}

/// Distinct words recorded as missed (`Word: <w>` lines)
pub fn missed_words(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter_map(|line| line.strip_prefix(WORD_LINE))
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// `wrong_log_<date>.txt` or `wrong_log_<base>_<date>.txt`
pub fn log_file_name(base: Option<&str>, date: NaiveDate) -> String {
    let date = date.format(DATE_FORMAT);
    match base {
        Some(base) => format!("{}{}_{}.txt", LOG_PREFIX, base, date),
        None => format!("{}{}.txt", LOG_PREFIX, date),
    }
}

fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

/// Recover the round context a log was written under
pub fn log_base_from_file_name(name: &str) -> Option<String> {
    let stem = name.strip_suffix(".txt").unwrap_or(name);
    let rest = stem.strip_prefix(LOG_PREFIX)?;
    if rest.is_empty() || is_date(rest) {
        return None;
    }

    // "_YYYY-MM-DD" is 11 bytes
    let cut = rest.len().saturating_sub(11);
    if cut > 0 && rest.is_char_boundary(cut) {
        let (base, suffix) = rest.split_at(cut);
        if let Some(date) = suffix.strip_prefix('_') {
            if is_date(date) {
                return Some(base.to_string());
            }
        }
    }
    Some(rest.to_string())
}

fn sorted(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// Grade a submission against the true meanings and the synonyms shown for
/// the word's last question. Wrong answers are appended to the round's log
/// before any session bookkeeping, so a failed write leaves the session as is.
pub fn grade<S: QuizStore>(
    corpus: &WordCorpus,
    session: &mut QuizSession,
    store: &mut S,
    word: &str,
    selected_meanings: &BTreeSet<String>,
    selected_synonyms: &BTreeSet<String>,
    today: NaiveDate,
) -> Result<GradeOutcome> {
    if !corpus.contains(word) {
        warn!("Grading '{}' which is not in the loaded corpus", word);
    }

    let meanings_only = session.meanings_only();
    let true_meanings: BTreeSet<String> = corpus.meanings_of(word).iter().cloned().collect();
    let shown_synonyms = if meanings_only {
        BTreeSet::new()
    } else {
        session.shown_synonyms(word)
    };

    let correct = *selected_meanings == true_meanings
        && (meanings_only || *selected_synonyms == shown_synonyms);

    if !correct {
        let entry = WrongLogEntry {
            word: word.to_string(),
            correct_meanings: sorted(&true_meanings),
            correct_synonyms: (!meanings_only).then(|| sorted(&shown_synonyms)),
            your_meanings: sorted(selected_meanings),
            your_synonyms: (!meanings_only).then(|| sorted(selected_synonyms)),
        };
        store.append_log(&log_file_name(session.active_log_base(), today), &entry.to_block())?;
    }

    session.record_result(word, correct);

    Ok(GradeOutcome {
        correct,
        correct_meanings: sorted(&true_meanings),
        correct_synonyms: sorted(&shown_synonyms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuizMode;
    use crate::store::MemoryStore;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 10).unwrap()
    }

    fn corpus() -> WordCorpus {
        WordCorpus::from_groups([
            ("joy", &["happy", "glad"][..]),
            ("sorrow", &["sad"][..]),
        ])
    }

    fn session_with_shown(mode: QuizMode, meanings_only: bool) -> QuizSession {
        let mut session = QuizSession::new();
        session.start_round(mode, set(&["happy", "glad", "sad"]), meanings_only, None);
        session.cache_shown_synonyms("happy", set(&["glad"]));
        session
    }

    #[test]
    fn exact_answer_is_correct_and_not_logged() {
        let corpus = corpus();
        let mut session = session_with_shown(QuizMode::All, false);
        let mut store = MemoryStore::new();

        let outcome = grade(&corpus, &mut session, &mut store, "happy", &set(&["joy"]), &set(&["glad"]), day()).unwrap();

        assert!(outcome.correct);
        assert_eq!(outcome.correct_meanings, ["joy"]);
        assert_eq!(outcome.correct_synonyms, ["glad"]);
        assert!(store.list_logs().unwrap().is_empty());
    }

    #[test]
    fn missing_synonym_is_wrong_and_logged() {
        let corpus = corpus();
        let mut session = session_with_shown(QuizMode::All, false);
        let mut store = MemoryStore::new();

        let outcome = grade(&corpus, &mut session, &mut store, "happy", &set(&["joy"]), &set(&[]), day()).unwrap();

        assert!(!outcome.correct);
        assert_eq!(session.wrong_words(), ["happy"]);
        assert_eq!(
            store.log("wrong_log_2025-08-10.txt").unwrap(),
            "Word: happy\nCorrect meanings: joy\nCorrect synonyms: glad\nYour meanings: joy\nYour synonyms: \n---\n"
        );
    }

    #[test]
    fn superset_of_meanings_is_wrong() {
        let corpus = corpus();
        let mut session = session_with_shown(QuizMode::All, false);
        let mut store = MemoryStore::new();

        let outcome = grade(&corpus, &mut session, &mut store, "happy", &set(&["joy", "sorrow"]), &set(&["glad"]), day()).unwrap();
        assert!(!outcome.correct);
    }

    #[test]
    fn meanings_only_ignores_synonyms_and_omits_them_from_log() {
        let corpus = corpus();
        let mut session = session_with_shown(QuizMode::Section("new_words_2025-08-10".into()), true);
        let mut store = MemoryStore::new();

        let right = grade(&corpus, &mut session, &mut store, "happy", &set(&["joy"]), &set(&["sad", "glad"]), day()).unwrap();
        assert!(right.correct);
        assert!(right.correct_synonyms.is_empty());

        grade(&corpus, &mut session, &mut store, "sad", &set(&["joy"]), &set(&[]), day()).unwrap();
        let text = store.log("wrong_log_2025-08-10.txt").unwrap();
        assert!(!text.contains("synonyms"));
    }

    #[test]
    fn unknown_word_degrades_to_empty_sets() {
        let corpus = corpus();
        let mut session = session_with_shown(QuizMode::All, false);
        let mut store = MemoryStore::new();

        let empty = grade(&corpus, &mut session, &mut store, "ghost", &set(&[]), &set(&[]), day()).unwrap();
        assert!(empty.correct);

        let guessed = grade(&corpus, &mut session, &mut store, "ghost", &set(&["joy"]), &set(&[]), day()).unwrap();
        assert!(!guessed.correct);
    }

    #[test]
    fn review_round_moves_words_in_and_out_of_retry_pool() {
        let corpus = corpus();
        let mut session = session_with_shown(QuizMode::Review("wrong_log_2025-08-09.txt".into()), false);
        let mut store = MemoryStore::new();

        grade(&corpus, &mut session, &mut store, "happy", &set(&["joy"]), &set(&["glad"]), day()).unwrap();
        assert!(!session.retry_pool().contains("happy"));

        grade(&corpus, &mut session, &mut store, "happy", &set(&[]), &set(&[]), day()).unwrap();
        grade(&corpus, &mut session, &mut store, "happy", &set(&[]), &set(&[]), day()).unwrap();
        assert_eq!(session.retry_pool().iter().filter(|w| *w == "happy").count(), 1);
        assert!(session.wrong_words().is_empty());
    }

    #[test]
    fn log_names_carry_round_context() {
        assert_eq!(log_file_name(None, day()), "wrong_log_2025-08-10.txt");
        assert_eq!(log_file_name(Some("section_3"), day()), "wrong_log_section_3_2025-08-10.txt");

        assert_eq!(log_base_from_file_name("wrong_log_2025-08-10.txt"), None);
        assert_eq!(log_base_from_file_name("wrong_log_section_3_2025-08-10.txt").as_deref(), Some("section_3"));
        assert_eq!(
            log_base_from_file_name("wrong_log_new_words_2025-08-01_2025-08-10.txt").as_deref(),
            Some("new_words_2025-08-01")
        );
        assert_eq!(log_base_from_file_name("notes.txt"), None);
    }

    #[test]
    fn parse_blocks_back() {
        let text = concat!(
            "Word: happy\nCorrect meanings: joy\nCorrect synonyms: glad\nYour meanings: joy, sorrow\nYour synonyms: \n---\n",
            "Word: zeal\nCorrect meanings: passion\nYour meanings: \n---\n",
            "Word: happy\nCorrect meanings: joy\n",
        );

        let entries = parse_log(text);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].your_meanings, ["joy", "sorrow"]);
        assert_eq!(entries[0].your_synonyms, Some(Vec::new()));
        assert_eq!(entries[1].correct_synonyms, None);
        assert_eq!(entries[2].word, "happy");

        assert_eq!(missed_words(text), set(&["happy", "zeal"]));
    }

    #[test]
    fn block_format_round_trips_through_parser() {
        let entry = WrongLogEntry {
            word: "glad".into(),
            correct_meanings: vec!["joy".into()],
            correct_synonyms: Some(vec!["happy".into()]),
            your_meanings: vec!["sorrow".into()],
            your_synonyms: Some(vec!["sad".into()]),
        };
        assert_eq!(parse_log(&entry.to_block()), [entry]);
    }
}
