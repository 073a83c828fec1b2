//! Question generation: pick the next unasked word and build its option sets

use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::corpus::WordCorpus;
use crate::session::QuizSession;

/// Distractor meanings and distractor synonyms offered per question
pub const MAX_DISTRACTORS: usize = 4;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Question {
    pub word: String,
    pub meanings: Vec<String>,
    /// Synonyms presented as correct; grading is against exactly these
    pub synonyms: Vec<String>,
    pub meaning_options: Vec<String>,
    pub synonym_options: Vec<String>,
    pub meanings_only: bool,
    pub progress: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextQuestion {
    Done { retry_mode: bool },
    Question { question: Question, retry_mode: bool },
}

impl NextQuestion {
    pub fn is_done(&self) -> bool {
        matches!(self, NextQuestion::Done { .. })
    }

    pub fn question(&self) -> Option<&Question> {
        match self {
            NextQuestion::Question { question, .. } => Some(question),
            NextQuestion::Done { .. } => None,
        }
    }
}

impl Serialize for NextQuestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Wire<'a> {
            done: bool,
            retry_mode: bool,
            #[serde(flatten)]
            question: Option<&'a Question>,
        }

        let wire = match self {
            NextQuestion::Done { retry_mode } => Wire {
                done: true,
                retry_mode: *retry_mode,
                question: None,
            },
            NextQuestion::Question { question, retry_mode } => Wire {
                done: false,
                retry_mode: *retry_mode,
                question: Some(question),
            },
        };
        wire.serialize(serializer)
    }
}

fn sample<R: Rng>(rng: &mut R, items: &[&String], amount: usize) -> Vec<String> {
    items.choose_multiple(rng, amount).map(|s| (*s).clone()).collect()
}

/// Serve the next word of the active pool, or `Done` when nothing is left.
///
/// Marks the word as asked and caches the synonyms presented as correct.
pub fn next_question<R: Rng>(
    corpus: &WordCorpus,
    session: &mut QuizSession,
    rng: &mut R,
) -> NextQuestion {
    let retry_mode = session.is_review();

    let word = {
        let remaining = session.remaining();
        match remaining.choose(rng) {
            Some(word) => (*word).clone(),
            None => return NextQuestion::Done { retry_mode },
        }
    };

    let meanings = corpus.meanings_of(&word).to_vec();

    let other_meanings: Vec<&String> = corpus.all_meanings()
        .iter()
        .filter(|m| !meanings.contains(m))
        .collect();
    let mut meaning_options = meanings.clone();
    meaning_options.extend(sample(rng, &other_meanings, MAX_DISTRACTORS));
    meaning_options.shuffle(rng);

    let (shown, synonym_options) = if session.meanings_only() {
        (Vec::new(), Vec::new())
    } else {
        let candidates = corpus.synonym_candidates(&word);
        let candidate_refs: Vec<&String> = candidates.iter().collect();
        let count = if candidates.len() >= 2 {
            rng.gen_range(1..=2)
        } else {
            candidates.len()
        };
        let mut shown = sample(rng, &candidate_refs, count);
        shown.sort();

        let unrelated: Vec<&String> = corpus.words()
            .filter(|w| **w != word && !candidates.contains(*w))
            .collect();
        let mut options = shown.clone();
        options.extend(sample(rng, &unrelated, MAX_DISTRACTORS));
        options.shuffle(rng);
        (shown, options)
    };

    session.cache_shown_synonyms(&word, shown.iter().cloned().collect::<BTreeSet<_>>());
    session.mark_asked(&word);

    NextQuestion::Question {
        question: Question {
            word,
            meanings,
            synonyms: shown,
            meaning_options,
            synonym_options,
            meanings_only: session.meanings_only(),
            progress: session.progress(),
            total: session.total(),
        },
        retry_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuizMode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn happy_corpus() -> WordCorpus {
        WordCorpus::from_groups([
            ("joy", &["happy", "glad"][..]),
            ("sorrow", &["sad"][..]),
        ])
    }

    fn all_round(corpus: &WordCorpus) -> QuizSession {
        let mut session = QuizSession::new();
        session.start_round(QuizMode::All, corpus.words().cloned().collect(), false, None);
        session
    }

    #[test]
    fn every_word_is_served_once_then_done() {
        let corpus = happy_corpus();
        let mut session = all_round(&corpus);
        let mut rng = StdRng::seed_from_u64(1);
        let mut served = BTreeSet::new();

        for expected_progress in 1..=3 {
            let next = next_question(&corpus, &mut session, &mut rng);
            let question = next.question().unwrap();
            assert!(served.insert(question.word.clone()));
            assert_eq!(question.progress, expected_progress);
            assert_eq!(question.total, 3);
        }

        assert_eq!(next_question(&corpus, &mut session, &mut rng), NextQuestion::Done { retry_mode: false });
        assert_eq!(session.asked().len(), 3);
    }

    #[test]
    fn meaning_options_contain_true_meanings_without_duplicates() {
        let corpus = WordCorpus::from_groups([
            ("m1", &["a", "b"][..]),
            ("m2", &["a", "c"][..]),
            ("m3", &["d"][..]),
            ("m4", &["e"][..]),
            ("m5", &["f"][..]),
            ("m6", &["g"][..]),
            ("m7", &["h"][..]),
        ]);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..20 {
            let mut session = all_round(&corpus);
            while let NextQuestion::Question { question, .. } = next_question(&corpus, &mut session, &mut rng) {
                let options: BTreeSet<_> = question.meaning_options.iter().collect();
                assert_eq!(options.len(), question.meaning_options.len());
                assert!(question.meanings.iter().all(|m| options.contains(m)));
                assert_eq!(question.meaning_options.len(), question.meanings.len() + MAX_DISTRACTORS);
            }
        }
    }

    #[test]
    fn single_candidate_is_always_presented() {
        let corpus = happy_corpus();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..10 {
            let mut session = QuizSession::new();
            session.start_round(QuizMode::All, ["happy".to_string()].into(), false, None);
            let next = next_question(&corpus, &mut session, &mut rng);
            let question = next.question().unwrap();

            assert_eq!(question.synonyms, ["glad"]);
            assert!(question.meaning_options.contains(&"joy".to_string()));
            assert!(question.synonym_options.contains(&"glad".to_string()));
            assert!(!question.synonym_options.contains(&"happy".to_string()));
            assert_eq!(session.shown_synonyms("happy"), BTreeSet::from(["glad".to_string()]));
        }
    }

    #[test]
    fn presented_synonyms_are_one_or_two_true_candidates() {
        let corpus = WordCorpus::from_groups([
            ("joy", &["happy", "glad", "merry", "jolly"][..]),
            ("sorrow", &["sad", "glum"][..]),
            ("anger", &["mad", "irate"][..]),
        ]);
        let candidates = corpus.synonym_candidates("happy");
        let mut rng = StdRng::seed_from_u64(11);
        let mut sizes = BTreeSet::new();

        for _ in 0..40 {
            let mut session = QuizSession::new();
            session.start_round(QuizMode::All, ["happy".to_string()].into(), false, None);
            let next = next_question(&corpus, &mut session, &mut rng);
            let question = next.question().unwrap();

            sizes.insert(question.synonyms.len());
            assert!(question.synonyms.iter().all(|s| candidates.contains(s)));
            let distractors: Vec<_> = question.synonym_options.iter()
                .filter(|o| !question.synonyms.contains(o))
                .collect();
            assert_eq!(distractors.len(), MAX_DISTRACTORS);
            assert!(distractors.iter().all(|d| !candidates.contains(*d)));
        }

        assert_eq!(sizes, BTreeSet::from([1, 2]));
    }

    #[test]
    fn small_corpus_takes_what_is_available() {
        let corpus = WordCorpus::from_groups([("joy", &["happy"][..])]);
        let mut session = all_round(&corpus);
        let mut rng = StdRng::seed_from_u64(5);

        let next = next_question(&corpus, &mut session, &mut rng);
        let question = next.question().unwrap();
        assert_eq!(question.meaning_options, ["joy"]);
        assert!(question.synonyms.is_empty());
        assert!(question.synonym_options.is_empty());
    }

    #[test]
    fn meanings_only_round_has_no_synonym_section() {
        let corpus = happy_corpus();
        let mut session = QuizSession::new();
        session.start_round(QuizMode::All, corpus.words().cloned().collect(), true, None);
        let mut rng = StdRng::seed_from_u64(2);

        while let NextQuestion::Question { question, .. } = next_question(&corpus, &mut session, &mut rng) {
            assert!(question.meanings_only);
            assert!(question.synonym_options.is_empty());
            assert!(session.shown_synonyms(&question.word).is_empty());
        }
    }

    #[test]
    fn empty_pool_is_done_immediately() {
        let corpus = happy_corpus();
        let mut session = QuizSession::new();
        session.start_round(QuizMode::Review("missing.txt".into()), BTreeSet::new(), false, None);
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(next_question(&corpus, &mut session, &mut rng), NextQuestion::Done { retry_mode: true });
    }

    #[test]
    fn same_seed_reproduces_questions() {
        let corpus = WordCorpus::from_groups([
            ("joy", &["happy", "glad", "merry"][..]),
            ("sorrow", &["sad", "glum"][..]),
            ("anger", &["mad", "irate"][..]),
        ]);
        let run = |seed| {
            let mut session = all_round(&corpus);
            let mut rng = StdRng::seed_from_u64(seed);
            (0..4).map(|_| next_question(&corpus, &mut session, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn wire_format_matches_client_expectations() {
        let done = serde_json::to_value(NextQuestion::Done { retry_mode: true }).unwrap();
        assert_eq!(done, serde_json::json!({ "done": true, "retry_mode": true }));

        let corpus = happy_corpus();
        let mut session = all_round(&corpus);
        let mut rng = StdRng::seed_from_u64(4);
        let value = serde_json::to_value(next_question(&corpus, &mut session, &mut rng)).unwrap();
        assert_eq!(value["done"], false);
        assert_eq!(value["progress"], 1);
        assert_eq!(value["total"], 3);
        assert!(value["meaning_options"].is_array());
        assert!(value["synonym_options"].is_array());
    }
}
