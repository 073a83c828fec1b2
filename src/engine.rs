//! Quiz engine: owns corpus, session, store and RNG, and exposes the quiz operations

use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::config::QuizConfig;
use crate::corpus::{RowLayout, WordCorpus};
use crate::error::{QuizError, Result};
use crate::progress::{self, GradeOutcome, WrongLogEntry};
use crate::questions::{self, NextQuestion};
use crate::sections;
use crate::session::{QuizMode, QuizSession, SessionSummary};
use crate::store::{CorpusSource, FileStore, QuizStore, SectionOrigin};

/// Reply to a mode change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeStatus {
    pub message: String,
    pub total: usize,
    pub meanings_only: bool,
}

pub struct QuizEngine<S: QuizStore, R: Rng = StdRng> {
    config: QuizConfig,
    store: S,
    rng: R,
    corpus: WordCorpus,
    source: CorpusSource,
    session: QuizSession,
}

impl QuizEngine<FileStore, StdRng> {
    /// Engine over the configured directories and spreadsheets
    pub fn open(config: QuizConfig) -> Self {
        let store = FileStore::new(&config);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_parts(config, store, rng)
    }
}

impl<S: QuizStore, R: Rng> QuizEngine<S, R> {
    /// Load the main corpus, make sure fixed sections exist and start an `all` round
    pub fn with_parts(config: QuizConfig, mut store: S, rng: R) -> Self {
        let corpus = load_corpus(&store, &CorpusSource::Main);

        if let Err(e) = sections::ensure_fixed_sections(&mut store, &corpus, config.section_size) {
            error!("Failed to create fixed sections: {}", e);
        }

        let mut engine = Self {
            config,
            store,
            rng,
            corpus,
            source: CorpusSource::Main,
            session: QuizSession::new(),
        };
        engine.configure_mode(QuizMode::All);
        engine
    }

    pub fn corpus(&self) -> &WordCorpus {
        &self.corpus
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Replace the corpus when a different source is needed
    fn use_source(&mut self, source: CorpusSource) {
        if source == self.source && !self.corpus.is_empty() {
            return;
        }
        self.corpus = load_corpus(&self.store, &source);
        self.source = source;
    }

    /// Corpus implied by a section or log base name. Dated sections remember
    /// the workbook and layout they were built from; otherwise the configured
    /// new-words workbook is used.
    fn source_for(&self, name: &str) -> CorpusSource {
        let Some(date) = sections::new_words_date(name) else {
            return CorpusSource::Main;
        };

        let origin = match self.store.read_section_origin(name) {
            Ok(Some(origin)) => origin,
            Ok(None) => self.default_origin(),
            Err(e) => {
                warn!("Unreadable origin of section {}, using configured workbook: {}", name, e);
                self.default_origin()
            }
        };

        CorpusSource::NewWords {
            path: origin.source_path,
            date: date.to_string(),
            first_column_is_meaning: origin.first_column_is_meaning,
        }
    }

    fn default_origin(&self) -> SectionOrigin {
        SectionOrigin {
            source_path: self.config.new_words_path.display().to_string(),
            first_column_is_meaning: self.config.new_words_first_column_is_meaning,
        }
    }

    /// Words of a section or log that are quizzable with the active corpus
    fn known_words(&self, words: impl IntoIterator<Item = String>, origin: &str) -> BTreeSet<String> {
        let (known, unknown): (BTreeSet<String>, BTreeSet<String>) =
            words.into_iter().partition(|w| self.corpus.contains(w));
        if !unknown.is_empty() {
            warn!("Dropping {} words of {} missing from the corpus", unknown.len(), origin);
        }
        known
    }

    /// Start a new round. Missing sections or logs give an empty round.
    pub fn configure_mode(&mut self, mode: QuizMode) -> ModeStatus {
        match mode.clone() {
            QuizMode::All => {
                self.use_source(CorpusSource::Main);
                let pool = self.corpus.words().cloned().collect();
                self.session.start_round(mode, pool, false, None);
            }
            QuizMode::Section(name) => {
                let source = self.source_for(&name);
                let meanings_only = is_new_words_source(&source);
                self.use_source(source);

                let words = match self.store.read_section(&name) {
                    Ok(words) => words,
                    Err(e) => {
                        degrade("section", &name, &e);
                        Vec::new()
                    }
                };
                let pool = self.known_words(words, &name);
                self.session.start_round(mode, pool, meanings_only, Some(name));
            }
            QuizMode::Review(log_name) => {
                let base = progress::log_base_from_file_name(&log_name);
                let source = match base.as_deref() {
                    Some(base) => self.source_for(base),
                    None => CorpusSource::Main,
                };
                let meanings_only = is_new_words_source(&source);
                self.use_source(source);

                let missed = match self.store.read_log(&log_name) {
                    Ok(text) => progress::missed_words(&text),
                    Err(e) => {
                        degrade("log", &log_name, &e);
                        BTreeSet::new()
                    }
                };
                let pool = self.known_words(missed, &log_name);
                self.session.start_round(mode, pool, meanings_only, base);
            }
        }

        let status = ModeStatus {
            message: format!("Mode set to {}", self.session.mode().label()),
            total: self.session.total(),
            meanings_only: self.session.meanings_only(),
        };
        info!(
            "{} ({} words, meanings only: {})",
            status.message, status.total, status.meanings_only
        );
        status
    }

    pub fn list_sections(&self) -> Result<Vec<String>> {
        sections::list_sections(&self.store)
    }

    pub fn list_logs(&self) -> Result<Vec<String>> {
        self.store.list_logs()
    }

    pub fn next_question(&mut self) -> NextQuestion {
        let next = questions::next_question(&self.corpus, &mut self.session, &mut self.rng);
        if let Some(question) = next.question() {
            debug!("Serving '{}' ({}/{})", question.word, question.progress, question.total);
        }
        next
    }

    /// Grade against today's log
    pub fn submit(
        &mut self,
        word: &str,
        selected_meanings: &[String],
        selected_synonyms: &[String],
    ) -> Result<GradeOutcome> {
        self.submit_on(word, selected_meanings, selected_synonyms, Local::now().date_naive())
    }

    pub fn submit_on(
        &mut self,
        word: &str,
        selected_meanings: &[String],
        selected_synonyms: &[String],
        today: NaiveDate,
    ) -> Result<GradeOutcome> {
        let meanings: BTreeSet<String> = selected_meanings.iter().cloned().collect();
        let synonyms: BTreeSet<String> = selected_synonyms.iter().cloned().collect();
        progress::grade(
            &self.corpus,
            &mut self.session,
            &mut self.store,
            word,
            &meanings,
            &synonyms,
            today,
        )
    }

    /// Build a `new_words_<date>` section; session state is left alone
    pub fn create_dated_section(
        &mut self,
        source_path: &str,
        date: &str,
        first_column_is_meaning: bool,
    ) -> Result<String> {
        sections::create_dated_section(&mut self.store, source_path, date, first_column_is_meaning)
    }

    pub fn summary(&self) -> SessionSummary {
        self.session.summary()
    }

    pub fn read_log_entries(&self, log_name: &str) -> Result<Vec<WrongLogEntry>> {
        Ok(progress::parse_log(&self.store.read_log(log_name)?))
    }
}

/// New-words rounds carry no synonym data
fn is_new_words_source(source: &CorpusSource) -> bool {
    matches!(source, CorpusSource::NewWords { .. })
}

fn load_corpus<S: QuizStore>(store: &S, source: &CorpusSource) -> WordCorpus {
    let layout = match source {
        CorpusSource::Main => RowLayout::MeaningFirst,
        CorpusSource::NewWords { first_column_is_meaning, .. } => {
            RowLayout::from_first_column_is_meaning(*first_column_is_meaning)
        }
    };

    match store.corpus_rows(source) {
        Ok(rows) => {
            let corpus = WordCorpus::from_rows(&rows, layout);
            info!(
                "Loaded {:?} corpus: {} words, {} meanings",
                source,
                corpus.word_count(),
                corpus.meaning_count()
            );
            corpus
        }
        Err(e) => {
            degrade("corpus", &format!("{:?}", source), &e);
            WordCorpus::default()
        }
    }
}

fn degrade(kind: &str, name: &str, err: &QuizError) {
    if err.is_missing() {
        warn!("No {} '{}', using an empty round: {}", kind, name, err);
    } else {
        error!("Failed to read {} '{}', using an empty round: {}", kind, name, err);
    }
}
