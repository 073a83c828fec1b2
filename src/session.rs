//! Process-wide quiz session: active mode, round pool, asked words and retry pool

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::{QuizError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizMode {
    /// Every word of the active corpus
    All,
    /// A named section file
    Section(String),
    /// Words missed in a wrong-answer log
    Review(String),
}

impl QuizMode {
    /// Build a mode from its wire form, e.g. `("review", Some("wrong_log_2025-08-10.txt"))`
    pub fn parse(mode: &str, target: Option<&str>) -> Result<Self> {
        let target = target.map(str::trim).filter(|t| !t.is_empty());
        match (mode.trim().to_lowercase().as_str(), target) {
            ("all", _) => Ok(QuizMode::All),
            ("section", Some(name)) => Ok(QuizMode::Section(name.to_string())),
            ("review", Some(log)) => Ok(QuizMode::Review(log.to_string())),
            ("section", None) | ("review", None) => {
                Err(QuizError::Config(format!("mode '{}' needs a target", mode)))
            }
            (other, _) => Err(QuizError::Config(format!("unknown mode '{}'", other))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizMode::All => "all",
            QuizMode::Section(_) => "section",
            QuizMode::Review(_) => "review",
        }
    }
}

/// Read-only view of the session for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub mode: String,
    pub target: Option<String>,
    pub progress: usize,
    pub total: usize,
    pub retry_remaining: usize,
    pub wrong_words: Vec<String>,
    pub meanings_only: bool,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: QuizMode,
    pool: BTreeSet<String>,
    asked: BTreeSet<String>,
    retry_pool: BTreeSet<String>,
    /// Missed outside review rounds; kept across rounds for display
    wrong_words: Vec<String>,
    /// Synonyms marked correct on the last question served for each word
    shown_synonyms: HashMap<String, BTreeSet<String>>,
    meanings_only: bool,
    active_log_base: Option<String>,
    round_total: usize,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            mode: QuizMode::All,
            pool: BTreeSet::new(),
            asked: BTreeSet::new(),
            retry_pool: BTreeSet::new(),
            wrong_words: Vec::new(),
            shown_synonyms: HashMap::new(),
            meanings_only: false,
            active_log_base: None,
            round_total: 0,
        }
    }

    /// Reset per-round state and install a new pool
    pub fn start_round(
        &mut self,
        mode: QuizMode,
        pool: BTreeSet<String>,
        meanings_only: bool,
        log_base: Option<String>,
    ) {
        self.retry_pool = match mode {
            QuizMode::Review(_) => pool.clone(),
            _ => BTreeSet::new(),
        };
        self.round_total = pool.len();
        self.pool = pool;
        self.asked.clear();
        self.shown_synonyms.clear();
        self.mode = mode;
        self.meanings_only = meanings_only;
        self.active_log_base = log_base;
    }

    pub fn mode(&self) -> &QuizMode {
        &self.mode
    }

    pub fn is_review(&self) -> bool {
        matches!(self.mode, QuizMode::Review(_))
    }

    pub fn meanings_only(&self) -> bool {
        self.meanings_only
    }

    pub fn active_log_base(&self) -> Option<&str> {
        self.active_log_base.as_deref()
    }

    /// Retry pool in review rounds, the configured pool otherwise
    pub fn active_pool(&self) -> &BTreeSet<String> {
        if self.is_review() {
            &self.retry_pool
        } else {
            &self.pool
        }
    }

    /// Active pool minus the words already asked this round
    pub fn remaining(&self) -> Vec<&String> {
        self.active_pool().difference(&self.asked).collect()
    }

    pub fn mark_asked(&mut self, word: &str) {
        self.asked.insert(word.to_string());
    }

    pub fn asked(&self) -> &BTreeSet<String> {
        &self.asked
    }

    pub fn progress(&self) -> usize {
        self.asked.len()
    }

    /// Pool size when the round began
    pub fn total(&self) -> usize {
        self.round_total
    }

    pub fn retry_pool(&self) -> &BTreeSet<String> {
        &self.retry_pool
    }

    pub fn wrong_words(&self) -> &[String] {
        &self.wrong_words
    }

    pub fn cache_shown_synonyms(&mut self, word: &str, shown: BTreeSet<String>) {
        self.shown_synonyms.insert(word.to_string(), shown);
    }

    pub fn shown_synonyms(&self, word: &str) -> BTreeSet<String> {
        self.shown_synonyms.get(word).cloned().unwrap_or_default()
    }

    /// Retry-pool and wrong-word bookkeeping after a graded answer
    pub fn record_result(&mut self, word: &str, correct: bool) {
        if self.is_review() {
            if correct {
                self.retry_pool.remove(word);
            } else {
                self.retry_pool.insert(word.to_string());
            }
        } else if !correct && !self.wrong_words.iter().any(|w| w == word) {
            self.wrong_words.push(word.to_string());
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let target = match &self.mode {
            QuizMode::All => None,
            QuizMode::Section(name) | QuizMode::Review(name) => Some(name.clone()),
        };
        SessionSummary {
            mode: self.mode.label().to_string(),
            target,
            progress: self.progress(),
            total: self.total(),
            retry_remaining: self.retry_pool.len(),
            wrong_words: self.wrong_words.clone(),
            meanings_only: self.meanings_only,
        }
    }
}
