//! Quiz configuration: file locations, section size and RNG seed

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{QuizError, Result};

/// Fixed sections hold at most this many words
pub const DEFAULT_SECTION_SIZE: usize = 300;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct QuizConfig {
    /// Main corpus, one `meaning, word, word...` row per synonym group
    pub corpus_path: PathBuf,
    /// Workbook with one sheet of new words per date
    pub new_words_path: PathBuf,
    pub new_words_first_column_is_meaning: bool,
    pub sections_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub section_size: usize,
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/synonyms.xlsx"),
            new_words_path: PathBuf::from("data/new_words.xlsx"),
            new_words_first_column_is_meaning: false,
            sections_dir: PathBuf::from("sections"),
            logs_dir: PathBuf::from("wrong_logs"),
            section_size: DEFAULT_SECTION_SIZE,
            seed: None,
        }
    }
}

impl QuizConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: QuizConfig =
            toml::from_str(contents).map_err(|e| QuizError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            QuizError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.section_size == 0 {
            return Err(QuizError::Config("section_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
