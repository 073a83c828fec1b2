//! Storage port: corpus sources, section lists and wrong-answer logs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::QuizConfig;
use crate::error::{QuizError, Result};
use crate::excel::{read_rows, Row};

/// Which spreadsheet the active corpus comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CorpusSource {
    Main,
    /// The sheet named `date` of a new-words workbook
    NewWords {
        path: String,
        date: String,
        first_column_is_meaning: bool,
    },
}

/// Where a dated section's words were read from, kept next to the section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOrigin {
    pub source_path: String,
    pub first_column_is_meaning: bool,
}

pub trait QuizStore {
    fn corpus_rows(&self, source: &CorpusSource) -> Result<Vec<Row>>;
    /// Rows of a named sheet in an arbitrary source file
    fn sheet_rows(&self, path: &str, sheet: &str) -> Result<Vec<Row>>;

    fn list_sections(&self) -> Result<Vec<String>>;
    fn read_section(&self, name: &str) -> Result<Vec<String>>;
    fn write_section(&mut self, name: &str, words: &[String]) -> Result<()>;
    /// `None` for sections that were not built from a dated sheet
    fn read_section_origin(&self, name: &str) -> Result<Option<SectionOrigin>>;
    fn write_section_origin(&mut self, name: &str, origin: &SectionOrigin) -> Result<()>;

    fn list_logs(&self) -> Result<Vec<String>>;
    fn read_log(&self, name: &str) -> Result<String>;
    fn append_log(&mut self, name: &str, text: &str) -> Result<()>;
}

/// Names come from clients; keep them inside their directory
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(QuizError::NotFound(name.to_string()));
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => QuizError::NotFound(path.display().to_string()),
        _ => QuizError::Io(e),
    })
}

/// Sorted `.txt` file names of a directory; a missing directory is empty
fn list_txt(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".txt") {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Flat-file store: `<sections_dir>/<name>.txt` (origin in `<name>.origin.toml`)
/// and `<logs_dir>/<name>`
#[derive(Debug, Clone)]
pub struct FileStore {
    corpus_path: PathBuf,
    sections_dir: PathBuf,
    logs_dir: PathBuf,
}

impl FileStore {
    pub fn new(config: &QuizConfig) -> Self {
        Self {
            corpus_path: config.corpus_path.clone(),
            sections_dir: config.sections_dir.clone(),
            logs_dir: config.logs_dir.clone(),
        }
    }

    fn section_path(&self, name: &str) -> PathBuf {
        self.sections_dir.join(format!("{}.txt", name))
    }

    fn origin_path(&self, name: &str) -> PathBuf {
        self.sections_dir.join(format!("{}.origin.toml", name))
    }
}

impl QuizStore for FileStore {
    fn corpus_rows(&self, source: &CorpusSource) -> Result<Vec<Row>> {
        match source {
            CorpusSource::Main => read_rows(&self.corpus_path, None),
            CorpusSource::NewWords { path, date, .. } => read_rows(Path::new(path), Some(date.as_str())),
        }
    }

    fn sheet_rows(&self, path: &str, sheet: &str) -> Result<Vec<Row>> {
        read_rows(Path::new(path), Some(sheet))
    }

    fn list_sections(&self) -> Result<Vec<String>> {
        Ok(list_txt(&self.sections_dir)?
            .into_iter()
            .map(|name| name.trim_end_matches(".txt").to_string())
            .collect())
    }

    fn read_section(&self, name: &str) -> Result<Vec<String>> {
        check_name(name)?;
        let text = read_text(&self.section_path(name))?;
        Ok(text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn write_section(&mut self, name: &str, words: &[String]) -> Result<()> {
        check_name(name)?;
        fs::create_dir_all(&self.sections_dir)?;
        let mut text = words.join("\n");
        text.push('\n');
        fs::write(self.section_path(name), text)?;
        Ok(())
    }

    fn read_section_origin(&self, name: &str) -> Result<Option<SectionOrigin>> {
        check_name(name)?;
        let text = match read_text(&self.origin_path(name)) {
            Ok(text) => text,
            Err(e) if e.is_missing() => return Ok(None),
            Err(e) => return Err(e),
        };
        toml::from_str(&text)
            .map(Some)
            .map_err(|e| QuizError::Config(format!("origin of section {}: {}", name, e)))
    }

    fn write_section_origin(&mut self, name: &str, origin: &SectionOrigin) -> Result<()> {
        check_name(name)?;
        fs::create_dir_all(&self.sections_dir)?;
        let text = toml::to_string(origin).map_err(|e| QuizError::Config(e.to_string()))?;
        fs::write(self.origin_path(name), text)?;
        Ok(())
    }

    fn list_logs(&self) -> Result<Vec<String>> {
        list_txt(&self.logs_dir)
    }

    fn read_log(&self, name: &str) -> Result<String> {
        check_name(name)?;
        read_text(&self.logs_dir.join(name))
    }

    fn append_log(&mut self, name: &str, text: &str) -> Result<()> {
        check_name(name)?;
        fs::create_dir_all(&self.logs_dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.logs_dir.join(name))?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    main_rows: Option<Vec<Row>>,
    sheets: HashMap<(String, String), Vec<Row>>,
    sections: BTreeMap<String, Vec<String>>,
    origins: HashMap<String, SectionOrigin>,
    logs: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_main_corpus(mut self, rows: Vec<Row>) -> Self {
        self.main_rows = Some(rows);
        self
    }

    pub fn with_sheet(mut self, path: &str, sheet: &str, rows: Vec<Row>) -> Self {
        self.sheets.insert((path.to_string(), sheet.to_string()), rows);
        self
    }

    pub fn with_section(mut self, name: &str, words: &[&str]) -> Self {
        self.sections.insert(name.to_string(), words.iter().map(|w| w.to_string()).collect());
        self
    }

    pub fn with_log(mut self, name: &str, text: &str) -> Self {
        self.logs.insert(name.to_string(), text.to_string());
        self
    }

    pub fn section(&self, name: &str) -> Option<&[String]> {
        self.sections.get(name).map(Vec::as_slice)
    }

    pub fn log(&self, name: &str) -> Option<&str> {
        self.logs.get(name).map(String::as_str)
    }
}

impl QuizStore for MemoryStore {
    fn corpus_rows(&self, source: &CorpusSource) -> Result<Vec<Row>> {
        match source {
            CorpusSource::Main => self.main_rows
                .clone()
                .ok_or_else(|| QuizError::NotFound("main corpus".to_string())),
            CorpusSource::NewWords { path, date, .. } => self.sheet_rows(path, date),
        }
    }

    fn sheet_rows(&self, path: &str, sheet: &str) -> Result<Vec<Row>> {
        self.sheets.get(&(path.to_string(), sheet.to_string()))
            .cloned()
            .ok_or_else(|| QuizError::NotFound(format!("sheet '{}' in {}", sheet, path)))
    }

    fn list_sections(&self) -> Result<Vec<String>> {
        Ok(self.sections.keys().cloned().collect())
    }

    fn read_section(&self, name: &str) -> Result<Vec<String>> {
        self.sections.get(name)
            .cloned()
            .ok_or_else(|| QuizError::NotFound(name.to_string()))
    }

    fn write_section(&mut self, name: &str, words: &[String]) -> Result<()> {
        self.sections.insert(name.to_string(), words.to_vec());
        Ok(())
    }

    fn read_section_origin(&self, name: &str) -> Result<Option<SectionOrigin>> {
        Ok(self.origins.get(name).cloned())
    }

    fn write_section_origin(&mut self, name: &str, origin: &SectionOrigin) -> Result<()> {
        self.origins.insert(name.to_string(), origin.clone());
        Ok(())
    }

    fn list_logs(&self) -> Result<Vec<String>> {
        Ok(self.logs.keys().filter(|n| n.ends_with(".txt")).cloned().collect())
    }

    fn read_log(&self, name: &str) -> Result<String> {
        self.logs.get(name)
            .cloned()
            .ok_or_else(|| QuizError::NotFound(name.to_string()))
    }

    fn append_log(&mut self, name: &str, text: &str) -> Result<()> {
        self.logs.entry(name.to_string()).or_default().push_str(text);
        Ok(())
    }
}
