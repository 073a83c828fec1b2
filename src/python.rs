//! Python bindings: one `QuizApp` handle per process, JSON replies for the web layer

use pyo3::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::config::QuizConfig;
use crate::engine::QuizEngine;
use crate::session::QuizMode;
use crate::store::FileStore;

fn runtime_error(e: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(runtime_error)
}

/// Quiz state shared by every request of the host application
#[pyclass]
pub struct QuizApp {
    engine: Mutex<QuizEngine<FileStore, StdRng>>,
}

impl QuizApp {
    fn engine(&self) -> PyResult<MutexGuard<'_, QuizEngine<FileStore, StdRng>>> {
        self.engine.lock().map_err(|_| runtime_error("quiz state poisoned by an earlier panic"))
    }
}

#[pymethods]
impl QuizApp {
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<&str>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => QuizConfig::from_toml_file(Path::new(path)).map_err(runtime_error)?,
            None => QuizConfig::default(),
        };
        Ok(Self {
            engine: Mutex::new(QuizEngine::open(config)),
        })
    }

    #[pyo3(signature = (mode, target=None))]
    fn configure_mode(&self, mode: &str, target: Option<&str>) -> PyResult<String> {
        let mode = QuizMode::parse(mode, target).map_err(runtime_error)?;
        to_json(&self.engine()?.configure_mode(mode))
    }

    fn list_sections(&self) -> PyResult<Vec<String>> {
        self.engine()?.list_sections().map_err(runtime_error)
    }

    fn list_logs(&self) -> PyResult<Vec<String>> {
        self.engine()?.list_logs().map_err(runtime_error)
    }

    fn next_question(&self) -> PyResult<String> {
        to_json(&self.engine()?.next_question())
    }

    fn submit(
        &self,
        word: &str,
        selected_meanings: Vec<String>,
        selected_synonyms: Vec<String>,
    ) -> PyResult<String> {
        let outcome = self.engine()?
            .submit(word, &selected_meanings, &selected_synonyms)
            .map_err(runtime_error)?;
        to_json(&outcome)
    }

    #[pyo3(signature = (source_path, date, first_column_is_meaning=false))]
    fn create_dated_section(
        &self,
        source_path: &str,
        date: &str,
        first_column_is_meaning: bool,
    ) -> PyResult<String> {
        self.engine()?
            .create_dated_section(source_path, date, first_column_is_meaning)
            .map_err(runtime_error)
    }

    fn summary(&self) -> PyResult<String> {
        to_json(&self.engine()?.summary())
    }

    fn read_log_entries(&self, log_name: &str) -> PyResult<String> {
        let entries = self.engine()?.read_log_entries(log_name).map_err(runtime_error)?;
        to_json(&entries)
    }

    fn __repr__(&self) -> PyResult<String> {
        let summary = self.engine()?.summary();
        Ok(format!(
            "QuizApp(mode='{}', progress={}/{})",
            summary.mode, summary.progress, summary.total
        ))
    }
}

/// Quiz core Python module
#[pymodule]
fn wordquiz_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<QuizApp>()?;
    Ok(())
}
