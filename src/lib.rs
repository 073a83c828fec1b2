//! Word quiz core - meaning and synonym quizzes over spreadsheet corpora
//!
//! Loads word/meaning groups, splits them into sections, serves randomized
//! multiple-choice questions, grades answers and keeps wrong-answer logs that
//! drive review rounds.

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod excel;
pub mod progress;
pub mod questions;
pub mod sections;
pub mod session;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use config::QuizConfig;
pub use corpus::{RowLayout, WordCorpus};
pub use engine::{ModeStatus, QuizEngine};
pub use error::{QuizError, Result};
pub use progress::{GradeOutcome, WrongLogEntry};
pub use questions::{NextQuestion, Question};
pub use session::{QuizMode, QuizSession, SessionSummary};
pub use store::{CorpusSource, FileStore, MemoryStore, QuizStore, SectionOrigin};
