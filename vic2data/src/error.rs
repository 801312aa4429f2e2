//! Error types for table misuse, field reads and loads.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use vic2txt::{AccessError, Lexeme, ParseError};

use crate::pipeline::Phase;

/// Misuse of an entity [`Table`](crate::table::Table).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("{0} table must be fully loaded before it can be indexed")]
    NotFrozen(&'static str),
    #[error("{0} table is already loaded and cannot grow")]
    Frozen(&'static str),
    #[error("{0} table is full")]
    Full(&'static str),
}

/// A single field of an entity that could not be read.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("unrecognised field '{0}'")]
    Unknown(String),
    #[error("unknown {kind} '{name}'")]
    Unresolved { kind: &'static str, name: String },
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

impl FieldError {
    pub fn invalid(message: impl fmt::Display) -> Self {
        FieldError::Invalid(message.to_string())
    }
}

/// Failure of a loader or of the load pipeline.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Internal consistency error: {0}")]
    Invariant(String),
    #[error("{file}: {errors} error(s)")]
    Invalid { file: String, errors: usize },
    #[error("Cannot load {phase} before {missing}")]
    MissingPrerequisite { phase: Phase, missing: Phase },
}

/// Error counter for one input file or folder.
///
/// Errors are logged as they are found and only counted; the loader keeps
/// going and [`Diagnostics::finish`] turns a non-zero count into a single
/// [`LoadError::Invalid`].
#[derive(Debug)]
pub struct Diagnostics {
    file: String,
    errors: usize,
}

impl Diagnostics {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            errors: 0,
        }
    }

    pub fn for_path(path: &Path) -> Self {
        Self::new(path.display().to_string())
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn error(&mut self, message: impl fmt::Display) {
        log::error!("[{}] {}", self.file, message);
        self.errors += 1;
    }

    pub fn warn(&self, message: impl fmt::Display) {
        log::warn!("[{}] {}", self.file, message);
    }

    /// Parses `path`, counting syntax errors. Only an unreadable file is fatal.
    pub fn parse(&mut self, path: &Path) -> Result<Lexeme, LoadError> {
        let parsed = vic2txt::parse_file(path)?;
        self.absorb(&parsed.errors);
        Ok(parsed.root)
    }

    /// Counts parse errors that the parser has already logged.
    pub fn absorb(&mut self, errors: &[ParseError]) {
        self.errors += errors.len();
    }

    /// Folds the outcome of a nested loader into this counter.
    pub fn merge(&mut self, result: Result<(), LoadError>) -> Result<(), LoadError> {
        match result {
            Ok(()) => Ok(()),
            Err(LoadError::Invalid { errors, .. }) => {
                self.errors += errors;
                Ok(())
            }
            Err(fatal) => Err(fatal),
        }
    }

    pub fn finish(self) -> Result<(), LoadError> {
        if self.errors == 0 {
            Ok(())
        } else {
            Err(LoadError::Invalid {
                file: self.file,
                errors: self.errors,
            })
        }
    }
}
