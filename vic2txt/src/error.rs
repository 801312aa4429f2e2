//! Error types for the Victoria 2 text parser.

use std::fmt;

use crate::token::LexError;

/// Errors raised while turning a file into lexemes.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The file could not be opened or read.
    Io {
        /// Display name of the source.
        source: String,
        /// Message of the underlying I/O error.
        message: String,
    },
    /// A run of characters could not be turned into a token.
    Lexical {
        /// 1-based line number.
        line: usize,
        /// The tokenizer's complaint.
        error: LexError,
    },
    /// A token appeared where it is not allowed.
    UnexpectedToken {
        /// 1-based line number.
        line: usize,
        /// The token that was found.
        token: String,
        /// What was expected instead.
        expected: &'static str,
    },
    /// `=` was followed by something that is neither data nor `{`.
    MissingValue {
        /// 1-based line number.
        line: usize,
        /// Key of the assignment.
        key: String,
    },
    /// The input ended in the middle of an assignment or block.
    UnexpectedEof {
        /// 1-based line number of the last line read.
        line: usize,
        /// What was still open.
        context: &'static str,
    },
    /// A `}` without a matching `{`.
    UnmatchedClose {
        /// 1-based line number.
        line: usize,
    },
}

impl ParseError {
    /// Line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Io { .. } => None,
            ParseError::Lexical { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::MissingValue { line, .. }
            | ParseError::UnexpectedEof { line, .. }
            | ParseError::UnmatchedClose { line } => Some(*line),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io { source, message } => {
                write!(f, "Failed to read {}: {}", source, message)
            }
            ParseError::Lexical { line, error } => write!(f, "Line {}: {}", line, error),
            ParseError::UnexpectedToken {
                line,
                token,
                expected,
            } => write!(
                f,
                "Line {}: unexpected token '{}', expected {}",
                line, token, expected
            ),
            ParseError::MissingValue { line, key } => {
                write!(f, "Line {}: '{} =' is not followed by a value", line, key)
            }
            ParseError::UnexpectedEof { line, context } => {
                write!(f, "Line {}: end of file inside {}", line, context)
            }
            ParseError::UnmatchedClose { line } => write!(f, "Line {}: unmatched '}}'", line),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors raised by the typed lexeme accessors.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessError {
    /// Wrong number of values.
    Arity {
        /// Key of the lexeme.
        key: String,
        /// Number of values the accessor wants.
        expected: usize,
        /// Number of values present.
        found: usize,
    },
    /// Written with braces when a scalar was wanted, or the reverse.
    Compound {
        /// Key of the lexeme.
        key: String,
        /// Whether braces were wanted.
        expected: bool,
    },
    /// The value token is of the wrong kind.
    Kind {
        /// Key of the lexeme.
        key: String,
        /// Kind the accessor wants.
        expected: &'static str,
        /// The token found.
        found: String,
    },
    /// A boolean that is neither `yes` nor `no`.
    NotBool {
        /// Key of the lexeme.
        key: String,
        /// The word found.
        found: String,
    },
    /// A value that is not a well-formed country tag.
    InvalidTag {
        /// Key of the lexeme.
        key: String,
        /// The word found.
        found: String,
    },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Arity {
                key,
                expected,
                found,
            } => write!(
                f,
                "'{}' must have exactly {} value(s), found {}",
                key, expected, found
            ),
            AccessError::Compound { key, expected } => {
                if *expected {
                    write!(f, "'{}' must be a {{ }} block", key)
                } else {
                    write!(f, "'{}' must not be a {{ }} block", key)
                }
            }
            AccessError::Kind {
                key,
                expected,
                found,
            } => write!(f, "'{}' must be {}, found '{}'", key, expected, found),
            AccessError::NotBool { key, found } => {
                write!(f, "'{}' must be yes or no, found '{}'", key, found)
            }
            AccessError::InvalidTag { key, found } => {
                write!(f, "'{}' is not a valid country tag: '{}'", key, found)
            }
        }
    }
}

impl std::error::Error for AccessError {}
