//! Recursive-descent builder for lexeme trees.
//!
//! ```text
//! document := lexeme*
//! lexeme   := KEY ( '=' value )? | '{' lexeme* '}'
//! value    := DATA | '{' lexeme* '}'
//! ```

use std::path::Path;

use crate::error::ParseError;
use crate::lexeme::{ANONYMOUS_KEY, Lexeme};
use crate::source::TokenSource;
use crate::token::Token;

/// A parsed document and every problem met on the way.
///
/// A malformed lexeme is dropped and parsing carries on with the next one,
/// so `root` holds everything that could be read.
#[derive(Debug)]
pub struct Parsed {
    pub root: Lexeme,
    pub errors: Vec<ParseError>,
}

impl Parsed {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses the file at `path`. Only failing to open the file is an `Err`.
pub fn parse_file(path: &Path) -> Result<Parsed, ParseError> {
    let mut src = TokenSource::open(path)?;
    Ok(parse_source(&mut src))
}

pub fn parse_str(name: &str, text: &str) -> Parsed {
    parse_source(&mut TokenSource::from_text(name, text))
}

pub fn parse_source(src: &mut TokenSource) -> Parsed {
    let mut root = Lexeme::root();
    let mut errors = Vec::new();
    while src.peek().is_some() {
        match read_lexeme(src) {
            Ok(lexeme) => root.push(lexeme),
            Err(e) => {
                log::error!("[{}] {}", src.name(), e);
                errors.push(e);
            }
        }
    }
    let mut lexical = src.take_errors();
    lexical.append(&mut errors);
    Parsed {
        root,
        errors: lexical,
    }
}

enum Next {
    Open,
    Close,
    Data,
    Other,
    End,
}

fn look(src: &mut TokenSource) -> Next {
    match src.peek() {
        None => Next::End,
        Some(Token::Symbol('{')) => Next::Open,
        Some(Token::Symbol('}')) => Next::Close,
        Some(Token::Symbol(_)) => Next::Other,
        Some(_) => Next::Data,
    }
}

/// Reads one lexeme, including any block it opens.
pub fn read_lexeme(src: &mut TokenSource) -> Result<Lexeme, ParseError> {
    let line = src.line_number();
    let token = src.next_token().ok_or(ParseError::UnexpectedEof {
        line,
        context: "a lexeme",
    })?;
    let line = src.line_number();
    match token {
        Token::Symbol('{') => {
            let mut lexeme = Lexeme::block(ANONYMOUS_KEY, Vec::new());
            read_block(src, &mut lexeme)?;
            Ok(lexeme)
        }
        Token::Symbol('}') => Err(ParseError::UnmatchedClose { line }),
        Token::Symbol(_) => Err(ParseError::UnexpectedToken {
            line,
            token: token.to_string(),
            expected: "a key or '{'",
        }),
        key => {
            let mut lexeme = Lexeme::item(key);
            if src.peek().is_some_and(|t| t.is_symbol('=')) {
                src.next_token();
                match look(src) {
                    Next::Open => {
                        src.next_token();
                        read_block(src, &mut lexeme)?;
                    }
                    Next::Data => {
                        if let Some(value) = src.next_token() {
                            lexeme.push(Lexeme::item(value));
                        }
                    }
                    Next::Close | Next::Other => {
                        return Err(ParseError::MissingValue {
                            line: src.line_number(),
                            key: lexeme.name(),
                        });
                    }
                    Next::End => {
                        return Err(ParseError::UnexpectedEof {
                            line: src.line_number(),
                            context: "an assignment",
                        });
                    }
                }
            }
            Ok(lexeme)
        }
    }
}

fn read_block(src: &mut TokenSource, parent: &mut Lexeme) -> Result<(), ParseError> {
    parent.compound = true;
    loop {
        match look(src) {
            Next::End => {
                return Err(ParseError::UnexpectedEof {
                    line: src.line_number(),
                    context: "a { } block",
                });
            }
            Next::Close => {
                src.next_token();
                return Ok(());
            }
            _ => {
                let child = read_lexeme(src)?;
                parent.push(child);
            }
        }
    }
}
