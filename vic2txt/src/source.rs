//! Token stream with line tracking and one-token lookahead.

use std::path::Path;

use crate::color::Color;
use crate::error::ParseError;
use crate::reader::SourceReader;
use crate::token::{Token, scan};

/// Pulls tokens out of a [`SourceReader`] line by line.
///
/// End of input is reported as `None`. Lexical failures are logged, recorded,
/// and the remainder of the offending line is skipped.
pub struct TokenSource {
    reader: SourceReader,
    line: String,
    cursor: usize,
    line_number: usize,
    peeked: Option<Token>,
    exhausted: bool,
    errors: Vec<ParseError>,
}

impl TokenSource {
    pub fn new(reader: SourceReader) -> TokenSource {
        TokenSource {
            reader,
            line: String::new(),
            cursor: 0,
            line_number: 0,
            peeked: None,
            exhausted: false,
            errors: Vec::new(),
        }
    }

    /// Opens `path`. Failing to open the file is fatal for the caller.
    pub fn open(path: &Path) -> Result<TokenSource, ParseError> {
        let reader = SourceReader::open(path).map_err(|e| ParseError::Io {
            source: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(reader))
    }

    pub fn from_text(name: &str, text: &str) -> TokenSource {
        Self::new(SourceReader::from_text(name, text))
    }

    pub fn name(&self) -> &str {
        self.reader.name()
    }

    /// 1-based number of the line the last token came from.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.peeked.take() {
            return Some(token);
        }
        loop {
            if self.cursor >= self.line.len() && !self.fill_line() {
                return None;
            }
            match scan(&self.line[self.cursor..]) {
                None => self.cursor = self.line.len(),
                Some((Ok(token), used)) => {
                    self.cursor += used;
                    return Some(token);
                }
                Some((Err(error), _)) => {
                    log::error!("[{}:{}] {}", self.name(), self.line_number, error);
                    self.errors.push(ParseError::Lexical {
                        line: self.line_number,
                        error,
                    });
                    self.cursor = self.line.len();
                }
            }
        }
    }

    /// Looks at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.next_token();
        }
        self.peeked.as_ref()
    }

    /// Drops whatever is left of the current line, including a peeked token.
    pub fn clear_line(&mut self) {
        self.peeked = None;
        self.cursor = self.line.len();
    }

    /// Lexical and I/O failures seen so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Records a failure found by a consumer of the stream.
    pub fn report(&mut self, error: ParseError) {
        log::error!("[{}] {}", self.name(), error);
        self.errors.push(error);
    }

    pub fn expect_symbol(&mut self, symbol: char) -> Result<(), ParseError> {
        match self.next_token() {
            Some(token) if token.is_symbol(symbol) => Ok(()),
            Some(token) => Err(self.unexpected(&token, "a symbol")),
            None => Err(self.eof("a symbol")),
        }
    }

    pub fn next_int(&mut self) -> Result<i32, ParseError> {
        match self.next_token() {
            Some(Token::Integer(i)) => Ok(i),
            Some(token) => Err(self.unexpected(&token, "an integer")),
            None => Err(self.eof("an integer")),
        }
    }

    /// Reads three integer channels, each optionally followed by `;` or `,`.
    pub fn next_color(&mut self) -> Result<Color, ParseError> {
        let mut channels = [0u8; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            let value = self.next_int()?;
            *channel = u8::try_from(value).map_err(|_| ParseError::UnexpectedToken {
                line: self.line_number,
                token: value.to_string(),
                expected: "a color channel in 0..=255",
            })?;
            if i < 2 && matches!(self.peek(), Some(Token::Symbol(';' | ','))) {
                self.next_token();
            }
        }
        Ok(Color::new(channels[0], channels[1], channels[2]))
    }

    fn unexpected(&self, token: &Token, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line_number,
            token: token.to_string(),
            expected,
        }
    }

    fn eof(&self, context: &'static str) -> ParseError {
        ParseError::UnexpectedEof {
            line: self.line_number,
            context,
        }
    }

    fn fill_line(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        match self.reader.read_line(&mut self.line) {
            Ok(true) => {
                self.line_number += 1;
                self.cursor = 0;
                true
            }
            Ok(false) => {
                self.exhausted = true;
                false
            }
            Err(e) => {
                log::error!("[{}:{}] {}", self.reader.name(), self.line_number, e);
                self.errors.push(ParseError::Io {
                    source: self.reader.name().to_string(),
                    message: e.to_string(),
                });
                self.exhausted = true;
                self.line.clear();
                self.cursor = 0;
                false
            }
        }
    }
}
