//! Character classification and single-line token scanning.

use std::fmt;

use serde::Serialize;

const DAYS_PER_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// An in-game calendar date written as `Y.M.D`.
///
/// The calendar has no leap years: February always has 28 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Number of days in `month` (1-based), or `None` for a month outside 1..=12.
    pub fn days_in_month(month: u8) -> Option<u8> {
        if (1..=12).contains(&month) {
            Some(DAYS_PER_MONTH[usize::from(month) - 1])
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        Self::days_in_month(self.month).is_some_and(|days| (1..=days).contains(&self.day))
    }

    /// Parses a three-segment `Y.M.D` run.
    ///
    /// Every segment that is missing or out of range is reported and keeps the
    /// corresponding field of [`Date::default`]. A leading `-` on the year is
    /// reported and ignored.
    pub fn parse_lenient(text: &str) -> Date {
        let mut date = Date::default();
        let mut segments = text.splitn(3, '.');
        let year = segments.next().unwrap_or_default();
        let month = segments.next().unwrap_or_default();
        let day = segments.next().unwrap_or_default();

        let year = match year.strip_prefix('-') {
            Some(stripped) => {
                log::warn!("Cannot have negative year: {}", text);
                stripped
            }
            None => year,
        };
        if year.is_empty() {
            log::warn!("Date is missing year: {}", text);
        } else {
            match year.parse::<u16>() {
                Ok(y) => date.year = y,
                Err(_) => log::warn!("Invalid year ({}) in {}", year, text),
            }
        }

        if month.is_empty() {
            log::warn!("Date is missing month: {}", text);
        } else {
            match month.parse::<u8>() {
                Ok(m) if Self::days_in_month(m).is_some() => date.month = m,
                _ => log::warn!("Invalid month ({}) in {}", month, text),
            }
        }

        if day.is_empty() {
            log::warn!("Date is missing day: {}", text);
        } else {
            let limit = Self::days_in_month(date.month).unwrap_or(31);
            match day.parse::<u8>() {
                Ok(d) if (1..=limit).contains(&d) => date.day = d,
                _ => log::warn!("Invalid day ({}) in {}", day, text),
            }
        }
        date
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::new(1836, 1, 1)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.year, self.month, self.day)
    }
}

/// A token scanned from a data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    /// A bare word: keys, identifiers, enum values.
    Alphanumeric(String),
    /// One of `= { } ; ,`.
    Symbol(char),
    /// A quoted string with the quotes removed.
    String(String),
    Integer(i32),
    Decimal(f64),
    Date(Date),
}

impl Token {
    /// Any token that may appear as a key or a value.
    pub fn is_data(&self) -> bool {
        !matches!(self, Token::Symbol(_))
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        matches!(self, Token::Symbol(c) if *c == symbol)
    }

    pub fn as_alphanumeric(&self) -> Option<&str> {
        match self {
            Token::Alphanumeric(s) => Some(s),
            _ => None,
        }
    }

    /// Text of a bare word or quoted string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Alphanumeric(s) | Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Alphanumeric(_) => "alphanumeric",
            Token::Symbol(_) => "symbol",
            Token::String(_) => "string",
            Token::Integer(_) => "integer",
            Token::Decimal(_) => "decimal",
            Token::Date(_) => "date",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Alphanumeric(s) => write!(f, "{}", s),
            Token::Symbol(c) => write!(f, "{}", c),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Integer(i) => write!(f, "{}", i),
            Token::Decimal(d) => write!(f, "{:.3}", d),
            Token::Date(d) => write!(f, "{}", d),
        }
    }
}

/// A run of characters that does not form a valid token.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A numeric-looking run with three or more `.` separators.
    PointCount { text: String, points: usize },
    /// An integer that does not fit in 32 bits.
    IntegerRange { text: String },
    /// A decimal the float parser rejected.
    Decimal { text: String },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::PointCount { text, points } => {
                write!(f, "Incompatible point-count ({}) in: {}", points, text)
            }
            LexError::IntegerRange { text } => write!(f, "Integer out of range: {}", text),
            LexError::Decimal { text } => write!(f, "Invalid decimal: {}", text),
        }
    }
}

pub fn is_symbol(c: char) -> bool {
    matches!(c, '=' | '{' | '}' | ';' | ',')
}

pub fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0B}' | '\u{0C}')
}

/// Anything that is not a symbol, quote or whitespace belongs to a bare word,
/// including non-ASCII characters.
pub fn is_constituent(c: char) -> bool {
    !is_symbol(c) && !is_quote(c) && !is_whitespace(c)
}

/// Scans the next token from `line`.
///
/// Returns `None` when the rest of the line is blank or a comment (`#` or `--`
/// after optional whitespace). Otherwise returns the token, or the reason the
/// run could not be tokenized, together with the number of bytes consumed.
pub fn scan(line: &str) -> Option<(Result<Token, LexError>, usize)> {
    let rest = line.trim_start_matches(is_whitespace);
    let skipped = line.len() - rest.len();
    if rest.starts_with('#') || rest.starts_with("--") {
        return None;
    }
    let first = rest.chars().next()?;

    if is_symbol(first) {
        return Some((Ok(Token::Symbol(first)), skipped + first.len_utf8()));
    }
    if is_quote(first) {
        let body = &rest[first.len_utf8()..];
        let (text, used) = match body.find(first) {
            Some(end) => (&body[..end], end + 2 * first.len_utf8()),
            None => (body, rest.len()),
        };
        return Some((Ok(Token::String(text.to_owned())), skipped + used));
    }

    let len = rest.find(|c| !is_constituent(c)).unwrap_or(rest.len());
    let run = &rest[..len];
    Some((classify(run), skipped + len))
}

/// Decides whether a bare run is an integer, decimal, date or word.
fn classify(run: &str) -> Result<Token, LexError> {
    let mut points = 0;
    let mut digits = false;
    for (i, c) in run.char_indices() {
        match c {
            '0'..='9' => digits = true,
            '.' => points += 1,
            '-' if i == 0 => {}
            _ => return Ok(Token::Alphanumeric(run.to_owned())),
        }
    }
    if !digits {
        return Ok(Token::Alphanumeric(run.to_owned()));
    }

    match points {
        0 => run
            .parse::<i32>()
            .map(Token::Integer)
            .map_err(|_| LexError::IntegerRange {
                text: run.to_owned(),
            }),
        1 => run
            .parse::<f64>()
            .map(Token::Decimal)
            .map_err(|_| LexError::Decimal {
                text: run.to_owned(),
            }),
        2 => Ok(Token::Date(Date::parse_lenient(run))),
        points => Err(LexError::PointCount {
            text: run.to_owned(),
            points,
        }),
    }
}
