//! Generic parse tree and typed accessors.

use std::fmt;

use serde::Serialize;

use crate::color::Color;
use crate::error::AccessError;
use crate::tag::Tag;
use crate::token::{Date, Token};

/// Key given to a `{ ... }` block written without one.
pub const ANONYMOUS_KEY: &str = "compound";

/// A parse tree node: a key token and its ordered children.
///
/// `foo = bar` is a non-compound lexeme keyed `foo` with one leaf child `bar`;
/// `foo = { a b }` is a compound lexeme with two leaf children. Compound-ness
/// records whether braces were written, so `foo = { a }` is still compound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lexeme {
    pub key: Token,
    pub children: Vec<Lexeme>,
    pub compound: bool,
}

impl Lexeme {
    /// A bare value with no children, as found inside a list.
    pub fn item(key: Token) -> Lexeme {
        Lexeme {
            key,
            children: Vec::new(),
            compound: false,
        }
    }

    /// The compound node every parsed document hangs off.
    pub fn root() -> Lexeme {
        Self::block("root", Vec::new())
    }

    /// `key = value`
    pub fn scalar(key: &str, value: Token) -> Lexeme {
        Lexeme {
            key: Token::Alphanumeric(key.to_owned()),
            children: vec![Lexeme::item(value)],
            compound: false,
        }
    }

    /// `key = { children }`
    pub fn block(key: &str, children: Vec<Lexeme>) -> Lexeme {
        Lexeme {
            key: Token::Alphanumeric(key.to_owned()),
            children,
            compound: true,
        }
    }

    /// `key = { r g b }`
    pub fn color(key: &str, color: Color) -> Lexeme {
        let channels = [color.r, color.g, color.b]
            .into_iter()
            .map(|c| Lexeme::item(Token::Integer(i32::from(c))))
            .collect();
        Self::block(key, channels)
    }

    pub fn push(&mut self, child: Lexeme) {
        self.children.push(child);
    }

    /// Text of a bare-word or quoted key.
    pub fn key_text(&self) -> Option<&str> {
        self.key.as_text()
    }

    /// Key rendered for diagnostics.
    pub fn name(&self) -> String {
        match &self.key {
            Token::String(s) | Token::Alphanumeric(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// A braced block with a bare-word key.
    pub fn is_named_group(&self) -> bool {
        self.compound && !self.is_anonymous() && matches!(self.key, Token::Alphanumeric(_))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(&self.key, Token::Alphanumeric(k) if k == ANONYMOUS_KEY)
    }

    pub fn is_leaf(&self) -> bool {
        !self.compound && self.children.is_empty()
    }

    /// Finds the first child keyed `key`.
    pub fn find(&self, key: &str) -> Option<&Lexeme> {
        self.children.iter().find(|c| c.key_text() == Some(key))
    }

    fn single(&self) -> Result<&Token, AccessError> {
        if self.compound {
            return Err(AccessError::Compound {
                key: self.name(),
                expected: false,
            });
        }
        match self.children.as_slice() {
            [only] if only.is_leaf() => Ok(&only.key),
            [only] => Err(AccessError::Compound {
                key: only.name(),
                expected: false,
            }),
            other => Err(AccessError::Arity {
                key: self.name(),
                expected: 1,
                found: other.len(),
            }),
        }
    }

    fn kind_error(&self, expected: &'static str, found: &Token) -> AccessError {
        AccessError::Kind {
            key: self.name(),
            expected,
            found: found.to_string(),
        }
    }

    /// `yes` or `no`.
    pub fn as_bool(&self) -> Result<bool, AccessError> {
        match self.single()? {
            Token::Alphanumeric(s) if s == "yes" => Ok(true),
            Token::Alphanumeric(s) if s == "no" => Ok(false),
            Token::Alphanumeric(s) => Err(AccessError::NotBool {
                key: self.name(),
                found: s.clone(),
            }),
            other => Err(self.kind_error("yes or no", other)),
        }
    }

    pub fn as_int(&self) -> Result<i32, AccessError> {
        match self.single()? {
            Token::Integer(i) => Ok(*i),
            other => Err(self.kind_error("an integer", other)),
        }
    }

    pub fn as_decimal(&self) -> Result<f64, AccessError> {
        match self.single()? {
            Token::Decimal(d) => Ok(*d),
            other => Err(self.kind_error("a decimal", other)),
        }
    }

    /// An integer or a decimal, widened to `f64`.
    pub fn as_number(&self) -> Result<f64, AccessError> {
        match self.single()? {
            Token::Decimal(d) => Ok(*d),
            Token::Integer(i) => Ok(f64::from(*i)),
            other => Err(self.kind_error("a number", other)),
        }
    }

    pub fn as_date(&self) -> Result<Date, AccessError> {
        match self.single()? {
            Token::Date(d) => Ok(*d),
            other => Err(self.kind_error("a date (Y.M.D)", other)),
        }
    }

    pub fn as_alphanumeric(&self) -> Result<&str, AccessError> {
        match self.single()? {
            Token::Alphanumeric(s) => Ok(s),
            other => Err(self.kind_error("a bare word", other)),
        }
    }

    pub fn as_string(&self) -> Result<&str, AccessError> {
        match self.single()? {
            Token::String(s) => Ok(s),
            other => Err(self.kind_error("a quoted string", other)),
        }
    }

    /// A bare word or a quoted string.
    pub fn as_text(&self) -> Result<&str, AccessError> {
        match self.single()? {
            Token::Alphanumeric(s) | Token::String(s) => Ok(s),
            other => Err(self.kind_error("text", other)),
        }
    }

    pub fn as_tag(&self) -> Result<Tag, AccessError> {
        let text = self.as_text()?;
        Tag::parse(text).ok_or_else(|| AccessError::InvalidTag {
            key: self.name(),
            found: text.to_owned(),
        })
    }

    /// `{ r g b }` with integer channels clamped to 0..=255, or decimal
    /// channels where 0..=1 is scaled to 0..=255. Out of range channels are
    /// clamped with a warning.
    pub fn as_color(&self) -> Result<Color, AccessError> {
        if !self.compound {
            return Err(AccessError::Compound {
                key: self.name(),
                expected: true,
            });
        }
        if self.children.len() != 3 {
            return Err(AccessError::Arity {
                key: self.name(),
                expected: 3,
                found: self.children.len(),
            });
        }
        let mut channels = [0u8; 3];
        for (channel, child) in channels.iter_mut().zip(&self.children) {
            if !child.is_leaf() {
                return Err(AccessError::Compound {
                    key: self.name(),
                    expected: false,
                });
            }
            *channel = match child.key {
                Token::Integer(i) => {
                    if !(0..=255).contains(&i) {
                        log::warn!("Color channel {} in '{}' clamped to 0..=255", i, self.name());
                    }
                    i.clamp(0, 255) as u8
                }
                Token::Decimal(d) => {
                    if d <= 0.0 {
                        if d < 0.0 {
                            log::warn!("Color channel {} in '{}' clamped to 0", d, self.name());
                        }
                        0
                    } else if d < 1.0 {
                        (d * 255.0) as u8
                    } else {
                        if d > 1.0 {
                            log::warn!("Color channel {} in '{}' clamped to 255", d, self.name());
                        }
                        255
                    }
                }
                ref other => return Err(self.kind_error("an integer or decimal channel", other)),
            };
        }
        Ok(Color::new(channels[0], channels[1], channels[2]))
    }
}

impl fmt::Display for Lexeme {
    /// Writes the lexeme back out as tab-indented text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl Lexeme {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "\t".repeat(depth);
        let anonymous = self.is_anonymous();
        if self.compound && !self.children.is_empty() && self.children.iter().all(Lexeme::is_leaf) {
            let values: Vec<String> = self.children.iter().map(|c| c.key.to_string()).collect();
            if anonymous {
                writeln!(f, "{}{{ {} }}", indent, values.join(" "))
            } else {
                writeln!(f, "{}{} = {{ {} }}", indent, self.key, values.join(" "))
            }
        } else if self.compound {
            if anonymous {
                writeln!(f, "{}{{", indent)?;
            } else {
                writeln!(f, "{}{} = {{", indent, self.key)?;
            }
            for child in &self.children {
                child.write_indented(f, depth + 1)?;
            }
            writeln!(f, "{}}}", indent)
        } else if self.children.is_empty() {
            writeln!(f, "{}{}", indent, self.key)
        } else {
            let values: Vec<String> = self.children.iter().map(|c| c.key.to_string()).collect();
            writeln!(f, "{}{} = {}", indent, self.key, values.join(" "))
        }
    }
}
