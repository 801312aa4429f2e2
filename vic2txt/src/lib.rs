//! A parser library for Victoria 2 text data files.
//!
//! Files are read line by line, decoded from `WINDOWS_1252`, and split into
//! [`Token`]s. The [`parser`] turns a token stream into a [`Lexeme`] tree of
//! `key = value` and `key = { ... }` entries, and [`check`] offers a cheaper
//! structural lint that never builds a tree.

pub mod check;
pub mod color;
pub mod error;
pub mod lexeme;
pub mod parser;
pub mod reader;
pub mod source;
pub mod tag;
pub mod token;

pub use color::Color;
pub use error::{AccessError, ParseError};
pub use lexeme::{ANONYMOUS_KEY, Lexeme};
pub use parser::{Parsed, parse_file, parse_str};
pub use reader::SourceReader;
pub use source::TokenSource;
pub use tag::{Tag, tag_valid};
pub use token::{Date, LexError, Token};
