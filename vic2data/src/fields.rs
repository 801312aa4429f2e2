//! Table-driven field dispatch shared by every loader.
//!
//! Each entity kind declares a static list of [`Field`]s: a key and a
//! [`Handler`] whose variant states the shape the value must have. The shape
//! is checked here, once, before the handler sees a typed value.

use std::fmt;

use vic2txt::{AccessError, Color, Date, Lexeme, Tag};

use crate::countries::Country;
use crate::db::Database;
use crate::error::{Diagnostics, FieldError};
use crate::map::Province;
use crate::table::{Idx, Named, Table};

pub type FieldResult = Result<(), FieldError>;

/// Read-only view of the database handed to field handlers.
pub struct Context<'a> {
    pub db: &'a Database,
    pub file: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(db: &'a Database, file: &'a str) -> Self {
        Self { db, file }
    }

    /// Advisory problem; logged, never counted.
    pub fn warn(&self, message: impl fmt::Display) {
        log::warn!("[{}] {}", self.file, message);
    }

    pub fn note(&self, message: impl fmt::Display) {
        log::info!("[{}] {}", self.file, message);
    }

    pub fn lookup<T: Named>(&self, table: &Table<T>, name: &str) -> Result<Idx<T>, FieldError> {
        table.find(name).ok_or_else(|| FieldError::Unresolved {
            kind: table.kind(),
            name: name.to_owned(),
        })
    }

    pub fn country(&self, tag: Tag) -> Result<Idx<Country>, FieldError> {
        self.db.country(tag).ok_or_else(|| FieldError::Unresolved {
            kind: "country",
            name: tag.to_string(),
        })
    }

    pub fn province(&self, id: i32) -> Result<Idx<Province>, FieldError> {
        match self.db.province(id) {
            Ok(Some(idx)) => Ok(idx),
            Ok(None) => Err(FieldError::Unresolved {
                kind: "province",
                name: id.to_string(),
            }),
            Err(e) => Err(FieldError::invalid(e)),
        }
    }
}

type Setter<T, V> = fn(&mut T, &Context<'_>, V) -> FieldResult;
type TextSetter<T> = fn(&mut T, &Context<'_>, &str) -> FieldResult;

/// How the value of one field is shaped and where it goes.
pub enum Handler<T> {
    /// `yes` / `no`
    Bool(Setter<T, bool>),
    Int(Setter<T, i32>),
    /// Integer or decimal.
    Number(Setter<T, f64>),
    Decimal(Setter<T, f64>),
    Date(Setter<T, Date>),
    /// A bare word.
    Word(TextSetter<T>),
    /// A quoted string.
    Quoted(TextSetter<T>),
    Tag(Setter<T, Tag>),
    Color(Setter<T, Color>),
    /// A `{ ... }` block handed over whole.
    Block(fn(&mut T, &Context<'_>, &Lexeme) -> FieldResult),
    /// Recognised and ignored.
    Skip,
}

pub struct Field<T> {
    pub name: &'static str,
    pub handler: Handler<T>,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str, handler: Handler<T>) -> Self {
        Self { name, handler }
    }
}

pub fn is_field<T>(fields: &[Field<T>], key: &str) -> bool {
    fields.iter().any(|f| f.name == key)
}

/// Handler for keys that are not in the static table.
pub type Fallback<T> = fn(&mut T, &Context<'_>, &Lexeme) -> FieldResult;

/// Fallback that accepts nothing.
pub fn unknown_field<T>(_: &mut T, _: &Context<'_>, lexeme: &Lexeme) -> FieldResult {
    Err(FieldError::Unknown(lexeme.name()))
}

fn dispatch<T>(handler: &Handler<T>, target: &mut T, cx: &Context<'_>, lexeme: &Lexeme) -> FieldResult {
    match handler {
        Handler::Bool(set) => set(target, cx, lexeme.as_bool()?),
        Handler::Int(set) => set(target, cx, lexeme.as_int()?),
        Handler::Number(set) => set(target, cx, lexeme.as_number()?),
        Handler::Decimal(set) => set(target, cx, lexeme.as_decimal()?),
        Handler::Date(set) => set(target, cx, lexeme.as_date()?),
        Handler::Word(set) => set(target, cx, lexeme.as_alphanumeric()?),
        Handler::Quoted(set) => set(target, cx, lexeme.as_string()?),
        Handler::Tag(set) => set(target, cx, lexeme.as_tag()?),
        Handler::Color(set) => set(target, cx, lexeme.as_color()?),
        Handler::Block(set) => {
            if !lexeme.compound {
                return Err(AccessError::Compound {
                    key: lexeme.name(),
                    expected: true,
                }
                .into());
            }
            set(target, cx, lexeme)
        }
        Handler::Skip => Ok(()),
    }
}

/// Applies one `key = value` child to `target`.
///
/// Keys must be bare words. Keys missing from `fields` go to `fallback`.
pub fn read_field<T>(
    fields: &[Field<T>],
    fallback: Fallback<T>,
    target: &mut T,
    cx: &Context<'_>,
    lexeme: &Lexeme,
) -> FieldResult {
    let Some(key) = lexeme.key.as_alphanumeric() else {
        return Err(FieldError::invalid(format_args!(
            "'{}' is not a field name",
            lexeme.key
        )));
    };
    match fields.iter().find(|f| f.name == key) {
        Some(field) => dispatch(&field.handler, target, cx, lexeme),
        None => fallback(target, cx, lexeme),
    }
}

/// Applies every child of `block` to `target`, logging and counting each
/// failing field without stopping.
pub fn read_fields<T>(
    fields: &[Field<T>],
    fallback: Fallback<T>,
    target: &mut T,
    cx: &Context<'_>,
    block: &Lexeme,
    owner: &dyn fmt::Display,
    diag: &mut Diagnostics,
) {
    for child in &block.children {
        if let Err(e) = read_field(fields, fallback, target, cx, child) {
            diag.error(format_args!("{}: {}", owner, e));
        }
    }
}
