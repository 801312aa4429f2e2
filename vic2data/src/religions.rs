use std::path::Path;

use serde::Serialize;
use vic2txt::Color;

use crate::db::Database;
use crate::error::{FieldError, LoadError};
use crate::fields::{Field, Handler, unknown_field};
use crate::group::{GroupedFile, load_grouped};
use crate::table::Idx;

pub const RELIGIONS_FILE: &str = "common/religion.txt";

#[derive(Debug, Clone, Serialize)]
pub struct ReligionGroup {
    pub name: String,
    pub members: Vec<Idx<Religion>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Religion {
    pub name: String,
    pub group: Option<Idx<ReligionGroup>>,
    pub icon: u8,
    pub color: Color,
    pub pagan: bool,
}

impl Religion {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            group: None,
            icon: 0,
            color: Color::default(),
            pagan: false,
        }
    }
}

named!(ReligionGroup, Religion);
grouped!(ReligionGroup => Religion);

static RELIGION_FIELDS: &[Field<Religion>] = &[
    Field::new(
        "icon",
        Handler::Int(|r, _, v| {
            r.icon = u8::try_from(v)
                .map_err(|_| FieldError::invalid(format_args!("icon {} is out of range", v)))?;
            Ok(())
        }),
    ),
    Field::new(
        "color",
        Handler::Color(|r, _, v| {
            r.color = v;
            Ok(())
        }),
    ),
    Field::new(
        "pagan",
        Handler::Bool(|r, _, v| {
            r.pagan = v;
            Ok(())
        }),
    ),
];

static RELIGIONS: GroupedFile<ReligionGroup, Religion> = GroupedFile {
    tables: |db| (&mut db.religion_groups, &mut db.religions),
    new_group: |name| ReligionGroup {
        name: name.to_owned(),
        members: Vec::new(),
    },
    new_member: Religion::new,
    fields: RELIGION_FIELDS,
    fallback: unknown_field,
};

/// Loads `common/religion.txt`.
pub fn load_religions(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    load_grouped(db, path, &RELIGIONS)
}
