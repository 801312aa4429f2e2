use std::path::Path;

use serde::Serialize;
use vic2txt::{Color, Date};

use crate::db::Database;
use crate::error::LoadError;
use crate::fields::{Field, Handler, unknown_field};
use crate::group::{GroupedFile, load_grouped};
use crate::table::Idx;

pub const IDEOLOGIES_FILE: &str = "common/ideologies.txt";

#[derive(Debug, Clone, Serialize)]
pub struct IdeologyGroup {
    pub name: String,
    pub members: Vec<Idx<Ideology>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ideology {
    pub name: String,
    pub group: Option<Idx<IdeologyGroup>>,
    pub uncivilized: bool,
    pub can_reduce_militancy: bool,
    pub color: Color,
    /// Date the ideology becomes available, if it is not there from the start.
    pub date: Option<Date>,
}

impl Ideology {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            group: None,
            uncivilized: true,
            can_reduce_militancy: false,
            color: Color::default(),
            date: None,
        }
    }
}

named!(IdeologyGroup, Ideology);
grouped!(IdeologyGroup => Ideology);

static IDEOLOGY_FIELDS: &[Field<Ideology>] = &[
    Field::new(
        "uncivilized",
        Handler::Bool(|i, _, v| {
            i.uncivilized = v;
            Ok(())
        }),
    ),
    Field::new(
        "color",
        Handler::Color(|i, _, v| {
            i.color = v;
            Ok(())
        }),
    ),
    Field::new(
        "date",
        Handler::Date(|i, _, v| {
            i.date = Some(v);
            Ok(())
        }),
    ),
    Field::new(
        "can_reduce_militancy",
        Handler::Bool(|i, _, v| {
            i.can_reduce_militancy = v;
            Ok(())
        }),
    ),
    // Reform triggers are scripted conditions.
    Field::new("add_political_reform", Handler::Skip),
    Field::new("remove_political_reform", Handler::Skip),
    Field::new("add_social_reform", Handler::Skip),
    Field::new("remove_social_reform", Handler::Skip),
    Field::new("add_economic_reform", Handler::Skip),
    Field::new("remove_economic_reform", Handler::Skip),
    Field::new("add_military_reform", Handler::Skip),
    Field::new("remove_military_reform", Handler::Skip),
];

static IDEOLOGIES: GroupedFile<IdeologyGroup, Ideology> = GroupedFile {
    tables: |db| (&mut db.ideology_groups, &mut db.ideologies),
    new_group: |name| IdeologyGroup {
        name: name.to_owned(),
        members: Vec::new(),
    },
    new_member: Ideology::new,
    fields: IDEOLOGY_FIELDS,
    fallback: unknown_field,
};

/// Loads `common/ideologies.txt`.
pub fn load_ideologies(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    load_grouped(db, path, &IDEOLOGIES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_ideologies() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
conservative = {{
    conservative = {{
        color = {{ 10 10 250 }}
        add_political_reform = {{ AND = {{ is_vassal = no }} }}
    }}
}}
socialist = {{
    socialist = {{
        uncivilized = no
        can_reduce_militancy = yes
        date = 1848.1.1
        color = {{ 200 0 0 }}
    }}
    communist = {{
        date = 1870.2.30
    }}
}}
"#
        )
        .unwrap();
        let mut db = Database::new();
        load_ideologies(&mut db, file.path()).unwrap();

        assert_eq!(db.ideologies.len(), 3);
        assert_eq!(db.ideology_groups.len(), 2);
        let socialist = &db.ideologies[db.ideologies.find("socialist").unwrap()];
        assert!(!socialist.uncivilized);
        assert!(socialist.can_reduce_militancy);
        assert_eq!(socialist.date, Some(Date::new(1848, 1, 1)));
        assert_eq!(socialist.color, Color::new(200, 0, 0));

        let conservative = &db.ideologies[db.ideologies.find("conservative").unwrap()];
        assert!(conservative.uncivilized);
        assert_eq!(conservative.date, None);

        // An impossible day keeps the default.
        let communist = &db.ideologies[db.ideologies.find("communist").unwrap()];
        assert_eq!(communist.date, Some(Date::new(1870, 2, 1)));
        assert_eq!(communist.group, db.ideology_groups.find("socialist"));
    }
}
