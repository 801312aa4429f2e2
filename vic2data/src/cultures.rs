use std::path::Path;

use serde::Serialize;
use vic2txt::{Color, Lexeme, Token};

use crate::countries::Country;
use crate::db::Database;
use crate::error::{Diagnostics, FieldError, LoadError};
use crate::fields::{Context, Field, Handler, is_field, read_field, read_fields, unknown_field};
use crate::group::{PendingGroup, resolve_groups};
use crate::table::Idx;

pub const CULTURES_FILE: &str = "common/cultures.txt";

keyword_enum! {
    /// Unit and building art set.
    pub enum GraphicalCulture {
        Generic => "Generic",
        British => "BritishGC",
        European => "EuropeanGC",
        MiddleEastern => "MiddleEasternGC",
        Chinese => "ChineseGC",
        Indian => "IndianGC",
        African => "AfricanGC",
        Us => "UsGC",
        Russian => "RussianGC",
        French => "FrenchGC",
        Prussian => "PrussianGC",
        Italian => "ItalianGC",
        AustriaHungary => "AustriaHungaryGC",
        Swedish => "SwedishGC",
        Spanish => "SpanishGC",
        Ottoman => "OttomanGC",
        Morocco => "MoroccoGC",
        Zulu => "ZuluGC",
        Asian => "AsianGC",
        SouthAmerican => "SouthAmericanGC",
        Confederate => "ConfederateGC",
        Japanese => "JapaneseGC",
    }
}

keyword_enum! {
    /// Portrait set used for a culture group's leaders.
    pub enum Leader {
        European => "european",
        Russian => "russian",
        Arab => "arab",
        Asian => "asian",
        Indian => "indian",
        NativeAmerican => "nativeamerican",
        SouthAmerican => "southamerican",
        African => "african",
        PolarBear => "polar_bear",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CultureGroup {
    pub name: String,
    pub leader: Option<Leader>,
    pub unit: Option<GraphicalCulture>,
    /// Country formed by uniting the group.
    pub union: Option<Idx<Country>>,
    pub is_overseas: bool,
    pub members: Vec<Idx<Culture>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Culture {
    pub name: String,
    pub group: Option<Idx<CultureGroup>>,
    pub color: Color,
    pub radicalism: i32,
    pub primary: Option<Idx<Country>>,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
}

impl Culture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            group: None,
            color: Color::default(),
            radicalism: 0,
            primary: None,
            first_names: Vec::new(),
            last_names: Vec::new(),
        }
    }
}

named!(CultureGroup, Culture);
grouped!(CultureGroup => Culture);

static CULTURE_GROUP_FIELDS: &[Field<CultureGroup>] = &[
    Field::new(
        "is_overseas",
        Handler::Bool(|g, _, v| {
            g.is_overseas = v;
            Ok(())
        }),
    ),
    Field::new(
        "leader",
        Handler::Word(|g, _, v| {
            g.leader = Some(Leader::from_keyword(v).ok_or_else(|| FieldError::Unresolved {
                kind: "leader",
                name: v.to_owned(),
            })?);
            Ok(())
        }),
    ),
    Field::new(
        "unit",
        Handler::Word(|g, _, v| {
            g.unit = Some(graphical_culture(v)?);
            Ok(())
        }),
    ),
    Field::new(
        "union",
        Handler::Tag(|g, cx, v| {
            g.union = Some(cx.country(v)?);
            Ok(())
        }),
    ),
];

static CULTURE_FIELDS: &[Field<Culture>] = &[
    Field::new(
        "color",
        Handler::Color(|c, _, v| {
            c.color = v;
            Ok(())
        }),
    ),
    Field::new(
        "radicalism",
        Handler::Int(|c, _, v| {
            c.radicalism = v;
            Ok(())
        }),
    ),
    Field::new(
        "primary",
        Handler::Tag(|c, cx, v| {
            c.primary = Some(cx.country(v)?);
            Ok(())
        }),
    ),
    Field::new(
        "first_names",
        Handler::Block(|c, _, v| {
            c.first_names = name_list(v)?;
            Ok(())
        }),
    ),
    Field::new(
        "last_names",
        Handler::Block(|c, _, v| {
            c.last_names = name_list(v)?;
            Ok(())
        }),
    ),
];

pub(crate) fn graphical_culture(word: &str) -> Result<GraphicalCulture, FieldError> {
    GraphicalCulture::from_keyword(word).ok_or_else(|| FieldError::Unresolved {
        kind: "graphical culture",
        name: word.to_owned(),
    })
}

/// `{ Name "Two Words" ... }`: a non-empty list of non-empty names.
fn name_list(list: &Lexeme) -> Result<Vec<String>, FieldError> {
    if list.children.is_empty() {
        return Err(FieldError::invalid(format_args!("'{}' is empty", list.name())));
    }
    let mut names = Vec::with_capacity(list.children.len());
    for item in &list.children {
        match &item.key {
            Token::Alphanumeric(name) | Token::String(name) if item.is_leaf() && !name.is_empty() => {
                names.push(name.clone())
            }
            other => {
                return Err(FieldError::invalid(format_args!(
                    "invalid name '{}' in '{}'",
                    other,
                    list.name()
                )));
            }
        }
    }
    Ok(names)
}

/// Loads `common/cultures.txt`. Countries must be loaded for `union` and
/// `primary` tags to resolve.
pub fn load_cultures(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let file = path.display().to_string();
    let mut diag = Diagnostics::new(file.clone());
    let root = diag.parse(path)?;
    let mut pending = Vec::new();

    for group_l in &root.children {
        if !group_l.is_named_group() {
            diag.error(format_args!("Expected a culture group, found '{}'", group_l.name()));
            continue;
        }
        let group_name = group_l.name();
        if db.culture_groups.find(&group_name).is_some() {
            diag.error(format_args!("Duplicate culture group '{}'", group_name));
            continue;
        }
        let mut group = CultureGroup {
            name: group_name.clone(),
            leader: None,
            unit: None,
            union: None,
            is_overseas: false,
            members: Vec::new(),
        };
        let mut cultures = Vec::new();
        for child in &group_l.children {
            let cx = Context::new(db, &file);
            let key = child.key.as_alphanumeric();
            if key.is_some_and(|k| is_field(CULTURE_GROUP_FIELDS, k)) {
                if let Err(e) = read_field(CULTURE_GROUP_FIELDS, unknown_field, &mut group, &cx, child) {
                    diag.error(format_args!("{}: {}", group_name, e));
                }
            } else if child.is_named_group() {
                let name = child.name();
                if db.cultures.find(&name).is_some() || cultures.iter().any(|c: &Culture| c.name == name) {
                    diag.error(format_args!("Duplicate culture '{}'", name));
                    continue;
                }
                let mut culture = Culture::new(&name);
                read_fields(CULTURE_FIELDS, unknown_field, &mut culture, &cx, child, &name, &mut diag);
                cultures.push(culture);
            } else {
                diag.error(format_args!(
                    "Expected a culture block in '{}', found '{}'",
                    group_name,
                    child.name()
                ));
            }
        }
        let mut batch = PendingGroup::new(db.culture_groups.add(group)?);
        for culture in cultures {
            batch.record(db.cultures.add(culture)?);
        }
        pending.push(batch);
    }

    resolve_groups(&mut db.culture_groups, &mut db.cultures, pending)?;
    log::info!(
        "Loaded {} cultures into {} culture groups",
        db.cultures.len(),
        db.culture_groups.len()
    );
    db.culture_groups.freeze();
    db.cultures.freeze();
    diag.finish()
}
