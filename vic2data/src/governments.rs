use std::path::Path;

use serde::Serialize;
use vic2txt::Lexeme;

use crate::db::Database;
use crate::error::{Diagnostics, FieldError, LoadError};
use crate::fields::{Context, Field, FieldResult, Handler, read_fields};
use crate::ideologies::Ideology;

pub const GOVERNMENTS_FILE: &str = "common/governments.txt";

keyword_enum! {
    /// Flag variant shown for a government.
    pub enum FlagType {
        Communist => "communist",
        Republic => "republic",
        Fascist => "fascist",
        Monarchy => "monarchy",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GovernmentType {
    pub name: String,
    /// Whether each ideology may rule, indexed by [`Ideology`] index.
    pub ideologies: Vec<bool>,
    pub election: bool,
    pub appoint_ruling_party: bool,
    /// Months between elections.
    pub duration: u8,
    pub flag: Option<FlagType>,
}

named!(GovernmentType);

impl GovernmentType {
    pub fn allows(&self, ideology: crate::table::Idx<Ideology>) -> bool {
        self.ideologies.get(ideology.index()).copied().unwrap_or(false)
    }
}

static GOVERNMENT_FIELDS: &[Field<GovernmentType>] = &[
    Field::new(
        "election",
        Handler::Bool(|g, _, v| {
            g.election = v;
            Ok(())
        }),
    ),
    Field::new(
        "duration",
        Handler::Int(|g, _, v| {
            g.duration = u8::try_from(v)
                .map_err(|_| FieldError::invalid(format_args!("duration {} is out of range", v)))?;
            Ok(())
        }),
    ),
    Field::new(
        "appoint_ruling_party",
        Handler::Bool(|g, _, v| {
            g.appoint_ruling_party = v;
            Ok(())
        }),
    ),
    Field::new(
        "flagType",
        Handler::Word(|g, _, v| {
            let flag = FlagType::from_keyword(v).ok_or_else(|| FieldError::Unresolved {
                kind: "flag type",
                name: v.to_owned(),
            })?;
            g.flag = Some(flag);
            Ok(())
        }),
    ),
];

/// Any other key must name an ideology.
fn ideology_allowed(gov: &mut GovernmentType, cx: &Context<'_>, lexeme: &Lexeme) -> FieldResult {
    let name = lexeme.name();
    let ideology = cx
        .db
        .ideologies
        .find(&name)
        .ok_or(FieldError::Unknown(name))?;
    gov.ideologies[ideology.index()] = lexeme.as_bool()?;
    Ok(())
}

/// Loads `common/governments.txt`. Ideologies must already be loaded, since
/// every government carries one flag per ideology.
pub fn load_government_types(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let allowed = db.ideologies.dense(false)?;
    let file = path.display().to_string();
    let mut diag = Diagnostics::new(file.clone());
    let root = diag.parse(path)?;

    for gov_l in &root.children {
        if !gov_l.is_named_group() {
            diag.error(format_args!("Expected a government block, found '{}'", gov_l.name()));
            continue;
        }
        let name = gov_l.name();
        if db.governments.find(&name).is_some() {
            diag.error(format_args!("Duplicate government type '{}'", name));
            continue;
        }
        let mut gov = GovernmentType {
            name,
            ideologies: allowed.clone(),
            election: false,
            appoint_ruling_party: false,
            duration: 0,
            flag: None,
        };
        let cx = Context::new(db, &file);
        read_fields(
            GOVERNMENT_FIELDS,
            ideology_allowed,
            &mut gov,
            &cx,
            gov_l,
            &gov_l.name(),
            &mut diag,
        );
        db.governments.add(gov)?;
    }
    log::info!("Loaded {} government types", db.governments.len());
    db.governments.freeze();
    diag.finish()
}
