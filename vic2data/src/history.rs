//! Start-date history of provinces and countries.
//!
//! Each file describes one entity: the province id or country tag is taken
//! from the start of the file name. Top-level keys set the starting state;
//! dated blocks describe later events and are not applied.

use std::path::Path;

use vic2txt::{Date, Lexeme, Token};

use crate::countries::{Country, tag_of};
use crate::db::Database;
use crate::error::{Diagnostics, FieldError, LoadError};
use crate::fields::{Context, Field, FieldResult, Handler, read_field, unknown_field};
use crate::folder::load_folder;
use crate::map::Province;

pub const PROVINCE_HISTORY_DIR: &str = "history/provinces";
pub const COUNTRY_HISTORY_DIR: &str = "history/countries";

/// Bookmark dates whose blocks are expected and skipped quietly.
const BOOKMARKS: [Date; 2] = [Date::new(1861, 1, 1), Date::new(1836, 1, 2)];

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn skip_dated_block(date: Date, owner: &dyn std::fmt::Display) {
    if !BOOKMARKS.contains(&date) {
        log::info!("{}: dated block {} is not applied", owner, date);
    }
}

/// Applies every top-level child of `root` to `target`, skipping dated blocks.
fn apply_history<T>(
    fields: &[Field<T>],
    fallback: crate::fields::Fallback<T>,
    target: &mut T,
    cx: &Context<'_>,
    root: &Lexeme,
    owner: &dyn std::fmt::Display,
    diag: &mut Diagnostics,
) {
    for child in &root.children {
        if let Token::Date(date) = child.key {
            skip_dated_block(date, owner);
            continue;
        }
        if let Err(e) = read_field(fields, fallback, target, cx, child) {
            diag.error(format_args!("{}: {}", owner, e));
        }
    }
}

static PROVINCE_HISTORY_FIELDS: &[Field<Province>] = &[
    Field::new(
        "owner",
        Handler::Tag(|p, cx, v| {
            p.owner = Some(cx.country(v)?);
            Ok(())
        }),
    ),
    Field::new(
        "controller",
        Handler::Tag(|p, cx, v| {
            p.controller = Some(cx.country(v)?);
            Ok(())
        }),
    ),
    Field::new(
        "add_core",
        Handler::Tag(|p, cx, v| {
            let country = cx.country(v)?;
            if p.cores.contains(&country) {
                cx.warn(format_args!("Province {} is readding core {}", p.id, v));
            } else {
                p.cores.push(country);
            }
            Ok(())
        }),
    ),
    Field::new(
        "trade_goods",
        Handler::Word(|p, cx, v| {
            let Some(good) = cx.db.trade_goods.find(v) else {
                cx.warn(format_args!("Province {} has unknown trade good '{}'", p.id, v));
                return Ok(());
            };
            if let Some(old) = p.rgo.filter(|&old| old != good) {
                cx.warn(format_args!(
                    "Province {} replaces trade good '{}' with '{}'",
                    p.id, cx.db.trade_goods[old].name, v
                ));
            }
            p.rgo = Some(good);
            Ok(())
        }),
    ),
    Field::new(
        "life_rating",
        Handler::Int(|p, _, v| {
            p.life_rating = v;
            Ok(())
        }),
    ),
    Field::new(
        "railroad",
        Handler::Int(|p, _, v| {
            p.railroad = v;
            Ok(())
        }),
    ),
    Field::new(
        "naval_base",
        Handler::Int(|p, _, v| {
            p.naval_base = v;
            Ok(())
        }),
    ),
    Field::new(
        "fort",
        Handler::Int(|p, _, v| {
            p.fort = v;
            Ok(())
        }),
    ),
    Field::new(
        "colonial",
        Handler::Int(|p, _, v| {
            p.colonial = v;
            Ok(())
        }),
    ),
    Field::new(
        "colony",
        Handler::Int(|p, _, v| {
            p.colony = v;
            Ok(())
        }),
    ),
    Field::new(
        "set_province_flag",
        Handler::Word(|p, cx, v| {
            if p.flags.iter().any(|f| f == v) {
                cx.warn(format_args!("Province {} is resetting flag '{}'", p.id, v));
            } else {
                p.flags.push(v.to_owned());
            }
            Ok(())
        }),
    ),
    Field::new("state_building", Handler::Skip),
    Field::new("party_loyalty", Handler::Skip),
    Field::new("is_slave", Handler::Skip),
    Field::new("terrain", Handler::Skip),
];

/// Leading decimal digits of a province history file name.
fn province_id_of(name: &str) -> Option<i32> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    name[..digits].parse().ok().filter(|&id| id >= 1)
}

/// Reads one province history file, e.g. `history/provinces/sweden/1 - Stockholm.txt`.
pub fn load_province_history(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let file = path.display().to_string();
    let mut diag = Diagnostics::new(file.clone());
    let Some(id) = province_id_of(file_name(path)) else {
        diag.error("File name does not start with a province id");
        return diag.finish();
    };
    let Some(idx) = db.province(id)? else {
        diag.error(format_args!("No province with id {}", id));
        return diag.finish();
    };

    let root = diag.parse(path)?;
    let mut province = db.provinces[idx].clone();
    if province.history_defined {
        diag.warn(format_args!("Province {} already has a history", id));
    } else if province.sea_start {
        log::info!("[{}] Sea province {} has a history", file, id);
    }
    let cx = Context::new(db, &file);
    let owner = format!("province {}", id);
    apply_history(PROVINCE_HISTORY_FIELDS, unknown_field, &mut province, &cx, &root, &owner, &mut diag);
    province.history_defined = true;
    db.provinces[idx] = province;
    diag.finish()
}

/// Reads every file below `history/provinces`.
pub fn load_province_histories(db: &mut Database, dir: &Path) -> Result<(), LoadError> {
    db.provinces.ensure_frozen()?;
    db.countries.ensure_frozen()?;
    db.trade_goods.ensure_frozen()?;
    load_folder(db, dir, load_province_history)?;
    let defined = db.provinces.iter().filter(|p| p.history_defined).count();
    log::info!(
        "Province histories cover {}/{} land provinces",
        defined,
        db.map.land_provinces
    );
    Ok(())
}

static COUNTRY_HISTORY_FIELDS: &[Field<Country>] = &[
    Field::new(
        "capital",
        Handler::Int(|c, cx, v| {
            let capital = cx.province(v)?;
            if let Some(old) = c.capital.filter(|&old| old != capital) {
                cx.note(format_args!(
                    "{} moves its capital from {} to {}",
                    c.tag, cx.db.provinces[old].id, v
                ));
            }
            c.capital = Some(capital);
            Ok(())
        }),
    ),
    Field::new(
        "primary_culture",
        Handler::Word(|c, cx, v| {
            c.primary_culture = Some(cx.lookup(&cx.db.cultures, v)?);
            Ok(())
        }),
    ),
    Field::new(
        "culture",
        Handler::Word(|c, cx, v| {
            let culture = cx.lookup(&cx.db.cultures, v)?;
            if c.accepted_cultures.contains(&culture) {
                cx.warn(format_args!("{} accepts culture '{}' twice", c.tag, v));
            } else {
                c.accepted_cultures.push(culture);
            }
            Ok(())
        }),
    ),
    Field::new(
        "religion",
        Handler::Word(|c, cx, v| {
            c.religion = Some(cx.lookup(&cx.db.religions, v)?);
            Ok(())
        }),
    ),
    Field::new(
        "government",
        Handler::Word(|c, cx, v| {
            c.government = Some(cx.lookup(&cx.db.governments, v)?);
            Ok(())
        }),
    ),
    Field::new(
        "nationalvalue",
        Handler::Word(|c, cx, v| {
            c.national_value = Some(cx.lookup(&cx.db.national_values, v)?);
            Ok(())
        }),
    ),
    Field::new(
        "plurality",
        Handler::Number(|c, _, v| {
            c.plurality = v;
            Ok(())
        }),
    ),
    Field::new(
        "prestige",
        Handler::Number(|c, _, v| {
            c.prestige = v;
            Ok(())
        }),
    ),
    Field::new(
        "consciousness",
        Handler::Number(|c, _, v| {
            c.consciousness = v;
            Ok(())
        }),
    ),
    Field::new(
        "nonstate_consciousness",
        Handler::Number(|c, _, v| {
            c.nonstate_consciousness = v;
            Ok(())
        }),
    ),
    Field::new(
        "literacy",
        Handler::Decimal(|c, _, v| {
            c.literacy = v;
            Ok(())
        }),
    ),
    Field::new(
        "non_state_culture_literacy",
        Handler::Decimal(|c, _, v| {
            c.non_state_culture_literacy = v;
            Ok(())
        }),
    ),
    Field::new(
        "civilized",
        Handler::Bool(|c, _, v| {
            c.civilized = v;
            Ok(())
        }),
    ),
    Field::new(
        "is_releasable_vassal",
        Handler::Bool(|c, _, v| {
            c.is_releasable_vassal = v;
            Ok(())
        }),
    ),
    Field::new(
        "set_country_flag",
        Handler::Word(|c, cx, v| {
            if c.flags.iter().any(|f| f == v) {
                cx.warn(format_args!("{} is resetting flag '{}'", c.tag, v));
            } else {
                c.flags.push(v.to_owned());
            }
            Ok(())
        }),
    ),
    Field::new(
        "ruling_party",
        Handler::Word(|c, _, v| {
            let party = c.party(v).ok_or_else(|| FieldError::Unresolved {
                kind: "party",
                name: v.to_owned(),
            })?;
            c.ruling_party = Some(party);
            Ok(())
        }),
    ),
    Field::new("upper_house", Handler::Block(upper_house)),
    Field::new(
        "last_election",
        Handler::Date(|c, _, v| {
            c.last_election = Some(v);
            Ok(())
        }),
    ),
    Field::new(
        "oob",
        Handler::Quoted(|c, _, v| {
            c.oob = Some(v.to_owned());
            Ok(())
        }),
    ),
];

/// `upper_house = { ideology = share ... }`
fn upper_house(country: &mut Country, cx: &Context<'_>, block: &Lexeme) -> FieldResult {
    if country.upper_house.is_empty() {
        country.upper_house = cx.db.ideologies.dense(0.0)?;
    }
    for seat in &block.children {
        let Some(name) = seat.key.as_alphanumeric().filter(|_| !seat.compound) else {
            return Err(FieldError::invalid(format_args!(
                "upper house entry '{}' is not `ideology = share`",
                seat.name()
            )));
        };
        let ideology = cx.lookup(&cx.db.ideologies, name)?;
        country.upper_house[ideology.index()] = seat.as_number()?;
    }
    Ok(())
}

/// `reform_group = reform`
fn active_reform(country: &mut Country, cx: &Context<'_>, lexeme: &Lexeme) -> FieldResult {
    let key = lexeme.name();
    let Some(group) = cx.db.reform_groups.find(&key) else {
        return Err(FieldError::Unknown(key));
    };
    let reform = cx.lookup(&cx.db.reforms, lexeme.as_alphanumeric()?)?;
    if cx.db.reforms[reform].group != Some(group) {
        return Err(FieldError::invalid(format_args!(
            "reform '{}' does not belong to '{}'",
            cx.db.reforms[reform].name, key
        )));
    }
    if country.reforms.is_empty() {
        country.reforms = cx.db.reform_groups.dense(None)?;
    }
    if let Some(old) = country.reforms[group.index()].replace(reform).filter(|&old| old != reform) {
        cx.note(format_args!(
            "{} changes '{}' from '{}' to '{}'",
            country.tag, key, cx.db.reforms[old].name, cx.db.reforms[reform].name
        ));
    }
    Ok(())
}

/// Reads one country history file, e.g. `history/countries/ENG - United Kingdom.txt`.
pub fn load_country_history(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let file = path.display().to_string();
    let mut diag = Diagnostics::new(file.clone());
    let name = file_name(path);
    let tag = match name.get(..3).map(tag_of) {
        Some(Ok(tag)) => tag,
        Some(Err(e)) => {
            diag.error(e);
            return diag.finish();
        }
        None => {
            diag.error("File name is too short to hold a country tag");
            return diag.finish();
        }
    };
    let Some(idx) = db.country(tag) else {
        diag.error(format_args!("No country with tag {}", tag));
        return diag.finish();
    };

    let root = diag.parse(path)?;
    let mut country = db.countries[idx].clone();
    if country.history_defined {
        diag.warn(format_args!("{} already has a history", tag));
    }
    let cx = Context::new(db, &file);
    apply_history(COUNTRY_HISTORY_FIELDS, active_reform, &mut country, &cx, &root, &tag, &mut diag);
    country.history_defined = true;
    db.countries[idx] = country;
    diag.finish()
}

/// Reads every file below `history/countries`.
pub fn load_country_histories(db: &mut Database, dir: &Path) -> Result<(), LoadError> {
    db.countries.ensure_frozen()?;
    db.cultures.ensure_frozen()?;
    db.religions.ensure_frozen()?;
    db.governments.ensure_frozen()?;
    db.national_values.ensure_frozen()?;
    db.ideologies.ensure_frozen()?;
    db.reform_groups.ensure_frozen()?;
    db.provinces.ensure_frozen()?;
    load_folder(db, dir, load_country_history)?;
    let defined = db.countries.iter().filter(|c| c.history_defined).count();
    log::info!("Country histories cover {}/{} countries", defined, db.countries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_province_id_from_file_name() {
        assert_eq!(province_id_of("1 - Stockholm.txt"), Some(1));
        assert_eq!(province_id_of("2581-Tromso.txt"), Some(2581));
        assert_eq!(province_id_of("0 - Nowhere.txt"), None);
        assert_eq!(province_id_of("Stockholm.txt"), None);
        assert_eq!(province_id_of("99999999999 - Overflow.txt"), None);
    }

    #[test]
    fn test_repeated_flag_is_kept_once() {
        let db = Database::new();
        let text = "set_country_flag = a\nset_country_flag = b\nset_country_flag = a\n";
        let root = vic2txt::parse_str("SWE - Sweden.txt", text).root;
        let mut country = Country::new(vic2txt::Tag::parse("SWE").unwrap(), "countries/Sweden.txt");
        let mut diag = Diagnostics::new("SWE - Sweden.txt");
        let cx = Context::new(&db, "SWE - Sweden.txt");
        apply_history(COUNTRY_HISTORY_FIELDS, active_reform, &mut country, &cx, &root, &"SWE", &mut diag);
        assert_eq!(diag.errors(), 0);
        assert_eq!(country.flags, vec!["a", "b"]);
    }

    #[test]
    fn test_bookmarks_are_known() {
        assert!(BOOKMARKS.contains(&Date::new(1861, 1, 1)));
        assert!(!BOOKMARKS.contains(&Date::new(1836, 1, 1)));
    }
}
