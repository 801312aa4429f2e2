use std::path::Path;

use serde::Serialize;
use vic2txt::{Color, Date, Lexeme, ParseError, Tag};

use crate::cultures::{Culture, GraphicalCulture, graphical_culture};
use crate::db::Database;
use crate::error::{Diagnostics, FieldError, LoadError};
use crate::fields::{Context, Field, FieldResult, Handler, read_field, read_fields};
use crate::governments::GovernmentType;
use crate::ideologies::Ideology;
use crate::issues::{Issue, Reform};
use crate::map::Province;
use crate::religions::Religion;
use crate::table::Idx;
use crate::values::NationalValue;

pub const COUNTRIES_FILE: &str = "common/countries.txt";

const DYNAMIC_TAGS: &str = "dynamic_tags";

/// A political party defined in a country's defines file.
#[derive(Debug, Clone, Serialize)]
pub struct Party {
    pub name: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub ideology: Option<Idx<Ideology>>,
    /// Chosen issue per issue group. Empty until the first issue is read.
    pub issues: Vec<Option<Idx<Issue>>>,
}

impl Default for Party {
    fn default() -> Self {
        Self {
            name: "unnamed".to_owned(),
            start_date: None,
            end_date: None,
            ideology: None,
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Country {
    pub tag: Tag,
    /// Defines file, relative to `common/`.
    pub defines: String,
    pub dynamic: bool,
    pub color: Color,
    pub graphical_culture: Option<GraphicalCulture>,
    /// Flag color per government type. Empty unless the defines file sets one.
    pub government_colors: Vec<Option<Color>>,
    pub parties: Vec<Party>,

    pub history_defined: bool,
    pub capital: Option<Idx<Province>>,
    pub primary_culture: Option<Idx<Culture>>,
    pub accepted_cultures: Vec<Idx<Culture>>,
    pub religion: Option<Idx<Religion>>,
    pub government: Option<Idx<GovernmentType>>,
    pub plurality: f64,
    pub national_value: Option<Idx<NationalValue>>,
    pub literacy: f64,
    pub non_state_culture_literacy: f64,
    pub civilized: bool,
    pub is_releasable_vassal: bool,
    pub prestige: f64,
    /// Position in [`Country::parties`].
    pub ruling_party: Option<usize>,
    /// Upper house share per ideology. Empty until history sets one.
    pub upper_house: Vec<f64>,
    /// Active reform per reform group. Empty until history sets one.
    pub reforms: Vec<Option<Idx<Reform>>>,
    pub consciousness: f64,
    pub nonstate_consciousness: f64,
    pub last_election: Option<Date>,
    pub flags: Vec<String>,
    pub oob: Option<String>,
}

impl Country {
    pub fn new(tag: Tag, defines: &str) -> Self {
        Self {
            tag,
            defines: defines.to_owned(),
            dynamic: false,
            color: Color::default(),
            graphical_culture: None,
            government_colors: Vec::new(),
            parties: Vec::new(),
            history_defined: false,
            capital: None,
            primary_culture: None,
            accepted_cultures: Vec::new(),
            religion: None,
            government: None,
            plurality: 0.0,
            national_value: None,
            literacy: 0.0,
            non_state_culture_literacy: 0.0,
            civilized: false,
            is_releasable_vassal: true,
            prestige: 0.0,
            ruling_party: None,
            upper_house: Vec::new(),
            reforms: Vec::new(),
            consciousness: 0.0,
            nonstate_consciousness: 0.0,
            last_election: None,
            flags: Vec::new(),
            oob: None,
        }
    }

    pub fn party(&self, name: &str) -> Option<usize> {
        self.parties.iter().position(|p| p.name == name)
    }
}

/// Loads `common/countries.txt`, the tag to defines-file list.
pub fn load_countries(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let mut diag = Diagnostics::for_path(path);
    let root = diag.parse(path)?;
    let mut dynamic = false;

    for entry in &root.children {
        let key = entry.name();
        if key == DYNAMIC_TAGS {
            match entry.as_bool() {
                Ok(v) => dynamic = v,
                Err(e) => diag.error(e),
            }
            continue;
        }
        let Some(tag) = entry.key.as_alphanumeric().and_then(Tag::parse) else {
            diag.error(format_args!("'{}' is not a valid country tag", key));
            continue;
        };
        if db.country(tag).is_some() {
            diag.error(format_args!("Duplicate country tag '{}'", tag));
            continue;
        }
        let defines = match entry.as_string() {
            Ok(defines) => defines,
            Err(e) => {
                diag.error(format_args!("{}: {}", tag, e));
                continue;
            }
        };
        let mut country = Country::new(tag, defines);
        country.dynamic = dynamic;
        db.countries.add(country)?;
    }

    log::info!("Loaded {} countries", db.countries.len());
    db.countries.freeze();
    diag.finish()
}

static COUNTRY_DEFINE_FIELDS: &[Field<Country>] = &[
    Field::new(
        "color",
        Handler::Color(|c, _, v| {
            c.color = v;
            Ok(())
        }),
    ),
    Field::new(
        "graphical_culture",
        Handler::Word(|c, _, v| {
            c.graphical_culture = Some(graphical_culture(v)?);
            Ok(())
        }),
    ),
    Field::new("unit_names", Handler::Skip),
];

/// `government_name = { r g b }`
fn government_color(country: &mut Country, cx: &Context<'_>, lexeme: &Lexeme) -> FieldResult {
    let name = lexeme.name();
    let Some(government) = cx.db.governments.find(&name) else {
        return Err(FieldError::Unknown(name));
    };
    let color = lexeme.as_color()?;
    if country.government_colors.is_empty() {
        country.government_colors = cx.db.governments.dense(None)?;
    }
    country.government_colors[government.index()] = Some(color);
    Ok(())
}

/// A party being read, with the number of fields it has set so far.
struct PartyDraft {
    party: Party,
    fields: usize,
}

static PARTY_FIELDS: &[Field<PartyDraft>] = &[
    Field::new(
        "name",
        Handler::Quoted(|d, _, v| {
            d.party.name = v.to_owned();
            d.fields += 1;
            Ok(())
        }),
    ),
    Field::new(
        "start_date",
        Handler::Date(|d, _, v| {
            d.party.start_date = Some(v);
            d.fields += 1;
            Ok(())
        }),
    ),
    Field::new(
        "end_date",
        Handler::Date(|d, _, v| {
            d.party.end_date = Some(v);
            d.fields += 1;
            Ok(())
        }),
    ),
    Field::new(
        "ideology",
        Handler::Word(|d, cx, v| {
            match cx.db.ideologies.find(v) {
                Some(ideology) => {
                    d.party.ideology = Some(ideology);
                    d.fields += 1;
                }
                None => cx.warn(format_args!("Party '{}' has unknown ideology '{}'", d.party.name, v)),
            }
            Ok(())
        }),
    ),
    Field::new("social_policy", Handler::Skip),
];

/// `issue_group = issue`
fn party_issue(draft: &mut PartyDraft, cx: &Context<'_>, lexeme: &Lexeme) -> FieldResult {
    let key = lexeme.name();
    let Some(group) = cx.db.issue_groups.find(&key) else {
        return Err(FieldError::Unknown(key));
    };
    let issue = cx.lookup(&cx.db.issues, lexeme.as_alphanumeric()?)?;
    if cx.db.issues[issue].group != Some(group) {
        return Err(FieldError::invalid(format_args!(
            "issue '{}' does not belong to '{}'",
            cx.db.issues[issue].name, key
        )));
    }
    let party = &mut draft.party;
    if party.issues.is_empty() {
        party.issues = cx.db.issue_groups.dense(None)?;
    }
    match party.issues[group.index()].replace(issue) {
        Some(old) => cx.note(format_args!(
            "Party '{}' replaces '{}' with '{}'",
            party.name, cx.db.issues[old].name, cx.db.issues[issue].name
        )),
        None => draft.fields += 1,
    }
    Ok(())
}

fn read_party(cx: &Context<'_>, block: &Lexeme, owner: Tag, diag: &mut Diagnostics) -> Party {
    let mut draft = PartyDraft {
        party: Party::default(),
        fields: 0,
    };
    let owner = format!("{} party", owner);
    read_fields(PARTY_FIELDS, party_issue, &mut draft, cx, block, &owner, diag);
    let expected = 4 + cx.db.issue_groups.len();
    if draft.fields < expected {
        cx.warn(format_args!(
            "{} '{}' sets only {} of {} fields",
            owner, draft.party.name, draft.fields, expected
        ));
    }
    draft.party
}

fn load_country_define(db: &mut Database, idx: Idx<Country>, path: &Path) -> Result<(), LoadError> {
    let file = path.display().to_string();
    let mut diag = Diagnostics::new(file.clone());
    let root = diag.parse(path)?;
    let mut country = db.countries[idx].clone();
    let cx = Context::new(db, &file);

    for child in &root.children {
        if child.key_text() == Some("party") {
            if child.compound {
                let party = read_party(&cx, child, country.tag, &mut diag);
                country.parties.push(party);
            } else {
                diag.error(format_args!("{}: 'party' must be a block", country.tag));
            }
            continue;
        }
        if let Err(e) = read_field(COUNTRY_DEFINE_FIELDS, government_color, &mut country, &cx, child) {
            diag.error(format_args!("{}: {}", country.tag, e));
        }
    }

    log::debug!("{}: {} parties", country.tag, country.parties.len());
    db.countries[idx] = country;
    diag.finish()
}

/// Reads every country's defines file under `common_dir`.
///
/// Every country is attempted; a missing or broken file only adds to the
/// error count.
pub fn load_country_defines(db: &mut Database, common_dir: &Path) -> Result<(), LoadError> {
    db.countries.ensure_frozen()?;
    db.ideologies.ensure_frozen()?;
    db.issue_groups.ensure_frozen()?;
    db.issues.ensure_frozen()?;
    db.governments.ensure_frozen()?;

    let mut diag = Diagnostics::for_path(common_dir);
    let targets: Vec<_> = db
        .countries
        .entries()
        .map(|(idx, c)| (idx, c.tag, common_dir.join(&c.defines)))
        .collect();
    for (idx, tag, path) in targets {
        match load_country_define(db, idx, &path) {
            Err(LoadError::Parse(e @ ParseError::Io { .. })) => {
                diag.error(format_args!("{}: {}", tag, e));
            }
            other => diag.merge(other)?,
        }
    }
    log::info!("Read defines for {} countries", db.countries.len());
    diag.finish()
}

pub(crate) fn tag_of(text: &str) -> Result<Tag, FieldError> {
    Tag::parse(text).ok_or_else(|| FieldError::invalid(format_args!("'{}' is not a valid country tag", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governments::load_government_types;
    use crate::ideologies::load_ideologies;
    use crate::issues::load_issues;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn tag(text: &str) -> Tag {
        Tag::parse(text).unwrap()
    }

    #[test]
    fn test_load_countries() {
        let file = file_with(
            "ENG = \"countries/United Kingdom.txt\"\nFRA = \"countries/France.txt\"\ndynamic_tags = yes\nD01 = \"countries/Dynamic.txt\"\n",
        );
        let mut db = Database::new();
        load_countries(&mut db, file.path()).unwrap();
        assert_eq!(db.countries.len(), 3);
        let eng = &db.countries[db.country(tag("ENG")).unwrap()];
        assert_eq!(eng.defines, "countries/United Kingdom.txt");
        assert!(!eng.dynamic);
        assert!(db.countries[db.country(tag("D01")).unwrap()].dynamic);
        assert!(db.countries.is_frozen());
    }

    #[test]
    fn test_bad_country_entries() {
        let file = file_with(
            "ENG = \"a.txt\"\nENG = \"b.txt\"\neng = \"c.txt\"\nFRA = bare\nGERMANY = \"d.txt\"\nPRU = { x }\n",
        );
        let mut db = Database::new();
        let result = load_countries(&mut db, file.path());
        assert!(matches!(result, Err(LoadError::Invalid { errors: 5, .. })));
        assert_eq!(db.countries.len(), 1);
    }

    const IDEOLOGIES: &str = "conservative_group = { conservative = { } liberal = { } }\n";
    const ISSUES: &str = r#"
party_issues = {
    trade_policy = { protectionism = { } free_trade = { } }
    economic_policy = { laissez_faire = { } interventionism = { } }
}
political_reforms = {
    slavery = { yes_slavery = { } no_slavery = { } }
}
"#;
    const GOVERNMENTS: &str = r#"
absolute_monarchy = { conservative = yes liberal = no election = no duration = 48 flagType = monarchy }
democracy = { conservative = yes liberal = yes election = yes duration = 48 }
"#;
    const ENGLAND: &str = r#"
color = { 200 50 60 }
graphical_culture = BritishGC
party = {
    name = "ENG_conservative"
    start_date = 1820.1.1
    end_date = 2000.1.1
    ideology = conservative
    trade_policy = protectionism
    economic_policy = laissez_faire
}
party = {
    name = "ENG_liberal"
    start_date = 1830.1.1
    ideology = anarchist
    trade_policy = free_trade
}
unit_names = { dreadnought = { Dreadnought } }
democracy = { 10 20 30 }
"#;

    fn prepared_db(dir: &Path, countries: &str) -> Database {
        let write = |name: &str, text: &str| {
            let path = dir.join(name);
            fs::write(&path, text).unwrap();
            path
        };
        let mut db = Database::new();
        load_ideologies(&mut db, &write("ideologies.txt", IDEOLOGIES)).unwrap();
        load_issues(&mut db, &write("issues.txt", ISSUES)).unwrap();
        load_government_types(&mut db, &write("governments.txt", GOVERNMENTS)).unwrap();
        load_countries(&mut db, &write("countries.txt", countries)).unwrap();
        db
    }

    #[test]
    fn test_country_defines() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("countries")).unwrap();
        fs::write(dir.path().join("countries/England.txt"), ENGLAND).unwrap();
        let mut db = prepared_db(dir.path(), "ENG = \"countries/England.txt\"\n");

        load_country_defines(&mut db, dir.path()).unwrap();
        let eng = &db.countries[db.country(tag("ENG")).unwrap()];
        assert_eq!(eng.color, Color::new(200, 50, 60));
        assert_eq!(eng.graphical_culture, Some(GraphicalCulture::British));
        assert_eq!(eng.parties.len(), 2);

        let conservative = &eng.parties[0];
        assert_eq!(conservative.name, "ENG_conservative");
        assert_eq!(conservative.start_date, Some(Date::new(1820, 1, 1)));
        assert_eq!(conservative.ideology, db.ideologies.find("conservative"));
        assert_eq!(conservative.issues[0], db.issues.find("protectionism"));
        assert_eq!(conservative.issues[1], db.issues.find("laissez_faire"));

        let liberal = &eng.parties[1];
        assert_eq!(liberal.ideology, None);
        assert_eq!(liberal.issues[1], None);
        assert_eq!(eng.party("ENG_liberal"), Some(1));

        let democracy = db.governments.find("democracy").unwrap();
        assert_eq!(eng.government_colors.len(), 2);
        assert_eq!(eng.government_colors[democracy.index()], Some(Color::new(10, 20, 30)));
    }

    #[test]
    fn test_bad_defines_are_aggregated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.txt"),
            "graphical_culture = MartianGC\nparty = { trade_policy = laissez_faire }\nflag = yes\n",
        )
        .unwrap();
        let mut db = prepared_db(dir.path(), "AAA = \"a.txt\"\nBBB = \"missing.txt\"\n");

        let result = load_country_defines(&mut db, dir.path());
        assert!(matches!(result, Err(LoadError::Invalid { errors: 4, .. })));
        assert_eq!(db.countries[db.country(tag("AAA")).unwrap()].parties.len(), 1);
    }

    #[test]
    fn test_defines_need_governments() {
        let file = file_with("ENG = \"e.txt\"\n");
        let mut db = Database::new();
        load_countries(&mut db, file.path()).unwrap();
        let result = load_country_defines(&mut db, Path::new("."));
        assert!(matches!(result, Err(LoadError::Table(_))));
    }

    #[test]
    fn test_tag_of() {
        assert!(tag_of("A01").is_ok());
        assert!(tag_of("a01").is_err());
    }
}
