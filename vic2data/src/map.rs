//! Province definitions, `default.map` and states.

use std::path::Path;

use serde::Serialize;
use vic2txt::{Color, ParseError, Token, TokenSource};

use crate::countries::Country;
use crate::db::Database;
use crate::error::{Diagnostics, LoadError};
use crate::table::Idx;
use crate::tradegoods::TradeGood;

pub const DEFINITION_FILE: &str = "map/definition.csv";
pub const DEFAULT_MAP_FILE: &str = "map/default.map";
pub const REGION_FILE: &str = "map/region.txt";

/// Highest id a province definition may use.
pub const MAX_PROVINCE_ID: i32 = u16::MAX as i32;

#[derive(Debug, Clone, Serialize)]
pub struct Province {
    /// 1-based; always the table position plus one.
    pub id: u16,
    pub color: Color,
    pub sea_start: bool,
    pub state: Option<Idx<State>>,

    pub history_defined: bool,
    pub owner: Option<Idx<Country>>,
    pub controller: Option<Idx<Country>>,
    pub cores: Vec<Idx<Country>>,
    pub rgo: Option<Idx<TradeGood>>,
    pub life_rating: i32,
    pub railroad: i32,
    pub naval_base: i32,
    pub fort: i32,
    pub colonial: i32,
    pub colony: i32,
    pub flags: Vec<String>,
}

impl Province {
    pub fn new(id: u16, color: Color) -> Self {
        Self {
            id,
            color,
            sea_start: false,
            state: None,
            history_defined: false,
            owner: None,
            controller: None,
            cores: Vec::new(),
            rgo: None,
            life_rating: 0,
            railroad: 0,
            naval_base: 0,
            fort: 0,
            colonial: 0,
            colony: 0,
            flags: Vec::new(),
        }
    }

    pub fn is_land(&self) -> bool {
        !self.sea_start
    }
}

/// A named set of provinces from `region.txt`.
#[derive(Debug, Clone, Serialize)]
pub struct State {
    pub name: String,
    pub provinces: Vec<Idx<Province>>,
}

named!(State);

/// Map-wide facts gathered from `default.map`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MapInfo {
    pub max_provinces: Option<i32>,
    pub land_provinces: usize,
    pub sea_provinces: usize,
}

/// `default.map` keys that are recognised but carry nothing we load.
const IGNORED_MAP_KEYS: &[&str] = &[
    "definitions",
    "provinces",
    "positions",
    "terrain",
    "rivers",
    "terrain_definition",
    "tree_definition",
    "continent",
    "adjacencies",
    "region",
    "region_sea",
    "province_flag_sprite",
    "border_heights",
    "terrain_sheet_heights",
    "tree",
    "border_cutoff",
];

fn read_definition(src: &mut TokenSource) -> Result<(i32, Color), ParseError> {
    let id = src.next_int()?;
    src.expect_symbol(';')?;
    let color = src.next_color()?;
    Ok((id, color))
}

/// Loads `map/definition.csv`: one `id;r;g;b;name;x` line per province.
///
/// Lines that do not start with an integer (the header) are skipped. Ids
/// must run 1, 2, 3... without gaps, and no two provinces may share a color.
pub fn load_province_definitions(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let mut diag = Diagnostics::for_path(path);
    let mut src = TokenSource::open(path)?;

    loop {
        match src.peek() {
            None => break,
            Some(Token::Integer(_)) => {}
            Some(_) => {
                src.clear_line();
                continue;
            }
        }
        let line = src.line_number();
        let record = read_definition(&mut src);
        src.clear_line();
        let (id, color) = match record {
            Ok(record) => record,
            Err(e) => {
                diag.error(format_args!("line {}: {}", line, e));
                continue;
            }
        };
        if !(1..=MAX_PROVINCE_ID).contains(&id) {
            diag.error(format_args!("line {}: invalid province id {}", line, id));
            continue;
        }
        let expected = db.provinces.len() + 1;
        if (id as usize) < expected {
            diag.error(format_args!("line {}: duplicate province id {}", line, id));
            continue;
        }
        if id as usize != expected {
            diag.error(format_args!(
                "line {}: province id {} breaks the sequence, expected {}",
                line, id, expected
            ));
            continue;
        }
        if let Some(other) = db.province_by_color(color.to_u32()) {
            diag.error(format_args!(
                "line {}: color {:06x} of province {} is already used by province {}",
                line,
                color.to_u32(),
                id,
                db.provinces[other].id
            ));
            continue;
        }
        db.provinces.add(Province::new(id as u16, color))?;
    }

    diag.absorb(&src.take_errors());
    log::info!("Loaded {} provinces", db.provinces.len());
    db.provinces.freeze();
    diag.finish()
}

/// Loads `map/default.map`: the sea provinces and the province limit.
pub fn load_default_map(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    db.provinces.ensure_frozen()?;
    let mut diag = Diagnostics::for_path(path);
    let root = diag.parse(path)?;

    for entry in &root.children {
        let Some(key) = entry.key.as_alphanumeric() else {
            diag.error(format_args!("Expected a key, found '{}'", entry.key));
            continue;
        };
        match key {
            "max_provinces" => match entry.as_int() {
                Ok(max) => {
                    if db.provinces.len() > max.max(0) as usize {
                        diag.warn(format_args!(
                            "{} provinces defined, more than max_provinces ({})",
                            db.provinces.len(),
                            max
                        ));
                    }
                    db.map.max_provinces = Some(max);
                }
                Err(e) => diag.error(e),
            },
            "sea_starts" => read_sea_starts(db, entry, &mut diag)?,
            _ if IGNORED_MAP_KEYS.contains(&key) => {}
            _ => diag.error(format_args!("Unrecognised key '{}'", key)),
        }
    }

    let sea = db.provinces.iter().filter(|p| p.sea_start).count();
    db.map.sea_provinces = sea;
    db.map.land_provinces = db.provinces.len() - sea;
    log::info!(
        "{} land and {} sea provinces",
        db.map.land_provinces,
        db.map.sea_provinces
    );
    diag.finish()
}

fn read_sea_starts(db: &mut Database, list: &vic2txt::Lexeme, diag: &mut Diagnostics) -> Result<(), LoadError> {
    for item in &list.children {
        let Token::Integer(id) = item.key else {
            diag.error(format_args!("Expected a province id in sea_starts, found '{}'", item.key));
            continue;
        };
        match db.province(id)? {
            Some(idx) => {
                let province = &mut db.provinces[idx];
                if province.sea_start {
                    diag.warn(format_args!("Province {} is already a sea start", id));
                }
                province.sea_start = true;
            }
            None => diag.error(format_args!("Unknown province id {} in sea_starts", id)),
        }
    }
    Ok(())
}

/// Loads `map/region.txt` and points every listed province at its state.
pub fn load_states(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    db.provinces.ensure_frozen()?;
    let mut diag = Diagnostics::for_path(path);
    let root = diag.parse(path)?;

    for state_l in &root.children {
        let Some(name) = state_l.key.as_alphanumeric() else {
            diag.error(format_args!("Expected a state name, found '{}'", state_l.key));
            continue;
        };
        if db.states.find(name).is_some() {
            diag.error(format_args!("Duplicate state '{}'", name));
            continue;
        }
        let mut state = State {
            name: name.to_owned(),
            provinces: Vec::new(),
        };
        for item in &state_l.children {
            let Token::Integer(id) = item.key else {
                diag.error(format_args!("{}: expected a province id, found '{}'", name, item.key));
                continue;
            };
            match db.province(id)? {
                Some(idx) if state.provinces.contains(&idx) => {
                    diag.warn(format_args!("{}: province {} is listed twice", name, id));
                }
                Some(idx) => state.provinces.push(idx),
                None => diag.error(format_args!("{}: invalid province id {}", name, id)),
            }
        }
        db.states.add(state)?;
    }

    log::info!("Loaded {} states", db.states.len());
    db.states.freeze();
    update_province_states(db)?;
    diag.finish()
}

/// Rebuilds every province's state back-reference from the state table.
pub fn update_province_states(db: &mut Database) -> Result<(), LoadError> {
    db.provinces.ensure_frozen()?;
    db.states.ensure_frozen()?;
    for province in db.provinces.iter_mut() {
        province.state = None;
    }
    for (state_idx, state) in db.states.entries() {
        for &idx in &state.provinces {
            let province = &mut db.provinces[idx];
            if let Some(previous) = province.state {
                log::warn!(
                    "Province {} moves from state '{}' to '{}'",
                    province.id,
                    db.states[previous].name,
                    state.name
                );
            }
            province.state = Some(state_idx);
        }
    }
    Ok(())
}
