use std::path::Path;

use serde::Serialize;
use vic2txt::Lexeme;

use crate::db::Database;
use crate::error::{Diagnostics, FieldError, LoadError};
use crate::fields::{Context, Field, Handler, read_fields, unknown_field};
use crate::folder::load_folder;

pub const UNITS_DIR: &str = "units";

keyword_enum! {
    pub enum UnitTerrain {
        Land => "land",
        Naval => "naval",
    }
}

keyword_enum! {
    pub enum UnitKind {
        Infantry => "infantry",
        Cavalry => "cavalry",
        Support => "support",
        Special => "special",
        Transport => "transport",
        LightShip => "light_ship",
        BigShip => "big_ship",
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Unit {
    pub name: String,
    pub icon: u8,
    pub naval_icon: u8,
    pub terrain: Option<UnitTerrain>,
    pub kind: Option<UnitKind>,
    pub sprite: String,
    pub move_sound: String,
    pub select_sound: String,
    pub sprite_override: String,
    pub sprite_mount: String,
    pub sprite_mount_attach_node: String,
    pub capital: bool,
    pub sail: bool,
    pub active: bool,
    pub transport: bool,
    pub floating_flag: bool,
    pub can_build_overseas: bool,
    pub colonial_points: f64,
    pub priority: f64,
    pub max_strength: f64,
    pub default_organisation: f64,
    pub maximum_speed: f64,
    pub weighted_value: f64,
    /// Days.
    pub build_time: i32,
    /// Amount per trade good, indexed by trade good.
    pub build_cost: Vec<f64>,
    pub min_port_level: i32,
    pub limit_per_port: i32,
    pub supply_consumption_score: f64,
    pub supply_consumption: f64,
    pub supply_cost: Vec<f64>,

    pub reconnaissance: f64,
    pub attack: f64,
    pub defence: f64,
    pub discipline: f64,
    pub support: f64,
    pub maneuver: f64,
    pub siege: f64,

    pub hull: f64,
    pub gun_power: f64,
    pub fire_range: f64,
    pub evasion: f64,
    pub torpedo_attack: f64,
}

named!(Unit);

macro_rules! set {
    ($key:literal, Word, $field:ident) => {
        Field::new(
            $key,
            Handler::Word(|u, _, v| {
                u.$field = v.to_owned();
                Ok(())
            }),
        )
    };
    ($key:literal, $shape:ident, $field:ident) => {
        Field::new(
            $key,
            Handler::$shape(|u, _, v| {
                u.$field = v;
                Ok(())
            }),
        )
    };
}

fn icon(value: i32) -> Result<u8, FieldError> {
    u8::try_from(value).map_err(|_| FieldError::invalid(format_args!("icon {} is out of range", value)))
}

static UNIT_FIELDS: &[Field<Unit>] = &[
    Field::new(
        "icon",
        Handler::Int(|u, _, v| {
            u.icon = icon(v)?;
            Ok(())
        }),
    ),
    Field::new(
        "naval_icon",
        Handler::Int(|u, _, v| {
            u.naval_icon = icon(v)?;
            Ok(())
        }),
    ),
    Field::new(
        "type",
        Handler::Word(|u, _, v| {
            u.terrain = Some(UnitTerrain::from_keyword(v).ok_or_else(|| FieldError::Unresolved {
                kind: "unit terrain",
                name: v.to_owned(),
            })?);
            Ok(())
        }),
    ),
    Field::new(
        "unit_type",
        Handler::Word(|u, _, v| {
            u.kind = Some(UnitKind::from_keyword(v).ok_or_else(|| FieldError::Unresolved {
                kind: "unit type",
                name: v.to_owned(),
            })?);
            Ok(())
        }),
    ),
    set!("sprite", Word, sprite),
    set!("move_sound", Word, move_sound),
    set!("select_sound", Word, select_sound),
    set!("sprite_override", Word, sprite_override),
    set!("sprite_mount", Word, sprite_mount),
    set!("sprite_mount_attach_node", Word, sprite_mount_attach_node),
    set!("capital", Bool, capital),
    set!("sail", Bool, sail),
    set!("active", Bool, active),
    set!("transport", Bool, transport),
    set!("floating_flag", Bool, floating_flag),
    set!("can_build_overseas", Bool, can_build_overseas),
    set!("colonial_points", Number, colonial_points),
    set!("priority", Number, priority),
    set!("max_strength", Number, max_strength),
    set!("default_organisation", Number, default_organisation),
    set!("maximum_speed", Number, maximum_speed),
    set!("weighted_value", Number, weighted_value),
    set!("build_time", Int, build_time),
    Field::new(
        "build_cost",
        Handler::Block(|u, cx, v| {
            u.build_cost = goods_list(cx, &u.name, v)?;
            Ok(())
        }),
    ),
    set!("min_port_level", Int, min_port_level),
    set!("limit_per_port", Int, limit_per_port),
    set!("supply_consumption_score", Number, supply_consumption_score),
    set!("supply_consumption", Number, supply_consumption),
    Field::new(
        "supply_cost",
        Handler::Block(|u, cx, v| {
            u.supply_cost = goods_list(cx, &u.name, v)?;
            Ok(())
        }),
    ),
    set!("reconnaissance", Number, reconnaissance),
    set!("attack", Number, attack),
    set!("defence", Number, defence),
    set!("discipline", Number, discipline),
    set!("support", Number, support),
    set!("maneuver", Number, maneuver),
    set!("siege", Number, siege),
    set!("hull", Number, hull),
    set!("gun_power", Number, gun_power),
    set!("fire_range", Number, fire_range),
    set!("evasion", Number, evasion),
    set!("torpedo_attack", Number, torpedo_attack),
];

/// `{ good = amount ... }` as one amount per trade good. Repeated goods add up.
fn goods_list(cx: &Context<'_>, unit: &str, block: &Lexeme) -> Result<Vec<f64>, FieldError> {
    let mut amounts = cx.db.trade_goods.dense(0.0)?;
    let what = block.name();
    if block.children.is_empty() {
        cx.note(format_args!("{}: {} is empty", unit, what));
    }
    for entry in &block.children {
        let Some(name) = entry.key.as_alphanumeric().filter(|_| !entry.compound) else {
            return Err(FieldError::invalid(format_args!(
                "{} entry '{}' is not `good = amount`",
                what,
                entry.name()
            )));
        };
        let good = cx.lookup(&cx.db.trade_goods, name)?;
        let amount = entry.as_number()?;
        if amount == 0.0 {
            cx.note(format_args!("{}: {} adds nothing of '{}'", unit, what, name));
        }
        if amounts[good.index()] != 0.0 {
            cx.warn(format_args!("{}: '{}' is listed twice in {}", unit, name, what));
        }
        amounts[good.index()] += amount;
    }
    Ok(amounts)
}

/// Reads every unit block of one file under `units/`.
pub fn load_unit_file(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let file = path.display().to_string();
    let mut diag = Diagnostics::new(file.clone());
    let root = diag.parse(path)?;

    for unit_l in &root.children {
        if !unit_l.is_named_group() {
            diag.error(format_args!("Expected a unit block, found '{}'", unit_l.name()));
            continue;
        }
        let name = unit_l.name();
        if db.units.find(&name).is_some() {
            diag.error(format_args!("Duplicate unit '{}'", name));
            continue;
        }
        let mut unit = Unit {
            name: name.clone(),
            ..Unit::default()
        };
        let cx = Context::new(db, &file);
        read_fields(UNIT_FIELDS, unknown_field, &mut unit, &cx, unit_l, &name, &mut diag);
        db.units.add(unit)?;
    }
    diag.finish()
}

/// Reads every file below `units/`. Needs the trade goods for costs.
pub fn load_units(db: &mut Database, dir: &Path) -> Result<(), LoadError> {
    db.trade_goods.ensure_frozen()?;
    let result = load_folder(db, dir, load_unit_file);
    log::info!("Loaded {} units", db.units.len());
    db.units.freeze();
    result
}
