use std::fs;
use std::path::Path;

use serde::Serialize;
use vic2txt::{Color, Lexeme, Token};

use crate::db::Database;
use crate::error::LoadError;
use crate::fields::{Field, Handler, unknown_field};
use crate::group::{GroupedFile, load_grouped};
use crate::table::Idx;

pub const GOODS_FILE: &str = "common/goods.txt";

#[derive(Debug, Clone, Serialize)]
pub struct TradeGoodGroup {
    pub name: String,
    pub members: Vec<Idx<TradeGood>>,
}

/// A good produced by provinces and traded on the world market.
#[derive(Debug, Clone, Serialize)]
pub struct TradeGood {
    pub name: String,
    pub group: Option<Idx<TradeGoodGroup>>,
    pub cost: f64,
    pub color: Color,
    pub available_from_start: bool,
    pub overseas_penalty: bool,
    pub money: bool,
    pub tradeable: bool,
}

impl TradeGood {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            group: None,
            cost: 1.0,
            color: Color::from_u32(0xFF0000),
            available_from_start: true,
            overseas_penalty: false,
            money: false,
            tradeable: true,
        }
    }
}

named!(TradeGoodGroup, TradeGood);
grouped!(TradeGoodGroup => TradeGood);

static TRADE_GOOD_FIELDS: &[Field<TradeGood>] = &[
    Field::new(
        "cost",
        Handler::Number(|g, _, v| {
            g.cost = v;
            Ok(())
        }),
    ),
    Field::new(
        "color",
        Handler::Color(|g, _, v| {
            g.color = v;
            Ok(())
        }),
    ),
    Field::new(
        "available_from_start",
        Handler::Bool(|g, _, v| {
            g.available_from_start = v;
            Ok(())
        }),
    ),
    Field::new(
        "tradeable",
        Handler::Bool(|g, _, v| {
            g.tradeable = v;
            Ok(())
        }),
    ),
    Field::new(
        "money",
        Handler::Bool(|g, _, v| {
            g.money = v;
            Ok(())
        }),
    ),
    Field::new(
        "overseas_penalty",
        Handler::Bool(|g, _, v| {
            g.overseas_penalty = v;
            Ok(())
        }),
    ),
];

static TRADE_GOODS: GroupedFile<TradeGoodGroup, TradeGood> = GroupedFile {
    tables: |db| (&mut db.trade_good_groups, &mut db.trade_goods),
    new_group: |name| TradeGoodGroup {
        name: name.to_owned(),
        members: Vec::new(),
    },
    new_member: TradeGood::new,
    fields: TRADE_GOOD_FIELDS,
    fallback: unknown_field,
};

/// Loads `common/goods.txt`.
pub fn load_trade_goods(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    load_grouped(db, path, &TRADE_GOODS)
}

fn flag(key: &str, value: bool) -> Lexeme {
    let word = if value { "yes" } else { "no" };
    Lexeme::scalar(key, Token::Alphanumeric(word.to_owned()))
}

/// Builds the lexeme tree of every trade good group.
///
/// Cost and color are always written; the flags only when they differ from
/// their defaults.
pub fn trade_goods_lexeme(db: &Database) -> Lexeme {
    let mut root = Lexeme::root();
    for group in &db.trade_good_groups {
        let mut group_l = Lexeme::block(&group.name, Vec::new());
        for &idx in &group.members {
            let good = &db.trade_goods[idx];
            let mut good_l = Lexeme::block(&good.name, Vec::new());
            good_l.push(Lexeme::scalar("cost", Token::Decimal(good.cost)));
            good_l.push(Lexeme::color("color", good.color));
            if !good.available_from_start {
                good_l.push(flag("available_from_start", false));
            }
            if !good.tradeable {
                good_l.push(flag("tradeable", false));
            }
            if good.money {
                good_l.push(flag("money", true));
            }
            if good.overseas_penalty {
                good_l.push(flag("overseas_penalty", true));
            }
            group_l.push(good_l);
        }
        root.push(group_l);
    }
    root
}

/// Renders the trade goods as `goods.txt` text.
pub fn trade_goods_text(db: &Database) -> String {
    trade_goods_lexeme(db)
        .children
        .iter()
        .map(ToString::to_string)
        .collect()
}

pub fn write_trade_goods(db: &Database, path: &Path) -> Result<(), LoadError> {
    fs::write(path, trade_goods_text(db)).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
