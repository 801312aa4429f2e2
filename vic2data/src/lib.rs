//! Victoria 2 game data, loaded into typed, cross-referenced tables.
//!
//! A [`pipeline::Loader`] reads an install phase by phase: common rules first,
//! then the map, then history. Entities refer to each other through
//! [`table::Idx`] handles into the tables of one [`Database`].

#[macro_use]
mod keyword;
#[macro_use]
pub mod table;
#[macro_use]
pub mod group;

pub mod countries;
pub mod cultures;
pub mod db;
pub mod error;
pub mod fields;
pub mod folder;
pub mod governments;
pub mod history;
pub mod ideologies;
pub mod issues;
pub mod map;
pub mod path;
pub mod pipeline;
pub mod religions;
pub mod shapes;
pub mod tradegoods;
pub mod units;
pub mod values;

pub use db::Database;
pub use error::{Diagnostics, FieldError, LoadError, TableError};
pub use pipeline::{LoadConfig, LoadStatus, Loader, Phase, Summary};
pub use shapes::{MapMode, ProvinceMap};
pub use table::{Idx, Table};
