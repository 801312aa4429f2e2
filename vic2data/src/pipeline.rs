//! The dependency-ordered load of a whole game install.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::countries::{COUNTRIES_FILE, load_countries, load_country_defines};
use crate::cultures::{CULTURES_FILE, load_cultures};
use crate::db::Database;
use crate::error::LoadError;
use crate::governments::{GOVERNMENTS_FILE, load_government_types};
use crate::history::{COUNTRY_HISTORY_DIR, PROVINCE_HISTORY_DIR, load_country_histories, load_province_histories};
use crate::ideologies::{IDEOLOGIES_FILE, load_ideologies};
use crate::issues::{ISSUES_FILE, load_issues};
use crate::map::{DEFAULT_MAP_FILE, DEFINITION_FILE, REGION_FILE, load_default_map, load_province_definitions, load_states};
use crate::religions::{RELIGIONS_FILE, load_religions};
use crate::shapes::{PROVINCES_BMP, load_province_shapes};
use crate::tradegoods::{GOODS_FILE, load_trade_goods};
use crate::units::{UNITS_DIR, load_units};
use crate::values::{NATIONAL_VALUES_FILE, load_national_values};

keyword_enum! {
    /// One step of the load, named after what it reads.
    pub enum Phase {
        TradeGoods => "trade goods",
        Ideologies => "ideologies",
        Issues => "issues",
        NationalValues => "national values",
        Religions => "religions",
        Governments => "government types",
        Countries => "countries",
        Cultures => "cultures",
        CountryDefines => "country defines",
        ProvinceDefinitions => "province definitions",
        DefaultMap => "default map",
        States => "states",
        ProvinceShapes => "province shapes",
        ProvinceHistories => "province histories",
        CountryHistories => "country histories",
        Units => "units",
    }
}

impl Phase {
    /// Every phase, in an order that satisfies [`Phase::requires`].
    pub const ORDER: &'static [Phase] = Phase::ALL;

    /// Phases that must be loaded first.
    pub fn requires(self) -> &'static [Phase] {
        use Phase::*;
        match self {
            TradeGoods | Ideologies | Issues | NationalValues | Religions | Countries | ProvinceDefinitions => &[],
            Governments => &[Ideologies],
            Cultures => &[Countries],
            CountryDefines => &[Countries, Ideologies, Issues, Governments],
            DefaultMap | States | ProvinceShapes => &[ProvinceDefinitions],
            ProvinceHistories => &[TradeGoods, Countries, ProvinceDefinitions, DefaultMap],
            CountryHistories => &[
                Ideologies,
                Issues,
                NationalValues,
                Religions,
                Governments,
                Countries,
                Cultures,
                CountryDefines,
                ProvinceDefinitions,
            ],
            Units => &[TradeGoods],
        }
    }
}

/// Phases loaded so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStatus {
    loaded: Vec<Phase>,
}

impl LoadStatus {
    pub fn is_loaded(&self, phase: Phase) -> bool {
        self.loaded.contains(&phase)
    }

    pub fn loaded(&self) -> &[Phase] {
        &self.loaded
    }

    fn mark(&mut self, phase: Phase) {
        if !self.is_loaded(phase) {
            self.loaded.push(phase);
        }
    }
}

/// Where to load from, and how much.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Game install or mod root holding `common/`, `map/` and `history/`.
    pub root: PathBuf,
    /// Whether [`Loader::load_all`] and [`Loader::load_through`] read
    /// `units/`. [`Loader::load`] of [`Phase::Units`] always does.
    pub units: bool,
}

impl LoadConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            units: true,
        }
    }
}

/// A database together with the record of how far it has been loaded.
#[derive(Debug)]
pub struct Loader {
    pub config: LoadConfig,
    pub db: Database,
    status: LoadStatus,
}

impl Loader {
    pub fn new(config: LoadConfig) -> Self {
        Self {
            config,
            db: Database::new(),
            status: LoadStatus::default(),
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn into_database(self) -> Database {
        self.db
    }

    /// Runs a single phase, once its prerequisites are loaded.
    pub fn load(&mut self, phase: Phase) -> Result<(), LoadError> {
        if let Some(&missing) = phase.requires().iter().find(|&&p| !self.status.is_loaded(p)) {
            return Err(LoadError::MissingPrerequisite { phase, missing });
        }
        log::info!("Loading {}", phase);
        let root = &self.config.root;
        let db = &mut self.db;
        match phase {
            Phase::TradeGoods => load_trade_goods(db, &root.join(GOODS_FILE)),
            Phase::Ideologies => load_ideologies(db, &root.join(IDEOLOGIES_FILE)),
            Phase::Issues => load_issues(db, &root.join(ISSUES_FILE)),
            Phase::NationalValues => load_national_values(db, &root.join(NATIONAL_VALUES_FILE)),
            Phase::Religions => load_religions(db, &root.join(RELIGIONS_FILE)),
            Phase::Governments => load_government_types(db, &root.join(GOVERNMENTS_FILE)),
            Phase::Countries => load_countries(db, &root.join(COUNTRIES_FILE)),
            Phase::Cultures => load_cultures(db, &root.join(CULTURES_FILE)),
            Phase::CountryDefines => load_country_defines(db, &root.join("common")),
            Phase::ProvinceDefinitions => load_province_definitions(db, &root.join(DEFINITION_FILE)),
            Phase::DefaultMap => load_default_map(db, &root.join(DEFAULT_MAP_FILE)),
            Phase::States => load_states(db, &root.join(REGION_FILE)),
            Phase::ProvinceShapes => load_province_shapes(db, &root.join(PROVINCES_BMP)),
            Phase::ProvinceHistories => load_province_histories(db, &root.join(PROVINCE_HISTORY_DIR)),
            Phase::CountryHistories => load_country_histories(db, &root.join(COUNTRY_HISTORY_DIR)),
            Phase::Units => load_units(db, &root.join(UNITS_DIR)),
        }?;
        self.status.mark(phase);
        Ok(())
    }

    /// Runs every phase up to and including `last`, skipping those already
    /// loaded. Stops at the first failing phase.
    pub fn load_through(&mut self, last: Phase) -> Result<(), LoadError> {
        for &phase in Phase::ORDER {
            if phase == Phase::Units && !self.config.units {
                continue;
            }
            if !self.status.is_loaded(phase) {
                self.load(phase)?;
            }
            if phase == last {
                break;
            }
        }
        Ok(())
    }

    pub fn load_all(&mut self) -> Result<(), LoadError> {
        let last = Phase::ORDER[Phase::ORDER.len() - 1];
        self.load_through(last)
    }

    /// Empties the database and forgets every loaded phase.
    pub fn free_all(&mut self) {
        self.db.free_all();
        self.status = LoadStatus::default();
    }

    pub fn summary(&self) -> Summary {
        Summary::new(&self.db, &self.status)
    }
}

/// Entity counts after a load.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub phases: Vec<Phase>,
    pub trade_goods: usize,
    pub ideologies: usize,
    pub issues: usize,
    pub reforms: usize,
    pub national_values: usize,
    pub religions: usize,
    pub governments: usize,
    pub countries: usize,
    pub cultures: usize,
    pub provinces: usize,
    pub land_provinces: usize,
    pub sea_provinces: usize,
    pub states: usize,
    pub units: usize,
    pub map_size: Option<(u32, u32)>,
}

impl Summary {
    pub fn new(db: &Database, status: &LoadStatus) -> Self {
        Self {
            phases: status.loaded().to_vec(),
            trade_goods: db.trade_goods.len(),
            ideologies: db.ideologies.len(),
            issues: db.issues.len(),
            reforms: db.reforms.len(),
            national_values: db.national_values.len(),
            religions: db.religions.len(),
            governments: db.governments.len(),
            countries: db.countries.len(),
            cultures: db.cultures.len(),
            provinces: db.provinces.len(),
            land_provinces: db.map.land_provinces,
            sea_provinces: db.map.sea_provinces,
            states: db.states.len(),
            units: db.units.len(),
            map_size: db.shapes.as_ref().map(|m| (m.width(), m.height())),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Phases loaded: {}/{}", self.phases.len(), Phase::ORDER.len())?;
        writeln!(f, "Trade goods: {}", self.trade_goods)?;
        writeln!(f, "Ideologies: {}", self.ideologies)?;
        writeln!(f, "Issues: {} ({} reforms)", self.issues, self.reforms)?;
        writeln!(f, "National values: {}", self.national_values)?;
        writeln!(f, "Religions: {}", self.religions)?;
        writeln!(f, "Government types: {}", self.governments)?;
        writeln!(f, "Countries: {}", self.countries)?;
        writeln!(f, "Cultures: {}", self.cultures)?;
        writeln!(
            f,
            "Provinces: {} ({} land, {} sea)",
            self.provinces, self.land_provinces, self.sea_provinces
        )?;
        writeln!(f, "States: {}", self.states)?;
        writeln!(f, "Units: {}", self.units)?;
        if let Some((w, h)) = self.map_size {
            writeln!(f, "Map: {}x{}", w, h)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_satisfies_requirements() {
        for (i, phase) in Phase::ORDER.iter().enumerate() {
            for required in phase.requires() {
                let position = Phase::ORDER.iter().position(|p| p == required).unwrap();
                assert!(position < i, "{} needs {} first", phase, required);
            }
        }
    }

    #[test]
    fn test_missing_prerequisite_is_rejected() {
        let mut loader = Loader::new(LoadConfig::new("/nonexistent"));
        match loader.load(Phase::Governments) {
            Err(LoadError::MissingPrerequisite { phase, missing }) => {
                assert_eq!(phase, Phase::Governments);
                assert_eq!(missing, Phase::Ideologies);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(loader.status().loaded().is_empty());
    }

    #[test]
    fn test_failed_phase_is_not_marked() {
        let mut loader = Loader::new(LoadConfig::new("/nonexistent"));
        assert!(loader.load_all().is_err());
        assert!(!loader.status().is_loaded(Phase::TradeGoods));
    }

    #[test]
    fn test_units_can_be_left_out() {
        let mut config = LoadConfig::new("/nonexistent");
        config.units = false;
        let mut loader = Loader::new(config);
        loader.status.loaded = Phase::ORDER
            .iter()
            .copied()
            .filter(|&p| p != Phase::Units)
            .collect();
        loader.load_all().unwrap();
        assert!(!loader.status().is_loaded(Phase::Units));

        loader.db.trade_goods.freeze();
        loader.config.units = true;
        assert!(matches!(loader.load_all(), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_summary_json() {
        let loader = Loader::new(LoadConfig::new("."));
        let json = loader.summary().to_json().unwrap();
        assert!(json.contains("\"provinces\": 0"));
        assert!(json.contains("\"map_size\": null"));
    }
}
