use vic2txt::Tag;

use crate::countries::Country;
use crate::cultures::{Culture, CultureGroup};
use crate::error::LoadError;
use crate::governments::GovernmentType;
use crate::ideologies::{Ideology, IdeologyGroup};
use crate::issues::{Issue, IssueGroup, Reform, ReformGroup};
use crate::map::{MapInfo, Province, State};
use crate::religions::{Religion, ReligionGroup};
use crate::shapes::ProvinceMap;
use crate::table::{Idx, Table};
use crate::tradegoods::{TradeGood, TradeGoodGroup};
use crate::units::Unit;
use crate::values::NationalValue;

/// Every entity table, owned by one value and filled by the load pipeline.
#[derive(Debug, Clone)]
pub struct Database {
    pub trade_good_groups: Table<TradeGoodGroup>,
    pub trade_goods: Table<TradeGood>,
    pub ideology_groups: Table<IdeologyGroup>,
    pub ideologies: Table<Ideology>,
    pub issue_groups: Table<IssueGroup>,
    pub issues: Table<Issue>,
    pub reform_groups: Table<ReformGroup>,
    pub reforms: Table<Reform>,
    pub national_values: Table<NationalValue>,
    pub religion_groups: Table<ReligionGroup>,
    pub religions: Table<Religion>,
    pub governments: Table<GovernmentType>,
    pub countries: Table<Country>,
    pub culture_groups: Table<CultureGroup>,
    pub cultures: Table<Culture>,
    pub provinces: Table<Province>,
    pub states: Table<State>,
    pub units: Table<Unit>,
    pub map: MapInfo,
    pub shapes: Option<ProvinceMap>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            trade_good_groups: Table::new("trade good group"),
            trade_goods: Table::new("trade good"),
            ideology_groups: Table::new("ideology group"),
            ideologies: Table::new("ideology"),
            issue_groups: Table::new("issue group"),
            issues: Table::new("issue"),
            reform_groups: Table::new("reform group"),
            reforms: Table::new("reform"),
            national_values: Table::new("national value"),
            religion_groups: Table::new("religion group"),
            religions: Table::new("religion"),
            governments: Table::new("government"),
            countries: Table::new("country"),
            culture_groups: Table::new("culture group"),
            cultures: Table::new("culture"),
            provinces: Table::new("province"),
            states: Table::new("state"),
            units: Table::new("unit"),
            map: MapInfo::default(),
            shapes: None,
        }
    }

    pub fn country(&self, tag: Tag) -> Option<Idx<Country>> {
        self.countries.position(|c| c.tag == tag)
    }

    /// Province with 1-based `id`, found by position.
    ///
    /// A province stored at the wrong position is an internal error.
    pub fn province(&self, id: i32) -> Result<Option<Idx<Province>>, LoadError> {
        let Some(idx) = usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|position| self.provinces.idx_at(position))
        else {
            return Ok(None);
        };
        let found = self.provinces[idx].id;
        if i32::from(found) != id {
            return Err(LoadError::Invariant(format!(
                "province {} is stored where province {} belongs",
                found, id
            )));
        }
        Ok(Some(idx))
    }

    /// Province with the 24-bit `color`; higher bits are ignored.
    pub fn province_by_color(&self, color: u32) -> Option<Idx<Province>> {
        let color = color & 0xFFFFFF;
        self.provinces.position(|p| p.color.to_u32() == color)
    }

    /// Empties every table, later-loaded kinds first.
    pub fn free_all(&mut self) {
        self.shapes = None;
        self.map = MapInfo::default();
        self.units.clear();
        self.states.clear();
        self.provinces.clear();
        self.cultures.clear();
        self.culture_groups.clear();
        self.countries.clear();
        self.governments.clear();
        self.religions.clear();
        self.religion_groups.clear();
        self.national_values.clear();
        self.reforms.clear();
        self.reform_groups.clear();
        self.issues.clear();
        self.issue_groups.clear();
        self.ideologies.clear();
        self.ideology_groups.clear();
        self.trade_goods.clear();
        self.trade_good_groups.clear();
    }
}
