use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use tempfile::TempDir;
use vic2data::governments::load_government_types;
use vic2data::shapes::owner_color;
use vic2data::{LoadConfig, LoadError, Loader, MapMode, Phase, TableError};
use vic2txt::{Color, Date, Tag};

const FILES: &[(&str, &str)] = &[
    (
        "common/goods.txt",
        r#"
raw_material_goods = {
    grain = { cost = 2.2 color = { 255 255 0 } }
    iron = { cost = 3.5 color = { 120 120 120 } }
}
military_goods = {
    small_arms = { cost = 37 color = { 153 0 0 } }
}
"#,
    ),
    (
        "common/ideologies.txt",
        r#"
conservative = {
    conservative = { color = { 10 10 250 } date = 1820.1.1 add_political_reform = { } }
}
liberal = {
    liberal = { color = { 250 250 10 } uncivilized = no }
}
"#,
    ),
    (
        "common/issues.txt",
        r#"
party_issues = {
    trade_policy = { protectionism = { } free_trade = { } }
    economic_policy = { laissez_faire = { } interventionism = { } }
}
political_reforms = {
    slavery = { next_step_only = yes yes_slavery = { } no_slavery = { } }
}
"#,
    ),
    ("common/nationalvalues.txt", "nv_order = { stability = 0.1 }\nnv_liberty = { }\n"),
    (
        "common/religion.txt",
        "christian = { protestant = { icon = 1 color = { 0 0 0.8 } } }\n",
    ),
    (
        "common/governments.txt",
        r#"
absolute_monarchy = { conservative = yes liberal = no election = no duration = 48 appoint_ruling_party = yes flagType = monarchy }
democracy = { conservative = yes liberal = yes election = yes duration = 48 }
"#,
    ),
    (
        "common/countries.txt",
        "SWE = \"countries/Sweden.txt\"\nNOR = \"countries/Norway.txt\"\ndynamic_tags = yes\nSCA = \"countries/Scandinavia.txt\"\n",
    ),
    (
        "common/countries/Sweden.txt",
        r#"
color = { 18 55 135 }
graphical_culture = EuropeanGC
party = {
    name = "SWE_conservative"
    start_date = 1820.1.1
    end_date = 2000.1.1
    ideology = conservative
    trade_policy = protectionism
    economic_policy = interventionism
}
party = {
    name = "SWE_liberal"
    start_date = 1820.1.1
    end_date = 2000.1.1
    ideology = liberal
    trade_policy = free_trade
    economic_policy = laissez_faire
}
democracy = { 50 80 160 }
"#,
    ),
    ("common/countries/Norway.txt", "color = { 140 55 50 }\n"),
    ("common/countries/Scandinavia.txt", "color = { 60 60 160 }\n"),
    (
        "common/cultures.txt",
        r#"
scandinavian = {
    leader = european
    unit = EuropeanGC
    union = SCA
    swedish = {
        color = { 10 20 200 }
        primary = SWE
        first_names = { Gustav Karl Oskar }
        last_names = { Bernadotte Vasa }
    }
    norwegian = {
        color = { 200 20 10 }
        first_names = { Haakon }
        last_names = { Olsen }
    }
}
"#,
    ),
    (
        "map/definition.csv",
        "province;red;green;blue;x;x\n1;200;0;0;Stockholm;x\n2;0;200;0;Uppsala;x\n3;0;0;200;Baltic;x\n4;50;50;50;Goteborg;x\n5;16;32;48;Malmo;x\n6;64;80;96;Visby;x\n",
    ),
    (
        "map/default.map",
        "max_provinces = 7\nsea_starts = { 3 }\ndefinitions = \"definition.csv\"\nprovinces = \"provinces.bmp\"\n",
    ),
    ("map/region.txt", "SWE_1 = { 1 2 }\nSWE_2 = { 4 5 6 }\n"),
    (
        "history/provinces/sweden/1 - Stockholm.txt",
        r#"
owner = SWE
controller = SWE
add_core = SWE
add_core = NOR
add_core = SWE
trade_goods = grain
life_rating = 35
railroad = 1
1861.1.1 = { owner = NOR }
1848.1.1 = { controller = NOR }
"#,
    ),
    ("history/provinces/sweden/2 - Uppsala.txt", "owner = SWE\ntrade_goods = iron\n"),
    (
        "history/countries/SWE - Sweden.txt",
        r#"
capital = 1
primary_culture = swedish
culture = norwegian
religion = protestant
government = absolute_monarchy
plurality = 0.0
nationalvalue = nv_order
literacy = 0.80
civilized = yes
prestige = 10
ruling_party = SWE_conservative
upper_house = {
    conservative = 0.7
    liberal = 0.3
}
slavery = no_slavery
last_election = 1834.1.1
set_country_flag = union_debate
oob = "SWE_oob.txt"
1861.1.1 = { government = democracy }
"#,
    ),
    (
        "units/infantry.txt",
        "infantry = { type = land unit_type = infantry build_cost = { small_arms = 5 } attack = 2 defence = 4 }\n",
    ),
];

fn install() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in FILES {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
    }
    // 3x2:
    //   1 1 2
    //   3 5 6
    let mut img = RgbImage::new(3, 2);
    img.put_pixel(0, 0, Rgb([200, 0, 0]));
    img.put_pixel(1, 0, Rgb([200, 0, 0]));
    img.put_pixel(2, 0, Rgb([0, 200, 0]));
    img.put_pixel(0, 1, Rgb([0, 0, 200]));
    img.put_pixel(1, 1, Rgb([16, 32, 48]));
    img.put_pixel(2, 1, Rgb([64, 80, 96]));
    img.save(dir.path().join("map/provinces.bmp")).unwrap();
    dir
}

fn loaded(root: &Path) -> Loader {
    let mut loader = Loader::new(LoadConfig::new(root));
    if let Err(e) = loader.load_all() {
        panic!("load failed: {}", e);
    }
    loader
}

fn tag(text: &str) -> Tag {
    Tag::parse(text).unwrap()
}

#[test]
fn test_full_load() {
    let dir = install();
    let loader = loaded(dir.path());
    assert_eq!(loader.status().loaded(), Phase::ORDER);

    let summary = loader.summary();
    assert_eq!(summary.trade_goods, 3);
    assert_eq!(summary.ideologies, 2);
    assert_eq!(summary.issues, 4);
    assert_eq!(summary.reforms, 2);
    assert_eq!(summary.countries, 3);
    assert_eq!(summary.cultures, 2);
    assert_eq!(summary.provinces, 6);
    assert_eq!(summary.land_provinces, 5);
    assert_eq!(summary.sea_provinces, 1);
    assert_eq!(summary.states, 2);
    assert_eq!(summary.units, 1);
    assert_eq!(summary.map_size, Some((3, 2)));
    assert!(summary.to_json().unwrap().contains("\"countries\": 3"));
}

#[test]
fn test_province_lookup_by_id_and_color() {
    let dir = install();
    let db = loaded(dir.path()).into_database();

    let five = db.province(5).unwrap().unwrap();
    assert_eq!(db.provinces[five].color, Color::from_u32(0x102030));
    let six = db.province_by_color(0x405060).unwrap();
    assert_eq!(db.provinces[six].id, 6);
    assert_eq!(db.province(7).unwrap(), None);
    assert_eq!(db.province_by_color(0x123456), None);
}

#[test]
fn test_trade_good_groups_hold_real_members() {
    let dir = install();
    let db = loaded(dir.path()).into_database();
    let raw = db.trade_good_groups.find("raw_material_goods").unwrap();
    let members = &db.trade_good_groups[raw].members;
    assert_eq!(members.len(), 2);
    for &good in members {
        assert_eq!(db.trade_goods[good].group, Some(raw));
    }
    assert_eq!(db.trade_goods[members[1]].name, "iron");
}

#[test]
fn test_duplicate_core_is_kept_once() {
    let dir = install();
    let mut loader = Loader::new(LoadConfig::new(dir.path()));
    assert!(loader.load_all().is_ok());
    let db = loader.into_database();
    let stockholm = &db.provinces[db.province(1).unwrap().unwrap()];
    let swe = db.country(tag("SWE")).unwrap();
    let nor = db.country(tag("NOR")).unwrap();
    assert_eq!(stockholm.cores, vec![swe, nor]);
}

#[test]
fn test_province_history() {
    let dir = install();
    let db = loaded(dir.path()).into_database();
    let swe = db.country(tag("SWE"));

    let stockholm = &db.provinces[db.province(1).unwrap().unwrap()];
    assert!(stockholm.history_defined);
    assert_eq!(stockholm.owner, swe);
    assert_eq!(stockholm.controller, swe);
    assert_eq!(stockholm.rgo, db.trade_goods.find("grain"));
    assert_eq!(stockholm.life_rating, 35);
    assert_eq!(stockholm.railroad, 1);

    let baltic = &db.provinces[db.province(3).unwrap().unwrap()];
    assert!(baltic.sea_start);
    assert!(!baltic.history_defined);
    assert_eq!(baltic.state, None);

    let visby = &db.provinces[db.province(6).unwrap().unwrap()];
    assert_eq!(visby.state, db.states.find("SWE_2"));
}

#[test]
fn test_country_history_and_defines() {
    let dir = install();
    let db = loaded(dir.path()).into_database();
    let sweden = &db.countries[db.country(tag("SWE")).unwrap()];

    assert!(sweden.history_defined);
    assert_eq!(sweden.color, Color::new(18, 55, 135));
    assert_eq!(sweden.parties.len(), 2);
    assert_eq!(sweden.ruling_party, Some(0));
    assert_eq!(sweden.capital, db.province(1).unwrap());
    assert_eq!(sweden.primary_culture, db.cultures.find("swedish"));
    assert_eq!(sweden.accepted_cultures, vec![db.cultures.find("norwegian").unwrap()]);
    assert_eq!(sweden.religion, db.religions.find("protestant"));
    assert_eq!(sweden.government, db.governments.find("absolute_monarchy"));
    assert_eq!(sweden.national_value, db.national_values.find("nv_order"));
    assert_eq!(sweden.literacy, 0.8);
    assert!(sweden.civilized);
    assert_eq!(sweden.prestige, 10.0);
    assert_eq!(sweden.upper_house, vec![0.7, 0.3]);
    let slavery = db.reform_groups.find("slavery").unwrap();
    assert_eq!(sweden.reforms[slavery.index()], db.reforms.find("no_slavery"));
    assert_eq!(sweden.last_election, Some(Date::new(1834, 1, 1)));
    assert_eq!(sweden.flags, vec!["union_debate"]);
    assert_eq!(sweden.oob.as_deref(), Some("SWE_oob.txt"));

    let scandinavia = &db.countries[db.country(tag("SCA")).unwrap()];
    assert!(scandinavia.dynamic);
    assert!(!scandinavia.history_defined);
    let group = db.culture_groups.find("scandinavian").unwrap();
    assert_eq!(db.culture_groups[group].union, db.country(tag("SCA")));
}

#[test]
fn test_later_history_file_wins() {
    let dir = install();
    let extra = dir.path().join("history/provinces/zz_mod");
    fs::create_dir_all(&extra).unwrap();
    fs::write(extra.join("1 - Stockholm.txt"), "life_rating = 40\n").unwrap();

    let db = loaded(dir.path()).into_database();
    let stockholm = &db.provinces[db.province(1).unwrap().unwrap()];
    assert_eq!(stockholm.life_rating, 40);
    assert_eq!(stockholm.rgo, db.trade_goods.find("grain"));
}

#[test]
fn test_repeated_flags_are_warnings() {
    let dir = install();
    let provinces = dir.path().join("history/provinces");
    fs::write(
        provinces.join("sweden/2 - Uppsala.txt"),
        "owner = SWE\ntrade_goods = iron\nset_province_flag = port\nset_province_flag = port\n",
    )
    .unwrap();
    fs::create_dir_all(provinces.join("zz_mod")).unwrap();
    fs::write(provinces.join("zz_mod/2 - Uppsala.txt"), "set_province_flag = port\n").unwrap();
    let countries = dir.path().join("history/countries");
    fs::create_dir_all(countries.join("zz_mod")).unwrap();
    fs::write(
        countries.join("zz_mod/SWE - Sweden.txt"),
        "set_country_flag = union_debate\nset_country_flag = union_debate\n",
    )
    .unwrap();

    let mut loader = Loader::new(LoadConfig::new(dir.path()));
    assert!(loader.load_all().is_ok());
    let db = loader.into_database();
    let uppsala = &db.provinces[db.province(2).unwrap().unwrap()];
    assert_eq!(uppsala.flags, vec!["port"]);
    let sweden = &db.countries[db.country(tag("SWE")).unwrap()];
    assert_eq!(sweden.flags, vec!["union_debate"]);
}

#[test]
fn test_fact_redefined_in_one_file_keeps_last() {
    let dir = install();
    fs::write(
        dir.path().join("history/provinces/sweden/4 - Goteborg.txt"),
        "owner = SWE\ntrade_goods = grain\nlife_rating = 20\ntrade_goods = iron\nlife_rating = 25\n",
    )
    .unwrap();

    let mut loader = Loader::new(LoadConfig::new(dir.path()));
    assert!(loader.load_all().is_ok());
    let db = loader.into_database();
    let goteborg = &db.provinces[db.province(4).unwrap().unwrap()];
    assert_eq!(goteborg.rgo, db.trade_goods.find("iron"));
    assert_eq!(goteborg.life_rating, 25);
}

#[test]
fn test_units_left_out() {
    let dir = install();
    fs::remove_dir_all(dir.path().join("units")).unwrap();

    let mut config = LoadConfig::new(dir.path());
    config.units = false;
    let mut loader = Loader::new(config);
    assert!(loader.load_all().is_ok());
    assert!(loader.status().is_loaded(Phase::CountryHistories));
    assert!(!loader.status().is_loaded(Phase::Units));
    assert_eq!(loader.summary().units, 0);

    assert!(matches!(loader.load(Phase::Units), Err(LoadError::Io { .. })));
}

#[test]
fn test_bad_history_halts_pipeline() {
    let dir = install();
    fs::write(
        dir.path().join("history/provinces/sweden/2 - Uppsala.txt"),
        "owner = XXX\nharbour = yes\n",
    )
    .unwrap();
    let mut loader = Loader::new(LoadConfig::new(dir.path()));
    match loader.load_all() {
        Err(LoadError::Invalid { errors, .. }) => assert_eq!(errors, 2),
        other => panic!("Unexpected result: {:?}", other),
    }
    assert!(loader.status().is_loaded(Phase::ProvinceShapes));
    assert!(!loader.status().is_loaded(Phase::ProvinceHistories));
    assert!(!loader.status().is_loaded(Phase::CountryHistories));
}

#[test]
fn test_governments_need_ideologies() {
    let dir = install();
    let mut loader = Loader::new(LoadConfig::new(dir.path()));
    assert!(matches!(
        loader.load(Phase::Governments),
        Err(LoadError::MissingPrerequisite {
            missing: Phase::Ideologies,
            ..
        })
    ));

    let mut db = vic2data::Database::new();
    let result = load_government_types(&mut db, &dir.path().join("common/governments.txt"));
    assert!(matches!(
        result,
        Err(LoadError::Table(TableError::NotFrozen("ideology")))
    ));
}

#[test]
fn test_governments_sized_to_ideologies() {
    let dir = install();
    let mut loader = Loader::new(LoadConfig::new(dir.path()));
    loader.load_through(Phase::Governments).unwrap();
    assert!(!loader.status().is_loaded(Phase::Countries));
    for government in &loader.db.governments {
        assert_eq!(government.ideologies.len(), loader.db.ideologies.len());
    }
    let democracy = loader.db.governments.find("democracy").unwrap();
    assert!(loader.db.governments[democracy].ideologies.iter().all(|&allowed| allowed));
}

#[test]
fn test_owner_map_mode() {
    let dir = install();
    let db = loaded(dir.path()).into_database();
    let map = db.shapes.as_ref().unwrap();

    let image = map.render(&db, |p| owner_color(&db, p));
    assert_eq!(image.get_pixel(0, 0), &Rgb([18, 55, 135]));
    assert_eq!(image.get_pixel(0, 1), &Rgb([0, 0, 200]));
    assert_eq!(image.get_pixel(1, 1), &Rgb([0xAA, 0xAA, 0xAA]));

    let states = map.apply(&db, |p| MapMode::State.color(&db, p));
    assert_eq!(states[0], 0xC80000);
    assert_eq!(states[2], 0xC80000);
    assert_eq!(states[4], 0x323232);
}
