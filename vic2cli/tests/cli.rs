//! CLI integration tests against the built `vic2` binary.

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const GOODS: &str = "military_goods = {\n\tammunition = { cost = 17.5 color = { 208 202 127 } }\n\tsmall_arms = { cost = 37 tradeable = no }\n}\n";

fn vic2() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vic2"))
}

#[test]
fn test_cli_help() {
    vic2().arg("--help").assert().success().stdout(contains("render"));
}

#[test]
fn test_cli_version() {
    vic2().arg("--version").assert().success();
}

#[test]
fn test_dump_text() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("test.txt");
    fs::write(&file, "test = foo\nlist = { 1 2 3 }\n").unwrap();

    vic2()
        .arg("dump")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("test = foo"))
        .stdout(contains("list = { 1 2 3 }"));
}

#[test]
fn test_dump_json() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("test.txt");
    fs::write(&file, "start = 1836.1.1\n").unwrap();

    vic2()
        .args(["dump", "--json"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("\"children\""))
        .stdout(contains("\"year\": 1836"));
}

#[test]
fn test_dump_missing_file_fails() {
    let dir = tempdir().unwrap();
    vic2()
        .arg("dump")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(contains("Failed to read"));
}

#[test]
fn test_check_file() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.txt");
    let bad = dir.path().join("bad.txt");
    fs::write(&good, "a = { b = c }\n").unwrap();
    fs::write(&bad, "a = { b = c }\n}\n").unwrap();

    vic2().arg("check").arg(&good).assert().success().stdout(contains("ok"));
    vic2()
        .arg("check")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(contains("1 problem(s)"));
}

#[test]
fn test_check_folder() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("history")).unwrap();
    fs::write(dir.path().join("history/a.txt"), "owner = ENG\n").unwrap();
    fs::write(dir.path().join("provinces.bmp"), "{{{{").unwrap();

    vic2().arg("check").arg(dir.path()).assert().success();

    fs::write(dir.path().join("history/b.txt"), "core = {\n").unwrap();
    vic2().arg("check").arg(dir.path()).assert().failure();
}

#[test]
fn test_goods_round_trip() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("common")).unwrap();
    fs::write(dir.path().join("common/goods.txt"), GOODS).unwrap();

    vic2()
        .arg("goods")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("ammunition = {"))
        .stdout(contains("tradeable = no"));

    let output = dir.path().join("out/goods.txt");
    vic2()
        .arg("goods")
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("Wrote 2 trade goods"));
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("small_arms = {"));
}

#[test]
fn test_load_missing_root_fails() {
    let dir = tempdir().unwrap();
    vic2()
        .arg("load")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(contains("Phases loaded: 0/"))
        .stderr(contains("Failed to load"));
}

// Smallest install every phase but units accepts: one province, no countries.
fn bare_install(root: &Path) {
    for name in [
        "common/ideologies.txt",
        "common/issues.txt",
        "common/nationalvalues.txt",
        "common/religion.txt",
        "common/governments.txt",
        "common/countries.txt",
        "common/cultures.txt",
        "map/default.map",
        "map/region.txt",
    ] {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    fs::write(root.join("common/goods.txt"), GOODS).unwrap();
    fs::write(root.join("map/definition.csv"), "1;200;0;0;Home;x\n").unwrap();
    RgbImage::from_pixel(2, 2, Rgb([200, 0, 0]))
        .save(root.join("map/provinces.bmp"))
        .unwrap();
    fs::create_dir_all(root.join("history/provinces")).unwrap();
    fs::create_dir_all(root.join("history/countries")).unwrap();
}

#[test]
fn test_load_without_units() {
    let dir = tempdir().unwrap();
    bare_install(dir.path());

    vic2()
        .arg("load")
        .arg(dir.path())
        .arg("--no-units")
        .assert()
        .success()
        .stdout(contains("Phases loaded: 15/16"))
        .stdout(contains("Units: 0"));

    vic2()
        .arg("load")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(contains("Phases loaded: 15/16"))
        .stderr(contains("Failed to load"));
}

#[test]
fn test_render_rejects_unknown_mode() {
    vic2()
        .args(["render", ".", "--mode", "terrain"])
        .assert()
        .failure()
        .stderr(contains("unknown map mode"));
}
