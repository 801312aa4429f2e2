use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use vic2data::tradegoods::{trade_goods_text, write_trade_goods};
use vic2data::{LoadConfig, Loader, MapMode, Phase};

pub fn load(root: &Path, json: bool, units: bool) -> Result<()> {
    let mut config = LoadConfig::new(root);
    config.units = units;
    let mut loader = Loader::new(config);
    let result = loader.load_all();

    let summary = loader.summary();
    if json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{}", summary);
    }
    result.with_context(|| format!("Failed to load {}", root.display()))
}

pub fn check(path: &Path) -> Result<()> {
    let problems = if path.is_dir() {
        vic2data::folder::lint_folder(path)
            .with_context(|| format!("Failed to check {}", path.display()))?
    } else {
        vic2txt::check::check_file(path)
            .with_context(|| format!("Failed to check {}", path.display()))?
            .len()
    };

    if problems > 0 {
        bail!("{} problem(s) in {}", problems, path.display());
    }
    println!("{}: ok", path.display());
    Ok(())
}

pub fn dump(file: &Path, json: bool) -> Result<()> {
    let parsed =
        vic2txt::parse_file(file).with_context(|| format!("Failed to read {}", file.display()))?;
    for error in &parsed.errors {
        log::warn!("{}", error);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed.root)?);
    } else {
        for child in &parsed.root.children {
            print!("{}", child);
        }
    }
    Ok(())
}

pub fn goods(root: &Path, output: Option<&Path>) -> Result<()> {
    let mut loader = Loader::new(LoadConfig::new(root));
    loader
        .load(Phase::TradeGoods)
        .with_context(|| format!("Failed to load trade goods from {}", root.display()))?;

    match output {
        Some(output) => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            write_trade_goods(&loader.db, output)?;
            println!(
                "Wrote {} trade goods to {}",
                loader.db.trade_goods.len(),
                output.display()
            );
        }
        None => print!("{}", trade_goods_text(&loader.db)),
    }
    Ok(())
}

pub fn render(root: &Path, mode: MapMode, output: &Path) -> Result<()> {
    let mut loader = Loader::new(LoadConfig::new(root));
    // Owners and RGOs come from province history.
    let last = match mode {
        MapMode::State => Phase::ProvinceShapes,
        MapMode::Owner | MapMode::Rgo => Phase::ProvinceHistories,
    };
    loader
        .load_through(last)
        .with_context(|| format!("Failed to load {}", root.display()))?;

    let db = &loader.db;
    let Some(map) = &db.shapes else {
        bail!("No province map was loaded");
    };
    let image = map.render(db, |province| mode.color(db, province));
    image
        .save(output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    println!(
        "Rendered {} map ({}x{}) to {}",
        mode,
        map.width(),
        map.height(),
        output.display()
    );
    Ok(())
}
