//! The province shape raster and map modes drawn over it.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::db::Database;
use crate::error::LoadError;
use crate::map::Province;

pub const PROVINCES_BMP: &str = "map/provinces.bmp";

/// Color of pixels that belong to no province.
pub const NO_PROVINCE: u32 = 0xFF0000;

keyword_enum! {
    /// Built-in province colorings.
    pub enum MapMode {
        Owner => "owner",
        Rgo => "rgo",
        State => "state",
    }
}

impl MapMode {
    pub fn color(self, db: &Database, province: &Province) -> u32 {
        match self {
            MapMode::Owner => owner_color(db, province),
            MapMode::Rgo => rgo_color(db, province),
            MapMode::State => state_color(db, province),
        }
    }
}

/// Owner's color; unowned land is grey.
pub fn owner_color(db: &Database, province: &Province) -> u32 {
    match province.owner {
        Some(owner) => db.countries[owner].color.to_u32(),
        None if province.is_land() => 0xAAAAAA,
        None => province.color.to_u32(),
    }
}

/// Color of the province's trade good; land without one is red.
pub fn rgo_color(db: &Database, province: &Province) -> u32 {
    match province.rgo {
        Some(good) => db.trade_goods[good].color.to_u32(),
        None if province.is_land() => 0xFF0000,
        None => province.color.to_u32(),
    }
}

/// Color of the first province of the state, so a state reads as one area.
pub fn state_color(db: &Database, province: &Province) -> u32 {
    let first = province
        .state
        .and_then(|state| db.states[state].provinces.first().copied());
    match first {
        Some(first) => db.provinces[first].color.to_u32(),
        None if province.is_land() => 0xFF00FF,
        None => province.color.to_u32(),
    }
}

/// Province id of every pixel of `provinces.bmp`, row-major from the top.
/// Id 0 marks a pixel whose color matches no province.
#[derive(Debug, Clone)]
pub struct ProvinceMap {
    width: u32,
    height: u32,
    ids: Vec<u16>,
}

impl ProvinceMap {
    pub fn from_image(db: &Database, image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let w = width as usize;
        let pixels: Vec<u32> = image
            .pixels()
            .map(|&Rgb([r, g, b])| (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
            .collect();
        let mut ids = vec![0u16; pixels.len()];
        let mut unmatched = 0usize;

        for i in 0..pixels.len() {
            let color = pixels[i];
            ids[i] = if i >= w && pixels[i - w] == color {
                ids[i - w]
            } else if i % w != 0 && pixels[i - 1] == color {
                ids[i - 1]
            } else {
                match db.province_by_color(color) {
                    Some(idx) => db.provinces[idx].id,
                    None => {
                        unmatched += 1;
                        0
                    }
                }
            };
        }
        if unmatched > 0 {
            log::warn!("{} province shape runs match no province color", unmatched);
        }
        Self { width, height, ids }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ids(&self) -> &[u16] {
        &self.ids
    }

    pub fn id_at(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let id = self.ids[(y * self.width + x) as usize];
        (id != 0).then_some(id)
    }

    /// Colors every pixel with `mode`, evaluated once per run of equal ids.
    pub fn apply(&self, db: &Database, mode: impl Fn(&Province) -> u32) -> Vec<u32> {
        let w = self.width as usize;
        let mut out = vec![NO_PROVINCE; self.ids.len()];
        for (i, &id) in self.ids.iter().enumerate() {
            out[i] = if i >= w && self.ids[i - w] == id {
                out[i - w]
            } else if i % w != 0 && self.ids[i - 1] == id {
                out[i - 1]
            } else {
                let province = usize::from(id)
                    .checked_sub(1)
                    .and_then(|position| db.provinces.idx_at(position));
                match province {
                    Some(idx) => mode(&db.provinces[idx]),
                    None => NO_PROVINCE,
                }
            };
        }
        out
    }

    pub fn render(&self, db: &Database, mode: impl Fn(&Province) -> u32) -> RgbImage {
        let colors = self.apply(db, mode);
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = colors[(y * self.width + x) as usize];
            Rgb([(c >> 16) as u8, (c >> 8) as u8, c as u8])
        })
    }
}

/// Decodes `map/provinces.bmp` and caches its id raster on the database.
pub fn load_province_shapes(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    db.provinces.ensure_frozen()?;
    let image = image::open(path)?.to_rgb8();
    let map = ProvinceMap::from_image(db, &image);
    log::info!("Province map is {}x{}", map.width(), map.height());
    db.shapes = Some(map);
    Ok(())
}
