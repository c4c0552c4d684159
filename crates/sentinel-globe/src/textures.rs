//! Procedural textures for the globe shells and weather sprites.
//!
//! Everything here is generated from fixed hashes, independent of zone data,
//! and built once per app into a [`TextureLibrary`] that every scene build
//! shares. A texture that cannot be allocated degrades to a blank pixel.

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::weather::WeatherCondition;

/// Hex overlay texture size (equirectangular, 2:1).
const HEX_SIZE: (u32, u32) = (1024, 512);
/// Cloud shell texture size (equirectangular, 2:1).
const CLOUD_SIZE: (u32, u32) = (1024, 512);
/// Weather glyph sprite size.
const GLYPH_SIZE: u32 = 64;

/// Hex cell size in pixels.
const HEX_CELL: f32 = 14.0;
/// Number of cloud blobs scattered over the cloud texture.
const CLOUD_BLOBS: u32 = 220;

/// Raw RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Allocate a transparent texture, or a blank 1x1 one if the size is
    /// zero or too large to address.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n > 0);
        match len {
            Some(len) => Self {
                width,
                height,
                pixels: vec![0; len as usize],
            },
            None => {
                tracing::warn!("Cannot allocate {width}x{height} texture, using blank");
                Self::blank()
            }
        }
    }

    /// A single transparent pixel.
    pub fn blank() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![0; 4],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// RGBA value at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Blend a color over the pixel with the given coverage (`0..=1`).
    fn blend(&mut self, x: u32, y: u32, rgb: [u8; 3], coverage: f32) {
        if x >= self.width || y >= self.height || coverage <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        let alpha = (coverage.min(1.0) * 255.0) as u8;
        if alpha >= self.pixels[i + 3] {
            self.pixels[i..i + 3].copy_from_slice(&rgb);
            self.pixels[i + 3] = alpha;
        }
    }

    /// Number of pixels with non-zero alpha.
    pub fn opaque_pixel_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] > 0).count()
    }

    /// Convert into a Bevy image.
    pub fn into_image(self) -> Image {
        Image::new(
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.pixels,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::RENDER_WORLD,
        )
    }
}

/// Simple deterministic hash for procedural placement.
fn pseudo_hash(seed: u32) -> u32 {
    let mut h = seed.wrapping_mul(2_654_435_761);
    h ^= h >> 16;
    h = h.wrapping_mul(0x45d9_f3b);
    h ^= h >> 16;
    h
}

/// Hash mapped into `[0, 1)`.
fn unit_hash(seed: u32) -> f32 {
    (pseudo_hash(seed) % 10_000) as f32 / 10_000.0
}

/// Pointy-top hex grid lines in cyan on a transparent background.
pub fn hex_grid(width: u32, height: u32) -> TextureData {
    let mut data = TextureData::new(width, height);
    if data.is_blank() {
        return data;
    }
    let sqrt3 = 3.0_f32.sqrt();
    for y in 0..height {
        for x in 0..width {
            let (px, py) = (x as f32, y as f32);
            // Fractional axial coordinates.
            let q = (sqrt3 / 3.0 * px - py / 3.0) / HEX_CELL;
            let r = (2.0 / 3.0 * py) / HEX_CELL;
            let s = -q - r;
            let (rq, rr, rs) = cube_round(q, r, s);
            let (dq, dr, ds) = (q - rq, r - rr, s - rs);
            // Reaches 1.0 on the cell boundary.
            let edge = (dq - dr).abs().max((dr - ds).abs()).max((ds - dq).abs());
            let coverage = ((edge - 0.86) / 0.14).clamp(0.0, 1.0);
            data.blend(x, y, [0x06, 0xb6, 0xd4], coverage * 0.8);
        }
    }
    data
}

fn cube_round(q: f32, r: f32, s: f32) -> (f32, f32, f32) {
    let (mut rq, mut rr, mut rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    } else {
        rs = -rq - rr;
    }
    (rq, rr, rs)
}

/// Soft white cloud blobs, wrapping horizontally.
pub fn cloud_cover(width: u32, height: u32) -> TextureData {
    let mut data = TextureData::new(width, height);
    if data.is_blank() {
        return data;
    }
    let (w, h) = (width as f32, height as f32);
    for i in 0..CLOUD_BLOBS {
        let cx = unit_hash(i) * w;
        // Keep clouds away from the stretched polar rows.
        let cy = (0.15 + 0.7 * unit_hash(i + CLOUD_BLOBS)) * h;
        let radius = 6.0 + 28.0 * unit_hash(i + CLOUD_BLOBS * 2);
        let density = 0.25 + 0.45 * unit_hash(i + CLOUD_BLOBS * 3);
        let stretch = 1.5 + unit_hash(i + CLOUD_BLOBS * 4);

        let rx = (radius * stretch).ceil() as i32;
        let ry = radius.ceil() as i32;
        for oy in -ry..=ry {
            let y = cy as i32 + oy;
            if y < 0 || y >= height as i32 {
                continue;
            }
            for ox in -rx..=rx {
                let nx = ox as f32 / (radius * stretch);
                let ny = oy as f32 / radius;
                let d2 = nx * nx + ny * ny;
                if d2 >= 1.0 {
                    continue;
                }
                let x = (cx as i32 + ox).rem_euclid(width as i32) as u32;
                let falloff = (1.0 - d2) * (1.0 - d2);
                data.blend(x, y as u32, [0xff, 0xff, 0xff], falloff * density);
            }
        }
    }
    data
}

/// Sprite glyph for a weather condition.
pub fn weather_glyph(condition: WeatherCondition, size: u32) -> TextureData {
    let mut data = TextureData::new(size, size);
    if data.is_blank() {
        return data;
    }
    let s = size as f32;
    let sun = [0xfa, 0xcc, 0x15];
    let cloud = [0xe2, 0xe8, 0xf0];
    let water = [0x38, 0xbd, 0xf8];
    let ice = [0xff, 0xff, 0xff];
    let bolt = [0xfd, 0xe0, 0x47];

    match condition {
        WeatherCondition::Clear => {
            fill_disc(&mut data, s * 0.5, s * 0.5, s * 0.22, sun);
            for k in 0..8 {
                let a = k as f32 * std::f32::consts::FRAC_PI_4;
                let (sin, cos) = a.sin_cos();
                draw_line(
                    &mut data,
                    (s * 0.5 + cos * s * 0.3, s * 0.5 + sin * s * 0.3),
                    (s * 0.5 + cos * s * 0.44, s * 0.5 + sin * s * 0.44),
                    s * 0.035,
                    sun,
                );
            }
        }
        WeatherCondition::PartlyCloudy => {
            fill_disc(&mut data, s * 0.62, s * 0.36, s * 0.18, sun);
            fill_cloud(&mut data, s, s * 0.58, cloud);
        }
        WeatherCondition::Fog => {
            for k in 0..4 {
                let y = s * (0.3 + 0.13 * k as f32);
                draw_line(&mut data, (s * 0.18, y), (s * 0.82, y), s * 0.04, cloud);
            }
        }
        WeatherCondition::Drizzle | WeatherCondition::Rain | WeatherCondition::Showers => {
            fill_cloud(&mut data, s, s * 0.42, cloud);
            let drops = match condition {
                WeatherCondition::Drizzle => 2,
                WeatherCondition::Rain => 3,
                _ => 4,
            };
            for k in 0..drops {
                let x = s * (0.3 + 0.4 * k as f32 / (drops - 1).max(1) as f32);
                draw_line(&mut data, (x, s * 0.66), (x - s * 0.06, s * 0.86), s * 0.03, water);
            }
        }
        WeatherCondition::Snow => {
            fill_cloud(&mut data, s, s * 0.42, cloud);
            for k in 0..3 {
                let x = s * (0.3 + 0.2 * k as f32);
                fill_disc(&mut data, x, s * 0.78, s * 0.05, ice);
            }
        }
        WeatherCondition::Thunderstorm => {
            fill_cloud(&mut data, s, s * 0.4, [0x94, 0xa3, 0xb8]);
            draw_line(&mut data, (s * 0.55, s * 0.55), (s * 0.42, s * 0.74), s * 0.045, bolt);
            draw_line(&mut data, (s * 0.42, s * 0.74), (s * 0.56, s * 0.74), s * 0.045, bolt);
            draw_line(&mut data, (s * 0.56, s * 0.74), (s * 0.44, s * 0.94), s * 0.045, bolt);
        }
        WeatherCondition::Unknown => {
            ring(&mut data, s * 0.5, s * 0.5, s * 0.3, s * 0.05, cloud);
        }
    }
    data
}

fn fill_disc(data: &mut TextureData, cx: f32, cy: f32, radius: f32, rgb: [u8; 3]) {
    for_each_pixel_near(data, cx, cy, radius + 1.0, |data, x, y, d| {
        data.blend(x, y, rgb, (radius + 0.5 - d).clamp(0.0, 1.0));
    });
}

fn ring(data: &mut TextureData, cx: f32, cy: f32, radius: f32, thickness: f32, rgb: [u8; 3]) {
    for_each_pixel_near(data, cx, cy, radius + thickness + 1.0, |data, x, y, d| {
        let coverage = (thickness * 0.5 + 0.5 - (d - radius).abs()).clamp(0.0, 1.0);
        data.blend(x, y, rgb, coverage);
    });
}

/// Three overlapping discs forming a cloud, centered horizontally.
fn fill_cloud(data: &mut TextureData, size: f32, cy: f32, rgb: [u8; 3]) {
    fill_disc(data, size * 0.36, cy + size * 0.04, size * 0.14, rgb);
    fill_disc(data, size * 0.52, cy - size * 0.03, size * 0.18, rgb);
    fill_disc(data, size * 0.68, cy + size * 0.05, size * 0.13, rgb);
}

fn draw_line(data: &mut TextureData, from: (f32, f32), to: (f32, f32), width: f32, rgb: [u8; 3]) {
    let a = Vec2::new(from.0, from.1);
    let b = Vec2::new(to.0, to.1);
    let ab = b - a;
    let len2 = ab.length_squared().max(f32::EPSILON);
    let min = a.min(b) - Vec2::splat(width + 1.0);
    let max = a.max(b) + Vec2::splat(width + 1.0);
    for y in (min.y.max(0.0) as u32)..=(max.y.max(0.0) as u32) {
        for x in (min.x.max(0.0) as u32)..=(max.x.max(0.0) as u32) {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
            let d = p.distance(a + ab * t);
            data.blend(x, y, rgb, (width * 0.5 + 0.5 - d).clamp(0.0, 1.0));
        }
    }
}

fn for_each_pixel_near(
    data: &mut TextureData,
    cx: f32,
    cy: f32,
    reach: f32,
    mut f: impl FnMut(&mut TextureData, u32, u32, f32),
) {
    let x0 = (cx - reach).max(0.0) as u32;
    let y0 = (cy - reach).max(0.0) as u32;
    let x1 = ((cx + reach) as u32).min(data.width.saturating_sub(1));
    let y1 = ((cy + reach) as u32).min(data.height.saturating_sub(1));
    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = Vec2::new(x as f32 + 0.5 - cx, y as f32 + 0.5 - cy).length();
            f(data, x, y, d);
        }
    }
}

/// Procedural textures shared by every scene build.
#[derive(Resource, Clone)]
pub struct TextureLibrary {
    pub hex_grid: Handle<Image>,
    pub clouds: Handle<Image>,
    glyphs: HashMap<WeatherCondition, Handle<Image>>,
}

impl TextureLibrary {
    /// Generate every texture and add it to the image assets.
    pub fn generate(images: &mut Assets<Image>) -> Self {
        let hex_grid = images.add(hex_grid(HEX_SIZE.0, HEX_SIZE.1).into_image());
        let clouds = images.add(cloud_cover(CLOUD_SIZE.0, CLOUD_SIZE.1).into_image());
        let glyphs = WeatherCondition::ALL
            .iter()
            .map(|&c| (c, images.add(weather_glyph(c, GLYPH_SIZE).into_image())))
            .collect();
        tracing::info!("Generated procedural texture library");
        Self {
            hex_grid,
            clouds,
            glyphs,
        }
    }

    /// Glyph sprite for a weather condition.
    pub fn glyph(&self, condition: WeatherCondition) -> Handle<Image> {
        self.glyphs
            .get(&condition)
            .or_else(|| self.glyphs.get(&WeatherCondition::Unknown))
            .cloned()
            .unwrap_or_default()
    }
}
