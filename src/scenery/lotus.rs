//! Lotus pads and flowers floating on the pond
//!
//! Pads carry a pre-rendered leaf texture and double as the rain's
//! collision targets. Flowers are drawn procedurally every frame.

use super::Layer;
use crate::depth::{depth_band_x, depth_color, depth_scale, project_x, Rgba};
use crate::display::PixelBuffer;
use crate::scene::FrameContext;
use crate::texture::Texture;
use rand::Rng;
use std::f32::consts::{PI, TAU};

pub const NUM_PADS: usize = 25;
pub const NUM_FLOWERS: usize = 8;
/// Pond things are scattered over a band this much wider at the horizon
const POND_DEPTH_SPREAD: f32 = 1.5;
/// Drops only land on pads this close in depth
const HIT_DEPTH_TOLERANCE: f32 = 0.2;
/// Leaves are drawn foreshortened: vertical extent relative to horizontal
const LEAF_SQUASH: f32 = 0.7;
const VEIN_COUNT: usize = 8;

const STEM_COLOR: Rgba = Rgba::opaque(0, 100, 50);
const FLOWER_HEART: Rgba = Rgba::opaque(255, 220, 0);

/// Random y inside the pond, keeping a 10-pixel margin at the shore and
/// bottom edge
fn pond_y(ctx: &FrameContext, rng: &mut impl Rng) -> f32 {
    let rows = (ctx.height as f32 - ctx.water_line - 20.0).max(1.0) as u32;
    ctx.water_line + 10.0 + rng.gen_range(0..rows) as f32
}

/// Point on the leaf outline at distance `r` along `angle`: slightly
/// flattened on one side and squashed vertically
fn leaf_point(r: f32, angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    let x = r * cos * (1.0 - 0.2 * sin);
    let y = r * sin * (1.0 + 0.1 * cos) * LEAF_SQUASH;
    (x, y)
}

/// Leaf texture for a pad: dark rim, filled body, eight radial veins.
/// Pure function of radius and palette.
pub fn build_pad_texture(radius: f32, color: Rgba) -> Texture {
    let r = radius as i32;
    let size = (r * 2 + 2).max(2) as u32;
    let mut tex = Texture::new(size, size);
    let centre = (size / 2) as i32;
    let radius = r as f32;

    let rim = color.scaled(0.7).with_alpha(255);
    let body = color.with_alpha(255);
    let vein = color.scaled(0.8).with_alpha(255);

    let stamp = |tex: &mut Texture, dist: f32, c: Rgba| {
        for step in (0..360).step_by(2) {
            let (x, y) = leaf_point(dist, (step as f32).to_radians());
            tex.set_pixel(centre + x as i32, centre + y as i32, c);
        }
    };

    stamp(&mut tex, radius, rim);
    let mut dist = 0.0;
    while dist < radius * 0.95 {
        stamp(&mut tex, dist, body);
        dist += 0.5;
    }

    for j in 0..VEIN_COUNT {
        let angle = j as f32 * TAU / VEIN_COUNT as f32;
        let (sin, cos) = angle.sin_cos();
        let mut dist = 0.0;
        while dist < radius * 0.9 {
            let x = (dist * cos) as i32;
            let y = ((dist * sin) as i32 as f32 * LEAF_SQUASH) as i32;
            tex.set_pixel(centre + x, centre + y, vein);
            dist += 0.5;
        }
    }
    tex
}

/// Fog-tinted leaf colour: distant pads lean toward the depth tint, near
/// ones keep their own green
pub fn pad_palette(color: Rgba, z: f32) -> Rgba {
    let fogged = depth_color(color, z);
    let mix = |far: u8, near: u8| (far as f32 + (near as f32 - far as f32) * z) as u8;
    Rgba::opaque(
        mix(fogged.r, color.r),
        mix(fogged.g, color.g),
        mix(fogged.b, color.b),
    )
}

#[derive(Clone)]
pub struct LotusPad {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    pub wave_phase: f32,
    pub wave_speed: f32,
    pub tilt: f32,
    pub color: Rgba,
    texture: Texture,
}

impl LotusPad {
    /// Level pad with its texture baked for depth `z`
    pub fn flat(x: f32, y: f32, z: f32, radius: f32, color: Rgba) -> Self {
        Self {
            x,
            y,
            z,
            radius,
            wave_phase: 0.0,
            wave_speed: 1.0,
            tilt: 0.0,
            color,
            texture: build_pad_texture(radius, pad_palette(color, z)),
        }
    }

    /// Hit radius shrinks as the leaf tips away from the viewer
    pub fn hit_radius(&self) -> f32 {
        self.radius / (1.0 + self.tilt.abs() * 0.5)
    }
}

pub struct LotusPads {
    pads: Vec<LotusPad>,
}

impl LotusPads {
    pub fn new(ctx: &FrameContext, rng: &mut impl Rng) -> Self {
        let pads = (0..NUM_PADS)
            .map(|_| {
                let z = 0.3 + rng.gen::<f32>() * 0.7;
                let x = depth_band_x(rng, z, POND_DEPTH_SPREAD, ctx.width);
                let y = pond_y(ctx, rng);
                let radius = (15.0 + rng.gen_range(0..20) as f32) * depth_scale(z);
                let color = Rgba::opaque(
                    rng.gen_range(30..50),
                    rng.gen_range(100..150),
                    rng.gen_range(30..50),
                );
                LotusPad {
                    wave_phase: rng.gen_range(0.0..TAU),
                    wave_speed: 0.5 + rng.gen::<f32>(),
                    tilt: rng.gen::<f32>() * 0.3,
                    ..LotusPad::flat(x, y, z, radius, color)
                }
            })
            .collect();
        Self { pads }
    }

    /// No pads at all; rain falls straight into the pond
    pub fn empty() -> Self {
        Self { pads: Vec::new() }
    }

    pub fn from_pads(pads: Vec<LotusPad>) -> Self {
        Self { pads }
    }

    /// Index of the first pad a drop at (x, y, z) lands on. Both drop and
    /// pad are compared in projected screen space.
    pub fn hit(&self, x: f32, y: f32, z: f32, camera_x: f32) -> Option<usize> {
        let drop_x = project_x(x, z, camera_x);
        self.pads.iter().position(|pad| {
            if (z - pad.z).abs() >= HIT_DEPTH_TOLERANCE {
                return false;
            }
            let dx = drop_x - project_x(pad.x, pad.z, camera_x);
            let dy = y - pad.y;
            (dx * dx + dy * dy).sqrt() < pad.hit_radius()
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &LotusPad> {
        self.pads.iter()
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}

impl Layer for LotusPads {
    fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.seconds();
        for pad in &mut self.pads {
            pad.wave_phase += ctx.dt * pad.wave_speed;
            pad.tilt = ctx.wind * 0.2 + (t * pad.wave_speed + pad.wave_phase).sin() * 0.1;
        }
    }

    fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let width = ctx.width as f32;
        let tint = Rgba::opaque(255, 255, 255);
        for pad in &self.pads {
            let px = ctx.project(pad.x, pad.z);
            if px + pad.radius < 0.0 || px - pad.radius >= width {
                continue;
            }
            let scale = depth_scale(pad.z);
            let w = pad.texture.width() as f32 * scale;
            let h = pad.texture.height() as f32 * scale;
            let angle = pad.tilt + ctx.wind * 0.2;
            buffer.blit_texture(&pad.texture, px, pad.y, w, h, angle, tint);
        }
    }

    fn name(&self) -> &str {
        "Lotus pads"
    }
}

#[derive(Debug, Clone)]
pub struct LotusFlower {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub size: f32,
    pub sway_phase: f32,
    pub color: Rgba,
    pub petals: u32,
}

impl LotusFlower {
    /// Sideways drift of the bloom in pixels
    pub fn sway(&self, seconds: f32, wind: f32) -> f32 {
        (seconds + self.sway_phase).sin() * wind * 5.0
    }
}

pub struct LotusFlowers {
    flowers: Vec<LotusFlower>,
}

impl LotusFlowers {
    pub fn new(ctx: &FrameContext, rng: &mut impl Rng) -> Self {
        let flowers = (0..NUM_FLOWERS)
            .map(|_| {
                let z = 0.4 + rng.gen::<f32>() * 0.6;
                let x = depth_band_x(rng, z, POND_DEPTH_SPREAD, ctx.width);
                let y = pond_y(ctx, rng);
                LotusFlower {
                    x,
                    y,
                    z,
                    size: (10.0 + rng.gen_range(0..10) as f32) * depth_scale(z),
                    sway_phase: rng.gen_range(0.0..TAU),
                    color: Rgba::opaque(
                        rng.gen_range(230..255),
                        rng.gen_range(200..225),
                        rng.gen_range(220..245),
                    ),
                    petals: rng.gen_range(5..9),
                }
            })
            .collect();
        Self { flowers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LotusFlower> {
        self.flowers.iter()
    }
}

impl Layer for LotusFlowers {
    fn update(&mut self, ctx: &FrameContext) {
        for flower in &mut self.flowers {
            flower.sway_phase += ctx.dt * 0.5;
        }
    }

    /// Stem, then each petal as a stack of horizontal spans that swell and
    /// narrow along its length, then the golden heart
    fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let t = ctx.seconds();
        let width = ctx.width as i32;
        for f in &self.flowers {
            let px = ctx.project(f.x, f.z) as i32;
            let size = f.size as i32;
            if px + size < 0 || px - size >= width {
                continue;
            }
            let sway = f.sway(t, ctx.wind) as i32;
            let y = f.y as i32;

            buffer.line(px + sway, y + size, px, ctx.water_line as i32, STEM_COLOR);

            let color = f.color.brighten(ctx.flash);
            for p in 0..f.petals {
                let angle = p as f32 * TAU / f.petals as f32 + t * 0.1;
                let (sin, cos) = angle.sin_cos();
                for r in 0..size.max(0) {
                    let rf = r as f32;
                    let half = ((rf / f.size * PI).sin() * f.size * 0.5) as i32;
                    let cx = px + (rf * cos) as i32 + sway;
                    let cy = y + (rf * sin) as i32;
                    buffer.hline(cx - half, cx + half, cy, color);
                }
            }

            buffer.fill_circle(px + sway, y, (f.size * 0.3) as i32, FLOWER_HEART);
        }
    }

    fn name(&self) -> &str {
        "Lotus flowers"
    }
}
