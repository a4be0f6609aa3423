use super::Layer;
use crate::depth::{depth_band_x, depth_scale, Rgba};
use crate::display::PixelBuffer;
use crate::scene::FrameContext;
use rand::Rng;
use std::f32::consts::TAU;

pub const NUM_STARS: usize = 300;
/// Stars near the horizon are scattered over a band this much wider
const STAR_DEPTH_SPREAD: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Current twinkle level in [0.5, 1.0]
    pub brightness: f32,
    twinkle_speed: f32,
    phase: f32,
}

pub struct Stars {
    stars: Vec<Star>,
}

impl Stars {
    pub fn new(ctx: &FrameContext, rng: &mut impl Rng) -> Self {
        let sky_rows = (ctx.water_line as u32).max(1);
        let stars = (0..NUM_STARS)
            .map(|_| {
                let z: f32 = rng.gen();
                Star {
                    x: depth_band_x(rng, z, STAR_DEPTH_SPREAD, ctx.width),
                    y: rng.gen_range(0..sky_rows) as f32,
                    z,
                    brightness: 1.0,
                    twinkle_speed: rng.gen_range(0.5..2.5),
                    phase: rng.gen_range(0.0..TAU),
                }
            })
            .collect();
        Self { stars }
    }

    /// Sky dimming from cloud cover: the tier's base visibility, thinned
    /// further as intensity rises
    pub fn visibility(ctx: &FrameContext) -> f32 {
        ctx.tier.star_visibility() * (1.0 - ctx.intensity as f32 / 200.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter()
    }
}

impl Layer for Stars {
    fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.seconds();
        for star in &mut self.stars {
            let wave = (t * star.twinkle_speed + star.phase).sin();
            star.brightness = 0.5 + (wave + 1.0) / 2.0 * 0.5;
        }
    }

    fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let visibility = Self::visibility(ctx);
        let width = ctx.width as i32;
        for star in &self.stars {
            let px = ctx.project(star.x, star.z) as i32;
            if px < 0 || px >= width {
                continue;
            }
            let level = star.brightness * 255.0 * depth_scale(star.z) * visibility;
            let v = (level.clamp(0.0, 255.0) as u8).saturating_add(ctx.flash);
            let color = Rgba::opaque(v, v, v);
            let py = star.y as i32;

            buffer.point(px, py, color);
            if star.brightness > 0.8 && star.z > 0.7 {
                buffer.point(px - 1, py, color);
                buffer.point(px + 1, py, color);
                buffer.point(px, py - 1, color);
                buffer.point(px, py + 1, color);
            }
        }
    }

    fn name(&self) -> &str {
        "Stars"
    }
}
