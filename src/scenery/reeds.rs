use super::Layer;
use crate::depth::Rgba;
use crate::display::PixelBuffer;
use crate::scene::FrameContext;
use rand::Rng;
use std::f32::consts::TAU;

pub const NUM_REEDS: usize = 20;
const STEM_SHARE: f32 = 0.7;
const LEAF_SHARE: f32 = 0.5;
/// Angle between each leaf and the stem, radians
const LEAF_SPREAD: f32 = 0.3;
/// Reeds this far off either edge are still drawn so leaves can lean in
const CULL_MARGIN: i32 = 10;

#[derive(Debug, Clone)]
pub struct Reed {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub height: f32,
    sway_offset: f32,
    sway_speed: f32,
    /// Current lean in radians, refreshed every update
    pub sway: f32,
}

impl Reed {
    /// Stem tip and both leaf tips, relative to a projected base `(x, y)`
    pub fn polyline(&self, x: i32, y: i32) -> [(i32, i32); 3] {
        let stem = (self.height * STEM_SHARE) as i32;
        let leaf = (self.height * LEAF_SHARE) as i32 as f32;
        let tip_x = x + (stem as f32 * self.sway.sin()) as i32;
        let tip_y = y - stem;
        let leaf_tip = |angle: f32| {
            (
                tip_x + (leaf * angle.sin()) as i32,
                tip_y - (leaf * angle.cos()) as i32,
            )
        };
        [
            (tip_x, tip_y),
            leaf_tip(self.sway - LEAF_SPREAD),
            leaf_tip(self.sway + LEAF_SPREAD),
        ]
    }
}

/// Shoreline reeds swaying in the wind
pub struct Reeds {
    reeds: Vec<Reed>,
}

impl Reeds {
    pub fn new(ctx: &FrameContext, rng: &mut impl Rng) -> Self {
        let reeds = (0..NUM_REEDS)
            .map(|_| {
                let z = 0.5 + rng.gen::<f32>() * 0.5;
                Reed {
                    x: rng.gen_range(0..ctx.width.max(1)) as f32,
                    y: ctx.water_line - 5.0 + rng.gen_range(0..10) as f32,
                    z,
                    height: (30.0 + rng.gen_range(0..30) as f32 * z).floor(),
                    sway_offset: rng.gen_range(0.0..TAU),
                    sway_speed: rng.gen_range(0.5..2.0),
                    sway: 0.0,
                }
            })
            .collect();
        Self { reeds }
    }

    /// Peak lean for the current wind
    pub fn sway_amplitude(wind: f32) -> f32 {
        0.1 + wind.abs() * 0.5
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reed> {
        self.reeds.iter()
    }
}

impl Layer for Reeds {
    fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.seconds();
        let amplitude = Self::sway_amplitude(ctx.wind);
        for reed in &mut self.reeds {
            reed.sway = (t * reed.sway_speed + reed.sway_offset).sin() * amplitude;
        }
    }

    fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let width = ctx.width as i32;
        for reed in &self.reeds {
            let px = ctx.project(reed.x, reed.z) as i32;
            if px < -CULL_MARGIN || px >= width + CULL_MARGIN {
                continue;
            }
            let green = (100.0 + reed.z * 50.0) as u8;
            let color = Rgba::opaque(30, green, 10).brighten(ctx.flash);
            let base_y = reed.y as i32;
            let [tip, left, right] = reed.polyline(px, base_y);
            buffer.line(px, base_y, tip.0, tip.1, color);
            buffer.line(tip.0, tip.1, left.0, left.1, color);
            buffer.line(tip.0, tip.1, right.0, right.1, color);
        }
    }

    fn name(&self) -> &str {
        "Reeds"
    }
}
