use super::Layer;
use crate::depth::Rgba;
use crate::display::PixelBuffer;
use crate::scene::FrameContext;
use rand::Rng;

pub const NUM_MOUNTAINS: usize = 5;

#[derive(Debug, Clone)]
pub struct Mountain {
    pub x_offset: f32,
    pub z: f32,
    pub height: f32,
    pub width: f32,
    pub color: Rgba,
}

impl Mountain {
    /// Silhouette half-width at screen row `y`, tapering linearly from the
    /// base (water line) to zero at the peak
    pub fn half_width_at(&self, y: f32, water_line: f32) -> f32 {
        let peak_y = water_line - self.height;
        if y < peak_y || y > water_line || self.height <= 0.0 {
            return 0.0;
        }
        self.width * (y - peak_y) / self.height / 2.0
    }

    /// Screen x of the peak, centred on the viewport
    pub fn peak_x(&self, ctx: &FrameContext) -> f32 {
        ctx.project(self.x_offset, self.z) + ctx.width as f32 / 2.0
    }
}

/// Distant range along the horizon, ordered back to front
pub struct Mountains {
    mountains: Vec<Mountain>,
}

impl Mountains {
    pub fn new(ctx: &FrameContext, rng: &mut impl Rng) -> Self {
        let width = ctx.width as f32;
        let mountains = (0..NUM_MOUNTAINS)
            .map(|i| {
                let z = 0.1 + i as f32 / (NUM_MOUNTAINS - 1) as f32 * 0.5;
                let c = 40.0 + 60.0 * z;
                Mountain {
                    x_offset: -width / 2.0 + rng.gen_range(0..ctx.width.max(1)) as f32,
                    z,
                    height: 100.0 + rng.gen_range(0..100) as f32 * z,
                    width: rng.gen_range(200..500) as f32,
                    color: Rgba::opaque((c - 20.0) as u8, c as u8, (c + 10.0) as u8),
                }
            })
            .collect();
        Self { mountains }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mountain> {
        self.mountains.iter()
    }
}

impl Layer for Mountains {
    fn update(&mut self, _ctx: &FrameContext) {}

    /// Scanline triangles from peak to water line
    fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let water = ctx.water_line;
        for m in &self.mountains {
            let peak_x = m.peak_x(ctx);
            let peak_y = (water - m.height) as i32;
            let color = m.color.brighten(ctx.flash);
            for y in peak_y..=water as i32 {
                let half = m.half_width_at(y as f32, water);
                if half <= 0.0 {
                    continue;
                }
                buffer.hline((peak_x - half) as i32, (peak_x + half) as i32, y, color);
            }
        }
    }

    fn name(&self) -> &str {
        "Mountains"
    }
}
