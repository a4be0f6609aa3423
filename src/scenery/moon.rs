use super::Layer;
use crate::depth::Rgba;
use crate::display::PixelBuffer;
use crate::scene::FrameContext;
use crate::texture::Texture;

pub const MOON_SIZE: u32 = 80;
/// The moon sits almost at the horizon, so it barely parallaxes
const MOON_DEPTH: f32 = 0.1;
const BODY_SHADE: u8 = 230;
const CRATER_SHADE: u8 = 200;
const CRATERS: [(f32, f32, f32); 3] = [(25.0, 30.0, 10.0), (50.0, 35.0, 5.0), (35.0, 50.0, 7.0)];

/// Grey disc with three darker craters
pub fn build_moon_texture() -> Texture {
    let mut tex = Texture::new(MOON_SIZE, MOON_SIZE);
    let half = MOON_SIZE as f32 / 2.0;
    tex.fill_disc(half, half, half, Rgba::opaque(BODY_SHADE, BODY_SHADE, BODY_SHADE));
    let crater = Rgba::opaque(CRATER_SHADE, CRATER_SHADE, CRATER_SHADE);
    for (cx, cy, r) in CRATERS {
        tex.fill_disc(cx, cy, r, crater);
    }
    tex
}

pub struct Moon {
    texture: Texture,
}

impl Moon {
    pub fn new() -> Self {
        Self {
            texture: build_moon_texture(),
        }
    }

    pub fn visibility(ctx: &FrameContext) -> f32 {
        ctx.tier.moon_visibility() * (1.0 - ctx.intensity as f32 / 200.0)
    }

    /// Colour modulation: slightly warm white, dimmed by cloud cover
    pub fn tint(ctx: &FrameContext) -> Rgba {
        let b = BODY_SHADE as f32 * Self::visibility(ctx);
        let r = (b as u8).saturating_add(ctx.flash);
        let blue = ((b * 0.9) as u8).saturating_add(ctx.flash);
        Rgba::opaque(r, r, blue)
    }

    /// Screen centre of the moon
    pub fn position(ctx: &FrameContext) -> (f32, f32) {
        let x = ctx.project(ctx.width as f32 * 0.75, MOON_DEPTH);
        (x, ctx.water_line / 4.0)
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}

impl Default for Moon {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Moon {
    fn update(&mut self, _ctx: &FrameContext) {}

    fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let (x, y) = Self::position(ctx);
        let size = MOON_SIZE as f32;
        buffer.blit_texture(&self.texture, x, y, size, size, 0.0, Self::tint(ctx));
    }

    fn name(&self) -> &str {
        "Moon"
    }
}
