use super::Layer;
use crate::depth::Rgba;
use crate::display::PixelBuffer;
use crate::scene::FrameContext;
use crate::texture::Texture;

pub const MAX_CLOUD_LAYERS: usize = 7;
pub const CLOUD_STRIP_HEIGHT: u32 = 200;
/// Scroll speed per visible layer, in pixels per second
const SCROLL_PER_LAYER: f32 = 60.0;
/// Each deeper layer drifts this much faster than the one behind it
const LAYER_SPEEDUP: f32 = 0.15;

/// Silhouette height of layer `layer` at column `x`: a sum of four sines
/// at rising frequency, each octave phase-shifted per layer
pub fn cloud_height(x: u32, layer: usize) -> i32 {
    let x = x as f32;
    let l = layer as f32;
    let noise = 0.5 * (x * 0.01 + l * 2.0).sin()
        + 0.25 * (x * 0.03 + l * 5.0).cos()
        + 0.15 * (x * 0.07 + l * 3.0).sin()
        + 0.10 * (x * 0.13 + l * 7.0).cos();
    (30.0 + noise * 40.0 + l * 10.0) as i32
}

/// Cloud band for one layer, twice the viewport wide so it can tile
pub fn build_cloud_texture(viewport_width: u32, layer: usize) -> Texture {
    let mut tex = Texture::new(viewport_width * 2, CLOUD_STRIP_HEIGHT);
    let shade = 10 * layer as u8;
    let color = Rgba::new(
        80 - shade,
        80 - shade,
        100 - shade,
        100 + 15 * layer as u8,
    );
    for x in 0..tex.width() {
        tex.fill_column_to(x as i32, cloud_height(x, layer), color);
    }
    tex
}

/// Number of layers drawn for the current weather
pub fn visible_layers(ctx: &FrameContext) -> usize {
    let base = ctx.tier.base_cloud_layers() as f32;
    let scaled = base * (0.7 + ctx.intensity as f32 / 100.0 * 0.6);
    (scaled as usize).min(MAX_CLOUD_LAYERS)
}

/// The one or two column ranges of a wrapped strip that fill the
/// viewport: `(src_x, src_w, dest_x)`
pub fn wrap_pieces(offset: u32, viewport_width: u32) -> [Option<(u32, u32, i32)>; 2] {
    let strip = viewport_width * 2;
    let offset = offset % strip;
    let first_w = viewport_width.min(strip - offset);
    let first = Some((offset, first_w, 0));
    let second = (offset > viewport_width)
        .then(|| (0, offset - viewport_width, (strip - offset) as i32));
    [first, second]
}

pub struct Clouds {
    textures: Vec<Texture>,
    offsets: [f32; MAX_CLOUD_LAYERS],
    visible: usize,
    viewport_width: u32,
}

impl Clouds {
    pub fn new(viewport_width: u32) -> Self {
        let textures = (0..MAX_CLOUD_LAYERS)
            .map(|layer| build_cloud_texture(viewport_width, layer))
            .collect();
        Self {
            textures,
            offsets: [0.0; MAX_CLOUD_LAYERS],
            visible: 0,
            viewport_width,
        }
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn offset(&self, layer: usize) -> u32 {
        self.offsets[layer] as u32
    }
}

impl Layer for Clouds {
    fn update(&mut self, ctx: &FrameContext) {
        self.visible = visible_layers(ctx);
        let strip = (self.viewport_width * 2) as f32;
        let speed = self.visible as f32 * SCROLL_PER_LAYER * ctx.dt;
        for (layer, offset) in self.offsets.iter_mut().enumerate().take(self.visible) {
            let step = speed * (1.0 + layer as f32 * LAYER_SPEEDUP);
            *offset = (*offset + step).rem_euclid(strip);
        }
    }

    /// Back layers first so nearer, denser bands cover them
    fn render(&self, buffer: &mut PixelBuffer, _ctx: &FrameContext) {
        for layer in (0..self.visible).rev() {
            let tex = &self.textures[layer];
            for (src_x, src_w, dest_x) in wrap_pieces(self.offset(layer), self.viewport_width)
                .into_iter()
                .flatten()
            {
                buffer.blit_texture_columns(tex, src_x, src_w, dest_x, 0);
            }
        }
    }

    fn name(&self) -> &str {
        "Clouds"
    }
}
