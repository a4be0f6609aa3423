//! Pre-rendered sprites
//!
//! Scenery that never changes shape (moon, cloud bands, lotus pads) is drawn
//! once into a `Texture` at startup and blitted every frame.

use crate::depth::Rgba;

/// RGBA sprite, 4 bytes per pixel in r, g, b, a order
#[derive(Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    /// Fully transparent texture
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Overwrite one texel. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        self.pixels[idx] = color.r;
        self.pixels[idx + 1] = color.g;
        self.pixels[idx + 2] = color.b;
        self.pixels[idx + 3] = color.a;
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::default();
        }
        let idx = self.index(x, y);
        Rgba::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Solid disc, texel centres inside `radius` of (cx, cy)
    pub fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        let r2 = radius * radius;
        let x0 = (cx - radius).floor().max(0.0) as i32;
        let y0 = (cy - radius).floor().max(0.0) as i32;
        let x1 = (cx + radius).ceil() as i32;
        let y1 = (cy + radius).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Vertical run from the top edge down to (not including) `y_end`
    pub fn fill_column_to(&mut self, x: i32, y_end: i32, color: Rgba) {
        for y in 0..y_end.min(self.height as i32) {
            self.set_pixel(x, y, color);
        }
    }

    /// Count of texels with non-zero alpha
    pub fn coverage(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }
}
