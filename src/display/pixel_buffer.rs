use crate::depth::Rgba;
use crate::texture::Texture;

// ============================================================================
// Utility Functions
// ============================================================================

/// Mix one channel of `src` over `dst` at `alpha`/255, rounded
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Multiply two 0..=255 quantities, result in 0..=255
#[inline]
fn modulate(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16 + 127) / 255) as u8
}

/// Store an opaque colour as A, B, G, R bytes
#[inline]
fn write_pixel(dest: &mut [u8], c: Rgba) {
    dest[0] = 255; // A
    dest[1] = c.b; // B
    dest[2] = c.g; // G
    dest[3] = c.r; // R
}

/// Source-over blend of `c` using its own alpha. Opaque colours take the
/// plain write path, fully transparent ones are skipped.
#[inline]
fn plot(dest: &mut [u8], c: Rgba) {
    match c.a {
        0 => {},
        255 => write_pixel(dest, c),
        a => {
            let alpha = a as u16;
            dest[0] = 255;
            dest[1] = blend_channel(c.b, dest[1], alpha);
            dest[2] = blend_channel(c.g, dest[2], alpha);
            dest[3] = blend_channel(c.r, dest[3], alpha);
        },
    }
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// CPU frame the whole scene is drawn into before upload
/// The whole scene is composited here, then uploaded once per frame.
///
/// Every drawing call honours the colour's alpha: 255 overwrites, anything
/// lower blends. Coordinates outside the buffer are clipped silently.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
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

    /// True when (x, y) is inside the frame
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Byte index of the first channel of (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid opaque color
    pub fn clear(&mut self, c: Rgba) {
        let pattern = [255, c.b, c.g, c.r];
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&pattern);
        }
    }

    /// Read a pixel back (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some(Rgba::new(
                self.pixels[idx + 3],
                self.pixels[idx + 2],
                self.pixels[idx + 1],
                self.pixels[idx],
            ))
        } else {
            None
        }
    }

    /// Draw a single point
    #[inline]
    pub fn point(&mut self, x: i32, y: i32, c: Rgba) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            plot(&mut self.pixels[idx..idx + 4], c);
        }
    }

    /// Draw a horizontal span, inclusive of both ends
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, c: Rgba) {
        if y < 0 || y >= self.height as i32 || c.a == 0 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        // Step four bytes per pixel from the span start
        let mut idx = self.pixel_index(start as u32, y as u32);
        for _ in start..=end {
            plot(&mut self.pixels[idx..idx + 4], c);
            idx += 4;
        }
    }

    /// Bresenham line, clipped to the frame first
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, c: Rgba) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1i32 } else { -1i32 };
        let sy = if cy0 < cy1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            let idx = self.pixel_index(x as u32, y as u32);
            plot(&mut self.pixels[idx..idx + 4], c);
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Trim a segment to the frame; `None` when it misses entirely
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 iterations for valid input
        const MAX_ITERATIONS: u32 = 16;

        let w = self.width as i32;
        let h = self.height as i32;

        let outcode = |x: i32, y: i32| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((x0, y0, x1, y1));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            // i64 so that far off-screen endpoints cannot overflow the products
            let (fx0, fy0) = (i64::from(x0), i64::from(y0));
            let dx = i64::from(x1) - fx0;
            let dy = i64::from(y1) - fy0;
            let (w64, h64) = (i64::from(w), i64::from(h));

            let (x, y) = if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return None;
                }
                (fx0 + dx * (h64 - 1 - fy0) / dy, h64 - 1)
            } else if (code_out & TOP) != 0 {
                if dy == 0 {
                    return None;
                }
                (fx0 + dx * (0 - fy0) / dy, 0)
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return None;
                }
                (w64 - 1, fy0 + dy * (w64 - 1 - fx0) / dx)
            } else {
                if dx == 0 {
                    return None;
                }
                (0, fy0 + dy * (0 - fx0) / dx)
            };
            let x = x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            let y = y.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, c: Rgba) {
        if w == 0 {
            return;
        }
        for row in 0..h as i32 {
            self.hline(x, x + w as i32 - 1, y + row, c);
        }
    }

    /// Blend `c` over every pixel (the lightning flash)
    pub fn overlay(&mut self, c: Rgba) {
        if c.a == 0 {
            return;
        }
        for chunk in self.pixels.chunks_exact_mut(4) {
            plot(chunk, c);
        }
    }

    /// Filled disc, one span per row so translucent discs blend evenly
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, c: Rgba) {
        if radius <= 0 {
            if radius == 0 {
                self.point(cx, cy, c);
            }
            return;
        }
        let r2 = (radius * radius) as f32;
        for dy in -radius..=radius {
            let half = (r2 - (dy * dy) as f32).sqrt() as i32;
            self.hline(cx - half, cx + half, cy + dy, c);
        }
    }

    /// Draw `tex` into the destination rectangle centred on (cx, cy),
    /// rotated by `angle` radians around that centre. Texels are
    /// nearest-neighbour sampled, multiplied by `tint` (alpha included) and
    /// blended with their own alpha.
    pub fn blit_texture(
        &mut self,
        tex: &Texture,
        cx: f32,
        cy: f32,
        dest_w: f32,
        dest_h: f32,
        angle: f32,
        tint: Rgba,
    ) {
        if dest_w < 1.0 || dest_h < 1.0 || tint.a == 0 {
            return;
        }
        let (sin, cos) = angle.sin_cos();
        let half_w = dest_w / 2.0;
        let half_h = dest_h / 2.0;

        // Bounding box of the rotated rectangle
        let ext_x = half_w * cos.abs() + half_h * sin.abs();
        let ext_y = half_w * sin.abs() + half_h * cos.abs();
        let x_start = ((cx - ext_x).floor() as i32).max(0);
        let x_end = ((cx + ext_x).ceil() as i32).min(self.width as i32 - 1);
        let y_start = ((cy - ext_y).floor() as i32).max(0);
        let y_end = ((cy + ext_y).ceil() as i32).min(self.height as i32 - 1);

        let tex_w = tex.width() as f32;
        let tex_h = tex.height() as f32;

        for py in y_start..=y_end {
            for px in x_start..=x_end {
                // Inverse-rotate the pixel centre into quad space
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let lx = dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                if lx < -half_w || lx >= half_w || ly < -half_h || ly >= half_h {
                    continue;
                }
                let u = ((lx + half_w) / dest_w * tex_w) as u32;
                let v = ((ly + half_h) / dest_h * tex_h) as u32;
                let texel = tex.pixel(u, v);
                if texel.a == 0 {
                    continue;
                }
                let c = Rgba::new(
                    modulate(texel.r, tint.r),
                    modulate(texel.g, tint.g),
                    modulate(texel.b, tint.b),
                    modulate(texel.a, tint.a),
                );
                let idx = self.pixel_index(px as u32, py as u32);
                plot(&mut self.pixels[idx..idx + 4], c);
            }
        }
    }

    /// Unscaled copy of the texture columns `src_x..src_x + src_w` (all rows)
    /// to (dest_x, dest_y), blended by texel alpha
    pub fn blit_texture_columns(
        &mut self,
        tex: &Texture,
        src_x: u32,
        src_w: u32,
        dest_x: i32,
        dest_y: i32,
    ) {
        let src_end = (src_x + src_w).min(tex.width());
        for ty in 0..tex.height() {
            let y = dest_y + ty as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for tx in src_x..src_end {
                let x = dest_x + (tx - src_x) as i32;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let texel = tex.pixel(tx, ty);
                let idx = self.pixel_index(x as u32, y as u32);
                plot(&mut self.pixels[idx..idx + 4], texel);
            }
        }
    }

    /// Frame bytes in streaming-texture layout
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    fn lit(buf: &PixelBuffer) -> usize {
        let mut n = 0;
        for y in 0..buf.height() as i32 {
            for x in 0..buf.width() as i32 {
                if buf.get_pixel(x, y).is_some_and(|c| c.r > 0) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn clear_writes_abgr() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.clear(Rgba::opaque(0, 30, 60));
        assert_eq!(&buf.as_bytes()[0..4], &[255, 60, 30, 0]);
        assert_eq!(buf.get_pixel(1, 1), Some(Rgba::opaque(0, 30, 60)));
    }

    #[test]
    fn off_screen_drawing_is_ignored() {
        let mut buf = PixelBuffer::with_size(10, 10);
        buf.point(-1, 5, WHITE);
        buf.point(10, 5, WHITE);
        buf.hline(-50, -1, 3, WHITE);
        buf.fill_circle(-100, -100, 20, WHITE);
        buf.line(-30, -30, -5, 40, WHITE);
        buf.fill_rect(20, 20, 5, 5, WHITE);
        assert_eq!(lit(&buf), 0);
        assert_eq!(buf.get_pixel(10, 0), None);
    }

    #[test]
    fn blend_mixes_half_alpha() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.clear(Rgba::opaque(0, 0, 0));
        buf.point(0, 0, Rgba::new(200, 100, 0, 128));
        let c = buf.get_pixel(0, 0).unwrap();
        assert!((99..=101).contains(&c.r), "r={}", c.r);
        assert!((49..=51).contains(&c.g), "g={}", c.g);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn transparent_draw_changes_nothing() {
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.clear(Rgba::opaque(1, 2, 3));
        buf.overlay(Rgba::new(255, 255, 255, 0));
        buf.fill_rect(0, 0, 4, 4, Rgba::new(255, 0, 0, 0));
        assert_eq!(buf.get_pixel(2, 2), Some(Rgba::opaque(1, 2, 3)));
    }

    #[test]
    fn line_is_clipped_but_drawn() {
        let mut buf = PixelBuffer::with_size(20, 20);
        buf.line(-10, 10, 30, 10, WHITE);
        assert_eq!(lit(&buf), 20);
        // Huge coordinates must not overflow the clipper
        buf.line(-1_000_000, -1_000_000, 1_000_000, 1_000_000, WHITE);
        assert!(buf.get_pixel(5, 5).unwrap().r > 0);
    }

    #[test]
    fn translucent_circle_rows_blend_once() {
        let mut buf = PixelBuffer::with_size(40, 40);
        buf.clear(Rgba::opaque(0, 0, 0));
        buf.fill_circle(20, 20, 9, Rgba::new(200, 200, 200, 100));
        let reference = buf.get_pixel(20, 20).unwrap().r;
        assert!(reference > 0);
        for y in 11..=29 {
            for x in 11..=29 {
                let c = buf.get_pixel(x, y).unwrap();
                assert!(c.r == 0 || c.r == reference, "({x},{y}) r={}", c.r);
            }
        }
    }

    #[test]
    fn texture_blit_tints_and_rotates() {
        let mut tex = Texture::new(4, 4);
        tex.fill_disc(1.5, 1.5, 3.0, WHITE);
        let mut buf = PixelBuffer::with_size(20, 20);
        buf.clear(Rgba::opaque(0, 0, 0));
        buf.blit_texture(&tex, 10.0, 10.0, 8.0, 8.0, 0.0, Rgba::opaque(255, 0, 0));
        let c = buf.get_pixel(10, 10).unwrap();
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
        assert_eq!(lit(&buf), 64);

        let mut rotated = PixelBuffer::with_size(20, 20);
        rotated.blit_texture(&tex, 10.0, 10.0, 8.0, 8.0, std::f32::consts::FRAC_PI_4, WHITE);
        let n = lit(&rotated);
        assert!((56..=72).contains(&n), "rotated coverage {n}");
        // Corner of the unrotated square is outside the diamond
        assert_eq!(rotated.get_pixel(6, 6).unwrap().r, 0);
    }

    #[test]
    fn column_blit_copies_slice() {
        let mut tex = Texture::new(6, 2);
        for x in 0..6 {
            tex.set_pixel(x, 0, Rgba::opaque(x as u8 * 10 + 10, 0, 0));
        }
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.blit_texture_columns(&tex, 4, 4, 1, 0);
        assert_eq!(buf.get_pixel(1, 0).unwrap().r, 50);
        assert_eq!(buf.get_pixel(2, 0).unwrap().r, 60);
        assert_eq!(buf.get_pixel(3, 0).unwrap().r, 0);
        // Row 1 is transparent in the texture
        assert_eq!(buf.get_pixel(1, 1).unwrap().r, 0);
    }
}
