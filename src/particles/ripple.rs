use crate::depth::{depth_color, depth_scale, Rgba};
use crate::display::PixelBuffer;
use crate::pool::{Pool, SlotId};
use crate::scene::FrameContext;
use rand::Rng;

pub const RIPPLE_LIFETIME_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct Ripple {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    pub max_radius: f32,
    /// Colour at birth; alpha fades from here to zero
    base: Rgba,
    pub alpha: u8,
    created_ms: u64,
}

impl Ripple {
    pub fn color(&self) -> Rgba {
        self.base.with_alpha(self.alpha)
    }
}

/// Expanding elliptical rings on the pond surface
pub struct Ripples {
    pool: Pool<Ripple>,
}

impl Ripples {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
        }
    }

    pub fn spawn(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        color: Rgba,
        now_ms: u64,
        rng: &mut impl Rng,
    ) -> Option<SlotId> {
        if self.pool.is_full() {
            return None;
        }
        let max_radius = rng.gen_range(20..60) as f32 * depth_scale(z);
        self.pool.spawn(Ripple {
            x,
            y,
            z,
            radius: 0.0,
            max_radius,
            base: color,
            alpha: color.a,
            created_ms: now_ms,
        })
    }

    /// Grow and fade; expire once the lifetime is reached
    pub fn update(&mut self, now_ms: u64) {
        self.pool.retain_mut(|ripple| {
            let age = now_ms.saturating_sub(ripple.created_ms);
            let progress = (age as f32 / RIPPLE_LIFETIME_MS as f32).min(1.0);
            ripple.radius = ripple.max_radius * progress;
            ripple.alpha = (ripple.base.a as f32 * (1.0 - progress)) as u8;
            age < RIPPLE_LIFETIME_MS
        });
    }

    pub fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let width = ctx.width as i32;
        let height = ctx.height as i32;
        let water = ctx.water_line as i32;
        let pond_depth = (ctx.height as f32 - ctx.water_line).max(1.0);

        for ripple in self.pool.iter() {
            let px = ctx.project(ripple.x, ripple.z) as i32;
            let reach = ripple.radius as i32;
            if px + reach < 0 || px - reach >= width {
                continue;
            }

            let color = depth_color(ripple.color(), ripple.z).brighten(ctx.flash / 2);
            let radius = (ripple.radius * depth_scale(ripple.z)) as i32;
            let squash = 0.3 + (ripple.y - ctx.water_line) / pond_depth * 0.2;

            for r in (radius - 2)..=radius {
                for step in 0..72 {
                    let rad = (step * 5) as f32 * std::f32::consts::PI / 180.0;
                    let x = (px as f32 + r as f32 * rad.cos()) as i32;
                    let y = (ripple.y + r as f32 * squash * rad.sin()) as i32;
                    if x >= 0 && x < width && y >= water && y < height {
                        buffer.point(x, y, color);
                    }
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ripple> {
        self.pool.iter()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}
