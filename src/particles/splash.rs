use super::ripple::Ripples;
use crate::depth::{depth_color, depth_scale, Rgba};
use crate::display::PixelBuffer;
use crate::pool::Pool;
use crate::scene::FrameContext;
use rand::Rng;
use std::f32::consts::TAU;

pub const SPLASH_LIFETIME_MS: u64 = 800;
const GRAVITY: f32 = 500.0;
const UPWARD_KICK: f32 = 200.0;

#[derive(Debug, Clone)]
pub struct Splash {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: Rgba,
    created_ms: u64,
}

/// Droplets thrown up when rain strikes a lotus pad
pub struct Splashes {
    pool: Pool<Splash>,
}

impl Splashes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
        }
    }

    /// Throw a burst of droplets from (x, y). Returns how many were placed;
    /// the rest of the burst is dropped once the pool is full.
    pub fn burst(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        color: Rgba,
        ctx: &FrameContext,
        rng: &mut impl Rng,
    ) -> usize {
        let boost = ctx.intensity_boost();
        let count = (rng.gen_range(5..13) as f32 * boost) as usize;

        let mut placed = 0;
        for _ in 0..count {
            if self.pool.is_full() {
                break;
            }
            let angle = rng.gen::<f32>() * TAU + ctx.wind * 0.5;
            let speed = (50.0 + rng.gen::<f32>() * 150.0) * boost;
            let splash = Splash {
                x,
                y,
                z,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed - UPWARD_KICK,
                size: 1.0 + rng.gen::<f32>() * 2.0,
                color,
                created_ms: ctx.now_ms,
            };
            if self.pool.spawn(splash).is_some() {
                placed += 1;
            }
        }
        placed
    }

    /// Ballistic step. Each droplet ends exactly once: by age, or by
    /// falling back through the surface (which leaves a faded ripple).
    pub fn update(&mut self, ctx: &FrameContext, ripples: &mut Ripples, rng: &mut impl Rng) {
        let water = ctx.water_line;
        let dt = ctx.dt;
        self.pool.retain_mut(|s| {
            let age = ctx.now_ms.saturating_sub(s.created_ms);
            s.vy += GRAVITY * dt;
            s.x += s.vx * dt;
            s.y += s.vy * dt;

            let progress = age as f32 / SPLASH_LIFETIME_MS as f32;
            if progress > 1.0 {
                return false;
            }
            if s.y >= water && s.vy > 0.0 {
                let faded = s.color.with_alpha((s.color.a as f32 * (1.0 - progress)) as u8);
                ripples.spawn(s.x, water, s.z, faded, ctx.now_ms, rng);
                return false;
            }
            true
        });
    }

    pub fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        for s in self.pool.iter() {
            let px = ctx.project(s.x, s.z) as i32;
            if px < 0 || px >= ctx.width as i32 || s.y < 0.0 || s.y >= ctx.height as f32 {
                continue;
            }
            let size = (s.size * depth_scale(s.z)) as i32;
            let color = depth_color(s.color, s.z).brighten(ctx.flash / 2);
            buffer.fill_circle(px, s.y as i32, size, color);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Splash> {
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
