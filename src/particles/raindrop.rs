use super::ripple::Ripples;
use super::splash::Splashes;
use crate::depth::{depth_band_x, depth_color, depth_scale, Rgba};
use crate::display::PixelBuffer;
use crate::pool::{Pool, SlotId};
use crate::scene::FrameContext;
use crate::scenery::lotus::LotusPads;
use rand::Rng;

/// How long a drop lingers after reaching the water
pub const IN_WATER_LINGER_MS: u64 = 500;
const FALL_SPEED_MIN: f32 = 200.0;
const FALL_SPEED_MAX: f32 = 500.0;
/// Band widening for drop placement at the horizon
const RAIN_DEPTH_SPREAD: f32 = 2.0;
const BLINK_TICK_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct Raindrop {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub size: f32,
    pub color: Rgba,
    pub in_water: bool,
    created_ms: u64,
    water_ms: u64,
}

impl Raindrop {
    /// Streak is shown for 3 of every 5 blink ticks, phased by birth time
    fn visible_at(&self, now_ms: u64) -> bool {
        (now_ms.saturating_sub(self.created_ms) / BLINK_TICK_MS) % 5 < 3
    }
}

pub struct Rain {
    pool: Pool<Raindrop>,
    last_emit_ms: u64,
    /// Counts airborne-drop updates to pick which ones test for pad hits
    collision_ticks: u64,
    collision_check_rate: u64,
}

impl Rain {
    pub fn new(capacity: usize, collision_check_rate: u32, now_ms: u64) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
            last_emit_ms: now_ms,
            collision_ticks: 0,
            collision_check_rate: u64::from(collision_check_rate.max(1)),
        }
    }

    /// Emit at most one drop when the weather's interval has elapsed
    pub fn emit(
        &mut self,
        ctx: &FrameContext,
        interval_ms: f32,
        surface_ratio: f32,
        ripples: &mut Ripples,
        rng: &mut impl Rng,
    ) -> Option<SlotId> {
        let since = ctx.now_ms.saturating_sub(self.last_emit_ms);
        if (since as f32) < interval_ms {
            return None;
        }
        self.last_emit_ms = ctx.now_ms;
        let on_surface = rng.gen::<f32>() < surface_ratio;
        self.spawn(on_surface, ctx, ripples, rng)
    }

    /// Create one drop. Surface drops start in the water and ripple at once.
    pub fn spawn(
        &mut self,
        on_surface: bool,
        ctx: &FrameContext,
        ripples: &mut Ripples,
        rng: &mut impl Rng,
    ) -> Option<SlotId> {
        if self.pool.is_full() {
            return None;
        }
        let z: f32 = rng.gen();
        let x = depth_band_x(rng, z, RAIN_DEPTH_SPREAD, ctx.width);
        let color = Rgba::random_rain(rng);

        let pond_rows = (ctx.height as f32 - ctx.water_line).max(1.0) as u32;
        let y = if on_surface {
            ctx.water_line + rng.gen_range(0..pond_rows) as f32
        } else {
            -10.0 - rng.gen_range(0..50) as f32
        };

        let scale = depth_scale(z);
        let boost = ctx.intensity_boost();
        let drop = Raindrop {
            x,
            y,
            z,
            speed_x: ctx.wind * 50.0 * scale * boost,
            speed_y: rng.gen_range(FALL_SPEED_MIN..FALL_SPEED_MAX) * scale * boost,
            size: rng.gen_range(2..7) as f32,
            color,
            in_water: on_surface,
            created_ms: ctx.now_ms,
            water_ms: ctx.now_ms,
        };

        let id = self.pool.spawn(drop)?;
        if on_surface {
            ripples.spawn(x, y, z, color, ctx.now_ms, rng);
        }
        Some(id)
    }

    /// Move airborne drops, resolve impacts, retire drops that have sat in
    /// the water long enough
    pub fn update(
        &mut self,
        ctx: &FrameContext,
        pads: &LotusPads,
        ripples: &mut Ripples,
        splashes: &mut Splashes,
        rng: &mut impl Rng,
    ) {
        let water = ctx.water_line;
        let gusty = ctx.tier.is_severe();
        let ticks = &mut self.collision_ticks;
        let rate = self.collision_check_rate;

        self.pool.retain_mut(|drop| {
            if drop.in_water {
                return ctx.now_ms.saturating_sub(drop.water_ms) <= IN_WATER_LINGER_MS;
            }

            let mut wind_effect = ctx.wind * 100.0 * ctx.dt;
            if gusty {
                wind_effect += rng.gen_range(-1.0f32..=1.0)
                    * 20.0
                    * ctx.dt
                    * (0.5 + ctx.intensity as f32 / 100.0);
            }
            drop.x += drop.speed_x * ctx.dt + wind_effect;
            drop.y += drop.speed_y * ctx.dt;

            *ticks += 1;
            let sampled = *ticks % rate == 0;
            if sampled && pads.hit(drop.x, drop.y, drop.z, ctx.camera_x).is_some() {
                drop.in_water = true;
                drop.water_ms = ctx.now_ms;
                splashes.burst(drop.x, drop.y, drop.z, drop.color, ctx, rng);
            } else if drop.y >= water {
                drop.in_water = true;
                drop.water_ms = ctx.now_ms;
                ripples.spawn(drop.x, water, drop.z, drop.color, ctx.now_ms, rng);
            }
            true
        });
    }

    pub fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext) {
        let angle = ctx.wind * 0.7;
        let (sin, cos) = angle.sin_cos();
        for drop in self.pool.iter().filter(|d| !d.in_water) {
            let px = ctx.project(drop.x, drop.z) as i32;
            if px < 0 || px >= ctx.width as i32 || drop.y < 0.0 || drop.y >= ctx.height as f32 {
                continue;
            }
            if !drop.visible_at(ctx.now_ms) {
                continue;
            }
            let size = (drop.size * depth_scale(drop.z)).floor();
            let length = size * ctx.intensity_boost();
            let end_y = drop.y as i32;
            let start_x = px - (length * sin) as i32;
            let start_y = end_y - (length * cos) as i32;
            let color = depth_color(drop.color, drop.z).brighten(ctx.flash / 2);
            buffer.line(start_x, start_y, px, end_y, color);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Raindrop> {
        self.pool.iter()
    }

    pub fn get(&self, id: SlotId) -> Option<&Raindrop> {
        self.pool.get(id)
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}
