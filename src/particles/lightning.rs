use crate::depth::Rgba;
use crate::display::PixelBuffer;
use crate::pool::{Pool, SlotId};
use crate::scene::FrameContext;
use crate::weather::{Thunder, WeatherTier};
use rand::Rng;

pub const MAX_BOLT_POINTS: usize = 20;
const GLOW_ALPHA: u8 = 50;
/// Share of the main bolt's brightness that lights the whole scene
const FLASH_FACTOR: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoltKind {
    /// Struck from the sky; may fork
    Main,
    /// Forked off a main bolt; never forks again
    Branch,
}

#[derive(Debug, Clone)]
pub struct Bolt {
    pub kind: BoltKind,
    path: [(i32, i32); MAX_BOLT_POINTS],
    path_len: usize,
    pub width: i32,
    pub brightness: u8,
    created_ms: u64,
    pub duration_ms: u64,
}

impl Bolt {
    /// Path from the strike point downward
    pub fn points(&self) -> &[(i32, i32)] {
        &self.path[..self.path_len]
    }
}

pub struct Lightning {
    pool: Pool<Bolt>,
    last_strike_ms: u64,
}

impl Lightning {
    pub fn new(capacity: usize, now_ms: u64) -> Self {
        Self {
            pool: Pool::with_capacity(capacity),
            last_strike_ms: now_ms,
        }
    }

    /// Build a zigzag bolt from (x, y) downward, stopping at the water line.
    /// A main bolt may fork branches from its interior points; each branch
    /// is half as long and one pixel thinner, and cannot fork again, so the
    /// recursion is one level deep. Returns the slot of the bolt itself.
    pub fn strike(
        &mut self,
        x: i32,
        y: i32,
        segments: usize,
        width: i32,
        kind: BoltKind,
        ctx: &FrameContext,
        rng: &mut impl Rng,
    ) -> Option<SlotId> {
        if self.pool.is_full() {
            return None;
        }
        let segments = segments.clamp(1, MAX_BOLT_POINTS - 1);
        let intensity = ctx.intensity as f32;

        let brightness = (180 + rng.gen_range(0..75) + ctx.intensity / 2).min(255) as u8;
        let duration_ms =
            (rng.gen_range(100..300) as f32 * (1.0 + intensity / 100.0)) as u64;
        let zigzag = 40.0 * (1.0 + intensity / 200.0);
        let branch_percent = 30.0 * (1.0 + intensity / 150.0);
        let step_y = ctx.height as i32 / segments as i32;
        let water = ctx.water_line as i32;

        let mut path = [(0, 0); MAX_BOLT_POINTS];
        let mut forks = [(0, 0); MAX_BOLT_POINTS];
        let mut fork_count = 0;
        let (mut cx, mut cy) = (x, y);
        path[0] = (cx, cy);
        for j in 1..=segments {
            cx += rng.gen_range(0..zigzag as i32) - (zigzag / 2.0) as i32;
            cy = (cy + step_y).min(water);
            path[j] = (cx, cy);

            if kind == BoltKind::Main
                && segments > 3
                && j > 1
                && j < segments - 1
                && (rng.gen_range(0..100) as f32) < branch_percent
            {
                forks[fork_count] = (cx, cy);
                fork_count += 1;
            }
        }

        let id = self.pool.spawn(Bolt {
            kind,
            path,
            path_len: segments + 1,
            width,
            brightness,
            created_ms: ctx.now_ms,
            duration_ms,
        })?;

        let branch_segments = segments / 2 + usize::from(ctx.intensity > 70);
        for &(fx, fy) in &forks[..fork_count] {
            self.strike(
                fx,
                fy,
                branch_segments.max(1),
                (width - 1).max(1),
                BoltKind::Branch,
                ctx,
                rng,
            );
        }
        Some(id)
    }

    pub fn update(&mut self, now_ms: u64) {
        self.pool
            .retain_mut(|bolt| now_ms.saturating_sub(bolt.created_ms) < bolt.duration_ms);
    }

    /// Storm scheduler: in a thunderstorm, or heavy rain above intensity 70,
    /// roll for a strike once the cooldown has passed. Half of the strikes
    /// arm thunder a little later.
    pub fn auto_strike(
        &mut self,
        ctx: &FrameContext,
        thunder: &mut Thunder,
        rng: &mut impl Rng,
    ) -> bool {
        let eligible = ctx.tier == WeatherTier::Thunderstorm
            || (ctx.tier == WeatherTier::HeavyRain && ctx.intensity > 70);
        if !eligible {
            return false;
        }
        let cooldown = (10_000 - ctx.intensity * 80).max(0) as u64;
        if ctx.now_ms.saturating_sub(self.last_strike_ms) <= cooldown {
            return false;
        }
        if rng.gen_range(0..100) >= ctx.intensity / 5 {
            return false;
        }

        let x = ctx.width as i32 / 2 + rng.gen_range(0..400) - 200;
        let segments = rng.gen_range(5..15);
        let width = rng.gen_range(2..5);
        self.strike(x, 0, segments, width, BoltKind::Main, ctx, rng);
        if rng.gen_bool(0.5) {
            let delay = rng.gen_range(500..1500);
            thunder.arm(ctx.now_ms + delay, rng.gen_range(1000..3000));
        }
        self.last_strike_ms = ctx.now_ms;
        true
    }

    /// Operator-triggered strike with immediate thunder. Only allowed in
    /// heavy rain and thunderstorms.
    pub fn manual_strike(
        &mut self,
        ctx: &FrameContext,
        thunder: &mut Thunder,
        rng: &mut impl Rng,
    ) -> bool {
        if !ctx.tier.is_severe() {
            return false;
        }
        let x = ctx.width as i32 / 2 + rng.gen_range(0..300) - 150;
        let segments = rng.gen_range(5..15);
        let width = rng.gen_range(2..5);
        self.strike(x, 0, segments, width, BoltKind::Main, ctx, rng);
        thunder.arm(ctx.now_ms, rng.gen_range(1000..3000));
        true
    }

    /// Scene-wide flash level from the first live main bolt, 0 when none
    pub fn flash(&self) -> u8 {
        self.pool
            .iter()
            .find(|b| b.kind == BoltKind::Main)
            .map_or(0, |b| (b.brightness as f32 * FLASH_FACTOR) as u8)
    }

    /// Solid core strokes first, then a wide translucent glow
    pub fn render(&self, buffer: &mut PixelBuffer) {
        for bolt in self.pool.iter() {
            let b = bolt.brightness;
            let core = Rgba::opaque(b, b, b);
            let glow = Rgba::new(b, b, b, GLOW_ALPHA);
            for (reach, color) in [(bolt.width, core), (bolt.width * 3, glow)] {
                for pair in bolt.points().windows(2) {
                    let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                    for w in -reach..=reach {
                        buffer.line(x0 + w, y0, x1 + w, y1, color);
                    }
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bolt> {
        self.pool.iter()
    }

    pub fn get(&self, id: SlotId) -> Option<&Bolt> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn storm_ctx() -> FrameContext {
        let mut ctx = FrameContext::for_size(800, 600);
        ctx.tier = WeatherTier::Thunderstorm;
        ctx.intensity = 100;
        ctx
    }

    #[test]
    fn ten_segment_bolt_has_eleven_points_above_water() {
        let ctx = storm_ctx();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut lightning = Lightning::new(5, 0);
            let id = lightning
                .strike(400, 0, 10, 3, BoltKind::Main, &ctx, &mut rng)
                .unwrap();
            let bolt = lightning.get(id).unwrap();
            assert_eq!(bolt.points().len(), 11);
            assert!(bolt.points().last().unwrap().1 <= ctx.water_line as i32);
            assert!(bolt.points().iter().all(|p| p.1 <= ctx.water_line as i32));
            // Main bolt took the first slot; branches follow it
            assert_eq!(id.index(), 0);
            for branch in lightning.iter().filter(|b| b.kind == BoltKind::Branch) {
                assert_eq!(branch.points().len(), 10 / 2 + 1 + 1);
                assert_eq!(branch.width, 2);
            }
        }
    }

    #[test]
    fn oversized_request_is_capped_to_the_fixed_path() {
        let ctx = storm_ctx();
        let mut rng = SmallRng::seed_from_u64(13);
        let mut lightning = Lightning::new(50, 0);
        let id = lightning
            .strike(400, 0, 500, 3, BoltKind::Main, &ctx, &mut rng)
            .unwrap();
        assert_eq!(lightning.get(id).unwrap().points().len(), MAX_BOLT_POINTS);
        assert!(lightning
            .iter()
            .all(|b| b.points().len() <= MAX_BOLT_POINTS));
    }

    #[test]
    fn branches_never_fork() {
        let ctx = storm_ctx();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut lightning = Lightning::new(50, 0);
        for _ in 0..100 {
            lightning.strike(300, 0, 19, 1, BoltKind::Branch, &ctx, &mut rng);
        }
        assert!(lightning.iter().all(|b| b.kind == BoltKind::Branch));
        assert_eq!(lightning.active_count(), 50);
        assert!(lightning.iter().all(|b| b.width == 1));
    }

    #[test]
    fn brightness_and_duration_bounds() {
        let mut ctx = storm_ctx();
        ctx.intensity = 0;
        let mut rng = SmallRng::seed_from_u64(8);
        let mut lightning = Lightning::new(5, 0);
        for _ in 0..200 {
            let id = lightning
                .strike(400, 0, 3, 2, BoltKind::Main, &ctx, &mut rng)
                .unwrap();
            let bolt = lightning.get(id).unwrap();
            assert!(bolt.brightness >= 180);
            assert!((100..300).contains(&bolt.duration_ms));
            lightning.update(u64::MAX / 2);
        }
    }

    #[test]
    fn all_bolts_expire() {
        let ctx = storm_ctx();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut lightning = Lightning::new(5, 0);
        lightning.strike(400, 0, 12, 4, BoltKind::Main, &ctx, &mut rng);
        assert!(lightning.active_count() >= 1);
        assert!(lightning.flash() >= (180.0 * FLASH_FACTOR) as u8);
        // Longest possible life is 299 * 2 ms at intensity 100
        lightning.update(600);
        assert_eq!(lightning.active_count(), 0);
        assert_eq!(lightning.flash(), 0);
    }

    #[test]
    fn full_pool_refuses_strike() {
        let ctx = storm_ctx();
        let mut rng = SmallRng::seed_from_u64(10);
        let mut lightning = Lightning::new(1, 0);
        assert!(lightning.strike(400, 0, 3, 2, BoltKind::Main, &ctx, &mut rng).is_some());
        assert!(lightning.strike(400, 0, 3, 2, BoltKind::Main, &ctx, &mut rng).is_none());
    }

    #[test]
    fn manual_strike_needs_severe_weather() {
        let mut ctx = storm_ctx();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut lightning = Lightning::new(5, 0);
        let mut thunder = Thunder::new();

        ctx.tier = WeatherTier::MediumRain;
        assert!(!lightning.manual_strike(&ctx, &mut thunder, &mut rng));
        assert_eq!(lightning.active_count(), 0);
        assert!(!thunder.is_active());

        ctx.tier = WeatherTier::HeavyRain;
        ctx.now_ms = 1234;
        assert!(lightning.manual_strike(&ctx, &mut thunder, &mut rng));
        assert!(lightning.active_count() >= 1);
        assert!(thunder.is_active());
        assert_eq!(thunder.start_ms(), 1234);
    }

    #[test]
    fn auto_strike_waits_for_cooldown_and_tier() {
        let mut ctx = storm_ctx();
        let mut rng = SmallRng::seed_from_u64(12);
        let mut lightning = Lightning::new(5, 0);
        let mut thunder = Thunder::new();

        // Cooldown at intensity 100 is 2000 ms
        ctx.now_ms = 2_000;
        for _ in 0..100 {
            assert!(!lightning.auto_strike(&ctx, &mut thunder, &mut rng));
        }

        ctx.tier = WeatherTier::HeavyRain;
        ctx.intensity = 70;
        ctx.now_ms = 100_000;
        for _ in 0..100 {
            assert!(!lightning.auto_strike(&ctx, &mut thunder, &mut rng));
        }

        ctx.intensity = 100;
        let struck = (0..200).any(|_| lightning.auto_strike(&ctx, &mut thunder, &mut rng));
        assert!(struck);
        assert!(lightning.active_count() >= 1);
    }
}
