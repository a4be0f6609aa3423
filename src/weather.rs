//! Weather tiers, wind and thunder
//!
//! One controller owns the tier state machine, the operator intensity knob
//! and the eased wind value that every other subsystem reads.

use crate::config::PondConfig;
use rand::Rng;

const WIND_SNAP_EPSILON: f32 = 0.01;
/// Chance per frame of nudging the wind target, in percent
const WIND_NUDGE_PERCENT: u32 = 1;
const RUMBLE_MAX_STROKES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeatherTier {
    LightRain,
    MediumRain,
    HeavyRain,
    Thunderstorm,
}

impl WeatherTier {
    pub const ALL: [WeatherTier; 4] = [
        WeatherTier::LightRain,
        WeatherTier::MediumRain,
        WeatherTier::HeavyRain,
        WeatherTier::Thunderstorm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WeatherTier::LightRain => "light rain",
            WeatherTier::MediumRain => "medium rain",
            WeatherTier::HeavyRain => "heavy rain",
            WeatherTier::Thunderstorm => "thunderstorm",
        }
    }

    /// Position in `ALL`
    pub fn index(self) -> usize {
        match self {
            WeatherTier::LightRain => 0,
            WeatherTier::MediumRain => 1,
            WeatherTier::HeavyRain => 2,
            WeatherTier::Thunderstorm => 3,
        }
    }

    /// Uniform pick among the three other tiers
    pub fn random_other(self, rng: &mut impl Rng) -> WeatherTier {
        let n = Self::ALL.len();
        Self::ALL[(self.index() + rng.gen_range(1..n)) % n]
    }

    /// Heavy rain and thunderstorms: lightning allowed, wind gusts jitter drops
    #[inline]
    pub fn is_severe(self) -> bool {
        self >= WeatherTier::HeavyRain
    }

    /// Milliseconds between raindrops before the intensity reduction
    pub fn base_rain_interval_ms(self) -> f32 {
        match self {
            WeatherTier::LightRain => 150.0,
            WeatherTier::MediumRain => 80.0,
            WeatherTier::HeavyRain | WeatherTier::Thunderstorm => 20.0,
        }
    }

    /// Half-width of the symmetric range a new wind target is drawn from
    pub fn wind_range(self) -> f32 {
        match self {
            WeatherTier::LightRain => 0.2,
            WeatherTier::MediumRain => 0.5,
            WeatherTier::HeavyRain => 0.8,
            WeatherTier::Thunderstorm => 1.0,
        }
    }

    /// Size of a random wind-target nudge before intensity scaling
    pub fn wind_variance(self) -> f32 {
        match self {
            WeatherTier::LightRain => 0.1,
            WeatherTier::MediumRain => 0.2,
            WeatherTier::HeavyRain => 0.4,
            WeatherTier::Thunderstorm => 0.5,
        }
    }

    pub fn star_visibility(self) -> f32 {
        match self {
            WeatherTier::LightRain => 1.0,
            WeatherTier::MediumRain => 0.7,
            WeatherTier::HeavyRain => 0.4,
            WeatherTier::Thunderstorm => 0.2,
        }
    }

    pub fn moon_visibility(self) -> f32 {
        match self {
            WeatherTier::LightRain => 0.9,
            WeatherTier::MediumRain => 0.7,
            WeatherTier::HeavyRain => 0.4,
            WeatherTier::Thunderstorm => 0.2,
        }
    }

    /// Cloud layers shown before intensity scaling (none in light rain)
    pub fn base_cloud_layers(self) -> usize {
        match self {
            WeatherTier::LightRain => 0,
            WeatherTier::MediumRain => 3,
            WeatherTier::HeavyRain => 5,
            WeatherTier::Thunderstorm => 7,
        }
    }
}

/// Rain spawn interval in ms. Intensity 100 halves the tier's base interval.
pub fn rain_interval_ms(tier: WeatherTier, intensity: i32) -> f32 {
    tier.base_rain_interval_ms() * (1.0 - intensity as f32 / 200.0)
}

pub struct WeatherController {
    current: WeatherTier,
    target: WeatherTier,
    intensity: i32,
    wind: f32,
    target_wind: f32,
    wind_change_rate: f32,
    last_change_ms: u64,
    dwell_ms: u64,
    dwell_min_ms: u64,
    dwell_max_ms: u64,
}

impl WeatherController {
    pub fn new(config: &PondConfig, now_ms: u64, rng: &mut impl Rng) -> Self {
        let mut weather = Self {
            current: WeatherTier::LightRain,
            target: WeatherTier::LightRain,
            intensity: config.initial_intensity.clamp(0, 100),
            wind: 0.0,
            target_wind: 0.0,
            wind_change_rate: config.wind_change_rate,
            last_change_ms: now_ms,
            dwell_ms: 0,
            dwell_min_ms: config.weather_duration_min_ms,
            dwell_max_ms: config.weather_duration_max_ms,
        };
        weather.dwell_ms = weather.roll_dwell(rng);
        weather
    }

    #[inline]
    pub fn current(&self) -> WeatherTier {
        self.current
    }

    #[inline]
    pub fn target(&self) -> WeatherTier {
        self.target
    }

    #[inline]
    pub fn intensity(&self) -> i32 {
        self.intensity
    }

    #[inline]
    pub fn wind(&self) -> f32 {
        self.wind
    }

    #[inline]
    pub fn target_wind(&self) -> f32 {
        self.target_wind
    }

    pub fn dwell_ms(&self) -> u64 {
        self.dwell_ms
    }

    /// Request a tier; applied on the next `update`
    pub fn set_target(&mut self, tier: WeatherTier) {
        self.target = tier;
    }

    /// Shift intensity by `delta`, clamped to [0, 100]
    pub fn adjust_intensity(&mut self, delta: i32) {
        self.intensity = (self.intensity + delta).clamp(0, 100);
    }

    pub fn rain_interval_ms(&self) -> f32 {
        rain_interval_ms(self.current, self.intensity)
    }

    fn roll_dwell(&self, rng: &mut impl Rng) -> u64 {
        if self.dwell_max_ms > self.dwell_min_ms {
            rng.gen_range(self.dwell_min_ms..self.dwell_max_ms)
        } else {
            self.dwell_min_ms
        }
    }

    /// Advance the state machine one frame. Returns the new tier when a
    /// transition happened.
    pub fn update(&mut self, now_ms: u64, rng: &mut impl Rng) -> Option<WeatherTier> {
        let elapsed = now_ms.saturating_sub(self.last_change_ms);
        if elapsed > self.dwell_ms && self.current == self.target {
            self.target = self.current.random_other(rng);
            self.last_change_ms = now_ms;
            self.dwell_ms = self.roll_dwell(rng);
        }

        let mut changed = None;
        if self.current != self.target {
            self.current = self.target;
            let range = self.current.wind_range();
            self.target_wind = rng.gen_range(-range..=range);
            changed = Some(self.current);
        }

        if rng.gen_range(0..100) < WIND_NUDGE_PERCENT {
            let variance =
                self.current.wind_variance() * (0.5 + self.intensity as f32 / 100.0);
            let nudge = rng.gen_range(-1.0f32..=1.0) * variance;
            self.target_wind = (self.target_wind + nudge).clamp(-1.0, 1.0);
        }

        self.ease_wind();
        changed
    }

    fn ease_wind(&mut self) {
        let diff = self.target_wind - self.wind;
        if diff.abs() > WIND_SNAP_EPSILON {
            self.wind += diff * self.wind_change_rate;
        } else {
            self.wind = self.target_wind;
        }
    }
}

/// A short bright horizontal stroke of the thunder rumble
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumbleStroke {
    pub x: i32,
    pub y: i32,
    pub length: i32,
}

/// Thunder is purely visual: a timed shimmer along the bottom of the screen
pub struct Thunder {
    active: bool,
    start_ms: u64,
    duration_ms: u64,
    strokes: Vec<RumbleStroke>,
    strength: f32,
}

impl Thunder {
    pub fn new() -> Self {
        Self {
            active: false,
            start_ms: 0,
            duration_ms: 0,
            strokes: Vec::with_capacity(RUMBLE_MAX_STROKES),
            strength: 0.0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    /// Schedule thunder starting at `start_ms` (may lie in the future)
    pub fn arm(&mut self, start_ms: u64, duration_ms: u64) {
        self.active = true;
        self.start_ms = start_ms;
        self.duration_ms = duration_ms;
    }

    /// Rumble strength at `now_ms`: a decaying cosine, 0 before start
    pub fn rumble_strength(&self, now_ms: u64) -> f32 {
        if !self.active || now_ms < self.start_ms || self.duration_ms == 0 {
            return 0.0;
        }
        let age = (now_ms - self.start_ms) as f32;
        let duration = self.duration_ms as f32;
        if age >= duration {
            return 0.0;
        }
        let wave = (age * std::f32::consts::PI * 5.0 / duration).cos() * 0.5 + 0.5;
        wave * (1.0 - age / duration)
    }

    /// Expire finished thunder and re-roll the rumble strokes for this frame
    pub fn update(&mut self, now_ms: u64, width: u32, height: u32, rng: &mut impl Rng) {
        if self.active
            && now_ms >= self.start_ms
            && now_ms - self.start_ms > self.duration_ms
        {
            self.active = false;
        }

        self.strokes.clear();
        self.strength = self.rumble_strength(now_ms);
        if self.strength <= 0.05 {
            return;
        }
        let count = ((RUMBLE_MAX_STROKES as f32 * self.strength) as usize).min(RUMBLE_MAX_STROKES);
        for _ in 0..count {
            let length = rng.gen_range(20..120).min(width as i32 - 1).max(1);
            let x = rng.gen_range(0..(width as i32 - length).max(1));
            let y = height as i32 - rng.gen_range(0..100);
            self.strokes.push(RumbleStroke { x, y, length });
        }
    }

    pub fn strokes(&self) -> &[RumbleStroke] {
        &self.strokes
    }

    /// Strength sampled at the last update
    pub fn strength(&self) -> f32 {
        self.strength
    }
}

impl Default for Thunder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn controller(rng: &mut SmallRng) -> WeatherController {
        WeatherController::new(&PondConfig::default(), 0, rng)
    }

    #[test]
    fn rain_interval_shrinks_with_intensity() {
        assert_eq!(rain_interval_ms(WeatherTier::LightRain, 0), 150.0);
        assert_eq!(rain_interval_ms(WeatherTier::LightRain, 100), 75.0);
        assert_eq!(rain_interval_ms(WeatherTier::MediumRain, 50), 60.0);
        assert_eq!(rain_interval_ms(WeatherTier::Thunderstorm, 100), 10.0);
        assert_eq!(
            rain_interval_ms(WeatherTier::HeavyRain, 30),
            rain_interval_ms(WeatherTier::Thunderstorm, 30)
        );
    }

    #[test]
    fn dwell_is_drawn_inside_window() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let w = controller(&mut rng);
            assert!((10_000..30_000).contains(&w.dwell_ms()));
        }
    }

    #[test]
    fn transitions_once_after_dwell_expires() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut w = controller(&mut rng);
        assert_eq!(w.current(), WeatherTier::LightRain);

        // Nothing happens while the dwell window is open
        for t in (0..10_000).step_by(16) {
            assert_eq!(w.update(t, &mut rng), None);
            assert_eq!(w.target(), WeatherTier::LightRain);
        }

        let changed = w.update(30_001, &mut rng);
        let new_tier = changed.expect("tier must change after the maximum dwell");
        assert_ne!(new_tier, WeatherTier::LightRain);
        assert_eq!(w.target(), new_tier);
        assert_eq!(w.current(), new_tier);

        // The timer restarted, so the very next frame is quiet
        assert_eq!(w.update(30_017, &mut rng), None);
        assert_eq!(w.current(), new_tier);
    }

    #[test]
    fn manual_target_applies_on_next_update() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut w = controller(&mut rng);
        w.set_target(WeatherTier::Thunderstorm);
        assert_eq!(w.current(), WeatherTier::LightRain);
        assert_eq!(w.update(16, &mut rng), Some(WeatherTier::Thunderstorm));
        assert_eq!(w.current(), WeatherTier::Thunderstorm);
        assert!(w.target_wind().abs() <= 1.0);
    }

    #[test]
    fn intensity_is_clamped() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut w = controller(&mut rng);
        for _ in 0..20 {
            w.adjust_intensity(10);
        }
        assert_eq!(w.intensity(), 100);
        for _ in 0..25 {
            w.adjust_intensity(-10);
        }
        assert_eq!(w.intensity(), 0);
        w.adjust_intensity(7);
        assert_eq!(w.intensity(), 7);
    }

    #[test]
    fn wind_stays_in_range_under_random_operations() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut w = controller(&mut rng);
        let mut now = 0;
        for step in 0..50_000u64 {
            now += 16;
            match step % 97 {
                0 => w.adjust_intensity(10),
                13 => w.adjust_intensity(-10),
                41 => w.set_target(WeatherTier::ALL[(step as usize / 97) % 4]),
                _ => {},
            }
            w.update(now, &mut rng);
            assert!((0..=100).contains(&w.intensity()));
            assert!((-1.0..=1.0).contains(&w.wind()), "wind {}", w.wind());
            assert!((-1.0..=1.0).contains(&w.target_wind()));
        }
    }

    #[test]
    fn wind_eases_and_snaps() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut w = controller(&mut rng);
        w.target_wind = 0.8;
        w.wind = 0.0;
        w.ease_wind();
        assert!((w.wind() - 0.016).abs() < 1e-6);
        w.wind = 0.795;
        w.ease_wind();
        assert_eq!(w.wind(), 0.8);
    }

    #[test]
    fn thunder_clears_after_duration() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut thunder = Thunder::new();
        thunder.arm(1_000, 1_500);
        thunder.update(500, 800, 600, &mut rng);
        assert!(thunder.is_active());
        assert!(thunder.strokes().is_empty());

        thunder.update(1_010, 800, 600, &mut rng);
        assert!(thunder.is_active());
        assert!(!thunder.strokes().is_empty());
        for s in thunder.strokes() {
            assert!(s.y > 500 && s.y <= 600);
            assert!(s.x >= 0 && s.x + s.length <= 800);
        }

        thunder.update(2_500, 800, 600, &mut rng);
        assert!(thunder.is_active());
        thunder.update(2_501, 800, 600, &mut rng);
        assert!(!thunder.is_active());
        assert!(thunder.strokes().is_empty());
    }

    #[test]
    fn tiers_are_ordered_by_severity() {
        assert!(!WeatherTier::MediumRain.is_severe());
        assert!(WeatherTier::HeavyRain.is_severe());
        assert!(WeatherTier::Thunderstorm > WeatherTier::LightRain);
    }

    #[test]
    fn random_other_never_repeats_and_reaches_every_tier() {
        let mut rng = SmallRng::seed_from_u64(21);
        for tier in WeatherTier::ALL {
            assert_eq!(WeatherTier::ALL[tier.index()], tier);
            let mut seen = [false; 4];
            for _ in 0..200 {
                let next = tier.random_other(&mut rng);
                assert_ne!(next, tier);
                seen[next.index()] = true;
            }
            assert_eq!(seen.iter().filter(|s| **s).count(), 3);
        }
    }
}
