//! Frame orchestration
//!
//! `PondScene` owns every pool and scenery layer. Each frame it advances
//! the simulation in a fixed order, then composites all layers back to
//! front into the pixel buffer.

use crate::camera::Camera;
use crate::config::PondConfig;
use crate::control::Command;
use crate::depth::{project_x, Rgba};
use crate::display::PixelBuffer;
use crate::hud;
use crate::particles::{Lightning, Rain, Ripples, Splashes};
use crate::scenery::{Clouds, Layer, LotusFlowers, LotusPads, Moon, Mountains, Reeds, Stars};
use crate::weather::{Thunder, WeatherController, WeatherTier};
use rand::Rng;
use tracing::{debug, info};

const SKY: Rgba = Rgba::opaque(0, 0, 20);
const POND: Rgba = Rgba::opaque(0, 30, 60);
const FLASH_OVERLAY_ALPHA: u8 = 100;
const RUMBLE_ALPHA: f32 = 50.0;

/// Read-only snapshot of the shared simulation state for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub now_ms: u64,
    /// Seconds since the previous frame
    pub dt: f32,
    pub tier: WeatherTier,
    pub intensity: i32,
    pub wind: f32,
    pub camera_x: f32,
    pub water_line: f32,
    pub width: u32,
    pub height: u32,
    /// Lightning flash added to lit colours, 0 when no bolt is live
    pub flash: u8,
}

impl FrameContext {
    #[inline]
    pub fn seconds(&self) -> f32 {
        self.now_ms as f32 / 1000.0
    }

    /// Speed and size multiplier from weather intensity, 1.0 to 2.0
    #[inline]
    pub fn intensity_boost(&self) -> f32 {
        1.0 + self.intensity as f32 / 100.0
    }

    #[inline]
    pub fn project(&self, x: f32, z: f32) -> f32 {
        project_x(x, z, self.camera_x)
    }

    #[cfg(test)]
    pub fn for_size(width: u32, height: u32) -> Self {
        Self {
            now_ms: 0,
            dt: 1.0 / 60.0,
            tier: WeatherTier::LightRain,
            intensity: 50,
            wind: 0.0,
            camera_x: 0.0,
            water_line: (height * 2 / 3) as f32,
            width,
            height,
            flash: 0,
        }
    }
}

pub struct PondScene {
    config: PondConfig,
    now_ms: u64,
    dt: f32,

    weather: WeatherController,
    thunder: Thunder,
    camera: Camera,

    rain: Rain,
    ripples: Ripples,
    splashes: Splashes,
    lightning: Lightning,

    stars: Stars,
    moon: Moon,
    clouds: Clouds,
    mountains: Mountains,
    reeds: Reeds,
    pads: LotusPads,
    flowers: LotusFlowers,
}

impl PondScene {
    /// Build the whole scene. All scenery and textures are generated here;
    /// nothing is allocated per frame afterwards.
    pub fn new(config: PondConfig, now_ms: u64, rng: &mut impl Rng) -> Self {
        let weather = WeatherController::new(&config, now_ms, rng);
        let pools = config.pools;
        let initial = initial_context(&config);

        let mut scene = Self {
            now_ms,
            dt: 0.0,
            thunder: Thunder::new(),
            camera: Camera::new(),
            rain: Rain::new(pools.raindrops, config.collision_check_rate, now_ms),
            ripples: Ripples::with_capacity(pools.ripples),
            splashes: Splashes::with_capacity(pools.splashes),
            lightning: Lightning::new(pools.lightning, now_ms),
            stars: Stars::new(&initial, rng),
            moon: Moon::new(),
            clouds: Clouds::new(config.width),
            mountains: Mountains::new(&initial, rng),
            reeds: Reeds::new(&initial, rng),
            pads: LotusPads::new(&initial, rng),
            flowers: LotusFlowers::new(&initial, rng),
            weather,
            config,
        };
        let ctx = scene.context();
        scene.stars.update(&ctx);

        let names: Vec<&str> = scene.layers().iter().map(|l| l.name()).collect();
        info!(
            width = scene.config.width,
            height = scene.config.height,
            layers = ?names,
            "Scenery generated"
        );
        scene
    }

    /// Snapshot of the shared state as it stands right now
    pub fn context(&self) -> FrameContext {
        FrameContext {
            now_ms: self.now_ms,
            dt: self.dt,
            tier: self.weather.current(),
            intensity: self.weather.intensity(),
            wind: self.weather.wind(),
            camera_x: self.camera.x(),
            water_line: self.config.water_line(),
            width: self.config.width,
            height: self.config.height,
            flash: self.lightning.flash(),
        }
    }

    fn layers(&self) -> [&dyn Layer; 7] {
        [
            &self.stars,
            &self.moon,
            &self.clouds,
            &self.mountains,
            &self.reeds,
            &self.pads,
            &self.flowers,
        ]
    }

    /// Advance the simulation to `now_ms`. Fixed order: weather, thunder,
    /// emission, storm scheduler, particles, scenery, camera.
    pub fn update(&mut self, now_ms: u64, dt: f32, rng: &mut impl Rng) {
        self.now_ms = now_ms;
        self.dt = dt;

        if let Some(tier) = self.weather.update(now_ms, rng) {
            info!(
                weather = tier.name(),
                intensity = self.weather.intensity(),
                target_wind = self.weather.target_wind(),
                "Weather changed"
            );
        }
        let ctx = self.context();

        self.thunder
            .update(now_ms, self.config.width, self.config.height, rng);

        let interval = self.weather.rain_interval_ms();
        self.rain.emit(
            &ctx,
            interval,
            self.config.rain_surface_ratio,
            &mut self.ripples,
            rng,
        );
        if self.lightning.auto_strike(&ctx, &mut self.thunder, rng) {
            debug!(bolts = self.lightning.active_count(), "Lightning struck");
        }

        self.rain
            .update(&ctx, &self.pads, &mut self.ripples, &mut self.splashes, rng);
        self.ripples.update(now_ms);
        self.splashes.update(&ctx, &mut self.ripples, rng);
        self.lightning.update(now_ms);

        let scenery: [&mut dyn Layer; 5] = [
            &mut self.stars,
            &mut self.clouds,
            &mut self.reeds,
            &mut self.pads,
            &mut self.flowers,
        ];
        for layer in scenery {
            layer.update(&ctx);
        }

        self.camera.update();
    }

    /// Apply an operator command. `Quit` is left to the caller.
    pub fn apply(&mut self, command: Command, rng: &mut impl Rng) {
        match command {
            Command::SelectWeather(tier) => {
                self.weather.set_target(tier);
                debug!(weather = tier.name(), "Weather selected");
            },
            Command::IntensityUp | Command::IntensityDown => {
                let step = if command == Command::IntensityUp {
                    self.config.intensity_step
                } else {
                    -self.config.intensity_step
                };
                self.weather.adjust_intensity(step);
                debug!(intensity = self.weather.intensity(), "Intensity changed");
            },
            Command::PanLeft => self.camera.pan_by(-self.config.camera_step),
            Command::PanRight => self.camera.pan_by(self.config.camera_step),
            Command::ResetCamera => self.camera.reset(),
            Command::TriggerLightning => {
                let ctx = self.context();
                if !self
                    .lightning
                    .manual_strike(&ctx, &mut self.thunder, rng)
                {
                    debug!(
                        weather = ctx.tier.name(),
                        "Lightning needs heavy rain or a thunderstorm"
                    );
                }
            },
            Command::Quit => {},
        }
    }

    /// Composite the frame back to front
    pub fn render(&self, buffer: &mut PixelBuffer) {
        let ctx = self.context();
        buffer.clear(SKY);
        if ctx.flash > 0 {
            buffer.overlay(Rgba::new(ctx.flash, ctx.flash, ctx.flash, FLASH_OVERLAY_ALPHA));
        }

        self.stars.render(buffer, &ctx);
        self.moon.render(buffer, &ctx);
        if ctx.tier >= WeatherTier::MediumRain {
            self.clouds.render(buffer, &ctx);
        }
        self.lightning.render(buffer);
        self.mountains.render(buffer, &ctx);

        let water = ctx.water_line as i32;
        let pond_rows = (ctx.height as i32 - water).max(0) as u32;
        buffer.fill_rect(0, water, ctx.width, pond_rows, POND);

        self.reeds.render(buffer, &ctx);
        self.pads.render(buffer, &ctx);
        self.flowers.render(buffer, &ctx);

        self.ripples.render(buffer, &ctx);
        self.splashes.render(buffer, &ctx);
        self.rain.render(buffer, &ctx);

        self.render_rumble(buffer);
        hud::draw(buffer, &ctx, self.thunder.is_active());
    }

    fn render_rumble(&self, buffer: &mut PixelBuffer) {
        let alpha = (RUMBLE_ALPHA * self.thunder.strength()) as u8;
        let color = Rgba::new(255, 255, 255, alpha);
        for stroke in self.thunder.strokes() {
            buffer.hline(stroke.x, stroke.x + stroke.length, stroke.y, color);
        }
    }

    pub fn weather(&self) -> &WeatherController {
        &self.weather
    }

    pub fn thunder(&self) -> &Thunder {
        &self.thunder
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn rain(&self) -> &Rain {
        &self.rain
    }

    pub fn ripples(&self) -> &Ripples {
        &self.ripples
    }

    pub fn splashes(&self) -> &Splashes {
        &self.splashes
    }

    pub fn lightning(&self) -> &Lightning {
        &self.lightning
    }
}

/// Context used while the scene itself is still being built
fn initial_context(config: &PondConfig) -> FrameContext {
    FrameContext {
        now_ms: 0,
        dt: 0.0,
        tier: WeatherTier::LightRain,
        intensity: config.initial_intensity,
        wind: 0.0,
        camera_x: 0.0,
        water_line: config.water_line(),
        width: config.width,
        height: config.height,
        flash: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn small_config() -> PondConfig {
        PondConfig {
            width: 320,
            height: 240,
            ..PondConfig::default()
        }
    }

    fn run(scene: &mut PondScene, rng: &mut SmallRng, from_ms: u64, frames: u64) -> u64 {
        let mut now = from_ms;
        for _ in 0..frames {
            now += 16;
            scene.update(now, 0.016, rng);
        }
        now
    }

    #[test]
    fn rain_builds_up_and_pools_stay_bounded() {
        let mut rng = SmallRng::seed_from_u64(81);
        let config = small_config();
        let pools = config.pools;
        let mut scene = PondScene::new(config, 0, &mut rng);
        scene.apply(Command::SelectWeather(WeatherTier::Thunderstorm), &mut rng);
        scene.apply(Command::IntensityUp, &mut rng);

        let mut now = 0;
        for _ in 0..50 {
            now = run(&mut scene, &mut rng, now, 20);
            assert!(scene.rain().active_count() <= pools.raindrops);
            assert!(scene.ripples().active_count() <= pools.ripples);
            assert!(scene.splashes().active_count() <= pools.splashes);
            assert!(scene.lightning().active_count() <= pools.lightning);
        }
        assert!(scene.rain().active_count() > 0);
        assert!(scene.ripples().active_count() > 0);
    }

    #[test]
    fn selected_weather_applies_next_frame() {
        let mut rng = SmallRng::seed_from_u64(82);
        let mut scene = PondScene::new(small_config(), 0, &mut rng);
        assert_eq!(scene.weather().current(), WeatherTier::LightRain);
        scene.apply(Command::SelectWeather(WeatherTier::HeavyRain), &mut rng);
        assert_eq!(scene.weather().current(), WeatherTier::LightRain);
        scene.update(16, 0.016, &mut rng);
        assert_eq!(scene.weather().current(), WeatherTier::HeavyRain);
    }

    #[test]
    fn intensity_commands_step_and_clamp() {
        let mut rng = SmallRng::seed_from_u64(83);
        let mut scene = PondScene::new(small_config(), 0, &mut rng);
        assert_eq!(scene.weather().intensity(), 50);
        scene.apply(Command::IntensityUp, &mut rng);
        assert_eq!(scene.weather().intensity(), 60);
        for _ in 0..20 {
            scene.apply(Command::IntensityDown, &mut rng);
        }
        assert_eq!(scene.weather().intensity(), 0);
    }

    #[test]
    fn camera_commands_pan_and_reset() {
        let mut rng = SmallRng::seed_from_u64(84);
        let mut scene = PondScene::new(small_config(), 0, &mut rng);
        scene.apply(Command::PanRight, &mut rng);
        scene.apply(Command::PanRight, &mut rng);
        assert_eq!(scene.camera().target_x(), 200.0);
        scene.apply(Command::PanLeft, &mut rng);
        assert_eq!(scene.camera().target_x(), 100.0);
        let now = run(&mut scene, &mut rng, 0, 200);
        assert!(!scene.camera().is_moving());
        assert_eq!(scene.camera().x(), 100.0);
        scene.apply(Command::ResetCamera, &mut rng);
        run(&mut scene, &mut rng, now, 200);
        assert_eq!(scene.camera().x(), 0.0);
    }

    #[test]
    fn manual_lightning_only_in_severe_weather() {
        let mut rng = SmallRng::seed_from_u64(85);
        let mut scene = PondScene::new(small_config(), 0, &mut rng);
        scene.apply(Command::TriggerLightning, &mut rng);
        assert_eq!(scene.lightning().active_count(), 0);
        assert!(!scene.thunder().is_active());

        scene.apply(Command::SelectWeather(WeatherTier::Thunderstorm), &mut rng);
        scene.update(16, 0.016, &mut rng);
        scene.apply(Command::TriggerLightning, &mut rng);
        assert!(scene.lightning().active_count() >= 1);
        assert!(scene.thunder().is_active());
        assert!(scene.context().flash > 0);
    }

    #[test]
    fn flash_lights_the_sky() {
        let mut rng = SmallRng::seed_from_u64(86);
        let mut scene = PondScene::new(small_config(), 0, &mut rng);
        let mut buffer = PixelBuffer::with_size(320, 240);
        // Top-right corner of the sky, clear of the moon and the HUD
        let sky_red = |buffer: &PixelBuffer| -> u32 {
            (280..320)
                .flat_map(|x| (0..8).map(move |y| (x, y)))
                .filter_map(|(x, y)| buffer.get_pixel(x, y))
                .map(|c| u32::from(c.r))
                .sum()
        };

        scene.render(&mut buffer);
        let pond_pixels = (0..320)
            .filter(|&x| buffer.get_pixel(x, 239) == Some(POND))
            .count();
        assert!(pond_pixels > 0);
        let dark = sky_red(&buffer);

        scene.apply(Command::SelectWeather(WeatherTier::HeavyRain), &mut rng);
        scene.update(16, 0.016, &mut rng);
        scene.apply(Command::TriggerLightning, &mut rng);
        scene.render(&mut buffer);
        assert!(sky_red(&buffer) > dark + 320 * 20);
    }

    #[test]
    fn long_run_stays_finite() {
        let mut rng = SmallRng::seed_from_u64(87);
        let config = PondConfig {
            weather_duration_min_ms: 500,
            weather_duration_max_ms: 1_000,
            ..small_config()
        };
        let mut scene = PondScene::new(config, 0, &mut rng);
        let mut buffer = PixelBuffer::with_size(320, 240);
        let mut now = 0;
        for _ in 0..30 {
            now = run(&mut scene, &mut rng, now, 30);
            scene.render(&mut buffer);
            let w = scene.weather().wind();
            assert!((-1.0..=1.0).contains(&w));
            assert!((0..=100).contains(&scene.weather().intensity()));
        }
    }
}
