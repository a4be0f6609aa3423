//! Status panel in the top-left corner: tier swatch, intensity and wind
//! bars, thunder indicator

use crate::depth::Rgba;
use crate::display::PixelBuffer;
use crate::scene::FrameContext;
use crate::weather::WeatherTier;

const PANEL: (i32, i32, u32, u32) = (10, 10, 250, 80);
const PANEL_COLOR: Rgba = Rgba::new(0, 0, 0, 200);
const BAR_X: i32 = 20;
const BAR_WIDTH: u32 = 200;
const BAR_HEIGHT: u32 = 10;
const INTENSITY_BAR_Y: i32 = 45;
const WIND_BAR_Y: i32 = 65;
const BAR_TRACK: Rgba = Rgba::opaque(50, 50, 50);
const WIND_MARKER: Rgba = Rgba::opaque(150, 150, 255);
const WIND_MARKER_WIDTH: u32 = 6;
const CENTRE_TICK: Rgba = Rgba::opaque(200, 200, 200);
const SWATCH: (i32, i32) = (20, 20);
const THUNDER_LAMP: (i32, i32) = (170, 20);
const LAMP_SIZE: u32 = 15;
const THUNDER_COLOR: Rgba = Rgba::opaque(255, 255, 0);
/// Thunder lamp toggles every this many ms (5 Hz blink)
const BLINK_MS: u64 = 100;

pub fn tier_color(tier: WeatherTier) -> Rgba {
    match tier {
        WeatherTier::LightRain => Rgba::opaque(100, 200, 255),
        WeatherTier::MediumRain => Rgba::opaque(80, 150, 200),
        WeatherTier::HeavyRain => Rgba::opaque(50, 100, 150),
        WeatherTier::Thunderstorm => Rgba::opaque(30, 70, 120),
    }
}

/// Filled part of the intensity bar in pixels
pub fn intensity_fill(intensity: i32) -> u32 {
    (BAR_WIDTH as i32 * intensity.clamp(0, 100) / 100) as u32
}

/// Left edge of the wind marker relative to the bar start
pub fn wind_marker_x(wind: f32) -> i32 {
    let half = BAR_WIDTH as i32 / 2;
    half + (wind * half as f32) as i32 - WIND_MARKER_WIDTH as i32 / 2
}

pub fn draw(buffer: &mut PixelBuffer, ctx: &FrameContext, thunder_active: bool) {
    let (x, y, w, h) = PANEL;
    buffer.fill_rect(x, y, w, h, PANEL_COLOR);

    let color = tier_color(ctx.tier);
    buffer.fill_rect(SWATCH.0, SWATCH.1, LAMP_SIZE, LAMP_SIZE, color);

    buffer.fill_rect(BAR_X, INTENSITY_BAR_Y, BAR_WIDTH, BAR_HEIGHT, BAR_TRACK);
    buffer.fill_rect(
        BAR_X,
        INTENSITY_BAR_Y,
        intensity_fill(ctx.intensity),
        BAR_HEIGHT,
        color,
    );

    buffer.fill_rect(BAR_X, WIND_BAR_Y, BAR_WIDTH, BAR_HEIGHT, BAR_TRACK);
    buffer.fill_rect(
        BAR_X + wind_marker_x(ctx.wind),
        WIND_BAR_Y,
        WIND_MARKER_WIDTH,
        BAR_HEIGHT,
        WIND_MARKER,
    );
    let mid = BAR_X + BAR_WIDTH as i32 / 2;
    buffer.line(mid, WIND_BAR_Y, mid, WIND_BAR_Y + BAR_HEIGHT as i32, CENTRE_TICK);

    if thunder_active && (ctx.now_ms / BLINK_MS) % 2 == 0 {
        buffer.fill_rect(THUNDER_LAMP.0, THUNDER_LAMP.1, LAMP_SIZE, LAMP_SIZE, THUNDER_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_with_state() {
        assert_eq!(intensity_fill(0), 0);
        assert_eq!(intensity_fill(50), 100);
        assert_eq!(intensity_fill(100), 200);
        assert_eq!(wind_marker_x(0.0), 97);
        assert_eq!(wind_marker_x(-1.0), -3);
        assert_eq!(wind_marker_x(1.0), 197);
    }

    #[test]
    fn panel_shows_tier_and_thunder_blink() {
        let mut ctx = FrameContext::for_size(400, 300);
        ctx.tier = WeatherTier::Thunderstorm;
        ctx.intensity = 100;
        let mut buffer = PixelBuffer::with_size(400, 300);
        buffer.clear(Rgba::opaque(0, 0, 20));

        ctx.now_ms = 0;
        draw(&mut buffer, &ctx, true);
        assert_eq!(buffer.get_pixel(25, 25), Some(tier_color(WeatherTier::Thunderstorm)));
        assert_eq!(buffer.get_pixel(175, 25), Some(THUNDER_COLOR));
        // Full intensity bar uses the tier colour end to end
        assert_eq!(buffer.get_pixel(219, 48), Some(tier_color(WeatherTier::Thunderstorm)));

        ctx.now_ms = 150;
        let mut buffer = PixelBuffer::with_size(400, 300);
        draw(&mut buffer, &ctx, true);
        assert_ne!(buffer.get_pixel(175, 25), Some(THUNDER_COLOR));

        // Outside the panel nothing changes
        assert_eq!(buffer.get_pixel(300, 200).map(|c| c.r), Some(0));
    }
}
