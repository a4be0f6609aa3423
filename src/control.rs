//! Operator commands
//!
//! Key presses are translated into abstract commands before they reach the
//! scene, so the simulation never sees raw key codes.

use crate::weather::WeatherTier;
use sdl2::keyboard::Keycode;

/// Everything the operator can ask of the running scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectWeather(WeatherTier),
    IntensityUp,
    IntensityDown,
    PanLeft,
    PanRight,
    ResetCamera,
    TriggerLightning,
    Quit,
}

/// Key bindings, in the order they are listed at startup
pub const KEY_BINDINGS: [(&str, &str); 8] = [
    ("1-4", "Light rain / medium rain / heavy rain / thunderstorm"),
    ("Up", "Raise intensity"),
    ("Down", "Lower intensity"),
    ("Left", "Pan camera left"),
    ("Right", "Pan camera right"),
    ("Home", "Reset camera"),
    ("Space", "Lightning strike (heavy rain and up)"),
    ("Escape", "Quit"),
];

impl Command {
    pub fn from_keycode(key: Keycode) -> Option<Self> {
        let command = match key {
            Keycode::Num1 | Keycode::Kp1 => Self::SelectWeather(WeatherTier::LightRain),
            Keycode::Num2 | Keycode::Kp2 => Self::SelectWeather(WeatherTier::MediumRain),
            Keycode::Num3 | Keycode::Kp3 => Self::SelectWeather(WeatherTier::HeavyRain),
            Keycode::Num4 | Keycode::Kp4 => Self::SelectWeather(WeatherTier::Thunderstorm),
            Keycode::Up => Self::IntensityUp,
            Keycode::Down => Self::IntensityDown,
            Keycode::Left => Self::PanLeft,
            Keycode::Right => Self::PanRight,
            Keycode::Home => Self::ResetCamera,
            Keycode::Space => Self::TriggerLightning,
            Keycode::Escape => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Write the key summary to the log
pub fn log_key_bindings() {
    tracing::info!("Controls:");
    for (keys, action) in KEY_BINDINGS {
        tracing::info!("  {:<8} - {}", keys, action);
    }
}
