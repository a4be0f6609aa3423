// Accessors kept for tests and diagnostics are not all read by the binary
#![allow(dead_code)]

mod camera;
mod config;
mod control;
mod depth;
mod display;
mod error;
mod hud;
mod particles;
mod perf;
mod pool;
mod scene;
mod scenery;
mod texture;
mod weather;

use config::PondConfig;
use control::Command;
use display::{Display, InputEvent, PixelBuffer, RenderTarget};
use error::PondResult;
use perf::{ms_since, pacing_delay, FrameClock, PerfStats, PhaseTimes};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use scene::PondScene;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

/// Longest step the simulation takes after a stall (window drag, debugger)
const MAX_DT: f32 = 0.25;

/// Command line overrides, applied on top of the config file
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config_path: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    no_vsync: bool,
    help: bool,
}

impl CliArgs {
    fn apply(&self, config: &mut PondConfig) {
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if self.no_vsync {
            config.vsync = false;
        }
    }
}

/// Parse command line arguments (first element is the program name)
fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => cli.no_vsync = true,
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    cli.config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        cli.width = Some(w);
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        cli.height = Some(h);
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // WxH, e.g. 1280x720
                    if let Some((w, h)) = args[i + 1].split_once('x') {
                        if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                            cli.width = Some(w);
                            cli.height = Some(h);
                        }
                    }
                    i += 1;
                }
            },
            "--help" => cli.help = true,
            other => tracing::warn!(arg = other, "ignoring unknown argument"),
        }
        i += 1;
    }

    cli
}

fn print_help() {
    let defaults = PondConfig::default();
    println!("Usage: night-pond [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config PATH, -c PATH    Load settings from a JSON file");
    println!(
        "  --width W, -w W           Set window width (default: {})",
        defaults.width
    );
    println!(
        "  --height H, -h H          Set window height (default: {})",
        defaults.height
    );
    println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1280x720)");
    println!("  --no-vsync                Disable VSync");
    println!("  --help                    Show this help message");
    println!();
    println!("Log level is read from RUST_LOG (default: info).");
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "startup failed");
            ExitCode::FAILURE
        },
    }
}

fn run() -> PondResult<()> {
    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args);
    if cli.help {
        print_help();
        return Ok(());
    }

    let mut config = match &cli.config_path {
        Some(path) => {
            info!(path = %path, "Loading config");
            PondConfig::load(path)?
        },
        None => PondConfig::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    let (width, height) = (config.width, config.height);
    info!(width, height, vsync = config.vsync, "Starting night-pond");

    let (mut display, texture_creator) =
        Display::with_options("night-pond", width, height, config.vsync)?;
    let backend = display.backend();
    info!(?backend, "Renderer ready");
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut buffer = PixelBuffer::with_size(width, height);

    let mut rng = SmallRng::from_entropy();
    let mut clock = FrameClock::new();
    let budget_ms = config.frame_budget_ms();
    let mut scene = PondScene::new(config, clock.now_ms(), &mut rng);
    control::log_key_bindings();

    let mut perf = PerfStats::new();

    'main: loop {
        let frame_start = Instant::now();
        let (now_ms, dt) = clock.tick();

        let input_start = Instant::now();
        for event in display.poll_events() {
            let command = match event {
                InputEvent::Quit => Command::Quit,
                InputEvent::KeyDown(key) => match Command::from_keycode(key) {
                    Some(command) => command,
                    None => continue,
                },
            };
            if command == Command::Quit {
                break 'main;
            }
            scene.apply(command, &mut rng);
        }
        let input_ms = ms_since(input_start);

        let physics_start = Instant::now();
        scene.update(now_ms, dt.min(MAX_DT), &mut rng);
        let physics_ms = ms_since(physics_start);

        let render_start = Instant::now();
        scene.render(&mut buffer);
        display.present(&mut target, &buffer);
        let render_ms = ms_since(render_start);

        if let Some(delay) = pacing_delay(frame_start.elapsed(), budget_ms) {
            std::thread::sleep(delay);
        }

        let due = perf.record(PhaseTimes {
            input_ms,
            physics_ms,
            render_ms,
            frame_ms: ms_since(frame_start),
        });
        if due {
            perf.report();
        }
    }

    info!(frames = perf.frames(), "Shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("night-pond")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_arguments_keeps_defaults() {
        assert_eq!(parse_args(&args(&[])), CliArgs::default());
    }

    #[test]
    fn size_flags_override_config() {
        let cli = parse_args(&args(&["--width", "1024", "-h", "768", "--no-vsync"]));
        let mut config = PondConfig::default();
        cli.apply(&mut config);
        assert_eq!((config.width, config.height), (1024, 768));
        assert!(!config.vsync);
        assert_eq!(config.water_line(), 512.0);
    }

    #[test]
    fn resolution_and_config_path() {
        let cli = parse_args(&args(&["-r", "1280x720", "--config", "storm.json"]));
        assert_eq!(cli.width, Some(1280));
        assert_eq!(cli.height, Some(720));
        assert_eq!(cli.config_path.as_deref(), Some("storm.json"));
    }

    #[test]
    fn malformed_values_are_skipped() {
        let cli = parse_args(&args(&["--width", "wide", "--resolution", "big", "--help"]));
        assert_eq!(cli.width, None);
        assert_eq!(cli.height, None);
        assert!(cli.help);
    }
}
