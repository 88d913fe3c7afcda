use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hugfield::draw::{self, Canvas};
use hugfield::{InputState, Key, RenderStyleKind, SimConfig, Simulation, SpawnLayout};
use pixels::{Pixels, SurfaceTexture};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use winit::dpi::LogicalSize;
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

/// Physical keys and the simulation key they stand for. Not remappable.
const KEY_MAP: &[(VirtualKeyCode, Key)] = &[
    (VirtualKeyCode::Up, Key::Up),
    (VirtualKeyCode::W, Key::Up),
    (VirtualKeyCode::Down, Key::Down),
    (VirtualKeyCode::S, Key::Down),
    (VirtualKeyCode::Left, Key::Left),
    (VirtualKeyCode::A, Key::Left),
    (VirtualKeyCode::Right, Key::Right),
    (VirtualKeyCode::D, Key::Right),
    (VirtualKeyCode::Space, Key::Identify),
    (VirtualKeyCode::H, Key::Connect),
    (VirtualKeyCode::LShift, Key::Connect),
];

#[derive(Parser, Debug)]
#[command(
    name = "hugfield",
    version,
    about = "Drifting entities that flash, trail, and link up when they reach for each other"
)]
struct Cli {
    /// JSON configuration file; missing fields use defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of autonomous entities.
    #[arg(long)]
    count: Option<usize>,
    /// Seed for the simulation RNG.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    style: Option<StyleArg>,
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
    /// Run without a player-controlled entity.
    #[arg(long)]
    solo: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StyleArg {
    Squares,
    Orbs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Random,
    Clustered,
    Centered,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(
        width = config.width,
        height = config.height,
        autonomous = config.autonomous_count,
        style = ?config.style,
        "starting hugfield"
    );

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();

    let window = WindowBuilder::new()
        .with_title("hugfield")
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_min_inner_size(LogicalSize::new(160.0, 120.0))
        .build(&event_loop)
        .context("failed to create window")?;

    let size = window.inner_size();
    let (mut buf_w, mut buf_h) = (size.width.max(1), size.height.max(1));
    let mut pixels = {
        let surface_texture = SurfaceTexture::new(buf_w, buf_h, &window);
        Pixels::new(buf_w, buf_h, surface_texture).context("failed to create pixel surface")?
    };

    let style = draw::style_for(config.style);
    let config = fit_to_surface(config, buf_w, buf_h);
    let mut sim = Simulation::new(config).context("invalid simulation configuration")?;
    let mut keys = InputState::new();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            let mut canvas = Canvas::new(pixels.frame_mut(), buf_w, buf_h);
            draw::render(&mut canvas, &sim, style.as_ref());
            if let Err(err) = pixels.render() {
                error!(%err, "render failed");
                *control_flow = ControlFlow::Exit;
                return;
            }
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape) || input.close_requested() || input.destroyed() {
                *control_flow = ControlFlow::Exit;
                return;
            }

            if let Some(size) = input.window_resized() {
                if size.width > 0 && size.height > 0 {
                    if let Err(err) = pixels.resize_surface(size.width, size.height) {
                        error!(%err, "surface resize failed");
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    if let Err(err) = pixels.resize_buffer(size.width, size.height) {
                        error!(%err, "buffer resize failed");
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    buf_w = size.width;
                    buf_h = size.height;
                    sim.resize(buf_w as f32, buf_h as f32);
                }
            }

            sync_keys(
                &mut keys,
                |code| input.key_held(code),
                |code| input.key_pressed(code),
            );
            sim.step(&keys.snapshot());
            keys.end_frame();

            window.request_redraw();
        }
    });
}

/// Spawn and steer in physical pixels: the window may have been scaled from the
/// logical size the config asked for.
fn fit_to_surface(mut config: SimConfig, width: u32, height: u32) -> SimConfig {
    config.width = width.max(1) as f32;
    config.height = height.max(1) as f32;
    config
}

/// Copy held keys into the simulation's table. The flash also listens to
/// presses, so a tap released before the end of the frame is not lost.
fn sync_keys(
    keys: &mut InputState,
    held: impl Fn(VirtualKeyCode) -> bool,
    pressed: impl Fn(VirtualKeyCode) -> bool,
) {
    keys.sync_held(
        KEY_MAP
            .iter()
            .filter(|(code, _)| held(*code))
            .map(|(_, key)| *key),
    );
    for (code, key) in KEY_MAP {
        if *key == Key::Identify && pressed(*code) {
            keys.mark_pressed(*key);
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SimConfig::from_json_str(&text)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(count) = cli.count {
        config.autonomous_count = count;
    }
    if let Some(seed) = cli.seed {
        config.rng_seed = Some(seed);
    }
    if let Some(style) = cli.style {
        config.style = match style {
            StyleArg::Squares => RenderStyleKind::Squares,
            StyleArg::Orbs => RenderStyleKind::Orbs,
        };
    }
    if let Some(layout) = cli.layout {
        config.layout = match layout {
            LayoutArg::Random => SpawnLayout::Random,
            LayoutArg::Clustered => SpawnLayout::Clustered,
            LayoutArg::Centered => SpawnLayout::Centered,
        };
    }
    if cli.solo {
        config.player = false;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_window_spawns_across_physical_surface() {
        let config = fit_to_surface(
            SimConfig {
                rng_seed: Some(21),
                autonomous_count: 60,
                ..SimConfig::default()
            },
            1600,
            1200,
        );
        let sim = Simulation::new(config).expect("valid config");
        assert_eq!(sim.bounds().width, 1600.0);
        assert_eq!(sim.bounds().height, 1200.0);
        assert!(sim.entities().iter().any(|e| e.position().x > 800.0));
        assert!(sim.entities().iter().any(|e| e.position().y > 600.0));
    }

    #[test]
    fn zero_sized_surface_is_clamped() {
        let config = fit_to_surface(SimConfig::default(), 0, 0);
        assert_eq!((config.width, config.height), (1.0, 1.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn space_tap_within_one_frame_flashes() {
        let mut keys = InputState::new();
        sync_keys(&mut keys, |_| false, |code| code == VirtualKeyCode::Space);
        let snap = keys.snapshot();
        assert!(snap.pressed(Key::Identify));
        assert!(!snap.held(Key::Identify));
    }

    #[test]
    fn held_keys_map_through_both_bindings() {
        let mut keys = InputState::new();
        sync_keys(
            &mut keys,
            |code| matches!(code, VirtualKeyCode::W | VirtualKeyCode::LShift),
            |_| false,
        );
        let snap = keys.snapshot();
        assert!(snap.held(Key::Up));
        assert!(snap.held(Key::Connect));
        assert!(!snap.pressed(Key::Identify));
    }
}
