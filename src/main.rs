use clap::Parser;
use cumulus::display::{Display, InputEvent, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use cumulus::remote::{MqttRemote, RemoteCommand, DEFAULT_PORT, DEFAULT_TOPIC};
use cumulus::util::FrameClock;
use cumulus::{Controls, PixelBuffer, Rgba, Scene};
use sdl2::keyboard::Keycode;
use std::path::PathBuf;

const WIND_STEP_DEGREES: f32 = 15.0;
const FPS_LOG_INTERVAL_MS: f64 = 5000.0;

/// Drifting procedural clouds
#[derive(Parser, Debug)]
#[command(name = "cumulus", version, about)]
struct Args {
    /// Window width in pixels
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Window height in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Disable VSync for uncapped framerate
    #[arg(long)]
    no_vsync: bool,

    /// Scene file (JSON). The built-in sky is used when omitted.
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Write the scene in use to this file before starting
    #[arg(long)]
    save_scene: Option<PathBuf>,

    /// Initial wind direction in degrees (0 = toward the right)
    #[arg(long)]
    wind: Option<f32>,

    /// Seed for reproducible cloud shapes
    #[arg(long)]
    seed: Option<u64>,

    /// Sky color of the back layer, e.g. "rgba(0, 0, 40, 0.3)" or "#87ceeb"
    #[arg(long)]
    sky: Option<Rgba>,

    /// MQTT broker host for remote control
    #[arg(long)]
    mqtt: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    mqtt_port: u16,

    #[arg(long, default_value = DEFAULT_TOPIC)]
    topic: String,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let (width, height) = (args.width, args.height);

    let mut scene = match &args.scene {
        Some(path) => Scene::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => Scene::default(),
    };
    if let Some(wind) = args.wind {
        scene.wind_degrees = wind;
    }
    if let Some(path) = &args.save_scene {
        scene.save(path).map_err(|e| e.to_string())?;
        log::info!("scene saved to {}", path.display());
    }

    let (mut display, texture_creator) =
        Display::with_options("cumulus", width, height, !args.no_vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut frame = PixelBuffer::with_size(width, height);

    log::info!("generating clouds for {}x{}", width, height);
    let backdrop = scene.render_backdrop(width, height, args.seed);
    let mut fields = scene
        .build_layers(width, height, args.seed)
        .map_err(|e| e.to_string())?;

    let remote = match &args.mqtt {
        Some(host) => Some(
            MqttRemote::connect(host, args.mqtt_port, &args.topic).map_err(|e| e.to_string())?,
        ),
        None => None,
    };

    let mut controls = Controls::new(scene.wind_degrees);
    if let Some(sky) = args.sky {
        controls.apply(&RemoteCommand::Sky(sky), &mut fields);
    }
    for field in &mut fields {
        field.draw();
    }
    controls.apply(&RemoteCommand::Play, &mut fields);

    log::info!("Controls: Space play/pause, Left/Right wind, F fps, Escape quit");

    let mut clock = FrameClock::new(120);
    let mut last_fps_log = 0.0;

    'main: loop {
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::Space => controls.apply(&RemoteCommand::Toggle, &mut fields),
                    Keycode::Left => controls.turn_wind(-WIND_STEP_DEGREES, &mut fields),
                    Keycode::Right => controls.turn_wind(WIND_STEP_DEGREES, &mut fields),
                    Keycode::F => controls.toggle_fps(),
                    _ => {},
                },
            }
        }
        if let Some(remote) = &remote {
            for command in remote.poll() {
                controls.apply(&command, &mut fields);
            }
        }

        let now = clock.tick();
        for field in &mut fields {
            field.dispatch(now);
        }

        frame.clear_rgba(0, 0, 0, 255);
        frame.composite(&backdrop, 0, 0);
        for field in &fields {
            frame.composite(field.surface(), 0, 0);
        }
        display.present(&mut target, &frame)?;

        if controls.show_fps() && now - last_fps_log >= FPS_LOG_INTERVAL_MS {
            let (min_fps, max_fps) = clock.min_max_fps();
            log::info!(
                "FPS {:.0} avg  {:.0} min  {:.0} max  {:.1}ms",
                clock.avg_fps(),
                min_fps,
                max_fps,
                clock.avg_frame_time_ms()
            );
            last_fps_log = now;
        }
    }

    Ok(())
}
