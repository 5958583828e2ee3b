use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;
use wavescope_client::{Client, FrameScheduler};
use wavescope_common::{Color, Transform};
use wavescope_render::RecordingContext;
use wavescope_scene::{CameraPose, ObjectKind, Spin};

#[derive(Parser)]
#[command(name = "wavescope-cli", about = "Headless driver for the wavescope engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and defaults
    Info,
    /// Drive the demo scene for a fixed number of simulated ticks
    Run {
        /// Simulated session length in milliseconds
        #[arg(short, long, default_value = "1000")]
        duration_ms: u64,
        /// Target frame rate
        #[arg(short, long, default_value = "30")]
        fps: u32,
        /// Viewport width in pixels
        #[arg(long, default_value = "800")]
        width: u32,
        /// Viewport height in pixels
        #[arg(long, default_value = "600")]
        height: u32,
    },
    /// Print the demo scene state as JSON after one update
    Dump {
        /// Elapsed time to advance to before dumping
        #[arg(short, long, default_value = "0")]
        elapsed_ms: u64,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
    },
}

/// Populate the reference scene: a backdrop panel behind a spinning wave
/// surface, viewed from the tilted reference camera.
fn spawn_demo_scene(client: &mut Client<RecordingContext>) {
    client.set_camera(CameraPose::tilted());
    client.spawn(
        ObjectKind::Panel {
            color: Color::DEEP_BLUE,
        },
        Transform::default(),
    );
    let surface = client.spawn(ObjectKind::Surface { resolution: 100 }, Transform::default());
    client.set_spin(surface, Spin::new(Vec3::Y, 0.2));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("wavescope-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "scheduler: {} ms period (~{} fps)",
                FrameScheduler::default().period_ms(),
                1000 / FrameScheduler::default().period_ms()
            );
            println!(
                "surface: up to {} cells per side, amplitude {}",
                wavescope_surface::MAX_GRID_CELLS,
                wavescope_surface::WaveParams::default().amplitude
            );
        }
        Commands::Run {
            duration_ms,
            fps,
            width,
            height,
        } => {
            let mut client = Client::with_context(RecordingContext::new());
            spawn_demo_scene(&mut client);

            let mut scheduler = FrameScheduler::with_fps(fps);
            let mut frames = 0u64;
            let mut drawn = 0usize;
            let mut failed = 0usize;

            for now_ms in 0..=duration_ms {
                if !scheduler.frame_due(now_ms) {
                    continue;
                }
                client.update(now_ms as i64, height as i32, width as i32)?;
                let stats = client.render()?;
                frames += 1;
                drawn += stats.drawn;
                failed += stats.failures.len();
            }

            println!(
                "ran {duration_ms} ms at {fps} fps target: {frames} frames, {drawn} draws, {failed} failures"
            );
            println!(
                "final phase: {:.2} rad over {} objects",
                client.scene().phase(),
                client.scene().object_count()
            );
        }
        Commands::Dump {
            elapsed_ms,
            width,
            height,
        } => {
            let mut client = Client::with_context(RecordingContext::new());
            spawn_demo_scene(&mut client);
            client.update(elapsed_ms as i64, height as i32, width as i32)?;
            println!("{}", serde_json::to_string_pretty(client.scene())?);
        }
    }

    Ok(())
}
