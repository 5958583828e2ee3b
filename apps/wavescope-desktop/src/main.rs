use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use wavescope_client::{Client, FrameScheduler};
use wavescope_common::{Color, Transform};
use wavescope_render::RenderError;
use wavescope_render_wgpu::WgpuContext;
use wavescope_scene::{CameraPose, ObjectKind, Spin};

#[derive(Parser)]
#[command(name = "wavescope-desktop", about = "Windowed driver for the wavescope engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,
}

struct DesktopApp {
    client: Client<WgpuContext>,
    scheduler: FrameScheduler,
    started: Option<Instant>,
    window: Option<Arc<Window>>,
    initial_size: PhysicalSize<u32>,
}

impl DesktopApp {
    fn new(initial_size: PhysicalSize<u32>) -> Self {
        Self {
            client: Client::new(),
            scheduler: FrameScheduler::default(),
            started: None,
            window: None,
            initial_size,
        }
    }

    /// The reference scene: backdrop panel behind a slowly spinning wave
    /// surface, tilted camera.
    fn spawn_demo_scene(&mut self) {
        self.client.set_camera(CameraPose::tilted());
        self.client.spawn(
            ObjectKind::Panel {
                color: Color::DEEP_BLUE,
            },
            Transform::default(),
        );
        let surface = self
            .client
            .spawn(ObjectKind::Surface { resolution: 100 }, Transform::default());
        self.client.set_spin(surface, Spin::new(Vec3::Y, 0.2));
    }

    fn draw_frame(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(started) = self.started else {
            return;
        };

        let now_ms = started.elapsed().as_millis() as u64;
        if !self.scheduler.frame_due(now_ms) {
            return;
        }

        let size = window.inner_size();
        if let Err(e) = self
            .client
            .update(now_ms as i64, size.height as i32, size.width as i32)
        {
            tracing::error!("update rejected: {e}");
            return;
        }

        match self.client.render() {
            Ok(stats) if !stats.is_clean() => {
                tracing::warn!(failures = stats.failures.len(), "frame had draw failures");
            }
            Ok(_) => {}
            Err(RenderError::ContextUnavailable) => {
                tracing::warn!("graphics context unavailable, frame skipped");
            }
            Err(e) => {
                tracing::error!("render failed: {e}");
            }
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("wavescope")
            .with_inner_size(self.initial_size);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        // Scoped context initialization: a failure here is fatal and
        // surfaced immediately instead of limping along without a GPU.
        match WgpuContext::new(window.clone()) {
            Ok(context) => {
                self.client.bind_context(context);
            }
            Err(e) => {
                tracing::error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.spawn_demo_scene();
        self.started = Some(Instant::now());
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(context) = self.client.context_mut() {
                    context.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.draw_frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("wavescope-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    Ok(())
}
