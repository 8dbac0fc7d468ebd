mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{AppConfig, Cli};
use hellogpu_input::Action;
use hellogpu_render::RenderState;
use hellogpu_render_wgpu::{GpuContext, SceneRenderer, SceneSetup, request_device};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

fn action_for_key(key: KeyCode) -> Action {
    match key {
        KeyCode::ArrowUp => Action::IncreaseMix,
        KeyCode::ArrowDown => Action::DecreaseMix,
        KeyCode::Escape => Action::Quit,
        _ => Action::Noop,
    }
}

/// Window, surface and scene, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    ctx: GpuContext,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: SceneRenderer,
}

struct GpuApp {
    config: AppConfig,
    state: RenderState,
    gpu: Option<Gpu>,
    /// Setup failure that ended the event loop.
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: AppConfig) -> Self {
        let state = RenderState::with_mix(config.initial_mix);
        Self {
            config,
            state,
            gpu: None,
            fatal: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create the window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create the window surface")?;
        let ctx = request_device(&instance, Some(&surface))
            .context("failed to initialize the graphics API")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&ctx.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctx.device, &surface_config);

        let (vertex_path, fragment_path) = self.config.shader_paths();
        let setup = SceneSetup {
            scene: self.config.scene,
            vertex_path,
            fragment_path,
            images: self.config.load_images()?,
            clear_color: self.config.clear_color(),
        };
        let renderer = SceneRenderer::new(&ctx.device, &ctx.queue, surface_format, &setup)?;

        Ok(Gpu {
            window,
            surface,
            ctx,
            surface_config,
            renderer,
        })
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        let action = action_for_key(key);
        if action.is_quit() {
            tracing::info!("escape pressed, closing");
            event_loop.exit();
            return;
        }
        if self.state.apply(action) {
            tracing::info!(mix = self.state.mix(), "blend intensity");
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.ctx.device, &gpu.surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gpu.renderer
            .render(&gpu.ctx.device, &gpu.ctx.queue, &view, &self.state);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.init(event_loop) {
            Ok(gpu) => {
                tracing::info!(
                    scene = %self.config.scene,
                    backend = gpu.ctx.adapter.get_info().backend.to_str(),
                    "window ready"
                );
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("{e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
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
                if let Some(gpu) = &mut self.gpu {
                    gpu.surface_config.width = new_size.width.max(1);
                    gpu.surface_config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.ctx.device, &gpu.surface_config);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.handle_key(event_loop, key);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = AppConfig::from_cli(&cli)?;
    tracing::info!(scene = %config.scene, "hellogpu-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_adjust_mix() {
        assert_eq!(action_for_key(KeyCode::ArrowUp), Action::IncreaseMix);
        assert_eq!(action_for_key(KeyCode::ArrowDown), Action::DecreaseMix);
    }

    #[test]
    fn escape_quits_and_other_keys_do_nothing() {
        assert_eq!(action_for_key(KeyCode::Escape), Action::Quit);
        assert_eq!(action_for_key(KeyCode::KeyW), Action::Noop);
    }
}
