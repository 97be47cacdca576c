//! Quantum Tunneling, 2D strip
//!
//! A flat side view of the same experiment: up to five particles run along a
//! track, hit the barrier wall in the middle and tunnel or bounce back.
//!
//! Usage: `quantum_tunneling_2d [config.toml]`
//!
//! Controls:
//! - Space: Pause/resume
//! - R: Reset simulation

use common::{Camera2D, GraphicsContext};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tunneling_sim::equations_ui::{draw_status_bar, StatusLine};
use tunneling_sim::overlay::EguiOverlay;
use tunneling_sim::renderer::{particles_to_points, ParticleRenderer};
use tunneling_sim::scene::{strip_2d, Segment};
use tunneling_sim::{ParticleSimulator, SimulatorConfig, SystemClock};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const PARTICLE_SIZE: f32 = 4.0;
const TRACK_HALF_HEIGHT: f32 = 60.0;

struct App {
    ctx: GraphicsContext,
    renderer: ParticleRenderer,
    overlay: EguiOverlay,
    simulation: ParticleSimulator<StdRng, SystemClock>,
    track: Vec<Segment>,
    camera: Camera2D,
    paused: bool,
}

impl App {
    fn new(ctx: GraphicsContext, config: SimulatorConfig) -> Self {
        let renderer = ParticleRenderer::new(&ctx, 256, 16);
        let overlay = EguiOverlay::new(&ctx);
        let mut camera = Camera2D::new(ctx.aspect_ratio());
        camera.zoom = config.exit_distance * 0.6;

        let track = strip_2d(config.exit_distance, TRACK_HALF_HEIGHT, config.barrier_x);
        let simulation = ParticleSimulator::new(config, StdRng::from_entropy(), SystemClock::new());

        Self {
            ctx,
            renderer,
            overlay,
            simulation,
            track,
            camera,
            paused: false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
    }

    fn update(&mut self) {
        if !self.paused {
            self.simulation.advance();
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera_2d(&self.ctx.queue, &self.camera);

        let num_lines = self.renderer.update_lines(&self.ctx.queue, &self.track);
        let points = particles_to_points(self.simulation.live_particles(), PARTICLE_SIZE);
        let num_points = self.renderer.update_points(&self.ctx.queue, &points);

        let stats = self.simulation.stats();
        let config = self.simulation.config();
        let status = StatusLine {
            scene: "Quantum Tunneling 2D",
            live: self.simulation.live_particles().len(),
            capacity: config.capacity,
            tunnel_probability: config.tunnel_probability,
            paused: self.paused,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render_lines(&mut encoder, &view, num_lines, true);
        self.renderer.render_points(&mut encoder, &view, num_points, false);
        self.overlay.paint(&self.ctx, &mut encoder, &view, |ctx| {
            draw_status_bar(ctx, &status, &stats);
        });

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space => self.paused = !self.paused,
            KeyCode::KeyR => self.simulation.reset(),
            _ => {}
        }
    }

    fn shutdown(&mut self) {
        log::info!("Shutting down after {} particles", self.simulation.stats().spawned);
        self.simulation.reset();
    }
}

fn main() -> anyhow::Result<()> {
    tunneling_sim::init_logging();

    let config = tunneling_sim::config_from_args(SimulatorConfig::scroll_demo())?;
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Quantum Tunneling - 2D Strip",
        960,
        360,
    ))?;

    let mut app = App::new(ctx, config);

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.overlay.handle_event(&app.ctx, event);

                match event {
                    WindowEvent::CloseRequested => {
                        app.shutdown();
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => app.resize(*size),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state,
                                ..
                            },
                        ..
                    } if !consumed => app.handle_key(*key, *state),
                    WindowEvent::RedrawRequested => {
                        app.update();
                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("Out of GPU memory, exiting");
                                app.shutdown();
                                elwt.exit();
                            }
                            Err(e) => log::warn!("Render error: {:?}", e),
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
