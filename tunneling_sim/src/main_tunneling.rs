//! Quantum Tunneling, 3D scene
//!
//! Particles stream from the left towards a translucent barrier. Each one
//! either tunnels through (turning green) or reflects (turning red).
//!
//! Usage: `quantum_tunneling_3d [config.toml]`
//!
//! Controls:
//! - Left drag: Orbit the camera
//! - Scroll: Zoom
//! - Space: Pause/resume
//! - R: Reset simulation

use common::{Camera3D, GraphicsContext};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tunneling_sim::equations_ui::{
    draw_equations_sidebar, draw_labels, draw_status_bar, ScreenLabel, StatusLine,
    TUNNELING_EQUATIONS, TUNNELING_VARIABLES,
};
use tunneling_sim::overlay::EguiOverlay;
use tunneling_sim::renderer::{particles_to_points, stars_to_points, ParticleRenderer};
use tunneling_sim::scene::{barrier_3d, floor_grid, Segment, Starfield, GRID_COLOR};
use tunneling_sim::{Clock, LabelBoard, ParticleSimulator, SimulatorConfig, SystemClock};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const PARTICLE_SIZE: f32 = 0.06;
const STAR_SIZE: f32 = 0.02;

struct App {
    ctx: GraphicsContext,
    renderer: ParticleRenderer,
    overlay: EguiOverlay,
    simulation: ParticleSimulator<StdRng, SystemClock>,
    labels: LabelBoard,
    starfield: Starfield,
    static_lines: Vec<Segment>,
    camera: Camera3D,
    cursor: PhysicalPosition<f64>,
    dragging: bool,
    paused: bool,
}

impl App {
    fn new(ctx: GraphicsContext, config: SimulatorConfig) -> Self {
        let renderer = ParticleRenderer::new(&ctx, 2048, 128);
        let overlay = EguiOverlay::new(&ctx);
        let camera = Camera3D::new(ctx.aspect_ratio());

        let labels = LabelBoard::new(config.labels.clone());
        let simulation = ParticleSimulator::new(config, StdRng::from_entropy(), SystemClock::new());

        let mut static_lines = floor_grid(20.0, 40, -1.0, GRID_COLOR);
        static_lines.extend(barrier_3d());

        Self {
            ctx,
            renderer,
            overlay,
            simulation,
            labels,
            starfield: Starfield::preset(),
            static_lines,
            camera,
            cursor: PhysicalPosition::new(0.0, 0.0),
            dragging: false,
            paused: false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
    }

    fn update(&mut self) {
        if !self.paused {
            let now = self.simulation.clock().now();
            self.simulation.spawn();
            let report = self.simulation.tick(now);
            self.labels.observe(&report, now);
        }
        self.starfield.rotate();
    }

    fn screen_labels(&self) -> Vec<ScreenLabel> {
        let now = self.simulation.clock().now();
        let scale = self.ctx.window.scale_factor() as f32;
        let (width, height) = (self.ctx.size.width as f32, self.ctx.size.height as f32);

        self.labels
            .labels()
            .iter()
            .filter_map(|label| {
                let particle = self
                    .simulation
                    .live_particles()
                    .iter()
                    .find(|p| p.id() == label.particle)?;
                let screen = self.camera.project_to_screen(particle.position(), width, height)?;
                Some(ScreenLabel {
                    position: egui::pos2(screen.x / scale, screen.y / scale - label.rise),
                    text: label.text,
                    color: label.color,
                    opacity: self.labels.opacity(label, now),
                })
            })
            .collect()
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera_3d(&self.ctx.queue, &self.camera);

        let num_lines = self.renderer.update_lines(&self.ctx.queue, &self.static_lines);

        let mut points = stars_to_points(self.starfield.positions(), STAR_SIZE);
        points.extend(particles_to_points(self.simulation.live_particles(), PARTICLE_SIZE));
        let num_points = self.renderer.update_points(&self.ctx.queue, &points);

        let screen_labels = self.screen_labels();
        let stats = self.simulation.stats();
        let config = self.simulation.config();
        let status = StatusLine {
            scene: "Quantum Tunneling 3D",
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
            draw_equations_sidebar(ctx, "Quantum Tunneling", TUNNELING_EQUATIONS, TUNNELING_VARIABLES);
            draw_status_bar(ctx, &status, &stats);
            draw_labels(ctx, &screen_labels);
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
            KeyCode::Space => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
            }
            KeyCode::KeyR => {
                self.simulation.reset();
                self.labels.clear();
            }
            _ => {}
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed && !self.overlay.wants_pointer();
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if self.dragging {
            let dx = (position.x - self.cursor.x) as f32;
            let dy = (position.y - self.cursor.y) as f32;
            self.camera.drag(dx, dy);
        }
        self.cursor = position;
    }

    fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        // Positive means "scroll down" (zoom out), matching pixel deltas
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, y) => -y * 100.0,
            MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
        };
        self.camera.zoom(pixels);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.overlay.handle_event(&self.ctx, event)
    }

    /// Drop everything the view owns; runs unconditionally on close
    fn shutdown(&mut self) {
        let stats = self.simulation.stats();
        log::info!(
            "Shutting down: {} spawned, {} tunneled, {} reflected",
            stats.spawned,
            stats.tunneled,
            stats.reflected
        );
        self.labels.clear();
        self.simulation.reset();
    }
}

fn main() -> anyhow::Result<()> {
    tunneling_sim::init_logging();

    let config = tunneling_sim::config_from_args(SimulatorConfig::scene_3d())?;
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Quantum Tunneling - 3D Particle Barrier",
        1280,
        720,
    ))?;

    let mut app = App::new(ctx, config);

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.handle_window_event(event);

                match event {
                    WindowEvent::CloseRequested => {
                        app.shutdown();
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => app.resize(*size),
                    WindowEvent::CursorMoved { position, .. } => app.handle_cursor(*position),
                    WindowEvent::CursorLeft { .. } => app.dragging = false,
                    WindowEvent::MouseInput { state, button, .. } if !consumed => {
                        app.handle_mouse_button(*button, *state)
                    }
                    WindowEvent::MouseInput { state: ElementState::Released, .. } => {
                        app.dragging = false
                    }
                    WindowEvent::MouseWheel { delta, .. } if !consumed => app.handle_scroll(*delta),
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
