//! GPU rendering for particles, stars and scene lines
//!
//! Points are drawn as instanced billboards sized in world units; lines are a
//! plain line list. Both share one camera uniform.

use crate::particle::Particle;
use crate::scene::Segment;
use common::{create_uniform_buffer, create_vertex_buffer, Camera2D, Camera3D, CameraUniform, GraphicsContext};
use bytemuck::Zeroable;
use glam::Vec3;

/// Instance data for one billboard
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

impl PointInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        2 => Float32x3,  // position
        3 => Float32,    // size
        4 => Float32x4,  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Quad vertex for billboards
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Line vertex for barrier outlines and the floor grid
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Background the first pass clears to (#000824)
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.031,
    b: 0.141,
    a: 1.0,
};

pub struct ParticleRenderer {
    point_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    point_buffer: wgpu::Buffer,
    max_points: usize,

    line_pipeline: wgpu::RenderPipeline,
    line_buffer: wgpu::Buffer,
    max_lines: usize,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl ParticleRenderer {
    pub fn new(ctx: &GraphicsContext, max_points: usize, max_lines: usize) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particles.wgsl").into()),
        });

        let camera_buffer = create_uniform_buffer(device, &CameraUniform::zeroed());

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let blend = Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        });

        let point_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_point",
                buffers: &[QuadVertex::layout(), PointInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_point",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_line",
                buffers: &[LineVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_line",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_buffer = create_vertex_buffer(device, "Quad Buffer", QUAD_VERTICES);

        let point_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Instance Buffer"),
            size: (std::mem::size_of::<PointInstance>() * max_points) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Buffer"),
            size: (std::mem::size_of::<LineVertex>() * max_lines * 2) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!("Particle renderer ready ({max_points} points, {max_lines} lines)");

        Self {
            point_pipeline,
            quad_buffer,
            point_buffer,
            max_points,
            line_pipeline,
            line_buffer,
            max_lines,
            camera_buffer,
            camera_bind_group,
        }
    }

    pub fn update_camera_3d(&self, queue: &wgpu::Queue, camera: &Camera3D) {
        let uniform = CameraUniform::from_camera_3d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn update_camera_2d(&self, queue: &wgpu::Queue, camera: &Camera2D) {
        let uniform = CameraUniform::from_camera_2d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Upload points, returning how many were kept
    pub fn update_points(&self, queue: &wgpu::Queue, points: &[PointInstance]) -> u32 {
        let data = &points[..points.len().min(self.max_points)];
        queue.write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(data));
        data.len() as u32
    }

    /// Upload line segments, returning how many were kept
    pub fn update_lines(&self, queue: &wgpu::Queue, lines: &[Segment]) -> u32 {
        let vertices = segments_to_vertices(&lines[..lines.len().min(self.max_lines)]);
        queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&vertices));
        (vertices.len() / 2) as u32
    }

    pub fn render_points(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        num_points: u32,
        clear: bool,
    ) {
        let mut render_pass = begin_pass(encoder, view, "Point Render Pass", clear);
        render_pass.set_pipeline(&self.point_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.point_buffer.slice(..));
        render_pass.draw(0..6, 0..num_points);
    }

    pub fn render_lines(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        num_lines: u32,
        clear: bool,
    ) {
        let mut render_pass = begin_pass(encoder, view, "Line Render Pass", clear);
        render_pass.set_pipeline(&self.line_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
        render_pass.draw(0..(num_lines * 2), 0..1);
    }
}

fn begin_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    label: &'static str,
    clear: bool,
) -> wgpu::RenderPass<'a> {
    let load = if clear {
        wgpu::LoadOp::Clear(CLEAR_COLOR)
    } else {
        wgpu::LoadOp::Load
    };

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

fn segments_to_vertices(lines: &[Segment]) -> Vec<LineVertex> {
    lines
        .iter()
        .flat_map(|(v1, v2, color)| {
            [
                LineVertex {
                    position: v1.to_array(),
                    color: *color,
                },
                LineVertex {
                    position: v2.to_array(),
                    color: *color,
                },
            ]
        })
        .collect()
}

/// Billboards for live particles, with their trails as shrinking fading dots
pub fn particles_to_points(particles: &[Particle], size: f32) -> Vec<PointInstance> {
    let mut points = Vec::new();
    for particle in particles {
        let color = particle.color();
        let trail_len = particle.trail().count().max(1) as f32;
        for (i, position) in particle.trail().enumerate() {
            let fade = 1.0 - (i as f32 + 1.0) / (trail_len + 1.0);
            points.push(PointInstance {
                position: position.to_array(),
                size: size * 0.5 * fade,
                color: [color[0], color[1], color[2], 0.4 * fade],
            });
        }
        // Soft glow behind the core
        points.push(PointInstance {
            position: particle.position().to_array(),
            size: size * 2.0,
            color: [color[0], color[1], color[2], 0.2],
        });
        points.push(PointInstance {
            position: particle.position().to_array(),
            size,
            color,
        });
    }
    points
}

pub fn stars_to_points(stars: impl Iterator<Item = Vec3>, size: f32) -> Vec<PointInstance> {
    stars
        .map(|star| PointInstance {
            position: star.to_array(),
            size,
            color: [1.0, 1.0, 1.0, 0.8],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::particle::APPROACHING_COLOR;
    use crate::simulator::ParticleSimulator;
    use crate::source::{ManualClock, SequenceSource};
    use std::time::Duration;

    #[test]
    fn particle_core_is_drawn_last_at_full_size() {
        let mut config = SimulatorConfig::scene_3d();
        config.spawn_jitter = [0.0, 0.0];
        let mut sim = ParticleSimulator::new(config, SequenceSource::new(vec![0.5]), ManualClock::new());
        sim.spawn();
        for frame in 0..3 {
            sim.tick(Duration::from_millis(frame * 16));
        }

        let points = particles_to_points(sim.live_particles(), 0.06);
        // three trail dots, glow, core
        assert_eq!(points.len(), 5);
        let core = points.last().unwrap();
        assert_eq!(core.size, 0.06);
        assert_eq!(core.color, APPROACHING_COLOR);
        assert_eq!(core.position, sim.live_particles()[0].position().to_array());
        assert!(points[..3].iter().all(|p| p.size < 0.06 && p.color[3] < 0.4));
    }

    #[test]
    fn segments_expand_to_vertex_pairs() {
        let lines = crate::scene::barrier_3d();
        let vertices = segments_to_vertices(&lines);
        assert_eq!(vertices.len(), 24);
        assert_eq!(vertices[0].position, lines[0].0.to_array());
        assert_eq!(vertices[1].position, lines[0].1.to_array());
    }

    #[test]
    fn stars_are_white_points() {
        let points = stars_to_points([Vec3::X, Vec3::Y].into_iter(), 0.02);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.color == [1.0, 1.0, 1.0, 0.8]));
    }
}
