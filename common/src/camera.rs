//! Camera system for 2D and 3D scenes

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::PI;

/// 2D orthographic camera
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub position: Vec3,
    pub zoom: f32,
    pub aspect_ratio: f32,
}

impl Camera2D {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            zoom: 1.0,
            aspect_ratio,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_width = self.zoom * self.aspect_ratio;
        let half_height = self.zoom;

        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            -1.0,
            1.0,
        )
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * Mat4::from_translation(-self.position)
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Limits and sensitivities for the orbit controls
#[derive(Debug, Clone, Copy)]
pub struct OrbitLimits {
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Radius units per pixel of scroll
    pub zoom_speed: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_polar: 0.1,
            max_polar: PI - 0.1,
            min_radius: 2.0,
            max_radius: 10.0,
            rotate_speed: 0.005,
            zoom_speed: 0.001,
        }
    }
}

/// 3D perspective camera orbiting a target on a sphere.
///
/// `polar` is measured from +Y, `azimuth` around +Y starting at +Z.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    // Orbital parameters
    pub radius: f32,
    pub azimuth: f32,
    pub polar: f32,
    pub limits: OrbitLimits,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 75.0f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
            radius: 5.0,
            azimuth: 0.0,
            polar: PI / 3.0,
            limits: OrbitLimits::default(),
        };
        camera.update_orbital();
        camera
    }

    /// Update camera position based on orbital parameters
    pub fn update_orbital(&mut self) {
        let ring = self.polar.sin() * self.radius;
        self.position = self.target
            + Vec3::new(
                ring * self.azimuth.sin(),
                self.polar.cos() * self.radius,
                ring * self.azimuth.cos(),
            );
    }

    /// Orbit by a mouse drag of `dx`, `dy` pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * self.limits.rotate_speed;
        self.polar = (self.polar + dy * self.limits.rotate_speed)
            .clamp(self.limits.min_polar, self.limits.max_polar);
        self.update_orbital();
    }

    /// Zoom by a scroll of `delta` pixels; positive moves away
    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius + delta * self.limits.zoom_speed)
            .clamp(self.limits.min_radius, self.limits.max_radius);
        self.update_orbital();
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Get the combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a world position to pixel coordinates (origin top-left).
    /// Returns `None` for points behind the camera.
    pub fn project_to_screen(&self, world: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x * 0.5 + 0.5) * width,
            (ndc.y * -0.5 + 0.5) * height,
        ))
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
    /// Projection x/y scale, used to size billboards in world units
    pub billboard_scale: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_3d(camera: &Camera3D) -> Self {
        let proj = camera.projection_matrix();
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
            billboard_scale: [proj.x_axis.x, proj.y_axis.y, 0.0, 0.0],
        }
    }

    pub fn from_camera_2d(camera: &Camera2D) -> Self {
        let proj = camera.projection_matrix();
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
            billboard_scale: [proj.x_axis.x, proj.y_axis.y, 0.0, 0.0],
        }
    }
}
