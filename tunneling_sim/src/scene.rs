//! Static and decorative scene geometry: starfield, barrier, floor grid

use glam::{Mat3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Line segment with a single color
pub type Segment = (Vec3, Vec3, [f32; 4]);

/// Purple barrier outline (#9c27b0)
pub const BARRIER_COLOR: [f32; 4] = [0.612, 0.153, 0.690, 0.6];
/// Dark blue floor grid (#0a1a3f)
pub const GRID_COLOR: [f32; 4] = [0.039, 0.102, 0.247, 1.0];

/// Slowly rotating cube of background stars
#[derive(Debug, Clone)]
pub struct Starfield {
    stars: Vec<Vec3>,
    rotation_x: f32,
    rotation_y: f32,
    spin_per_frame: f32,
}

impl Starfield {
    /// `count` stars uniformly inside a cube of edge `extent` centered on the origin
    pub fn new(count: usize, extent: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let half = extent / 2.0;
        let stars = (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                )
            })
            .collect();

        Self {
            stars,
            rotation_x: 0.0,
            rotation_y: 0.0,
            spin_per_frame: 0.0001,
        }
    }

    pub fn preset() -> Self {
        Self::new(1000, 20.0, 0x5eed)
    }

    /// Advance the rotation by one frame
    pub fn rotate(&mut self) {
        self.rotation_x += self.spin_per_frame;
        self.rotation_y += self.spin_per_frame;
    }

    pub fn rotation(&self) -> Mat3 {
        Mat3::from_rotation_x(self.rotation_x) * Mat3::from_rotation_y(self.rotation_y)
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Star positions with the current rotation applied
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        let rotation = self.rotation();
        self.stars.iter().map(move |star| rotation * *star)
    }
}

/// Edges of an axis-aligned box centered on `center`
pub fn box_edges(center: Vec3, size: Vec3, color: [f32; 4]) -> Vec<Segment> {
    let h = size / 2.0;
    let corner = |sx: f32, sy: f32, sz: f32| center + Vec3::new(sx * h.x, sy * h.y, sz * h.z);

    let mut edges = Vec::with_capacity(12);
    for &s in &[-1.0, 1.0] {
        for &t in &[-1.0, 1.0] {
            edges.push((corner(-1.0, s, t), corner(1.0, s, t), color));
            edges.push((corner(s, -1.0, t), corner(s, 1.0, t), color));
            edges.push((corner(s, t, -1.0), corner(s, t, 1.0), color));
        }
    }
    edges
}

/// The 0.5 x 2 x 2 barrier slab at the origin
pub fn barrier_3d() -> Vec<Segment> {
    box_edges(Vec3::ZERO, Vec3::new(0.5, 2.0, 2.0), BARRIER_COLOR)
}

/// Square floor grid in the xz plane at height `y`
pub fn floor_grid(size: f32, divisions: u32, y: f32, color: [f32; 4]) -> Vec<Segment> {
    let half = size / 2.0;
    let step = size / divisions as f32;
    (0..=divisions)
        .flat_map(|i| {
            let offset = -half + i as f32 * step;
            [
                (Vec3::new(offset, y, -half), Vec3::new(offset, y, half), color),
                (Vec3::new(-half, y, offset), Vec3::new(half, y, offset), color),
            ]
        })
        .collect()
}

/// Track outline and barrier wall for the 2D strip
pub fn strip_2d(track_half_length: f32, half_height: f32, barrier_x: f32) -> Vec<Segment> {
    let track = [0.2, 0.2, 0.35, 1.0];
    let (l, r) = (-track_half_length, track_half_length);
    let (b, t) = (-half_height, half_height);
    vec![
        (Vec3::new(l, b, 0.0), Vec3::new(r, b, 0.0), track),
        (Vec3::new(l, t, 0.0), Vec3::new(r, t, 0.0), track),
        (Vec3::new(l, b, 0.0), Vec3::new(l, t, 0.0), track),
        (Vec3::new(r, b, 0.0), Vec3::new(r, t, 0.0), track),
        (Vec3::new(barrier_x, b, 0.0), Vec3::new(barrier_x, t, 0.0), BARRIER_COLOR),
    ]
}
