use bytemuck::{Pod, Zeroable};

use crate::math::{euler_matrix, multiply_many_matrices, scale_matrix, translation_matrix, Mat4, Matrix};

use super::config::SimulationConfig;

/// GPU layout of one particle: a translation matrix followed by a velocity
/// matrix, both row-major.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub translation: [[f32; 4]; 4],
    pub velocity: [[f32; 4]; 4],
}

/// Bytes per instance in an instance buffer.
pub const INSTANCE_BYTES: usize = std::mem::size_of::<Instance>();

const _: () = assert!(INSTANCE_BYTES == 128);

impl Instance {
    pub fn new(translation: &Mat4, velocity: &Mat4) -> Self {
        Self {
            translation: translation.0,
            velocity: velocity.0,
        }
    }

    pub fn translation(&self) -> Mat4 {
        Matrix(self.translation)
    }

    pub fn velocity(&self) -> Mat4 {
        Matrix(self.velocity)
    }

    /// World position (last row of the translation matrix).
    pub fn position(&self) -> [f32; 3] {
        self.translation().translation()
    }

    pub fn is_finite(&self) -> bool {
        self.translation
            .as_flattened()
            .iter()
            .chain(self.velocity.as_flattened())
            .all(|v| v.is_finite())
    }
}

/// Startup state: a `side x side` grid spread over `spread_width` horizontally
/// and `canvas_height` vertically, every particle sharing one orientation and
/// scale, at rest.
pub fn initial_instances(config: &SimulationConfig, canvas_height: f32) -> Vec<Instance> {
    let side = config.side as usize;
    let [rx, ry, rz] = config.initial_euler_deg.map(f32::to_radians);
    let rotation = euler_matrix(rx, ry, rz);
    let s = config.particle_scale;
    let scale = scale_matrix(s, s, s);
    let at_rest = Mat4::identity();

    (0..config.instance_count())
        .map(|i| {
            let x = config.spread_width * (i % side) as f32 / side as f32;
            let y = canvas_height * (i / side) as f32 / side as f32;
            let translation =
                multiply_many_matrices([&translation_matrix(x, y, 0.0), &rotation, &scale]);
            Instance::new(&translation, &at_rest)
        })
        .collect()
}

/// The two instance buffers: one holds this frame's state, the other receives
/// the next compute pass.
///
/// Roles are swapped by flipping an index; buffer contents never move.
#[derive(Debug, Clone)]
pub struct InstanceBuffers<B> {
    slots: [B; 2],
    current: usize,
    instance_count: usize,
}

impl<B: Copy> InstanceBuffers<B> {
    /// `current` holds the initial state; `next` is scratch.
    pub fn new(current: B, next: B, instance_count: usize) -> Self {
        Self {
            slots: [current, next],
            current: 0,
            instance_count,
        }
    }

    pub fn current(&self) -> B {
        self.slots[self.current]
    }

    pub fn next(&self) -> B {
        self.slots[self.current ^ 1]
    }

    /// Hands the freshly written `next` buffer the "current" role.
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    /// Size of each buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.instance_count * INSTANCE_BYTES
    }
}
