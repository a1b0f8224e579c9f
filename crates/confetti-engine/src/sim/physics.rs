//! The per-instance integration rule run by the compute pass.
//!
//! The GPU executes this rule in `shaders/physics.vert.glsl`. [`integrate`] is
//! the same rule on the CPU, used to check GPU output and by the test context.
//! Both read their constants from [`PhysicsParams`].
//!
//! Storage convention: matrices are stored row-major and each stored row is a
//! GLSL column, so the shader product `A * B` corresponds to
//! `multiply_matrices(B, A)` here.

use crate::math::{multiply_matrices, translation_matrix, Mat4};

use super::instance::Instance;

/// Boundary constants of the simulation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PhysicsParams {
    /// Height a particle is recycled to after falling below `y = 0`.
    pub ceiling: f32,
    /// Horizontal period; `x` wraps into `[0, wrap_width]`.
    pub wrap_width: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            ceiling: 1578.0,
            wrap_width: 2208.0,
        }
    }
}

/// `fract(sin(dot(co, (12.9898, 78.233))) * 43758.5453)`, in single precision.
pub fn hash(co: [f32; 2]) -> f32 {
    let d = co[0] * 12.9898 + co[1] * 78.233;
    let v = d.sin() * 43758.5453;
    v - v.floor()
}

/// Per-step gravity nudge for a particle at `(x, y)`.
///
/// Both axes use the same hash value: horizontal in `[-1, 1)`, vertical in
/// `(-1, 0]`.
pub fn gravity_delta(x: f32, y: f32) -> [f32; 2] {
    let r = hash([x, y]);
    [2.0 * r - 1.0, -r]
}

/// Advances one instance by one step.
///
/// Velocity picks up the gravity nudge first, then moves the translation.
/// Boundary handling looks at the moved position: a particle below `y = 0`
/// is put back at the ceiling with its velocity reset to identity, and `x`
/// wraps by `wrap_width` in either direction. The vertical and horizontal
/// checks are independent and may both fire in one step.
pub fn integrate(instance: &Instance, params: &PhysicsParams) -> Instance {
    let translation = instance.translation();
    let [x, y, _] = translation.translation();
    let [gx, gy] = gravity_delta(x, y);

    let mut velocity = multiply_matrices(&instance.velocity(), &translation_matrix(gx, gy, 0.0));
    let mut moved = multiply_matrices(&translation, &velocity);

    if moved.0[3][1] < 0.0 {
        moved.0[3][1] = params.ceiling;
        velocity = Mat4::identity();
    }

    if moved.0[3][0] > params.wrap_width {
        moved = multiply_matrices(&moved, &translation_matrix(-params.wrap_width, 0.0, 0.0));
    }

    if moved.0[3][0] < 0.0 {
        moved = multiply_matrices(&moved, &translation_matrix(params.wrap_width, 0.0, 0.0));
    }

    Instance::new(&moved, &velocity)
}
