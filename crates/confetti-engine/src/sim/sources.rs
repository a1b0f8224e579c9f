//! GLSL sources of the compute and render programs.

use crate::shader::{with_dialect, GlslDialect, ShaderTemplate};

use super::physics::PhysicsParams;

const PHYSICS_VERT: &str = include_str!("shaders/physics.vert.glsl");
const PHYSICS_FRAG: &str = include_str!("shaders/physics.frag.glsl");
const SIMPLE_VERT: &str = include_str!("shaders/simple.vert.glsl");
const SIMPLE_FRAG: &str = include_str!("shaders/simple.frag.glsl");

/// Vertex outputs of the compute program captured into the next instance
/// buffer, interleaved in `Instance` field order.
pub const FEEDBACK_VARYINGS: [&str; 2] = ["out_translation", "out_velocity"];

/// Uniform the render program reads the view transform from.
pub const VIEW_MATRIX_UNIFORM: &str = "viewMatrix";

/// Compute vertex stage with the boundary constants of `params` baked in.
pub fn physics_vertex(params: &PhysicsParams, dialect: GlslDialect) -> String {
    ShaderTemplate::new(PHYSICS_VERT)
        .float("CEILING", params.ceiling)
        .float("WRAP_WIDTH", params.wrap_width)
        .render(dialect)
}

pub fn physics_fragment(dialect: GlslDialect) -> String {
    with_dialect(PHYSICS_FRAG, dialect)
}

pub fn render_vertex(dialect: GlslDialect) -> String {
    with_dialect(SIMPLE_VERT, dialect)
}

pub fn render_fragment(dialect: GlslDialect) -> String {
    with_dialect(SIMPLE_FRAG, dialect)
}
