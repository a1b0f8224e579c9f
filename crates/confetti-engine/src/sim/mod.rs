//! The GPU-resident confetti simulation.
//!
//! This module is responsible for:
//! - the instance data layout and the double-buffered instance storage
//! - the physics rule, on the GPU (compute shader) and as a CPU reference
//! - the per-frame compute/render choreography (`Engine`)

mod config;
mod engine;
mod layout;
mod sources;

pub mod instance;
pub mod physics;

pub use config::SimulationConfig;
pub use engine::{view_matrix, Engine};
pub use instance::{initial_instances, Instance, InstanceBuffers, INSTANCE_BYTES};
pub use layout::{
    compute_instance_layout, render_geometry_layout, render_instance_layout, AttributeBinding,
};
pub use physics::{integrate, PhysicsParams};
pub use sources::{FEEDBACK_VARYINGS, VIEW_MATRIX_UNIFORM};
