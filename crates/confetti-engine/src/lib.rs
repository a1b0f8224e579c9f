//! Confetti engine crate.
//!
//! A particle simulation that lives entirely on the GPU: instance state is
//! advanced by a transform-feedback "compute" pass and drawn as instanced
//! quads. Hosts provide a [`device::RenderingContext`] and a
//! [`device::Drawable`] and call [`sim::Engine::frame`] once per refresh.

pub mod device;
pub mod logging;
pub mod math;
pub mod shader;
pub mod sim;
