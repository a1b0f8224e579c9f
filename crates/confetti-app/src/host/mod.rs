//! Platform hosts.
//!
//! Each host provisions a GL context and a drawable surface, builds the
//! engine, and calls `Engine::frame` once per display refresh.

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::{run, HostConfig, NativeSurface};
#[cfg(target_arch = "wasm32")]
pub use web::{start, WebSurface};
