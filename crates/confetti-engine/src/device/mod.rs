//! Rendering-context seam and surface handling.
//!
//! This module is responsible for:
//! - the `RenderingContext` capability set and its `glow` implementation
//! - keeping a host surface's drawing buffer sized to its display size
//! - the error type shared by every construction step

mod context;
mod drawable;
mod error;
mod glow_backend;

#[cfg(test)]
pub(crate) mod soft;

pub use context::{
    BufferTarget, BufferUsage, Capability, MatrixShape, Primitive, RenderingContext, ShaderStage,
    VectorWidth,
};
pub use drawable::{sync_size_to_display, Drawable};
pub use error::{Error, Result};

#[cfg(test)]
pub(crate) use drawable::tests::FakeDrawable;
