//! Shader compilation, program linking and typed uniform uploads.

mod compile;
mod program;
mod source;

pub use compile::{compile, finalize_link, link};
pub use program::Program;
pub use source::{glsl_float, with_dialect, GlslDialect, ShaderTemplate};
