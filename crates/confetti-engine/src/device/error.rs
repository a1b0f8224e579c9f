use std::fmt;

use super::context::ShaderStage;

/// Construction-time failures of the simulation.
///
/// All of these surface while building the engine; the per-frame loop has no
/// fallible steps. Callers are expected to abort startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The host could not provide a 3-D capable rendering context.
    ContextUnavailable(String),
    /// A shader failed to compile; `log` is the driver's info log.
    ShaderCompile { stage: ShaderStage, log: String },
    /// The platform could not allocate a program object.
    ProgramCreation(String),
    /// Linking failed; `log` is the driver's info log.
    ProgramLink { log: String },
    /// The platform refused a buffer, vertex-array or transform-feedback object.
    BufferAllocation { what: &'static str, reason: String },
    /// The uniform is not active in the linked program (possibly optimized away).
    UnknownUniform { name: String },
    /// Uniform data does not fit the requested upload.
    UniformData { name: String, reason: String },
    /// The simulation configuration cannot be realised.
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContextUnavailable(why) => write!(f, "rendering context unavailable: {why}"),
            Error::ShaderCompile { stage, log } => {
                write!(f, "failed to compile {} shader: {log}", stage.label())
            }
            Error::ProgramCreation(why) => write!(f, "failed to create shader program: {why}"),
            Error::ProgramLink { log } => write!(f, "failed to link shader program: {log}"),
            Error::BufferAllocation { what, reason } => {
                write!(f, "failed to allocate {what}: {reason}")
            }
            Error::UnknownUniform { name } => {
                write!(f, "uniform \"{name}\" is not active in the program")
            }
            Error::UniformData { name, reason } => {
                write!(f, "invalid data for uniform \"{name}\": {reason}")
            }
            Error::InvalidConfig(why) => write!(f, "invalid simulation config: {why}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
