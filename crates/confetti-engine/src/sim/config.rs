use crate::device::{Error, Result};

use super::instance::INSTANCE_BYTES;
use super::physics::PhysicsParams;

/// Parameters of the confetti simulation.
///
/// Fixed for the lifetime of an engine; in particular the instance count
/// never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Particles per grid row; the instance count is `side * side`.
    pub side: u32,

    /// Horizontal extent of the initial grid, in pixels.
    pub spread_width: f32,

    /// Initial orientation shared by all particles, in degrees, passed to
    /// `euler_matrix` as `(x, y, z)`.
    pub initial_euler_deg: [f32; 3],

    /// Uniform scale baked into each particle's translation matrix.
    pub particle_scale: f32,

    /// RGBA clear color.
    pub clear_color: [f32; 4],

    pub physics: PhysicsParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            side: 100,
            spread_width: 1500.0,
            initial_euler_deg: [0.0, 50.0, 50.0],
            particle_scale: 10.0,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            physics: PhysicsParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn instance_count(&self) -> usize {
        let side = self.side as usize;
        side * side
    }

    /// Byte size of one instance buffer.
    pub fn instance_buffer_bytes(&self) -> usize {
        self.instance_count() * INSTANCE_BYTES
    }

    /// Rejects configurations the GPU side cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.side == 0 {
            return Err(Error::InvalidConfig("side must be at least 1".into()));
        }

        // Buffer sizes and instance counts cross the API as signed 32-bit values.
        let bytes = (self.side as u64).pow(2) * INSTANCE_BYTES as u64;
        if bytes > i32::MAX as u64 {
            return Err(Error::InvalidConfig(format!(
                "side {} needs {bytes} bytes per instance buffer",
                self.side
            )));
        }

        if !(self.physics.wrap_width > 0.0 && self.physics.wrap_width.is_finite()) {
            return Err(Error::InvalidConfig("wrap width must be positive".into()));
        }

        if !self.physics.ceiling.is_finite() {
            return Err(Error::InvalidConfig("ceiling must be finite".into()));
        }

        Ok(())
    }
}
