//! Vertex-attribute layouts of the two passes.
//!
//! A `mat4` attribute occupies four consecutive locations, one `vec4` per
//! stored matrix row. Layouts mirror [`Instance`] exactly.

use std::mem::{offset_of, size_of};

use super::instance::{Instance, INSTANCE_BYTES};

/// One float attribute sourced from a buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeBinding {
    pub location: u32,
    pub components: i32,
    /// Bytes between consecutive elements.
    pub stride: i32,
    /// Byte offset of the first element.
    pub offset: i32,
    /// 0 advances per vertex, 1 per instance.
    pub divisor: u32,
}

const ROW_BYTES: i32 = 4 * size_of::<f32>() as i32;
const STRIDE: i32 = INSTANCE_BYTES as i32;
const TRANSLATION_OFFSET: i32 = offset_of!(Instance, translation) as i32;
const VELOCITY_OFFSET: i32 = offset_of!(Instance, velocity) as i32;

/// Components per geometry vertex.
pub const GEOMETRY_COMPONENTS: i32 = 3;

/// Per-instance `mat4` read as four `vec4` rows starting at `location`.
fn matrix_rows(location: u32, base_offset: i32) -> [AttributeBinding; 4] {
    std::array::from_fn(|row| AttributeBinding {
        location: location + row as u32,
        components: 4,
        stride: STRIDE,
        offset: base_offset + row as i32 * ROW_BYTES,
        divisor: 1,
    })
}

/// Compute pass: `in_translation` at locations 0..=3, `in_velocity` at 4..=7,
/// all per instance from the current instance buffer.
pub fn compute_instance_layout() -> [AttributeBinding; 8] {
    let t = matrix_rows(0, TRANSLATION_OFFSET);
    let v = matrix_rows(4, VELOCITY_OFFSET);
    std::array::from_fn(|i| if i < 4 { t[i] } else { v[i - 4] })
}

/// Render pass: shared quad `position` at location 0, per vertex.
pub fn render_geometry_layout() -> AttributeBinding {
    AttributeBinding {
        location: 0,
        components: GEOMETRY_COMPONENTS,
        stride: GEOMETRY_COMPONENTS * size_of::<f32>() as i32,
        offset: 0,
        divisor: 0,
    }
}

/// Render pass: per-instance `translation` at locations 1..=4.
pub fn render_instance_layout() -> [AttributeBinding; 4] {
    matrix_rows(1, TRANSLATION_OFFSET)
}
