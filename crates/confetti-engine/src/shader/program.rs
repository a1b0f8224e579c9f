use std::collections::HashMap;
use std::rc::Rc;

use crate::device::{Error, MatrixShape, RenderingContext, Result, ShaderStage, VectorWidth};

use super::compile;

/// A linked GPU program with memoized uniform locations and typed uploads.
///
/// The uniform set of a linked program never changes, so cached locations are
/// never invalidated. Every upload activates the program first.
pub struct Program<C: RenderingContext> {
    gl: Rc<C>,
    raw: C::Program,
    uniforms: HashMap<String, C::UniformLocation>,
}

impl<C: RenderingContext> Program<C> {
    /// Compiles both stages, optionally declares interleaved feedback
    /// varyings, and links.
    pub fn new(
        gl: Rc<C>,
        vertex_source: &str,
        fragment_source: &str,
        feedback_varyings: Option<&[&str]>,
    ) -> Result<Self> {
        let vertex = compile::compile(&*gl, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile::compile(&*gl, ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(vertex);
                return Err(e);
            }
        };

        let linked = compile::link(&*gl, vertex, fragment).and_then(|program| {
            if let Some(varyings) = feedback_varyings {
                gl.transform_feedback_varyings(program, varyings);
            }
            compile::finalize_link(&*gl, program).map(|()| program)
        });

        // Shaders are owned by the program once linked.
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        Ok(Self {
            gl,
            raw: linked?,
            uniforms: HashMap::new(),
        })
    }

    pub fn raw(&self) -> C::Program {
        self.raw
    }

    /// Makes this the current program.
    pub fn activate(&self) {
        self.gl.use_program(Some(self.raw));
    }

    /// Looks up a uniform location, memoizing the result.
    ///
    /// Uniforms the compiler optimized away are reported as unknown, the same
    /// as misspelled ones.
    pub fn uniform_location(&mut self, name: &str) -> Result<C::UniformLocation> {
        if let Some(loc) = self.uniforms.get(name) {
            return Ok(loc.clone());
        }

        let loc = self
            .gl
            .uniform_location(self.raw, name)
            .ok_or_else(|| Error::UnknownUniform { name: name.to_string() })?;
        self.uniforms.insert(name.to_string(), loc.clone());
        Ok(loc)
    }

    /// Float vector upload of `data[src_offset..src_offset + src_length]`.
    ///
    /// `src_length` of `None` or `0` means "to the end of `data`".
    pub fn uniform_fv(
        &mut self,
        name: &str,
        width: VectorWidth,
        data: &[f32],
        src_offset: Option<usize>,
        src_length: Option<usize>,
    ) -> Result<()> {
        self.activate();
        let loc = self.uniform_location(name)?;
        let data = source_range(name, data, src_offset, src_length, width.components())?;
        self.gl.uniform_f32_slice(&loc, width, data);
        Ok(())
    }

    /// Integer vector upload; range semantics as in [`Program::uniform_fv`].
    pub fn uniform_iv(
        &mut self,
        name: &str,
        width: VectorWidth,
        data: &[i32],
        src_offset: Option<usize>,
        src_length: Option<usize>,
    ) -> Result<()> {
        self.activate();
        let loc = self.uniform_location(name)?;
        let data = source_range(name, data, src_offset, src_length, width.components())?;
        self.gl.uniform_i32_slice(&loc, width, data);
        Ok(())
    }

    /// Matrix upload. With `transpose == false` the data is read column by
    /// column, exactly as the GL matrix-upload calls do.
    pub fn uniform_matrix_fv(
        &mut self,
        name: &str,
        shape: MatrixShape,
        transpose: bool,
        data: &[f32],
        src_offset: Option<usize>,
        src_length: Option<usize>,
    ) -> Result<()> {
        self.activate();
        let loc = self.uniform_location(name)?;
        let data = source_range(name, data, src_offset, src_length, shape.components())?;
        self.gl.uniform_matrix_f32_slice(&loc, shape, transpose, data);
        Ok(())
    }
}

macro_rules! vector_uploads {
    ($($fn_name:ident => $inner:ident, $ty:ty, $width:expr;)*) => {
        impl<C: RenderingContext> Program<C> {
            $(
                pub fn $fn_name(
                    &mut self,
                    name: &str,
                    data: &[$ty],
                    src_offset: Option<usize>,
                    src_length: Option<usize>,
                ) -> Result<()> {
                    self.$inner(name, $width, data, src_offset, src_length)
                }
            )*
        }
    };
}

vector_uploads! {
    uniform_1fv => uniform_fv, f32, VectorWidth::One;
    uniform_2fv => uniform_fv, f32, VectorWidth::Two;
    uniform_3fv => uniform_fv, f32, VectorWidth::Three;
    uniform_4fv => uniform_fv, f32, VectorWidth::Four;
    uniform_1iv => uniform_iv, i32, VectorWidth::One;
    uniform_2iv => uniform_iv, i32, VectorWidth::Two;
    uniform_3iv => uniform_iv, i32, VectorWidth::Three;
    uniform_4iv => uniform_iv, i32, VectorWidth::Four;
}

macro_rules! matrix_uploads {
    ($($fn_name:ident => $shape:expr;)*) => {
        impl<C: RenderingContext> Program<C> {
            $(
                pub fn $fn_name(
                    &mut self,
                    name: &str,
                    transpose: bool,
                    data: &[f32],
                    src_offset: Option<usize>,
                    src_length: Option<usize>,
                ) -> Result<()> {
                    self.uniform_matrix_fv(name, $shape, transpose, data, src_offset, src_length)
                }
            )*
        }
    };
}

matrix_uploads! {
    uniform_matrix_2fv => MatrixShape::M2;
    uniform_matrix_3fv => MatrixShape::M3;
    uniform_matrix_4fv => MatrixShape::M4;
    uniform_matrix_2x3fv => MatrixShape::M2x3;
    uniform_matrix_2x4fv => MatrixShape::M2x4;
    uniform_matrix_3x2fv => MatrixShape::M3x2;
    uniform_matrix_3x4fv => MatrixShape::M3x4;
    uniform_matrix_4x2fv => MatrixShape::M4x2;
    uniform_matrix_4x3fv => MatrixShape::M4x3;
}

/// Applies WebGL2-style `srcOffset`/`srcLength` to `data` and checks that the
/// selected range is a non-empty whole number of `components`-sized elements.
fn source_range<'a, T>(
    name: &str,
    data: &'a [T],
    src_offset: Option<usize>,
    src_length: Option<usize>,
    components: usize,
) -> Result<&'a [T]> {
    let invalid = |reason: String| Error::UniformData { name: name.to_string(), reason };

    let offset = src_offset.unwrap_or(0);
    if offset > data.len() {
        return Err(invalid(format!("offset {offset} exceeds {} elements", data.len())));
    }

    let end = match src_length {
        None | Some(0) => data.len(),
        Some(len) => offset
            .checked_add(len)
            .filter(|end| *end <= data.len())
            .ok_or_else(|| {
                invalid(format!("range {offset}+{len} exceeds {} elements", data.len()))
            })?,
    };

    let range = &data[offset..end];
    if range.is_empty() || range.len() % components != 0 {
        return Err(invalid(format!(
            "{} elements is not a whole number of {components}-component values",
            range.len()
        )));
    }

    Ok(range)
}
