use std::fmt::Debug;

/// Pipeline stage a shader object is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Buffer binding points used by the simulation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    Array,
    TransformFeedback,
}

/// Usage hint passed along with buffer storage allocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    StaticDraw,
    /// Rewritten frequently (every frame for instance state).
    DynamicDraw,
}

/// Global pipeline switches toggled by the simulation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    /// Primitives are discarded right before rasterization.
    RasterizerDiscard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    Points,
    Triangles,
}

/// Component count of a vector uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VectorWidth {
    One,
    Two,
    Three,
    Four,
}

impl VectorWidth {
    pub fn components(self) -> usize {
        match self {
            VectorWidth::One => 1,
            VectorWidth::Two => 2,
            VectorWidth::Three => 3,
            VectorWidth::Four => 4,
        }
    }
}

/// Shape of a matrix uniform, named `columns x rows` as in GLSL
/// (`mat2x3` has two columns of three rows).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MatrixShape {
    M2,
    M3,
    M4,
    M2x3,
    M2x4,
    M3x2,
    M3x4,
    M4x2,
    M4x3,
}

impl MatrixShape {
    /// `(columns, rows)`.
    pub fn dims(self) -> (usize, usize) {
        match self {
            MatrixShape::M2 => (2, 2),
            MatrixShape::M3 => (3, 3),
            MatrixShape::M4 => (4, 4),
            MatrixShape::M2x3 => (2, 3),
            MatrixShape::M2x4 => (2, 4),
            MatrixShape::M3x2 => (3, 2),
            MatrixShape::M3x4 => (3, 4),
            MatrixShape::M4x2 => (4, 2),
            MatrixShape::M4x3 => (4, 3),
        }
    }

    pub fn components(self) -> usize {
        let (c, r) = self.dims();
        c * r
    }
}

/// The graphics capability set the simulation needs from its host.
///
/// This is the seam between the engine and a concrete GL: shader and program
/// objects, buffers with usage hints, vertex-array objects, transform
/// feedback, instanced draws, viewport and clear. It is implemented for
/// `glow::Context` (WebGL2 and desktop GL/GLES) and, in tests, by a software
/// context.
///
/// Every call is issued from the single thread that owns the context, with
/// that context current.
pub trait RenderingContext {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type Buffer: Copy + Debug + PartialEq;
    type VertexArray: Copy + Debug;
    type TransformFeedback: Copy + Debug;
    type UniformLocation: Clone + Debug;

    // ── shaders & programs ────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Declares vertex outputs captured, interleaved, into a single feedback
    /// buffer. Takes effect at the next link.
    fn transform_feedback_varyings(&self, program: Self::Program, varyings: &[&str]);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    // ── uniforms ──────────────────────────────────────────────────────────

    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    fn uniform_f32_slice(&self, location: &Self::UniformLocation, width: VectorWidth, data: &[f32]);
    fn uniform_i32_slice(&self, location: &Self::UniformLocation, width: VectorWidth, data: &[i32]);
    fn uniform_matrix_f32_slice(
        &self,
        location: &Self::UniformLocation,
        shape: MatrixShape,
        transpose: bool,
        data: &[f32],
    );

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// Allocates `size` bytes of undefined contents for the bound buffer.
    fn buffer_data_size(&self, target: BufferTarget, size: usize, usage: BufferUsage);
    fn buffer_data_u8_slice(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<Self::Buffer>);
    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]);

    // ── vertex arrays ─────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>);
    fn enable_vertex_attrib_array(&self, location: u32);
    fn vertex_attrib_divisor(&self, location: u32, divisor: u32);
    /// Float attribute sourced from the buffer bound to `BufferTarget::Array`.
    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32);

    // ── transform feedback ────────────────────────────────────────────────

    fn create_transform_feedback(&self) -> Result<Self::TransformFeedback, String>;
    fn bind_transform_feedback(&self, feedback: Option<Self::TransformFeedback>);
    fn begin_transform_feedback(&self, primitive: Primitive);
    fn end_transform_feedback(&self);

    // ── pipeline state & draws ────────────────────────────────────────────

    fn enable(&self, capability: Capability);
    fn disable(&self, capability: Capability);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_buffer(&self);
    fn draw_arrays_instanced(&self, primitive: Primitive, first: i32, count: i32, instances: i32);
}
