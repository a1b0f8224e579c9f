//! `RenderingContext` for `glow`, covering WebGL2 in the browser and GL/GLES
//! on the desktop.

use glow::HasContext;

use super::context::{
    BufferTarget, BufferUsage, Capability, MatrixShape, Primitive, RenderingContext, ShaderStage,
    VectorWidth,
};

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::TransformFeedback => glow::TRANSFORM_FEEDBACK_BUFFER,
    }
}

fn usage_enum(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

fn capability_enum(capability: Capability) -> u32 {
    match capability {
        Capability::RasterizerDiscard => glow::RASTERIZER_DISCARD,
    }
}

fn primitive_enum(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Points => glow::POINTS,
        Primitive::Triangles => glow::TRIANGLES,
    }
}

// glow takes byte sizes as GLsizei/GLintptr; sizes beyond i32 are rejected
// by `SimulationConfig::validate` long before they reach here.
fn gl_size(bytes: usize) -> i32 {
    i32::try_from(bytes).unwrap_or(i32::MAX)
}

impl RenderingContext for glow::Context {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type VertexArray = <glow::Context as HasContext>::VertexArray;
    type TransformFeedback = <glow::Context as HasContext>::TransformFeedback;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage_enum(stage)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn transform_feedback_varyings(&self, program: Self::Program, varyings: &[&str]) {
        unsafe {
            HasContext::transform_feedback_varyings(
                self,
                program,
                varyings,
                glow::INTERLEAVED_ATTRIBS,
            )
        }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn uniform_f32_slice(&self, location: &Self::UniformLocation, width: VectorWidth, data: &[f32]) {
        let loc = Some(location);
        unsafe {
            match width {
                VectorWidth::One => self.uniform_1_f32_slice(loc, data),
                VectorWidth::Two => self.uniform_2_f32_slice(loc, data),
                VectorWidth::Three => self.uniform_3_f32_slice(loc, data),
                VectorWidth::Four => self.uniform_4_f32_slice(loc, data),
            }
        }
    }

    fn uniform_i32_slice(&self, location: &Self::UniformLocation, width: VectorWidth, data: &[i32]) {
        let loc = Some(location);
        unsafe {
            match width {
                VectorWidth::One => self.uniform_1_i32_slice(loc, data),
                VectorWidth::Two => self.uniform_2_i32_slice(loc, data),
                VectorWidth::Three => self.uniform_3_i32_slice(loc, data),
                VectorWidth::Four => self.uniform_4_i32_slice(loc, data),
            }
        }
    }

    fn uniform_matrix_f32_slice(
        &self,
        location: &Self::UniformLocation,
        shape: MatrixShape,
        transpose: bool,
        data: &[f32],
    ) {
        let loc = Some(location);
        unsafe {
            match shape {
                MatrixShape::M2 => self.uniform_matrix_2_f32_slice(loc, transpose, data),
                MatrixShape::M3 => self.uniform_matrix_3_f32_slice(loc, transpose, data),
                MatrixShape::M4 => self.uniform_matrix_4_f32_slice(loc, transpose, data),
                MatrixShape::M2x3 => self.uniform_matrix_2x3_f32_slice(loc, transpose, data),
                MatrixShape::M2x4 => self.uniform_matrix_2x4_f32_slice(loc, transpose, data),
                MatrixShape::M3x2 => self.uniform_matrix_3x2_f32_slice(loc, transpose, data),
                MatrixShape::M3x4 => self.uniform_matrix_3x4_f32_slice(loc, transpose, data),
                MatrixShape::M4x2 => self.uniform_matrix_4x2_f32_slice(loc, transpose, data),
                MatrixShape::M4x3 => self.uniform_matrix_4x3_f32_slice(loc, transpose, data),
            }
        }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target_enum(target), buffer) }
    }

    fn buffer_data_size(&self, target: BufferTarget, size: usize, usage: BufferUsage) {
        unsafe {
            HasContext::buffer_data_size(self, target_enum(target), gl_size(size), usage_enum(usage))
        }
    }

    fn buffer_data_u8_slice(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { HasContext::buffer_data_u8_slice(self, target_enum(target), data, usage_enum(usage)) }
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer_base(self, target_enum(target), index, buffer) }
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]) {
        unsafe { HasContext::get_buffer_sub_data(self, target_enum(target), gl_size(offset), dst) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vao) }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, location) }
    }

    fn vertex_attrib_divisor(&self, location: u32, divisor: u32) {
        unsafe { HasContext::vertex_attrib_divisor(self, location, divisor) }
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                location,
                components,
                glow::FLOAT,
                false,
                stride,
                offset,
            )
        }
    }

    fn create_transform_feedback(&self) -> Result<Self::TransformFeedback, String> {
        unsafe { HasContext::create_transform_feedback(self) }
    }

    fn bind_transform_feedback(&self, feedback: Option<Self::TransformFeedback>) {
        unsafe { HasContext::bind_transform_feedback(self, glow::TRANSFORM_FEEDBACK, feedback) }
    }

    fn begin_transform_feedback(&self, primitive: Primitive) {
        unsafe { HasContext::begin_transform_feedback(self, primitive_enum(primitive)) }
    }

    fn end_transform_feedback(&self) {
        unsafe { HasContext::end_transform_feedback(self) }
    }

    fn enable(&self, capability: Capability) {
        unsafe { HasContext::enable(self, capability_enum(capability)) }
    }

    fn disable(&self, capability: Capability) {
        unsafe { HasContext::disable(self, capability_enum(capability)) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { HasContext::clear_color(self, r, g, b, a) }
    }

    fn clear_color_buffer(&self) {
        unsafe { self.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn draw_arrays_instanced(&self, primitive: Primitive, first: i32, count: i32, instances: i32) {
        unsafe {
            HasContext::draw_arrays_instanced(self, primitive_enum(primitive), first, count, instances)
        }
    }
}
