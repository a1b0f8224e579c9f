//! The particle simulation engine.
//!
//! Owns both GPU programs, the static quad geometry, the double-buffered
//! instance state and one vertex-array object per pass. Each frame runs the
//! compute pass (transform feedback with rasterization discarded, one point
//! per instance, writing the next buffer) and then the render pass (six
//! vertices per instance, reading the current buffer).

use std::rc::Rc;

use bytemuck::Zeroable;

use crate::device::{
    sync_size_to_display, BufferTarget, BufferUsage, Capability, Drawable, Error, Primitive,
    RenderingContext, Result,
};
use crate::math::{multiply_many_matrices, scale_matrix, translation_matrix, Mat4};
use crate::shader::{GlslDialect, Program};

use super::config::SimulationConfig;
use super::instance::{initial_instances, Instance, InstanceBuffers};
use super::layout::{
    compute_instance_layout, render_geometry_layout, render_instance_layout, AttributeBinding,
};
use super::sources;

/// Two triangles covering the unit quad, `(x, y, z)` per vertex.
const QUAD: [f32; 18] = [
    -1.0, -1.0, 0.0, //
    -1.0, 1.0, 0.0, //
    1.0, -1.0, 0.0, //
    1.0, -1.0, 0.0, //
    -1.0, 1.0, 0.0, //
    1.0, 1.0, 0.0,
];

const QUAD_VERTICES: i32 = 6;

/// Maps pixel coordinates `[0, w] x [0, h]` onto clip space `[-1, 1]`,
/// flattening `z`.
pub fn view_matrix(width: u32, height: u32) -> Mat4 {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    multiply_many_matrices([
        &scale_matrix(2.0 / w, 2.0 / h, 0.0),
        &translation_matrix(-w / 2.0, -h / 2.0, 0.0),
    ])
}

pub struct Engine<C: RenderingContext, D: Drawable> {
    gl: Rc<C>,
    drawable: D,
    config: SimulationConfig,

    compute_program: Program<C>,
    render_program: Program<C>,

    geometry: C::Buffer,
    instances: InstanceBuffers<C::Buffer>,

    compute_vao: C::VertexArray,
    render_vao: C::VertexArray,
    feedback: C::TransformFeedback,

    view_matrix: Mat4,
    frames: u64,
}

impl<C: RenderingContext, D: Drawable> Engine<C, D> {
    /// Builds both programs and every GPU object, uploads the initial grid and
    /// sizes the drawable. Any failure here is fatal for the simulation.
    pub fn new(gl: Rc<C>, drawable: D, config: SimulationConfig) -> Result<Self> {
        Self::with_dialect(gl, drawable, config, GlslDialect::default())
    }

    /// As [`Engine::new`], compiling shaders for `dialect`.
    pub fn with_dialect(
        gl: Rc<C>,
        mut drawable: D,
        config: SimulationConfig,
        dialect: GlslDialect,
    ) -> Result<Self> {
        config.validate()?;

        let mut render_program = Program::new(
            gl.clone(),
            &sources::render_vertex(dialect),
            &sources::render_fragment(dialect),
            None,
        )?;
        // Fail now rather than on the first frame.
        render_program.uniform_location(sources::VIEW_MATRIX_UNIFORM)?;

        let compute_program = Program::new(
            gl.clone(),
            &sources::physics_vertex(&config.physics, dialect),
            &sources::physics_fragment(dialect),
            Some(&sources::FEEDBACK_VARYINGS[..]),
        )?;

        let render_vao = gl.create_vertex_array().map_err(alloc_error("render vertex array"))?;
        let compute_vao = gl.create_vertex_array().map_err(alloc_error("compute vertex array"))?;
        let feedback = gl
            .create_transform_feedback()
            .map_err(alloc_error("transform feedback"))?;

        let [r, g, b, a] = config.clear_color;
        gl.clear_color(r, g, b, a);
        sync_size_to_display(&mut drawable);
        let (width, height) = drawable.backing_size();
        gl.viewport(0, 0, width as i32, height as i32);

        let geometry = gl.create_buffer().map_err(alloc_error("geometry buffer"))?;
        gl.bind_buffer(BufferTarget::Array, Some(geometry));
        gl.buffer_data_u8_slice(
            BufferTarget::Array,
            bytemuck::cast_slice(&QUAD),
            BufferUsage::StaticDraw,
        );

        let initial = initial_instances(&config, height as f32);
        let current = gl.create_buffer().map_err(alloc_error("instance buffer"))?;
        gl.bind_buffer(BufferTarget::Array, Some(current));
        gl.buffer_data_u8_slice(
            BufferTarget::Array,
            bytemuck::cast_slice(&initial),
            BufferUsage::DynamicDraw,
        );

        let next = gl.create_buffer().map_err(alloc_error("instance buffer"))?;
        gl.bind_buffer(BufferTarget::Array, Some(next));
        gl.buffer_data_size(
            BufferTarget::Array,
            config.instance_buffer_bytes(),
            BufferUsage::DynamicDraw,
        );
        gl.bind_buffer(BufferTarget::Array, None);

        let instances = InstanceBuffers::new(current, next, config.instance_count());

        configure_vertex_array(&*gl, compute_vao, &compute_instance_layout());
        let mut render_attributes = vec![render_geometry_layout()];
        render_attributes.extend(render_instance_layout());
        configure_vertex_array(&*gl, render_vao, &render_attributes);
        gl.bind_vertex_array(None);

        log::info!(
            "confetti engine ready: {} instances, 2 x {} byte instance buffers, {width}x{height} drawable",
            instances.instance_count(),
            instances.byte_len(),
        );

        Ok(Self {
            gl,
            drawable,
            config,
            compute_program,
            render_program,
            geometry,
            instances,
            compute_vao,
            render_vao,
            feedback,
            view_matrix: view_matrix(width, height),
            frames: 0,
        })
    }

    /// Advances every instance by one physics step on the GPU and makes the
    /// result the current state.
    pub fn compute(&mut self) {
        let gl = &*self.gl;
        let count = self.instance_count_i32();

        gl.bind_vertex_array(Some(self.compute_vao));
        self.compute_program.activate();
        point_attributes(gl, self.instances.current(), &compute_instance_layout());

        gl.bind_transform_feedback(Some(self.feedback));
        gl.bind_buffer_base(BufferTarget::TransformFeedback, 0, Some(self.instances.next()));
        gl.bind_transform_feedback(None);
        gl.bind_buffer(BufferTarget::Array, None);
        gl.bind_buffer(BufferTarget::TransformFeedback, None);

        gl.enable(Capability::RasterizerDiscard);
        gl.bind_transform_feedback(Some(self.feedback));
        gl.begin_transform_feedback(Primitive::Points);
        gl.draw_arrays_instanced(Primitive::Points, 0, 1, count);
        gl.end_transform_feedback();
        gl.bind_transform_feedback(None);
        gl.disable(Capability::RasterizerDiscard);

        self.instances.swap();
    }

    /// Draws one quad per instance from the current state.
    pub fn render(&mut self) {
        let gl = &*self.gl;
        let count = self.instance_count_i32();

        gl.bind_vertex_array(Some(self.render_vao));
        point_attributes(gl, self.geometry, &[render_geometry_layout()]);
        point_attributes(gl, self.instances.current(), &render_instance_layout());
        gl.bind_buffer(BufferTarget::Array, None);

        self.render_program.activate();
        gl.clear_color_buffer();

        if sync_size_to_display(&mut self.drawable) {
            let (width, height) = self.drawable.backing_size();
            gl.viewport(0, 0, width as i32, height as i32);
            self.view_matrix = view_matrix(width, height);
        }

        let view = self.view_matrix;
        if let Err(e) = self.render_program.uniform_matrix_4fv(
            sources::VIEW_MATRIX_UNIFORM,
            false,
            view.as_flat(),
            None,
            None,
        ) {
            log::error!("view matrix upload failed: {e}");
        }

        gl.draw_arrays_instanced(Primitive::Triangles, 0, QUAD_VERTICES, count);
    }

    /// One display refresh: `compute` then `render`.
    pub fn frame(&mut self) {
        self.compute();
        self.render();
        self.frames += 1;
        if self.frames == 1 {
            log::debug!("first frame submitted");
        }
    }

    /// Copies the current instance buffer back to the CPU.
    pub fn read_instances(&self) -> Vec<Instance> {
        let mut out = vec![Instance::zeroed(); self.instances.instance_count()];
        self.gl.bind_buffer(BufferTarget::Array, Some(self.instances.current()));
        self.gl
            .get_buffer_sub_data(BufferTarget::Array, 0, bytemuck::cast_slice_mut(&mut out));
        self.gl.bind_buffer(BufferTarget::Array, None);
        out
    }

    pub fn instance_count(&self) -> usize {
        self.instances.instance_count()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn drawable(&self) -> &D {
        &self.drawable
    }

    pub fn drawable_mut(&mut self) -> &mut D {
        &mut self.drawable
    }

    fn instance_count_i32(&self) -> i32 {
        // Bounded by `SimulationConfig::validate`.
        self.instances.instance_count() as i32
    }
}

fn alloc_error(what: &'static str) -> impl Fn(String) -> Error {
    move |reason| Error::BufferAllocation { what, reason }
}

/// One-time vertex-array setup: enables each attribute and sets its divisor.
fn configure_vertex_array<C: RenderingContext>(
    gl: &C,
    vao: C::VertexArray,
    attributes: &[AttributeBinding],
) {
    gl.bind_vertex_array(Some(vao));
    for a in attributes {
        gl.enable_vertex_attrib_array(a.location);
        gl.vertex_attrib_divisor(a.location, a.divisor);
    }
}

/// Points `attributes` of the bound vertex array at `buffer`.
fn point_attributes<C: RenderingContext>(
    gl: &C,
    buffer: C::Buffer,
    attributes: &[AttributeBinding],
) {
    gl.bind_buffer(BufferTarget::Array, Some(buffer));
    for a in attributes {
        gl.vertex_attrib_pointer_f32(a.location, a.components, a.stride, a.offset);
    }
}
