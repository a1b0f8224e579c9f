//! In-memory `RenderingContext` for tests.
//!
//! Buffers are byte vectors, vertex arrays record attribute pointers, and a
//! draw with transform feedback active runs [`physics::integrate`] over the
//! instances the bound vertex array points at, writing interleaved
//! translation/velocity into the feedback buffer. Draws without feedback are
//! recorded, not rasterized. Uniforms declared but never referenced are
//! treated as optimized out.
//!
//! Anything a real GL would flag (missing bindings, a feedback target that is
//! also a draw source, reads past a buffer's end, uniforms from a program
//! that is not current) is collected in [`SoftContext::errors`].

use std::cell::RefCell;
use std::collections::HashMap;

use crate::sim::instance::Instance;
use crate::sim::physics::{self, PhysicsParams};

use super::context::{
    BufferTarget, BufferUsage, Capability, MatrixShape, Primitive, RenderingContext, ShaderStage,
    VectorWidth,
};

const MAX_ATTRIBS: usize = 16;
const FEEDBACK_VARYINGS: [&str; 2] = ["out_translation", "out_velocity"];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SoftShader(u32);
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SoftProgram(u32);
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SoftBuffer(u32);
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SoftVertexArray(u32);
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SoftFeedback(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftUniform {
    program: SoftProgram,
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformUpload {
    Float { name: String, width: VectorWidth, data: Vec<f32> },
    Int { name: String, width: VectorWidth, data: Vec<i32> },
    Matrix { name: String, shape: MatrixShape, transpose: bool, data: Vec<f32> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub count: i32,
    pub instances: i32,
    pub program: Option<SoftProgram>,
    pub rasterizer_discard: bool,
    pub feedback: bool,
    /// Buffers the enabled attributes read from, by location.
    pub sources: Vec<(u32, SoftBuffer)>,
}

struct ShaderObj {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

struct ProgramObj {
    shaders: Vec<SoftShader>,
    varyings: Vec<String>,
    linked: bool,
    info_log: String,
    active_uniforms: Vec<String>,
}

#[derive(Debug, Copy, Clone, Default)]
struct Attrib {
    enabled: bool,
    divisor: u32,
    pointer: Option<(SoftBuffer, i32, i32, i32)>,
}

struct State {
    next_id: u32,
    shaders: HashMap<SoftShader, ShaderObj>,
    programs: HashMap<SoftProgram, ProgramObj>,
    buffers: HashMap<SoftBuffer, Vec<u8>>,
    vaos: HashMap<SoftVertexArray, [Attrib; MAX_ATTRIBS]>,
    feedbacks: HashMap<SoftFeedback, Option<SoftBuffer>>,
    array_buffer: Option<SoftBuffer>,
    feedback_buffer: Option<SoftBuffer>,
    vao: Option<SoftVertexArray>,
    feedback: Option<SoftFeedback>,
    feedback_active: bool,
    program: Option<SoftProgram>,
    rasterizer_discard: bool,
    viewport: (i32, i32, i32, i32),
    clear_color: [f32; 4],
    clears: usize,
    draws: Vec<DrawCall>,
    uploads: Vec<UniformUpload>,
    uniform_lookups: usize,
    refuse_buffers: bool,
    errors: Vec<String>,
}

pub struct SoftContext {
    physics: PhysicsParams,
    state: RefCell<State>,
}

impl SoftContext {
    pub fn new() -> Self {
        Self::with_physics(PhysicsParams::default())
    }

    /// Context whose emulated compute pass integrates with `physics`.
    pub fn with_physics(physics: PhysicsParams) -> Self {
        Self {
            physics,
            state: RefCell::new(State {
                next_id: 1,
                shaders: HashMap::new(),
                programs: HashMap::new(),
                buffers: HashMap::new(),
                vaos: HashMap::new(),
                feedbacks: HashMap::new(),
                array_buffer: None,
                feedback_buffer: None,
                vao: None,
                feedback: None,
                feedback_active: false,
                program: None,
                rasterizer_discard: false,
                viewport: (0, 0, 0, 0),
                clear_color: [0.0; 4],
                clears: 0,
                draws: Vec::new(),
                uploads: Vec::new(),
                uniform_lookups: 0,
                refuse_buffers: false,
                errors: Vec::new(),
            }),
        }
    }

    // ── inspection ────────────────────────────────────────────────────────

    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn last_upload(&self) -> Option<UniformUpload> {
        self.state.borrow().uploads.last().cloned()
    }

    pub fn uniform_lookups(&self) -> usize {
        self.state.borrow().uniform_lookups
    }

    pub fn current_program(&self) -> Option<SoftProgram> {
        self.state.borrow().program
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn rasterizer_discard(&self) -> bool {
        self.state.borrow().rasterizer_discard
    }

    pub fn viewport_rect(&self) -> (i32, i32, i32, i32) {
        self.state.borrow().viewport
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn clear_rgba(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    pub fn buffer_bytes(&self, buffer: SoftBuffer) -> Vec<u8> {
        self.state.borrow().buffers.get(&buffer).cloned().unwrap_or_default()
    }

    /// Makes every later `create_buffer` fail.
    pub fn refuse_buffers(&self) {
        self.state.borrow_mut().refuse_buffers = true;
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn id(&self) -> u32 {
        let mut s = self.state.borrow_mut();
        let id = s.next_id;
        s.next_id += 1;
        id
    }

    fn error(&self, msg: impl Into<String>) {
        self.state.borrow_mut().errors.push(msg.into());
    }

    fn bound(&self, target: BufferTarget) -> Option<SoftBuffer> {
        let s = self.state.borrow();
        match target {
            BufferTarget::Array => s.array_buffer,
            BufferTarget::TransformFeedback => s.feedback_buffer,
        }
    }

    fn with_bound_attribs<R>(&self, f: impl FnOnce(&mut [Attrib; MAX_ATTRIBS]) -> R) -> Option<R> {
        let mut s = self.state.borrow_mut();
        let vao = s.vao?;
        s.vaos.get_mut(&vao).map(f)
    }

    fn record_upload(&self, location: &SoftUniform, upload: UniformUpload) {
        if self.current_program() != Some(location.program) {
            self.error(format!("uniform {} uploaded while its program is not current", location.name));
            return;
        }
        self.state.borrow_mut().uploads.push(upload);
    }

    /// Reads `components` floats of element `index` through `attrib`.
    fn fetch(&self, attrib: &Attrib, index: usize) -> Option<[f32; 4]> {
        let (buffer, components, stride, offset) = attrib.pointer?;
        let components = components as usize;
        let stride = if stride == 0 { components * 4 } else { stride as usize };
        let start = offset as usize + index * stride;

        let s = self.state.borrow();
        let bytes = s.buffers.get(&buffer)?.get(start..start + components * 4)?;
        let mut out = [0.0, 0.0, 0.0, 1.0];
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            out[i] = bytemuck::pod_read_unaligned(chunk);
        }
        Some(out)
    }

    fn enabled_attribs(&self) -> Vec<(u32, Attrib)> {
        self.with_bound_attribs(|attribs| {
            attribs
                .iter()
                .enumerate()
                .filter(|(_, a)| a.enabled)
                .map(|(i, a)| (i as u32, *a))
                .collect()
        })
        .unwrap_or_default()
    }

    fn run_feedback(&self, count: i32, instances: i32, attribs: &[(u32, Attrib)]) {
        let program_varyings = {
            let s = self.state.borrow();
            s.program
                .and_then(|p| s.programs.get(&p))
                .map(|p| p.varyings.clone())
                .unwrap_or_default()
        };
        if program_varyings != FEEDBACK_VARYINGS {
            self.error(format!("feedback draw with varyings {program_varyings:?}"));
            return;
        }
        if count != 1 {
            self.error(format!("feedback draw of {count} vertices per instance"));
            return;
        }

        let target = {
            let s = self.state.borrow();
            s.feedback.and_then(|f| s.feedbacks.get(&f).copied().flatten())
        };
        let Some(target) = target else {
            self.error("feedback draw without a bound feedback buffer");
            return;
        };
        if attribs.iter().any(|(_, a)| a.pointer.map(|p| p.0) == Some(target)) {
            self.error("feedback buffer is also a draw source");
            return;
        }

        let mut out = Vec::with_capacity(instances as usize);
        for i in 0..instances as usize {
            let mut rows = [[0.0f32; 4]; 8];
            for (loc, row) in rows.iter_mut().enumerate() {
                let Some((_, attrib)) = attribs.iter().find(|(l, _)| *l as usize == loc) else {
                    self.error(format!("compute attribute {loc} not enabled"));
                    return;
                };
                let index = if attrib.divisor == 0 { 0 } else { i / attrib.divisor as usize };
                let Some(v) = self.fetch(attrib, index) else {
                    self.error(format!("compute attribute {loc} reads past its buffer"));
                    return;
                };
                *row = v;
            }
            let input = Instance {
                translation: [rows[0], rows[1], rows[2], rows[3]],
                velocity: [rows[4], rows[5], rows[6], rows[7]],
            };
            out.push(physics::integrate(&input, &self.physics));
        }

        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        let Some(dst) = s.buffers.get_mut(&target) else { return };
        let bytes: &[u8] = bytemuck::cast_slice(&out);
        if dst.len() < bytes.len() {
            let msg = format!("feedback buffer holds {} bytes, need {}", dst.len(), bytes.len());
            s.errors.push(msg);
            return;
        }
        dst[..bytes.len()].copy_from_slice(bytes);
    }

    fn check_draw_sources(&self, first: i32, count: i32, instances: i32, attribs: &[(u32, Attrib)]) {
        for (loc, attrib) in attribs {
            if attrib.pointer.is_none() {
                self.error(format!("attribute {loc} enabled without a pointer"));
                continue;
            }
            let last = if attrib.divisor == 0 {
                (first + count - 1).max(0) as usize
            } else {
                (instances as usize).saturating_sub(1) / attrib.divisor as usize
            };
            if self.fetch(attrib, last).is_none() {
                self.error(format!("attribute {loc} reads past its buffer"));
            }
        }
    }
}

impl Default for SoftContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Names of uniforms that are declared and referenced somewhere else.
fn active_uniforms(sources: &[&str]) -> Vec<String> {
    let all = sources.join("\n");
    let mut names = Vec::new();
    for line in all.lines() {
        let Some(decl) = line.trim().strip_prefix("uniform ") else { continue };
        let Some(name) = decl.trim_end_matches(';').split_whitespace().last() else { continue };
        if all.matches(name).count() > 1 {
            names.push(name.to_string());
        }
    }
    names
}

fn declares_output(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        let line = line.trim();
        line.starts_with("out ") && line.trim_end_matches(';').ends_with(&format!(" {name}"))
    })
}

impl RenderingContext for SoftContext {
    type Shader = SoftShader;
    type Program = SoftProgram;
    type Buffer = SoftBuffer;
    type VertexArray = SoftVertexArray;
    type TransformFeedback = SoftFeedback;
    type UniformLocation = SoftUniform;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let shader = SoftShader(self.id());
        self.state.borrow_mut().shaders.insert(
            shader,
            ShaderObj { stage, source: String::new(), compiled: false },
        );
        Ok(shader)
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        if let Some(obj) = self.state.borrow_mut().shaders.get_mut(&shader) {
            obj.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        if let Some(obj) = self.state.borrow_mut().shaders.get_mut(&shader) {
            obj.compiled = obj.source.trim_start().starts_with("#version");
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "ERROR: 0:1: '' : #version required and missing.".to_string()
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let program = SoftProgram(self.id());
        self.state.borrow_mut().programs.insert(
            program,
            ProgramObj {
                shaders: Vec::new(),
                varyings: Vec::new(),
                linked: false,
                info_log: String::new(),
                active_uniforms: Vec::new(),
            },
        );
        Ok(program)
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.shaders.push(shader);
        }
    }

    fn transform_feedback_varyings(&self, program: Self::Program, varyings: &[&str]) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.varyings = varyings.iter().map(|v| v.to_string()).collect();
        }
    }

    fn link_program(&self, program: Self::Program) {
        let mut s = self.state.borrow_mut();
        let State { shaders, programs, .. } = &mut *s;
        let Some(p) = programs.get_mut(&program) else { return };

        let stages: Vec<&ShaderObj> = p.shaders.iter().filter_map(|sh| shaders.get(sh)).collect();
        let vertex = stages.iter().find(|s| s.stage == ShaderStage::Vertex);
        let fragment = stages.iter().find(|s| s.stage == ShaderStage::Fragment);

        let (Some(vertex), Some(fragment)) = (vertex, fragment) else {
            p.linked = false;
            p.info_log = "program needs a vertex and a fragment shader".into();
            return;
        };
        if !vertex.compiled || !fragment.compiled {
            p.linked = false;
            p.info_log = "attached shader is not compiled".into();
            return;
        }
        if let Some(missing) = p.varyings.iter().find(|v| !declares_output(&vertex.source, v)) {
            p.linked = false;
            p.info_log = format!("transform feedback varying {missing} is not a vertex output");
            return;
        }

        p.active_uniforms = active_uniforms(&[vertex.source.as_str(), fragment.source.as_str()]);
        p.linked = true;
        p.info_log.clear();
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: Self::Program) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<Self::Program>) {
        self.state.borrow_mut().program = program;
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let mut s = self.state.borrow_mut();
        s.uniform_lookups += 1;
        let p = s.programs.get(&program)?;
        p.active_uniforms
            .iter()
            .any(|u| u == name)
            .then(|| SoftUniform { program, name: name.to_string() })
    }

    fn uniform_f32_slice(&self, location: &Self::UniformLocation, width: VectorWidth, data: &[f32]) {
        let upload = UniformUpload::Float { name: location.name.clone(), width, data: data.to_vec() };
        self.record_upload(location, upload);
    }

    fn uniform_i32_slice(&self, location: &Self::UniformLocation, width: VectorWidth, data: &[i32]) {
        let upload = UniformUpload::Int { name: location.name.clone(), width, data: data.to_vec() };
        self.record_upload(location, upload);
    }

    fn uniform_matrix_f32_slice(
        &self,
        location: &Self::UniformLocation,
        shape: MatrixShape,
        transpose: bool,
        data: &[f32],
    ) {
        let upload = UniformUpload::Matrix {
            name: location.name.clone(),
            shape,
            transpose,
            data: data.to_vec(),
        };
        self.record_upload(location, upload);
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        if self.state.borrow().refuse_buffers {
            return Err("out of memory".into());
        }
        let buffer = SoftBuffer(self.id());
        self.state.borrow_mut().buffers.insert(buffer, Vec::new());
        Ok(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        let mut s = self.state.borrow_mut();
        match target {
            BufferTarget::Array => {
                if buffer.is_some() && buffer == s.feedback_buffer {
                    s.errors.push("array binding of a buffer bound for transform feedback".into());
                }
                s.array_buffer = buffer;
            }
            BufferTarget::TransformFeedback => s.feedback_buffer = buffer,
        }
    }

    fn buffer_data_size(&self, target: BufferTarget, size: usize, _usage: BufferUsage) {
        let Some(buffer) = self.bound(target) else {
            self.error("buffer_data_size with nothing bound");
            return;
        };
        if let Some(bytes) = self.state.borrow_mut().buffers.get_mut(&buffer) {
            *bytes = vec![0; size];
        }
    }

    fn buffer_data_u8_slice(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let Some(buffer) = self.bound(target) else {
            self.error("buffer_data with nothing bound");
            return;
        };
        if let Some(bytes) = self.state.borrow_mut().buffers.get_mut(&buffer) {
            *bytes = data.to_vec();
        }
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<Self::Buffer>) {
        if target != BufferTarget::TransformFeedback || index != 0 {
            self.error(format!("unsupported indexed binding {target:?}[{index}]"));
            return;
        }
        let mut s = self.state.borrow_mut();
        let Some(feedback) = s.feedback else {
            s.errors.push("bind_buffer_base without a feedback object".into());
            return;
        };
        s.feedbacks.insert(feedback, buffer);
        s.feedback_buffer = buffer;
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]) {
        let Some(buffer) = self.bound(target) else {
            self.error("get_buffer_sub_data with nothing bound");
            return;
        };
        let copied = {
            let s = self.state.borrow();
            let src = s.buffers.get(&buffer).and_then(|b| b.get(offset..offset + dst.len()));
            src.map(|src| dst.copy_from_slice(src)).is_some()
        };
        if !copied {
            self.error("get_buffer_sub_data past the end of the buffer");
        }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        let vao = SoftVertexArray(self.id());
        self.state.borrow_mut().vaos.insert(vao, [Attrib::default(); MAX_ATTRIBS]);
        Ok(vao)
    }

    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>) {
        self.state.borrow_mut().vao = vao;
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        if self.with_bound_attribs(|a| a[location as usize].enabled = true).is_none() {
            self.error("enable_vertex_attrib_array without a vertex array");
        }
    }

    fn vertex_attrib_divisor(&self, location: u32, divisor: u32) {
        if self.with_bound_attribs(|a| a[location as usize].divisor = divisor).is_none() {
            self.error("vertex_attrib_divisor without a vertex array");
        }
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        let Some(buffer) = self.bound(BufferTarget::Array) else {
            self.error(format!("attribute {location} pointer with no array buffer"));
            return;
        };
        let pointer = Some((buffer, components, stride, offset));
        if self.with_bound_attribs(|a| a[location as usize].pointer = pointer).is_none() {
            self.error("vertex_attrib_pointer without a vertex array");
        }
    }

    fn create_transform_feedback(&self) -> Result<Self::TransformFeedback, String> {
        let feedback = SoftFeedback(self.id());
        self.state.borrow_mut().feedbacks.insert(feedback, None);
        Ok(feedback)
    }

    fn bind_transform_feedback(&self, feedback: Option<Self::TransformFeedback>) {
        self.state.borrow_mut().feedback = feedback;
    }

    fn begin_transform_feedback(&self, primitive: Primitive) {
        let mut s = self.state.borrow_mut();
        if s.feedback.is_none() || s.feedback_active || primitive != Primitive::Points {
            s.errors.push(format!("invalid begin_transform_feedback({primitive:?})"));
            return;
        }
        s.feedback_active = true;
    }

    fn end_transform_feedback(&self) {
        let mut s = self.state.borrow_mut();
        if !s.feedback_active {
            s.errors.push("end_transform_feedback while inactive".into());
        }
        s.feedback_active = false;
    }

    fn enable(&self, capability: Capability) {
        match capability {
            Capability::RasterizerDiscard => self.state.borrow_mut().rasterizer_discard = true,
        }
    }

    fn disable(&self, capability: Capability) {
        match capability {
            Capability::RasterizerDiscard => self.state.borrow_mut().rasterizer_discard = false,
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = (x, y, width, height);
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.state.borrow_mut().clear_color = [r, g, b, a];
    }

    fn clear_color_buffer(&self) {
        self.state.borrow_mut().clears += 1;
    }

    fn draw_arrays_instanced(&self, primitive: Primitive, first: i32, count: i32, instances: i32) {
        let attribs = self.enabled_attribs();
        let (program, rasterizer_discard, feedback) = {
            let s = self.state.borrow();
            (s.program, s.rasterizer_discard, s.feedback_active)
        };

        if program.is_none() {
            self.error("draw without a current program");
        }

        self.state.borrow_mut().draws.push(DrawCall {
            primitive,
            count,
            instances,
            program,
            rasterizer_discard,
            feedback,
            sources: attribs
                .iter()
                .filter_map(|(loc, a)| a.pointer.map(|p| (*loc, p.0)))
                .collect(),
        });

        if feedback {
            self.run_feedback(count, instances, &attribs);
        } else {
            self.check_draw_sources(first, count, instances, &attribs);
        }
    }
}
