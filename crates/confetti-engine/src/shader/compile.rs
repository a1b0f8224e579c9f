use crate::device::{Error, RenderingContext, Result, ShaderStage};

/// Compiles `source` into a shader object for `stage`.
///
/// On failure the driver's info log is logged and returned in the error, and
/// the shader object is deleted.
pub fn compile<C: RenderingContext>(gl: &C, stage: ShaderStage, source: &str) -> Result<C::Shader> {
    let shader = gl
        .create_shader(stage)
        .map_err(|log| Error::ShaderCompile { stage, log })?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        log::error!("{} shader compile log:\n{log}", stage.label());
        gl.delete_shader(shader);
        return Err(Error::ShaderCompile { stage, log });
    }

    Ok(shader)
}

/// Creates a program object with both stages attached, ready for
/// pre-link configuration (feedback varyings) and `finalize_link`.
pub fn link<C: RenderingContext>(
    gl: &C,
    vertex: C::Shader,
    fragment: C::Shader,
) -> Result<C::Program> {
    let program = gl.create_program().map_err(Error::ProgramCreation)?;
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    Ok(program)
}

/// Links `program` and checks the result.
///
/// Anything that is fixed at link time, such as transform-feedback varyings,
/// must be declared before this call.
pub fn finalize_link<C: RenderingContext>(gl: &C, program: C::Program) -> Result<()> {
    gl.link_program(program);

    if !gl.program_link_status(program) {
        let log = gl.program_info_log(program);
        log::error!("program link log:\n{log}");
        gl.delete_program(program);
        return Err(Error::ProgramLink { log });
    }

    Ok(())
}
