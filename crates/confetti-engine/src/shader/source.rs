/// GLSL flavour accepted by the current context.
///
/// Sources are authored as GLSL ES 3.00. Desktop contexts that only offer a
/// core profile get the equivalent `330 core` header; the bodies are valid in
/// both.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum GlslDialect {
    #[default]
    Es300,
    Core330,
}

impl GlslDialect {
    pub fn version_line(self) -> &'static str {
        match self {
            GlslDialect::Es300 => "#version 300 es",
            GlslDialect::Core330 => "#version 330 core",
        }
    }
}

/// Shader text with `{{NAME}}` placeholders.
#[derive(Debug, Clone)]
pub struct ShaderTemplate {
    text: &'static str,
    bindings: Vec<(&'static str, String)>,
}

impl ShaderTemplate {
    pub fn new(text: &'static str) -> Self {
        Self { text, bindings: Vec::new() }
    }

    /// Binds a float placeholder, rendered as a GLSL float literal.
    pub fn float(mut self, name: &'static str, value: f32) -> Self {
        self.bindings.push((name, glsl_float(value)));
        self
    }

    /// Produces final source for `dialect`.
    pub fn render(&self, dialect: GlslDialect) -> String {
        let mut out = self.text.to_string();
        for (name, value) in &self.bindings {
            out = out.replace(&format!("{{{{{name}}}}}"), value);
        }
        with_dialect(&out, dialect)
    }
}

/// Replaces the `#version` directive with the one for `dialect`.
///
/// Sources without a directive get one prepended.
pub fn with_dialect(source: &str, dialect: GlslDialect) -> String {
    let body = source.trim_start();
    let rest = match body.strip_prefix("#version") {
        Some(after) => after.split_once('\n').map_or("", |(_, rest)| rest),
        None => body,
    };
    format!("{}\n{}", dialect.version_line(), rest)
}

/// Formats `v` as a GLSL float literal.
///
/// GLSL ES has no implicit int-to-float conversion, so whole numbers must
/// keep their decimal point.
pub fn glsl_float(v: f32) -> String {
    let s = format!("{v:?}");
    if s.contains(['.', 'e', 'E']) || !v.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}
