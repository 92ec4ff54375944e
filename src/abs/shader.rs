//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! Shader stages are picked from the file extension, see [`ShaderStage::from_path`].
//!
//! Uniforms must be registered on a program with [`ShaderProgram::register_uniform`] before they
//! can be set. Registration caches the location and the expected [`UniformKind`], so a value of
//! the wrong type is rejected instead of silently uploaded.

use std::{fmt, path::Path, sync::Arc};

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;
use indexmap::IndexMap;

use crate::{
    error::{Error, Result},
    glenum::gl_enum_name,
};

/// Shader stage, one per recognised file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Compute,
    ];

    /// The file extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => ".vert",
            ShaderStage::Fragment => ".frag",
            ShaderStage::Geometry => ".geom",
            ShaderStage::TessControl => ".tesc",
            ShaderStage::TessEvaluation => ".tese",
            ShaderStage::Compute => ".comp",
        }
    }

    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
            ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
            ShaderStage::Compute => glow::COMPUTE_SHADER,
        }
    }

    /// Detects the stage from the last five bytes of the file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.as_os_str().as_encoded_bytes();
        if name.len() < 5 {
            log::error!("file name {} is not long enough to detect extension", path.display());
            return Err(Error::UnknownShaderExtension(path.to_path_buf()));
        }
        let ext = &name[name.len() - 5..];
        Self::ALL
            .into_iter()
            .find(|stage| stage.extension().as_bytes() == ext)
            .ok_or_else(|| {
                log::error!("couldn't detect type of file {}, invalid extension", path.display());
                Error::UnknownShaderExtension(path.to_path_buf())
            })
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(gl: &Arc<glow::Context>, stage: ShaderStage, source: &str) -> Result<Self> {
        Self::compile(gl, stage, source, "<source>")
    }

    /// Reads and compiles a shader file. The stage comes from the extension.
    pub fn from_file(gl: &Arc<glow::Context>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stage = ShaderStage::from_path(path)?;
        let source = read_source(path)?;
        Self::compile(gl, stage, &source, &path.display().to_string())
    }

    fn compile(
        gl: &Arc<glow::Context>,
        stage: ShaderStage,
        source: &str,
        label: &str,
    ) -> Result<Self> {
        unsafe {
            let shader = gl.create_shader(stage.gl_type()).map_err(Error::Gl)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                log::error!("couldn't compile shader {label}, compilation failed:\n{log}");
                return Err(Error::ShaderCompile {
                    path: label.to_string(),
                    log,
                });
            }

            log::debug!("compiled {:?} shader {label}", stage);
            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
                stage,
            })
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
        log::debug!("deleted {:?} shader {}", self.stage, self.id.0);
    }
}

fn read_source(path: &Path) -> Result<String> {
    let source = std::fs::read_to_string(path).map_err(|source| {
        log::error!("couldn't read file {}: {source}", path.display());
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    if source.is_empty() {
        log::error!("couldn't read file {}, file has 0 length", path.display());
        return Err(Error::EmptyFile(path.to_path_buf()));
    }
    Ok(source)
}

/// The uniform types a program can register and set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
}

impl UniformKind {
    pub fn gl_type(self) -> u32 {
        match self {
            UniformKind::Int => glow::INT,
            UniformKind::Float => glow::FLOAT,
            UniformKind::Vec2 => glow::FLOAT_VEC2,
            UniformKind::Vec3 => glow::FLOAT_VEC3,
            UniformKind::Vec4 => glow::FLOAT_VEC4,
            UniformKind::Mat3 => glow::FLOAT_MAT3,
            UniformKind::Mat4 => glow::FLOAT_MAT4,
        }
    }

    pub fn name(self) -> &'static str {
        gl_enum_name(self.gl_type())
    }
}

impl TryFrom<u32> for UniformKind {
    type Error = Error;

    fn try_from(gl_type: u32) -> Result<Self> {
        match gl_type {
            glow::INT => Ok(UniformKind::Int),
            glow::FLOAT => Ok(UniformKind::Float),
            glow::FLOAT_VEC2 => Ok(UniformKind::Vec2),
            glow::FLOAT_VEC3 => Ok(UniformKind::Vec3),
            glow::FLOAT_VEC4 => Ok(UniformKind::Vec4),
            glow::FLOAT_MAT3 => Ok(UniformKind::Mat3),
            glow::FLOAT_MAT4 => Ok(UniformKind::Mat4),
            other => Err(Error::UnsupportedUniformType(other)),
        }
    }
}

/// A value that can be uploaded to a registered uniform.
pub trait Uniform {
    /// The kind of uniform this value fits.
    const KIND: UniformKind;

    /// Uploads the value. The owning program must be bound.
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for i32 {
    const KIND: UniformKind = UniformKind::Int;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl Uniform for bool {
    const KIND: UniformKind = UniformKind::Int;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self as i32) }
    }
}

impl Uniform for f32 {
    const KIND: UniformKind = UniformKind::Float;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_f32(Some(location), *self) }
    }
}

impl Uniform for Vec2 {
    const KIND: UniformKind = UniformKind::Vec2;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_2_f32_slice(Some(location), self.as_ref()) }
    }
}

impl Uniform for Vec3 {
    const KIND: UniformKind = UniformKind::Vec3;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_3_f32_slice(Some(location), self.as_ref()) }
    }
}

impl Uniform for Vec4 {
    const KIND: UniformKind = UniformKind::Vec4;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_4_f32_slice(Some(location), self.as_ref()) }
    }
}

impl Uniform for Mat3 {
    const KIND: UniformKind = UniformKind::Mat3;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_3_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

impl Uniform for Mat4 {
    const KIND: UniformKind = UniformKind::Mat4;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref()) }
    }
}

impl Uniform for [f32; 2] {
    const KIND: UniformKind = UniformKind::Vec2;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_2_f32_slice(Some(location), self) }
    }
}

impl Uniform for [f32; 3] {
    const KIND: UniformKind = UniformKind::Vec3;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_3_f32_slice(Some(location), self) }
    }
}

impl Uniform for [f32; 4] {
    const KIND: UniformKind = UniformKind::Vec4;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_4_f32_slice(Some(location), self) }
    }
}

impl<T: Uniform> Uniform for &T {
    const KIND: UniformKind = T::KIND;

    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        (*self).upload(gl, location);
    }
}

/// A uniform that has been looked up on a program.
#[derive(Debug, Clone)]
pub struct RegisteredUniform {
    pub location: glow::UniformLocation,
    pub kind: UniformKind,
}

/// Checks that `T` may be written into `registered`.
fn check_kind<T: Uniform>(name: &str, registered: &RegisteredUniform) -> Result<()> {
    if registered.kind == T::KIND {
        Ok(())
    } else {
        Err(Error::UniformKindMismatch {
            name: name.to_string(),
            expected: registered.kind.name(),
            found: T::KIND.name(),
        })
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    uniforms: IndexMap<String, RegisteredUniform>,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    ///
    /// The shaders are detached after linking and can be dropped right away.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self> {
        if shaders.is_empty() {
            log::error!("couldn't create shader program, no shaders given");
            return Err(Error::NoShaders);
        }
        unsafe {
            let program = gl.create_program().map_err(Error::Gl)?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                log::error!("couldn't link shader program:\n{log}");
                return Err(Error::ProgramLink(log));
            }

            log::debug!("linked shader program {} from {} shaders", program.0, shaders.len());
            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                uniforms: IndexMap::new(),
            })
        }
    }

    /// Compiles every file in `paths` and links them into a program.
    ///
    /// Compilation stops at the first failing file. Shaders compiled before it are released.
    pub fn from_files<P: AsRef<Path>>(gl: &Arc<glow::Context>, paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            log::error!("couldn't create shader program, no shader files given");
            return Err(Error::NoShaders);
        }
        let shaders = paths
            .iter()
            .map(|path| {
                Shader::from_file(gl, path).inspect_err(|_| {
                    log::error!(
                        "couldn't create shader program, compilation of shader {} failed",
                        path.as_ref().display()
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let refs = shaders.iter().collect::<Vec<_>>();
        Self::new(gl, &refs)
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Looks up `name` and remembers its location and kind.
    pub fn register_uniform(&mut self, name: &str, kind: UniformKind) -> Result<()> {
        self.use_program();
        let location = unsafe { self.gl.get_uniform_location(self.id, name) };
        let Some(location) = location else {
            log::warn!("uniform \"{name}\" not found in shader program {}", self.id.0);
            return Err(Error::UniformNotFound(name.to_string()));
        };
        self.uniforms
            .insert(name.to_string(), RegisteredUniform { location, kind });
        Ok(())
    }

    /// Same as [`register_uniform`](Self::register_uniform) but with a raw GL type enum.
    pub fn register_uniform_gl(&mut self, name: &str, gl_type: u32) -> Result<()> {
        let kind = UniformKind::try_from(gl_type).inspect_err(|_| {
            log::error!(
                "couldn't register uniform \"{name}\", unsupported type {}",
                gl_enum_name(gl_type)
            )
        })?;
        self.register_uniform(name, kind)
    }

    /// Sets a registered uniform.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) -> Result<()> {
        let Some(uniform) = self.uniforms.get(name) else {
            log::error!("couldn't set uniform \"{name}\", not registered in shader program");
            return Err(Error::UniformNotRegistered(name.to_string()));
        };
        check_kind::<T>(name, uniform)?;
        self.use_program();
        value.upload(&self.gl, &uniform.location);
        Ok(())
    }

    pub fn uniform(&self, name: &str) -> Option<&RegisteredUniform> {
        self.uniforms.get(name)
    }

    /// Registered uniforms in registration order.
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &RegisteredUniform)> {
        self.uniforms.iter().map(|(name, u)| (name.as_str(), u))
    }

    /// The raw program, for uniform types this module doesn't cover.
    pub fn id(&self) -> glow::Program {
        self.id
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
        log::debug!("deleted shader program {}", self.id.0);
    }
}

impl fmt::Display for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program {{")?;
        writeln!(f, "  shader_program: {}", self.id.0)?;
        writeln!(f, "  num_uniforms: {}", self.uniforms.len())?;
        writeln!(f, "  uniforms: {{")?;
        for (name, uniform) in &self.uniforms {
            writeln!(f, "    Uniform {{")?;
            writeln!(f, "      name: {name}")?;
            writeln!(f, "      location: {}", uniform.location.0)?;
            writeln!(
                f,
                "      type: {} ({})",
                uniform.kind.name(),
                uniform.kind.gl_type()
            )?;
            writeln!(f, "    }}")?;
        }
        writeln!(f, "  }}")?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_extension() {
        assert_eq!(
            ShaderStage::from_path(Path::new("shaders/chunk.vert")).unwrap(),
            ShaderStage::Vertex
        );
        assert_eq!(
            ShaderStage::from_path(Path::new("a.frag")).unwrap(),
            ShaderStage::Fragment
        );
        assert_eq!(
            ShaderStage::from_path(Path::new("outline.geom")).unwrap(),
            ShaderStage::Geometry
        );
        assert_eq!(
            ShaderStage::from_path(Path::new("x.tesc")).unwrap(),
            ShaderStage::TessControl
        );
        assert_eq!(
            ShaderStage::from_path(Path::new("x.tese")).unwrap(),
            ShaderStage::TessEvaluation
        );
        assert_eq!(
            ShaderStage::from_path(Path::new("cull.comp")).unwrap(),
            ShaderStage::Compute
        );
    }

    #[test]
    fn test_stage_rejects_short_and_unknown_names() {
        assert!(matches!(
            ShaderStage::from_path(Path::new("vert")),
            Err(Error::UnknownShaderExtension(_))
        ));
        assert!(matches!(
            ShaderStage::from_path(Path::new("shader.glsl")),
            Err(Error::UnknownShaderExtension(_))
        ));
        // extension matching is case sensitive
        assert!(ShaderStage::from_path(Path::new("shader.VERT")).is_err());
        // exactly five bytes is enough
        assert_eq!(
            ShaderStage::from_path(Path::new(".vert")).unwrap(),
            ShaderStage::Vertex
        );
    }

    #[test]
    fn test_stage_gl_types() {
        assert_eq!(ShaderStage::Vertex.gl_type(), glow::VERTEX_SHADER);
        assert_eq!(ShaderStage::Compute.gl_type(), glow::COMPUTE_SHADER);
        for stage in ShaderStage::ALL {
            assert_eq!(stage.extension().len(), 5);
        }
    }

    #[test]
    fn test_uniform_kind_from_gl() {
        assert_eq!(UniformKind::try_from(glow::FLOAT_MAT4).unwrap(), UniformKind::Mat4);
        assert_eq!(UniformKind::try_from(glow::INT).unwrap(), UniformKind::Int);
        for kind in [
            UniformKind::Int,
            UniformKind::Float,
            UniformKind::Vec2,
            UniformKind::Vec3,
            UniformKind::Vec4,
            UniformKind::Mat3,
            UniformKind::Mat4,
        ] {
            assert_eq!(UniformKind::try_from(kind.gl_type()).unwrap(), kind);
        }
        assert!(matches!(
            UniformKind::try_from(glow::SAMPLER_2D),
            Err(Error::UnsupportedUniformType(glow::SAMPLER_2D))
        ));
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(<i32 as Uniform>::KIND, UniformKind::Int);
        assert_eq!(<bool as Uniform>::KIND, UniformKind::Int);
        assert_eq!(<[f32; 3] as Uniform>::KIND, UniformKind::Vec3);
        assert_eq!(<&Mat4 as Uniform>::KIND, UniformKind::Mat4);
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let registered = RegisteredUniform {
            location: glow::NativeUniformLocation(0),
            kind: UniformKind::Mat4,
        };
        assert!(check_kind::<Mat4>("u_view", &registered).is_ok());
        let err = check_kind::<Vec3>("u_view", &registered).unwrap_err();
        assert_eq!(
            err.to_string(),
            "uniform \"u_view\" was registered as GL_FLOAT_MAT4, got GL_FLOAT_VEC3"
        );
    }

    #[test]
    fn test_read_source_rejects_empty_file() {
        let path = std::env::temp_dir().join(format!("nugl-empty-{}.frag", std::process::id()));
        std::fs::write(&path, "").unwrap();
        assert!(matches!(read_source(&path), Err(Error::EmptyFile(_))));

        std::fs::write(&path, "void main() {}\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), "void main() {}\n");
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(read_source(&path), Err(Error::Io { .. })));
    }
}
