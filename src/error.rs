//! Error type shared by every handle in the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while creating or using a handle.
#[derive(Debug, Error)]
pub enum Error {
    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("OpenGL error: {0}")]
    Gl(String),

    #[error("couldn't read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't read file {0}, file has 0 length")]
    EmptyFile(PathBuf),

    #[error(
        "couldn't detect shader type of {0}, use .vert, .frag, .geom, .tesc, .tese or .comp"
    )]
    UnknownShaderExtension(PathBuf),

    #[error("couldn't compile shader {path}:\n{log}")]
    ShaderCompile { path: String, log: String },

    #[error("couldn't link shader program:\n{0}")]
    ProgramLink(String),

    #[error("couldn't create shader program, no shaders given")]
    NoShaders,

    #[error("uniform \"{0}\" not found in shader program")]
    UniformNotFound(String),

    #[error("uniform \"{0}\" not registered in shader program")]
    UniformNotRegistered(String),

    #[error("uniform \"{name}\" was registered as {expected}, got {found}")]
    UniformKindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unsupported uniform type {0:#06x}, set it through the raw program id")]
    UnsupportedUniformType(u32),

    #[error("couldn't create mesh, layout has 0 components")]
    EmptyLayout,

    #[error("couldn't create mesh, stride was 0")]
    ZeroStride,

    #[error("couldn't load texture {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("couldn't load texture array, no images given")]
    EmptyTextureArray,

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("couldn't install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = Error::UniformNotRegistered("u_view".to_string());
        assert_eq!(
            err.to_string(),
            "uniform \"u_view\" not registered in shader program"
        );

        let err = Error::UnknownShaderExtension(PathBuf::from("shader.glsl"));
        assert!(err.to_string().contains("shader.glsl"));
        assert!(err.to_string().contains(".tese"));

        let err = Error::UnsupportedUniformType(glow::SAMPLER_2D);
        assert_eq!(
            err.to_string(),
            "unsupported uniform type 0x8b5e, set it through the raw program id"
        );
    }
}
