//! This module contains the handles wrapping SDL2 and OpenGL objects:
//! windows, shader programs, meshes and textures.

pub mod mesh;
pub mod shader;
pub mod texture;
pub mod window;

pub use mesh::*;
pub use shader::*;
pub use texture::*;
pub use window::*;
