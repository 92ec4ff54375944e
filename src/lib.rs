//! A small convenience layer over SDL2 windows and OpenGL 3.3.
//!
//! The crate wraps the handful of objects a simple renderer needs: a [`Window`]
//! with its GL context and input state, a [`ShaderProgram`] built from shader
//! files, a [`Mesh`] filled through a CPU-side byte builder, and a [`Texture`]
//! loaded from image files. Every handle owns its GL object and releases it on
//! drop.

pub mod abs;
pub mod config;
pub mod error;
pub mod glenum;
pub mod input;
pub mod logging;

pub use abs::*;
pub use config::{Config, WindowConfig};
pub use error::{Error, Result};
pub use input::InputState;
