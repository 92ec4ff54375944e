//! Window and logging configuration.
//!
//! Configuration is plain JSON. Every field is optional and falls back to the
//! values produced by [`Default`], so an empty object is a valid config.

use std::{path::Path, str::FromStr};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Title used when none (or an empty one) is supplied.
pub const DEFAULT_TITLE: &str = "nu_Window";

/// Options for creating a [`crate::abs::Window`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Width and height are ignored when this is set, the desktop resolution is used instead.
    pub fullscreen: bool,
    pub resizable: bool,
    pub vsync: bool,
    /// Requested OpenGL core profile version as `[major, minor]`.
    pub gl_version: [u8; 2],
    /// Colour used by [`crate::abs::Window::start_frame`].
    pub clear_color: [f32; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
            resizable: true,
            vsync: true,
            gl_version: [3, 3],
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl WindowConfig {
    /// Shorthand for a windowed or fullscreen config with everything else defaulted.
    pub fn new(title: &str, width: u32, height: u32, fullscreen: bool) -> Self {
        Self {
            title: title.to_string(),
            width,
            height,
            fullscreen,
            ..Default::default()
        }
    }

    /// The title to hand to SDL, never empty.
    pub fn effective_title(&self) -> &str {
        if self.title.is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }
}

/// Top level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parses a config from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and parses a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&s)
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The configured log level, `info` if it can't be parsed.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}
