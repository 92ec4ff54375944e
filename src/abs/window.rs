//! SDL2 and OpenGL window management.
//!
//! This module defines the [`Window`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application, along
//! with the per-frame helpers and the input state fed by its event pump.

use std::{fmt, sync::Arc};

use glow::HasContext;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    video::{FullscreenType, GLProfile, SwapInterval},
};

use crate::{
    config::WindowConfig,
    error::{Error, Result},
    input::InputState,
};

/// Viewport rectangle covering a drawable of `size` pixels.
fn viewport_rect((width, height): (u32, u32)) -> [i32; 4] {
    let clamp = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
    [0, 0, clamp(width), clamp(height)]
}

fn sdl_err(context: &str, e: impl fmt::Display) -> Error {
    log::error!("error creating window, {context} failed: {e}");
    Error::Sdl(format!("{context}: {e}"))
}

/// The [`Window`] struct encapsulates the SDL2 and OpenGL context.
///
/// Fields are dropped in declaration order, so the GL context goes before
/// the window and the window before SDL itself.
pub struct Window {
    event_pump: sdl2::EventPump,
    gl: Arc<glow::Context>,
    _gl_context: sdl2::video::GLContext,
    window: sdl2::video::Window,
    _video_subsystem: sdl2::VideoSubsystem,
    _sdl: sdl2::Sdl,
    width: u32,
    height: u32,
    clear_color: [f32; 4],
    input: InputState,
    should_close: bool,
}

impl Window {
    /// Creates a window and its OpenGL context from `config`.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(|e| sdl_err("sdl2::init()", e))?;
        let video_subsystem = sdl.video().map_err(|e| sdl_err("video subsystem", e))?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(config.gl_version[0], config.gl_version[1]);

        let (width, height) = if config.fullscreen {
            let mode = video_subsystem
                .current_display_mode(0)
                .map_err(|e| sdl_err("current_display_mode()", e))?;
            (mode.w.max(0) as u32, mode.h.max(0) as u32)
        } else {
            (config.width, config.height)
        };

        let mut builder = video_subsystem.window(config.effective_title(), width, height);
        builder.opengl();
        if config.resizable {
            builder.resizable();
        }
        let mut window = builder
            .build()
            .map_err(|e| sdl_err("window creation", e))?;
        if config.fullscreen {
            window
                .set_fullscreen(FullscreenType::Desktop)
                .map_err(|e| sdl_err("set_fullscreen()", e))?;
        }

        let gl_context = window
            .gl_create_context()
            .map_err(|e| sdl_err("gl_create_context()", e))?;
        window
            .gl_make_current(&gl_context)
            .map_err(|e| sdl_err("gl_make_current()", e))?;
        let interval = if config.vsync {
            SwapInterval::VSync
        } else {
            SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("couldn't set swap interval: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let gl = Arc::new(gl);
        let event_pump = sdl.event_pump().map_err(|e| sdl_err("event_pump()", e))?;

        let (width, height) = window.drawable_size();
        let [x, y, w, h] = viewport_rect((width, height));
        unsafe {
            gl.viewport(x, y, w, h);
        }
        log::info!(
            "created window \"{}\" {width}x{height}, OpenGL {}.{}",
            config.effective_title(),
            config.gl_version[0],
            config.gl_version[1]
        );

        Ok(Self {
            event_pump,
            gl,
            _gl_context: gl_context,
            window,
            _video_subsystem: video_subsystem,
            _sdl: sdl,
            width,
            height,
            clear_color: config.clear_color,
            input: InputState::new(),
            should_close: false,
        })
    }

    /// Creates a window with the given title and size, everything else defaulted.
    /// The width and height are ignored if `fullscreen` is set to `true`.
    pub fn with_size(title: &str, width: u32, height: u32, fullscreen: bool) -> Result<Self> {
        Self::new(&WindowConfig::new(title, width, height, fullscreen))
    }

    /// Clears the colour and depth buffers.
    pub fn start_frame(&self) {
        let [r, g, b, a] = self.clear_color;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    /// Swaps buffers, then polls events.
    pub fn end_frame(&mut self) {
        self.window.gl_swap_window();
        self.poll_events();
    }

    fn poll_events(&mut self) {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => self.should_close = true,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    // event sizes are in window coordinates, the viewport wants pixels
                    (self.width, self.height) = self.window.drawable_size();
                    let [x, y, w, h] = viewport_rect((self.width, self.height));
                    unsafe {
                        self.gl.viewport(x, y, w, h);
                    }
                    log::debug!("window resized to {}x{}", self.width, self.height);
                }
                _ => {}
            }
            self.input.handle_event(&event);
        }
    }

    /// Copies this frame's input into the previous frame's. Run at the end of every frame.
    pub fn update_input(&mut self) {
        self.input.update();
    }

    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Set once SDL reports a quit request, or after [`close`](Self::close).
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn close(&mut self) {
        self.should_close = true;
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.window.set_title(title) {
            log::warn!("couldn't set window title: {e}");
        }
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    pub fn key_state(&self, keycode: Keycode) -> bool {
        self.input.key_state(keycode)
    }

    pub fn key_pressed(&self, keycode: Keycode) -> bool {
        self.input.key_pressed(keycode)
    }

    pub fn mouse_x(&self) -> f64 {
        self.input.mouse_x()
    }

    pub fn mouse_y(&self) -> f64 {
        self.input.mouse_y()
    }

    pub fn last_mouse_x(&self) -> f64 {
        self.input.last_mouse_x()
    }

    pub fn last_mouse_y(&self) -> f64 {
        self.input.last_mouse_y()
    }

    pub fn delta_mouse_x(&self) -> f64 {
        self.input.delta_mouse_x()
    }

    pub fn delta_mouse_y(&self) -> f64 {
        self.input.delta_mouse_y()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        log::debug!("destroying window \"{}\"", self.window.title());
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = &self.input;
        writeln!(f, "Window {{")?;
        writeln!(f, "  title: {}", self.window.title())?;
        writeln!(f, "  width: {}", self.width)?;
        writeln!(f, "  height: {}", self.height)?;
        writeln!(f, "  mouse_x: {:.2}", input.mouse_x())?;
        writeln!(f, "  mouse_y: {:.2}", input.mouse_y())?;
        writeln!(f, "  last_mouse_x: {:.2}", input.last_mouse_x())?;
        writeln!(f, "  last_mouse_y: {:.2}", input.last_mouse_y())?;
        writeln!(
            f,
            "  mouse_left: {}",
            input.mouse_button_state(sdl2::mouse::MouseButton::Left)
        )?;
        writeln!(
            f,
            "  mouse_right: {}",
            input.mouse_button_state(sdl2::mouse::MouseButton::Right)
        )?;
        writeln!(f, "  focused: {}", input.focused())?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_covers_drawable() {
        assert_eq!(viewport_rect((1280, 720)), [0, 0, 1280, 720]);
        assert_eq!(viewport_rect((0, 0)), [0, 0, 0, 0]);
        assert_eq!(viewport_rect((u32::MAX, 1)), [0, 0, i32::MAX, 1]);
    }
}
