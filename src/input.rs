//! Keyboard and mouse state.
//!
//! [`InputState`] keeps two copies of everything: the state as of the latest
//! processed event, and the state at the last call to [`InputState::update`].
//! "Pressed this frame" is then just "down now, up before".

use fxhash::FxHashSet;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    mouse::MouseButton,
};

/// The state of the two tracked mouse buttons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Buttons {
    left: bool,
    right: bool,
}

impl Buttons {
    fn get(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            _ => false,
        }
    }

    fn set(&mut self, button: MouseButton, down: bool) {
        match button {
            MouseButton::Left => self.left = down,
            MouseButton::Right => self.right = down,
            _ => {}
        }
    }
}

/// Current and previous frame input.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: FxHashSet<Keycode>,
    last_keys: FxHashSet<Keycode>,
    mouse: (f64, f64),
    last_mouse: (f64, f64),
    buttons: Buttons,
    last_buttons: Buttons,
    focused: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a single SDL event into the current state. Events that aren't
    /// input related are ignored.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::KeyDown {
                keycode: Some(keycode),
                ..
            } => self.set_key(*keycode, true),
            Event::KeyUp {
                keycode: Some(keycode),
                ..
            } => self.set_key(*keycode, false),
            Event::MouseMotion { x, y, .. } => self.set_cursor(*x as f64, *y as f64),
            Event::MouseButtonDown { mouse_btn, .. } => self.set_mouse_button(*mouse_btn, true),
            Event::MouseButtonUp { mouse_btn, .. } => self.set_mouse_button(*mouse_btn, false),
            Event::Window {
                win_event: WindowEvent::FocusGained,
                ..
            } => self.set_focused(true),
            Event::Window {
                win_event: WindowEvent::FocusLost,
                ..
            } => self.set_focused(false),
            _ => {}
        }
    }

    pub fn set_key(&mut self, keycode: Keycode, down: bool) {
        if down {
            self.keys.insert(keycode);
        } else {
            self.keys.remove(&keycode);
        }
    }

    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.mouse = (x, y);
    }

    /// Only the left and right buttons are tracked.
    pub fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        self.buttons.set(button, down);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Makes the current state the previous state. Run once at the end of every frame.
    pub fn update(&mut self) {
        self.last_keys.clone_from(&self.keys);
        self.last_mouse = self.mouse;
        self.last_buttons = self.buttons;
    }

    /// Whether `keycode` is currently held.
    pub fn key_state(&self, keycode: Keycode) -> bool {
        self.keys.contains(&keycode)
    }

    /// Whether `keycode` went down since the last [`update`](Self::update).
    pub fn key_pressed(&self, keycode: Keycode) -> bool {
        self.keys.contains(&keycode) && !self.last_keys.contains(&keycode)
    }

    /// Whether `keycode` went up since the last [`update`](Self::update).
    pub fn key_released(&self, keycode: Keycode) -> bool {
        !self.keys.contains(&keycode) && self.last_keys.contains(&keycode)
    }

    pub fn mouse_x(&self) -> f64 {
        self.mouse.0
    }

    pub fn mouse_y(&self) -> f64 {
        self.mouse.1
    }

    pub fn last_mouse_x(&self) -> f64 {
        self.last_mouse.0
    }

    pub fn last_mouse_y(&self) -> f64 {
        self.last_mouse.1
    }

    pub fn delta_mouse_x(&self) -> f64 {
        self.mouse.0 - self.last_mouse.0
    }

    pub fn delta_mouse_y(&self) -> f64 {
        self.mouse.1 - self.last_mouse.1
    }

    pub fn mouse_button_state(&self, button: MouseButton) -> bool {
        self.buttons.get(button)
    }

    pub fn mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.get(button) && !self.last_buttons.get(button)
    }

    pub fn focused(&self) -> bool {
        self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdl2::{keyboard::Mod, mouse::MouseState};

    fn key_event(keycode: Option<Keycode>, down: bool) -> Event {
        if down {
            Event::KeyDown {
                timestamp: 0,
                window_id: 1,
                keycode,
                scancode: None,
                keymod: Mod::NOMOD,
                repeat: false,
            }
        } else {
            Event::KeyUp {
                timestamp: 0,
                window_id: 1,
                keycode,
                scancode: None,
                keymod: Mod::NOMOD,
                repeat: false,
            }
        }
    }

    #[test]
    fn test_key_pressed_only_on_first_frame() {
        let mut input = InputState::new();
        input.set_key(Keycode::W, true);
        assert!(input.key_state(Keycode::W));
        assert!(input.key_pressed(Keycode::W));

        input.update();
        // repeats keep the key down without re-triggering a press
        input.set_key(Keycode::W, true);
        assert!(input.key_state(Keycode::W));
        assert!(!input.key_pressed(Keycode::W));

        input.set_key(Keycode::W, false);
        assert!(!input.key_state(Keycode::W));
        assert!(input.key_released(Keycode::W));

        input.update();
        assert!(!input.key_released(Keycode::W));
        assert!(!input.key_state(Keycode::A));
    }

    #[test]
    fn test_mouse_delta_against_last_frame() {
        let mut input = InputState::new();
        input.set_cursor(10.0, 20.0);
        assert_eq!(input.delta_mouse_x(), 10.0);
        assert_eq!(input.delta_mouse_y(), 20.0);

        input.update();
        assert_eq!(input.last_mouse_x(), 10.0);
        assert_eq!(input.last_mouse_y(), 20.0);
        assert_eq!(input.delta_mouse_x(), 0.0);

        input.set_cursor(4.0, 25.5);
        input.set_cursor(7.0, 30.0);
        assert_eq!(input.mouse_x(), 7.0);
        assert_eq!(input.mouse_y(), 30.0);
        assert_eq!(input.delta_mouse_x(), -3.0);
        assert_eq!(input.delta_mouse_y(), 10.0);
    }

    #[test]
    fn test_only_left_and_right_buttons_tracked() {
        let mut input = InputState::new();
        input.set_mouse_button(MouseButton::Left, true);
        input.set_mouse_button(MouseButton::Middle, true);
        assert!(input.mouse_button_state(MouseButton::Left));
        assert!(input.mouse_button_pressed(MouseButton::Left));
        assert!(!input.mouse_button_state(MouseButton::Middle));
        assert!(!input.mouse_button_state(MouseButton::Right));

        input.update();
        assert!(input.mouse_button_state(MouseButton::Left));
        assert!(!input.mouse_button_pressed(MouseButton::Left));

        input.set_mouse_button(MouseButton::Right, true);
        assert!(input.mouse_button_pressed(MouseButton::Right));
    }

    #[test]
    fn test_focus_events() {
        let mut input = InputState::new();
        assert!(!input.focused());
        input.handle_event(&Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event: WindowEvent::FocusGained,
        });
        assert!(input.focused());
        input.handle_event(&Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event: WindowEvent::FocusLost,
        });
        assert!(!input.focused());
    }

    #[test]
    fn test_events_route_into_state() {
        let mut input = InputState::new();

        input.handle_event(&key_event(Some(Keycode::A), true));
        assert!(input.key_state(Keycode::A));
        assert!(input.key_pressed(Keycode::A));

        // key events without a keycode are ignored
        let before = input.clone();
        input.handle_event(&key_event(None, true));
        assert_eq!(input.keys, before.keys);

        input.handle_event(&Event::MouseMotion {
            timestamp: 0,
            window_id: 1,
            which: 0,
            mousestate: MouseState::from_sdl_state(0),
            x: 5,
            y: 7,
            xrel: 5,
            yrel: 7,
        });
        assert_eq!((input.mouse_x(), input.mouse_y()), (5.0, 7.0));

        input.handle_event(&Event::MouseButtonDown {
            timestamp: 0,
            window_id: 1,
            which: 0,
            mouse_btn: MouseButton::Right,
            clicks: 1,
            x: 5,
            y: 7,
        });
        assert!(input.mouse_button_state(MouseButton::Right));
        assert!(!input.mouse_button_state(MouseButton::Left));

        input.update();
        input.handle_event(&key_event(Some(Keycode::A), false));
        assert!(!input.key_state(Keycode::A));
        assert!(input.key_released(Keycode::A));

        input.handle_event(&Event::MouseButtonUp {
            timestamp: 0,
            window_id: 1,
            which: 0,
            mouse_btn: MouseButton::Right,
            clicks: 1,
            x: 5,
            y: 7,
        });
        assert!(!input.mouse_button_state(MouseButton::Right));
    }
}
