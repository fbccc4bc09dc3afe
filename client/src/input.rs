//! Pointer and keyboard capture with press edge detection

use crate::game::InputEvent;
use macroquad::prelude::*;

/// Turns held buttons into one event per press
pub struct InputManager {
    // Previous frame states for edge detection
    prev_flap: bool,
    prev_pointer: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_flap: false,
            prev_pointer: false,
        }
    }

    /// Samples macroquad's input state for this frame
    pub fn poll(&mut self) -> Vec<InputEvent> {
        let flap = is_key_down(KeyCode::Space) || is_key_down(KeyCode::Up);
        let pointer = is_mouse_button_down(MouseButton::Left);
        let (x, y) = mouse_position();
        self.detect(flap, pointer, (x, y))
    }

    /// Emits events for keys that went down since the previous call
    pub fn detect(&mut self, flap: bool, pointer: bool, position: (f32, f32)) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if pointer && !self.prev_pointer {
            events.push(InputEvent::Pointer {
                x: position.0,
                y: position.1,
            });
        }
        if flap && !self.prev_flap {
            events.push(InputEvent::Flap);
        }

        self.prev_flap = flap;
        self.prev_pointer = pointer;
        events
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_fires_once_while_held() {
        let mut input = InputManager::new();

        assert_eq!(input.detect(true, false, (0.0, 0.0)), vec![InputEvent::Flap]);
        assert!(input.detect(true, false, (0.0, 0.0)).is_empty());
        assert!(input.detect(false, false, (0.0, 0.0)).is_empty());
        assert_eq!(input.detect(true, false, (0.0, 0.0)), vec![InputEvent::Flap]);
    }

    #[test]
    fn test_pointer_carries_position() {
        let mut input = InputManager::new();

        let events = input.detect(false, true, (120.0, 48.5));
        assert_eq!(events, vec![InputEvent::Pointer { x: 120.0, y: 48.5 }]);
        assert!(input.detect(false, true, (130.0, 50.0)).is_empty());
    }

    #[test]
    fn test_simultaneous_presses() {
        let mut input = InputManager::new();
        let events = input.detect(true, true, (1.0, 2.0));
        assert_eq!(events.len(), 2);
    }
}
