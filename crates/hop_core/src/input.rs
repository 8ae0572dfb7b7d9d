//! Keyboard state with level-triggered (held) and edge-triggered
//! (just-pressed) queries.
//!
//! Movement keys are read as held state every step; the jump key is
//! edge-triggered so holding Space does not machine-gun jumps. Edge state is
//! cleared by `end_frame()`, which the main loop calls only after at least
//! one fixed simulation step ran -- a press landing on a zero-step frame
//! would otherwise be dropped before the simulation ever saw it.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    A,
    D,
    Space,
    Escape,
    F3,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        // OS key-repeat re-delivers key_down while held; only the first
        // transition counts as a press.
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn repeat_key_down_does_not_retrigger_press() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.end_frame();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(!input.is_just_pressed(Key::Space));
    }

    #[test]
    fn end_frame_clears_presses_but_not_held() {
        let mut input = InputState::new();
        input.key_down(Key::D);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::D));
        assert!(input.is_held(Key::D));
    }

    #[test]
    fn key_up_then_down_presses_again() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.end_frame();
        input.key_up(Key::Space);
        input.key_down(Key::Space);
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn movement_keys_track_independently() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_down(Key::Right);
        input.key_up(Key::A);
        assert!(!input.is_held(Key::A));
        assert!(input.is_held(Key::Right));
    }
}
