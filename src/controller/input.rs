//! Per-frame input accumulation.

use std::collections::HashSet;

use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// What the camera controller consumes for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// -1.0 / 0.0 / +1.0 from arrow keys and A/D, right positive.
    pub left_right_axis: f32,
    /// -1.0 / 0.0 / +1.0 from arrow keys and W/S, up positive.
    pub up_down_axis: f32,
    /// Left mouse button currently held. Presses the GUI overlay consumed
    /// never show up here.
    pub mouse_left: bool,
    /// Pointer velocity in px/s, from the motion accumulated since the
    /// previous snapshot.
    pub mouse_vel: (f32, f32),
    /// At least one touch point is down.
    pub touch_active: bool,
}

/// Accumulates winit events between redraws; drained once per frame.
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    mouse_left: bool,
    mouse_delta: (f32, f32),
    active_touches: HashSet<u64>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            mouse_left: false,
            mouse_delta: (0.0, 0.0),
            active_touches: HashSet::new(),
        }
    }

    /// Feed one window event. The caller filters out events the GUI
    /// overlay already consumed.
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            self.pressed_keys.insert(code);
                        }
                        ElementState::Released => {
                            self.pressed_keys.remove(&code);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *button == MouseButton::Left {
                    self.mouse_left = *state == ElementState::Pressed;
                }
            }
            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started | TouchPhase::Moved => {
                    self.active_touches.insert(touch.id);
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    self.active_touches.remove(&touch.id);
                }
            },
            WindowEvent::Focused(false) => self.clear(),
            _ => {}
        }
    }

    /// Feed relative mouse motion (device event, not clipped to the window).
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_delta.0 += delta.0 as f32;
        self.mouse_delta.1 += delta.1 as f32;
    }

    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.mouse_left = false;
        self.mouse_delta = (0.0, 0.0);
        self.active_touches.clear();
    }

    fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed_keys.contains(&code)
    }

    /// Drain the accumulated state into this frame's snapshot. `dt` is the
    /// elapsed time since the previous snapshot, in seconds.
    pub fn snapshot(&mut self, dt: f32) -> InputSnapshot {
        let mut left_right = 0.0;
        let mut up_down = 0.0;
        if self.is_pressed(KeyCode::ArrowLeft) || self.is_pressed(KeyCode::KeyA) {
            left_right -= 1.0;
        }
        if self.is_pressed(KeyCode::ArrowRight) || self.is_pressed(KeyCode::KeyD) {
            left_right += 1.0;
        }
        if self.is_pressed(KeyCode::ArrowDown) || self.is_pressed(KeyCode::KeyS) {
            up_down -= 1.0;
        }
        if self.is_pressed(KeyCode::ArrowUp) || self.is_pressed(KeyCode::KeyW) {
            up_down += 1.0;
        }

        let delta = self.mouse_delta;
        self.mouse_delta = (0.0, 0.0);
        let mouse_vel = if dt > 0.0 {
            (delta.0 / dt, delta.1 / dt)
        } else {
            (0.0, 0.0)
        };

        InputSnapshot {
            left_right_axis: left_right,
            up_down_axis: up_down,
            mouse_left: self.mouse_left,
            mouse_vel,
            touch_active: !self.active_touches.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_from_keys() {
        let mut input = InputState::new();
        input.pressed_keys.insert(KeyCode::ArrowRight);
        input.pressed_keys.insert(KeyCode::KeyW);
        let snap = input.snapshot(0.016);
        assert_eq!(snap.left_right_axis, 1.0);
        assert_eq!(snap.up_down_axis, 1.0);

        // Opposing keys cancel out
        input.pressed_keys.insert(KeyCode::ArrowLeft);
        let snap = input.snapshot(0.016);
        assert_eq!(snap.left_right_axis, 0.0);
    }

    #[test]
    fn test_mouse_velocity_is_delta_over_dt() {
        let mut input = InputState::new();
        input.process_mouse_motion((8.0, -4.0));
        input.process_mouse_motion((2.0, 0.0));
        let snap = input.snapshot(0.1);
        assert_eq!(snap.mouse_vel, (100.0, -40.0));

        // Snapshot drains the accumulator
        let snap = input.snapshot(0.1);
        assert_eq!(snap.mouse_vel, (0.0, 0.0));
    }

    #[test]
    fn test_zero_dt_yields_zero_velocity() {
        let mut input = InputState::new();
        input.process_mouse_motion((5.0, 5.0));
        let snap = input.snapshot(0.0);
        assert_eq!(snap.mouse_vel, (0.0, 0.0));
    }

    #[test]
    fn test_touch_tracking() {
        let mut input = InputState::new();
        assert!(!input.snapshot(0.016).touch_active);
        input.active_touches.insert(7);
        assert!(input.snapshot(0.016).touch_active);
        input.active_touches.remove(&7);
        assert!(!input.snapshot(0.016).touch_active);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut input = InputState::new();
        input.pressed_keys.insert(KeyCode::KeyD);
        input.mouse_left = true;
        input.process_mouse_motion((3.0, 3.0));
        input.active_touches.insert(1);
        input.clear();
        let snap = input.snapshot(0.016);
        assert_eq!(snap, InputSnapshot::default());
    }
}
