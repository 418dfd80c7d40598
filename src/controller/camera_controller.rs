use crate::controller::input::InputSnapshot;
use crate::model::HeadOrientation;

/// Angular speed factor shared by mouse and keyboard drive.
pub const ROTATION_SPEED: f32 = 7.0;
/// Exponential decay constant for the velocity when no input drives it, 1/s.
pub const DAMPING: f32 = 0.8;
/// Converts pointer velocity (px/s) into angular velocity.
pub const MOUSE_VEL_SCALE: f32 = 0.0005;
/// Velocity-to-angle integration divisor, kept from the tuned behavior.
pub const ANGLE_STEP_DIVISOR: f32 = 3.0;

/// Damped orbit rotation state. One instance per viewer, updated once per
/// frame; never global.
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraController {
    pub angle_horz: f32,
    pub angle_vert: f32,
    pub angle_vel_horz: f32,
    pub angle_vel_vert: f32,
    /// Latched when a keyboard axis was the last drive source. A mouse
    /// press releases it.
    keyboard_driven: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// One tick of the rotation state machine.
    ///
    /// Drive priority per frame: mouse drag, then touch recentering, then
    /// latched keyboard axes, then damping. Angles integrate afterwards as
    /// `angle -= velocity / ANGLE_STEP_DIVISOR` on both axes.
    pub fn update(&mut self, input: &InputSnapshot, head: HeadOrientation, dt: f32) {
        if input.left_right_axis != 0.0 || input.up_down_axis != 0.0 {
            self.keyboard_driven = true;
        }

        if input.mouse_left {
            self.keyboard_driven = false;
            // Dragging right turns the view left
            self.angle_vel_horz = -ROTATION_SPEED * input.mouse_vel.0 * dt * MOUSE_VEL_SCALE;
            self.angle_vel_vert = -ROTATION_SPEED * input.mouse_vel.1 * dt * MOUSE_VEL_SCALE;
        } else if input.touch_active {
            // Recenter onto the sensor estimate. Velocities are dropped so
            // the integration below leaves the angles equal to it exactly.
            self.angle_horz = head.yaw;
            self.angle_vert = head.pitch;
            self.angle_vel_horz = 0.0;
            self.angle_vel_vert = 0.0;
        } else if self.keyboard_driven {
            self.angle_vel_horz = -ROTATION_SPEED * input.left_right_axis * dt;
            self.angle_vel_vert = -ROTATION_SPEED * input.up_down_axis * dt;
        } else {
            let falloff = (-DAMPING * dt).exp();
            self.angle_vel_horz *= falloff;
            self.angle_vel_vert *= falloff;
        }

        self.angle_horz -= self.angle_vel_horz / ANGLE_STEP_DIVISOR;
        self.angle_vert -= self.angle_vel_vert / ANGLE_STEP_DIVISOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    #[test]
    fn test_velocity_decays_geometrically() {
        let mut controller = CameraController {
            angle_vel_horz: 2.0,
            angle_vel_vert: -1.5,
            ..Default::default()
        };
        let dt = 1.0 / 60.0;
        let frames = 90;
        for _ in 0..frames {
            controller.update(&idle(), HeadOrientation::default(), dt);
        }
        let expected = (-DAMPING * dt * frames as f32).exp();
        assert!((controller.angle_vel_horz - 2.0 * expected).abs() < EPSILON);
        assert!((controller.angle_vel_vert - -1.5 * expected).abs() < EPSILON);
    }

    #[test]
    fn test_touch_recenters_exactly() {
        let mut controller = CameraController {
            angle_horz: 1.2,
            angle_vert: -0.4,
            angle_vel_horz: 5.0,
            angle_vel_vert: 5.0,
            ..Default::default()
        };
        let head = HeadOrientation {
            yaw: 0.25,
            roll: 0.9,
            pitch: -0.75,
        };
        let input = InputSnapshot {
            touch_active: true,
            ..Default::default()
        };
        controller.update(&input, head, 1.0 / 60.0);
        assert_eq!(controller.angle_horz, head.yaw);
        assert_eq!(controller.angle_vert, head.pitch);
    }

    #[test]
    fn test_mouse_drag_sign_and_magnitude() {
        let mut controller = CameraController::new();
        let dt = 1.0 / 60.0;
        let input = InputSnapshot {
            mouse_left: true,
            mouse_vel: (120.0, -40.0),
            ..Default::default()
        };
        controller.update(&input, HeadOrientation::default(), dt);
        // Rightward drag, negative velocity
        assert!(
            (controller.angle_vel_horz - -(ROTATION_SPEED * 120.0 * dt * MOUSE_VEL_SCALE)).abs()
                < EPSILON
        );
        assert!(
            (controller.angle_vel_vert - -(ROTATION_SPEED * -40.0 * dt * MOUSE_VEL_SCALE)).abs()
                < EPSILON
        );
    }

    #[test]
    fn test_keyboard_latch_until_mouse_press() {
        let mut controller = CameraController::new();
        let dt = 1.0 / 60.0;
        let keys = InputSnapshot {
            left_right_axis: 1.0,
            ..Default::default()
        };
        controller.update(&keys, HeadOrientation::default(), dt);
        assert!(controller.keyboard_driven);
        assert!((controller.angle_vel_horz - -(ROTATION_SPEED * dt)).abs() < EPSILON);

        // Axis released: latched mode keeps driving from the (zero) axis
        // instead of damping
        controller.update(&idle(), HeadOrientation::default(), dt);
        assert!(controller.keyboard_driven);
        assert_eq!(controller.angle_vel_horz, 0.0);

        // Mouse press releases the latch
        let mouse = InputSnapshot {
            mouse_left: true,
            ..Default::default()
        };
        controller.update(&mouse, HeadOrientation::default(), dt);
        assert!(!controller.keyboard_driven);
    }

    #[test]
    fn test_integration_divisor() {
        let mut controller = CameraController {
            angle_vel_horz: 3.0,
            keyboard_driven: false,
            ..Default::default()
        };
        let dt = 1.0 / 60.0;
        controller.update(&idle(), HeadOrientation::default(), dt);
        let vel = 3.0 * (-DAMPING * dt).exp();
        assert!((controller.angle_horz - -(vel / ANGLE_STEP_DIVISOR)).abs() < EPSILON);
    }

    #[test]
    fn test_angles_stay_finite() {
        let mut controller = CameraController::new();
        let wild = InputSnapshot {
            mouse_left: true,
            mouse_vel: (1e6, -1e6),
            ..Default::default()
        };
        for _ in 0..1000 {
            controller.update(&wild, HeadOrientation::default(), 0.25);
        }
        assert!(controller.angle_horz.is_finite());
        assert!(controller.angle_vert.is_finite());
        assert!(controller.angle_vel_horz.is_finite());
        assert!(controller.angle_vel_vert.is_finite());
    }
}
