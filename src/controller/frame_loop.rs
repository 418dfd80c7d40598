//! Per-frame view matrices and pass planning.
//!
//! Everything here is plain arithmetic on the controller state, kept free of
//! GPU types so the per-frame pass structure can be asserted directly.

use glam::{Mat4, Vec3};

use crate::config::StereoMode;
use crate::model::HeadOrientation;

/// Scene placement below the viewer, world units.
pub const SCENE_OFFSET_Y: f32 = -200.0;
/// Depth in front of the viewer where the two eye axes converge.
pub const CONVERGENCE_DEPTH: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Horizontal camera offset of this eye: the left eye sits at
    /// `+eye_distance/2`, the right at the mirrored negative.
    pub fn offset(self, eye_distance: f32) -> f32 {
        match self {
            Eye::Left => eye_distance / 2.0,
            Eye::Right => -eye_distance / 2.0,
        }
    }
}

/// Window region a pass draws into, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One scene pass of a frame.
#[derive(Debug, Clone, Copy)]
pub struct EyePass {
    /// `None` for the single mono pass.
    pub eye: Option<Eye>,
    pub viewport: Viewport,
    pub view: Mat4,
}

/// The complete pass structure of one frame. Execution follows it 1:1.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub passes: Vec<EyePass>,
    /// Whether the offscreen stereo target gets composited to the surface
    /// after the scene passes.
    pub composite: bool,
}

/// Rotation shared by every pass of a frame, composed Z·X·Y from the head
/// estimate and the controller angles.
pub fn head_rotation(head: HeadOrientation, angle_horz: f32, angle_vert: f32) -> Mat4 {
    let rot_x = Mat4::from_rotation_x(-head.pitch + angle_vert);
    let rot_y = Mat4::from_rotation_y(-head.yaw + angle_horz);
    let rot_z = Mat4::from_rotation_z(-head.roll);
    rot_z * rot_x * rot_y
}

/// View matrix of the single full-window pass.
pub fn mono_view(head: HeadOrientation, angle_horz: f32, angle_vert: f32) -> Mat4 {
    head_rotation(head, angle_horz, angle_vert)
        * Mat4::from_translation(Vec3::new(0.0, SCENE_OFFSET_Y, 0.0))
}

/// View matrix of one stereo eye: the eye looks from its offset position at
/// the convergence point in front of the viewer, with the scene shifted by
/// the same offset.
pub fn eye_view(
    eye: Eye,
    eye_distance: f32,
    head: HeadOrientation,
    angle_horz: f32,
    angle_vert: f32,
) -> Mat4 {
    let offset = eye.offset(eye_distance);
    let look = Mat4::look_at_rh(
        Vec3::new(offset, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -CONVERGENCE_DEPTH),
        Vec3::Y,
    );
    head_rotation(head, angle_horz, angle_vert)
        * look
        * Mat4::from_translation(Vec3::new(offset, SCENE_OFFSET_Y, 0.0))
}

/// Lay out the passes of one frame. Mono is a single full-window pass with
/// no composite; side-by-side is exactly left then right onto the window
/// halves, then one composite.
pub fn plan_frame(
    mode: StereoMode,
    width: u32,
    height: u32,
    eye_distance: f32,
    head: HeadOrientation,
    angle_horz: f32,
    angle_vert: f32,
) -> FramePlan {
    match mode {
        StereoMode::Mono => FramePlan {
            passes: vec![EyePass {
                eye: None,
                viewport: Viewport {
                    x: 0,
                    y: 0,
                    width,
                    height,
                },
                view: mono_view(head, angle_horz, angle_vert),
            }],
            composite: false,
        },
        StereoMode::SideBySide => {
            let half = width / 2;
            FramePlan {
                passes: vec![
                    EyePass {
                        eye: Some(Eye::Left),
                        viewport: Viewport {
                            x: 0,
                            y: 0,
                            width: half,
                            height,
                        },
                        view: eye_view(Eye::Left, eye_distance, head, angle_horz, angle_vert),
                    },
                    EyePass {
                        eye: Some(Eye::Right),
                        viewport: Viewport {
                            x: half,
                            y: 0,
                            width: width - half,
                            height,
                        },
                        view: eye_view(Eye::Right, eye_distance, head, angle_horz, angle_vert),
                    },
                ],
                composite: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_mat_close(a: Mat4, b: Mat4) {
        let a = a.to_cols_array();
        let b = b.to_cols_array();
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < EPSILON, "element {}: {} vs {}", i, a[i], b[i]);
        }
    }

    fn head() -> HeadOrientation {
        HeadOrientation {
            yaw: 0.3,
            roll: -0.2,
            pitch: 0.1,
        }
    }

    #[test]
    fn test_rotation_composes_z_x_y() {
        let h = head();
        let expected = Mat4::from_rotation_z(0.2)
            * Mat4::from_rotation_x(-0.1 + 0.5)
            * Mat4::from_rotation_y(-0.3 + 0.7);
        assert_mat_close(head_rotation(h, 0.7, 0.5), expected);
    }

    #[test]
    fn test_angles_cancel_head_estimate() {
        // Controller angles equal to the head estimate null the X/Y parts
        let h = head();
        let expected = Mat4::from_rotation_z(0.2);
        assert_mat_close(head_rotation(h, h.yaw, h.pitch), expected);
    }

    #[test]
    fn test_mono_view_is_rotation_times_translation() {
        let view = mono_view(head(), 0.4, -0.6);
        let expected = head_rotation(head(), 0.4, -0.6)
            * Mat4::from_translation(Vec3::new(0.0, SCENE_OFFSET_Y, 0.0));
        assert_mat_close(view, expected);
    }

    #[test]
    fn test_eye_views_mirror_the_offset() {
        let d = 10.0;
        assert_eq!(Eye::Left.offset(d), 5.0);
        assert_eq!(Eye::Right.offset(d), -5.0);

        for (eye, offset) in [(Eye::Left, 5.0f32), (Eye::Right, -5.0f32)] {
            let view = eye_view(eye, d, head(), 0.4, -0.6);
            let expected = head_rotation(head(), 0.4, -0.6)
                * Mat4::look_at_rh(
                    Vec3::new(offset, 0.0, 0.0),
                    Vec3::new(0.0, 0.0, -CONVERGENCE_DEPTH),
                    Vec3::Y,
                )
                * Mat4::from_translation(Vec3::new(offset, SCENE_OFFSET_Y, 0.0));
            assert_mat_close(view, expected);
        }
    }

    #[test]
    fn test_mono_plan() {
        let plan = plan_frame(
            StereoMode::Mono,
            2560,
            1440,
            10.0,
            HeadOrientation::default(),
            0.0,
            0.0,
        );
        assert_eq!(plan.passes.len(), 1);
        assert!(!plan.composite);
        assert_eq!(plan.passes[0].eye, None);
        assert_eq!(
            plan.passes[0].viewport,
            Viewport {
                x: 0,
                y: 0,
                width: 2560,
                height: 1440
            }
        );
    }

    #[test]
    fn test_stereo_plan_is_left_then_right() {
        let plan = plan_frame(
            StereoMode::SideBySide,
            2560,
            1440,
            10.0,
            HeadOrientation::default(),
            0.0,
            0.0,
        );
        assert_eq!(plan.passes.len(), 2);
        assert!(plan.composite);
        assert_eq!(plan.passes[0].eye, Some(Eye::Left));
        assert_eq!(plan.passes[1].eye, Some(Eye::Right));

        let left = plan.passes[0].viewport;
        let right = plan.passes[1].viewport;
        assert_eq!(left.x, 0);
        assert_eq!(left.width, 1280);
        assert_eq!(right.x, 1280);
        assert_eq!(right.width, 1280);
    }

    #[test]
    fn test_stereo_halves_tile_odd_widths() {
        let plan = plan_frame(
            StereoMode::SideBySide,
            1281,
            720,
            10.0,
            HeadOrientation::default(),
            0.0,
            0.0,
        );
        let left = plan.passes[0].viewport;
        let right = plan.passes[1].viewport;
        // Disjoint, and together they cover the full width
        assert_eq!(left.x + left.width, right.x);
        assert_eq!(right.x + right.width, 1281);
    }
}
