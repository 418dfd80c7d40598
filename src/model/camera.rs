use glam::Mat4;

use crate::config::StereoMode;

pub struct Camera {
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, mode: StereoMode) -> Self {
        Self {
            fov_y: 90f32.to_radians(),
            aspect: aspect_ratio(width, height, mode),
            z_near: 1.0,
            z_far: 20000.0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32, mode: StereoMode) {
        self.aspect = aspect_ratio(width, height, mode);
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self, view: Mat4) -> Mat4 {
        self.proj() * view
    }
}

/// Each eye of a side-by-side frame gets half the window width, so its
/// projection uses half the full-window aspect.
pub fn aspect_ratio(width: u32, height: u32, mode: StereoMode) -> f32 {
    match mode {
        StereoMode::Mono => width as f32 / height as f32,
        StereoMode::SideBySide => width as f32 / (2.0 * height as f32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_aspect_ratio_mono() {
        assert!((aspect_ratio(2560, 1440, StereoMode::Mono) - 2560.0 / 1440.0).abs() < EPSILON);
        assert!((aspect_ratio(800, 600, StereoMode::Mono) - 800.0 / 600.0).abs() < EPSILON);
    }

    #[test]
    fn test_aspect_ratio_side_by_side_halves_width() {
        assert!(
            (aspect_ratio(2560, 1440, StereoMode::SideBySide) - 2560.0 / 2880.0).abs() < EPSILON
        );
        // Half the width of the mono aspect, for any size
        for (w, h) in [(100, 100), (1920, 1080), (333, 777)] {
            let mono = aspect_ratio(w, h, StereoMode::Mono);
            let sbs = aspect_ratio(w, h, StereoMode::SideBySide);
            assert!((sbs - mono / 2.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_resize_reapplies_rule() {
        let mut camera = Camera::new(2560, 1440, StereoMode::SideBySide);
        camera.set_viewport(1920, 1080, StereoMode::SideBySide);
        assert!((camera.aspect - 1920.0 / 2160.0).abs() < EPSILON);
    }

    #[test]
    fn test_projection_constants() {
        let camera = Camera::new(2560, 1440, StereoMode::Mono);
        assert!((camera.fov_y - std::f32::consts::FRAC_PI_2).abs() < EPSILON);
        assert_eq!(camera.z_near, 1.0);
        assert_eq!(camera.z_far, 20000.0);
        // Matrix stays finite
        let proj = camera.proj();
        assert!(proj.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
