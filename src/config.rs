//! Startup configuration from command line and environment.

use std::env;

use tracing::warn;

pub const DEFAULT_WIDTH: u32 = 2560;
pub const DEFAULT_HEIGHT: u32 = 1440;
pub const DEFAULT_EYE_DISTANCE: f32 = 10.0;
pub const DEFAULT_MODEL_PATH: &str = "assets/rocket.obj";
pub const DEFAULT_LOGO_PATH: &str = "assets/logo.png";

/// How frames are presented. Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoMode {
    /// One render pass over the whole window.
    Mono,
    /// Two render passes into the left and right window halves.
    SideBySide,
}

impl StereoMode {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "mono" => Some(StereoMode::Mono),
            "sbs" | "side-by-side" => Some(StereoMode::SideBySide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub stereo_mode: StereoMode,
    /// Offset between the two virtual cameras, in world units.
    pub eye_distance: f32,
    pub model_path: String,
    pub logo_path: String,
    pub width: u32,
    pub height: u32,
    /// Fixed sensor orientation `[yaw, roll, pitch]` in radians, for running
    /// without a real rotation sensor.
    pub head_orientation: Option<[f32; 3]>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            stereo_mode: StereoMode::Mono,
            eye_distance: DEFAULT_EYE_DISTANCE,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            logo_path: DEFAULT_LOGO_PATH.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            head_orientation: None,
        }
    }
}

impl ViewerConfig {
    /// Parse command-line arguments, then `STEREOSCOPE_*` environment
    /// variables on top.
    ///
    /// Supported arguments:
    /// - `stereoscope mono` - one full-window pass (the default)
    /// - `stereoscope sbs` / `stereoscope side-by-side` - stereo halves
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        let mut config = Self::from_args(&args);

        if let Ok(value) = env::var("STEREOSCOPE_STEREO") {
            if value == "1" || value.eq_ignore_ascii_case("true") {
                config.stereo_mode = StereoMode::SideBySide;
            }
        }
        if let Ok(value) = env::var("STEREOSCOPE_EYE_DISTANCE") {
            match value.parse::<f32>() {
                Ok(d) if d.is_finite() => config.eye_distance = d,
                _ => warn!("ignoring malformed STEREOSCOPE_EYE_DISTANCE {:?}", value),
            }
        }
        if let Ok(value) = env::var("STEREOSCOPE_MODEL") {
            config.model_path = value;
        }
        if let Ok(value) = env::var("STEREOSCOPE_LOGO") {
            config.logo_path = value;
        }
        if let Ok(value) = env::var("STEREOSCOPE_SIZE") {
            match parse_size(&value) {
                Some((w, h)) => {
                    config.width = w;
                    config.height = h;
                }
                None => warn!("ignoring malformed STEREOSCOPE_SIZE {:?}", value),
            }
        }
        if let Ok(value) = env::var("STEREOSCOPE_HEAD") {
            match parse_head(&value) {
                Some(head) => config.head_orientation = Some(head),
                None => warn!("ignoring malformed STEREOSCOPE_HEAD {:?}", value),
            }
        }

        config
    }

    fn from_args(args: &[String]) -> Self {
        let mut config = ViewerConfig::default();
        for arg in args {
            match StereoMode::from_word(arg) {
                Some(mode) => config.stereo_mode = mode,
                None => warn!("unknown argument {:?}, running with defaults", arg),
            }
        }
        config
    }
}

/// Parse `WIDTHxHEIGHT`, e.g. `2560x1440`. Zero dimensions are rejected.
pub fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    let w = w.trim().parse::<u32>().ok()?;
    let h = h.trim().parse::<u32>().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

/// Parse `yaw,roll,pitch` in radians, e.g. `0.3,0,-0.1`.
pub fn parse_head(value: &str) -> Option<[f32; 3]> {
    let mut parts = value.split(',');
    let yaw = parts.next()?.trim().parse::<f32>().ok()?;
    let roll = parts.next()?.trim().parse::<f32>().ok()?;
    let pitch = parts.next()?.trim().parse::<f32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([yaw, roll, pitch])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_words() {
        assert_eq!(StereoMode::from_word("mono"), Some(StereoMode::Mono));
        assert_eq!(StereoMode::from_word("sbs"), Some(StereoMode::SideBySide));
        assert_eq!(
            StereoMode::from_word("side-by-side"),
            Some(StereoMode::SideBySide)
        );
        assert_eq!(StereoMode::from_word("anaglyph"), None);
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.stereo_mode, StereoMode::Mono);
        assert_eq!(config.width, 2560);
        assert_eq!(config.height, 1440);
        assert_eq!(config.eye_distance, 10.0);
        assert!(config.head_orientation.is_none());
    }

    #[test]
    fn test_args_select_mode() {
        let args = vec!["sbs".to_string()];
        let config = ViewerConfig::from_args(&args);
        assert_eq!(config.stereo_mode, StereoMode::SideBySide);

        // Unknown words keep the defaults
        let args = vec!["warp-drive".to_string()];
        let config = ViewerConfig::from_args(&args);
        assert_eq!(config.stereo_mode, StereoMode::Mono);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("2560x1440"), Some((2560, 1440)));
        assert_eq!(parse_size("800X600"), Some((800, 600)));
        assert_eq!(parse_size("0x600"), None);
        assert_eq!(parse_size("800"), None);
        assert_eq!(parse_size("800x-600"), None);
    }

    #[test]
    fn test_parse_head() {
        assert_eq!(parse_head("0.3,0,-0.1"), Some([0.3, 0.0, -0.1]));
        assert_eq!(parse_head("0.3, 0.0, -0.1"), Some([0.3, 0.0, -0.1]));
        assert_eq!(parse_head("0.3,0"), None);
        assert_eq!(parse_head("0.3,0,0,0"), None);
        assert_eq!(parse_head("a,b,c"), None);
    }
}
