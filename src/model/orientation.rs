/// Rotation estimate of the viewer's head, maintained outside the frame
/// loop (a phone's game-rotation-vector service, or a fixed value from the
/// configuration). The camera controller only ever reads it. Radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadOrientation {
    /// Rotation around the vertical axis (horizontal look direction).
    pub yaw: f32,
    /// Rotation around the view axis.
    pub roll: f32,
    /// Rotation around the lateral axis (vertical look direction).
    pub pitch: f32,
}

impl HeadOrientation {
    /// Map a raw sensor sample. Game rotation vectors deliver the components
    /// ordered [yaw, roll, pitch].
    pub fn from_sensor(values: [f32; 3]) -> Self {
        HeadOrientation {
            yaw: values[0],
            roll: values[1],
            pitch: values[2],
        }
    }
}
