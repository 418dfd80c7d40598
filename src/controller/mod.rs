// CONTROLLER: Input and per-frame update logic
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputState, InputSnapshot};
pub use camera_controller::CameraController;
pub use frame_loop::{plan_frame, Eye, EyePass, FramePlan, Viewport};
