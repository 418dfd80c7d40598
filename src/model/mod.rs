// MODEL: Viewer state and data
pub mod camera;
pub mod orientation;
pub mod scene;

pub use camera::Camera;
pub use orientation::HeadOrientation;
pub use scene::Scene;
