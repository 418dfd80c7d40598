// VIEW: Rendering and graphics
pub mod gpu_init;
pub mod render;
pub mod stereo;

pub use gpu_init::GpuContext;
pub use render::RenderState;
pub use stereo::StereoContext;
