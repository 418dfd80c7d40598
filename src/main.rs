use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

// Import from the library crate
use stereoscope::{
    config::ViewerConfig,
    controller::{plan_frame, CameraController, InputState},
    logging,
    model::{Camera, HeadOrientation, Scene},
    ui::{Overlay, UiFrame},
    view::{GpuContext, RenderState},
};

struct App {
    // Core GPU resources
    gpu: GpuContext,
    size: winit::dpi::PhysicalSize<u32>,
    window: Arc<Window>,
    render_state: RenderState,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    overlay: Overlay,

    // Viewer state
    config: ViewerConfig,
    camera: Camera,
    head: HeadOrientation,
    input_state: InputState,
    controller: CameraController,

    // Frame timing
    last_frame_time: std::time::Instant,
}

impl App {
    async fn new(window: Arc<Window>, config: ViewerConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await;

        let scene = Scene::load(&config.model_path)?;
        let meshes = scene.upload(&gpu.device);

        let camera = Camera::new(size.width, size.height, config.stereo_mode);
        let head = config
            .head_orientation
            .map(HeadOrientation::from_sensor)
            .unwrap_or_default();

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let overlay = Overlay::new(&egui_ctx, Path::new(&config.logo_path))?;

        let render_state = RenderState::new(
            &gpu.device,
            gpu.format,
            size.width,
            size.height,
            config.stereo_mode,
            meshes,
        );

        Ok(Self {
            gpu,
            size,
            window,
            render_state,
            egui_state,
            egui_ctx,
            overlay,
            config,
            camera,
            head,
            input_state: InputState::new(),
            controller: CameraController::new(),
            last_frame_time: std::time::Instant::now(),
        })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // First let egui process the event
        let egui_captured = self
            .egui_state
            .on_window_event(self.window.as_ref(), event)
            .consumed;
        if egui_captured {
            return true;
        }

        self.input_state.process_window_event(event);
        false
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.gpu.resize(new_size.width, new_size.height);
            self.render_state
                .resize(&self.gpu.device, new_size.width, new_size.height);
            self.camera
                .set_viewport(new_size.width, new_size.height, self.config.stereo_mode);
        }
    }

    fn update(&mut self, dt: f32) {
        let snapshot = self.input_state.snapshot(dt);
        self.controller.update(&snapshot, self.head, dt);
    }

    fn render_ui(&mut self) -> UiFrame {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let output = self.egui_ctx.run(raw_input, |ctx| {
            self.overlay.show(ctx);
        });

        self.egui_state
            .handle_platform_output(&self.window, output.platform_output);
        let pixels_per_point = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(output.shapes, pixels_per_point);
        UiFrame {
            primitives,
            textures_delta: output.textures_delta,
            pixels_per_point,
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let ui_frame = self.render_ui();
        let plan = plan_frame(
            self.config.stereo_mode,
            self.size.width,
            self.size.height,
            self.config.eye_distance,
            self.head,
            self.controller.angle_horz,
            self.controller.angle_vert,
        );
        self.render_state.draw_frame(
            &self.gpu.device,
            &self.gpu.queue,
            &self.gpu.surface,
            &self.camera,
            &plan,
            ui_frame,
        )
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ViewerConfig::parse();
    info!(
        "starting in {:?} mode at {}x{}",
        config.stereo_mode, config.width, config.height
    );

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Stereoscope")
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone(), config))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    state: ElementState::Pressed,
                                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                                    ..
                                },
                            ..
                        } => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = std::time::Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32();
                            app.last_frame_time = now;

                            app.update(dt);

                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => app.resize(app.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => warn!("surface error: {:?}", e),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::DeviceEvent {
                event: winit::event::DeviceEvent::MouseMotion { delta },
                ..
            } => {
                app.input_state.process_mouse_motion(delta);
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
