use egui::Context;
use std::path::Path;

use anyhow::{Context as _, Result};

pub const HOMEPAGE_URL: &str = "https://github.com/stereoscope/stereoscope";
pub const CAPTION: &str = "Stereoscope Cardboard Demo";

/// Clickable region around the logo.
const LINK_POS: egui::Pos2 = egui::pos2(6.0, 6.0);
const LINK_SIZE: egui::Vec2 = egui::vec2(157.0, 87.0);
/// Logo image, inset inside the clickable region.
const LOGO_POS: egui::Pos2 = egui::pos2(10.0, 10.0);
const LOGO_SIZE: egui::Vec2 = egui::vec2(150.0, 80.0);

const CAPTION_FONT_SIZE: f32 = 18.0;
const CAPTION_BOTTOM_MARGIN: f32 = 3.0;

/// Tessellated egui output for one frame, handed to the renderer.
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// The fixed overlay: logo link button top-left, caption along the bottom.
pub struct Overlay {
    logo: egui::TextureHandle,
}

impl Overlay {
    /// Decode the logo and register it as an egui texture. A missing or
    /// corrupt logo aborts startup.
    pub fn new(ctx: &Context, logo_path: &Path) -> Result<Self> {
        let logo_image = image::open(logo_path)
            .with_context(|| format!("loading logo {:?}", logo_path))?
            .to_rgba8();
        let size = [logo_image.width() as usize, logo_image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, logo_image.as_raw());
        let logo = ctx.load_texture("logo", color_image, egui::TextureOptions::LINEAR);
        Ok(Self { logo })
    }

    /// Lay out the overlay for the current frame.
    pub fn show(&self, ctx: &Context) {
        draw_link_button(ctx, &self.logo);
        draw_caption(ctx);
    }
}

fn draw_link_button(ctx: &Context, logo: &egui::TextureHandle) {
    egui::Area::new(egui::Id::new("logo_link"))
        .fixed_pos(egui::Pos2::new(0.0, 0.0))
        .show(ctx, |ui| {
            let button_rect = egui::Rect::from_min_size(LINK_POS, LINK_SIZE);
            let logo_rect = egui::Rect::from_min_size(LOGO_POS, LOGO_SIZE);

            ui.painter().image(
                logo.id(),
                logo_rect,
                egui::Rect::from_min_max(egui::Pos2::new(0.0, 0.0), egui::Pos2::new(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let response = ui
                .interact(
                    button_rect,
                    ui.id().with("homepage_link"),
                    egui::Sense::click(),
                )
                .on_hover_cursor(egui::CursorIcon::PointingHand);

            if response.hovered() {
                ui.painter().rect_filled(
                    button_rect,
                    egui::CornerRadius::ZERO,
                    egui::Color32::from_rgba_unmultiplied(0, 153, 51, 102),
                );
                ui.painter().rect_stroke(
                    button_rect,
                    egui::CornerRadius::ZERO,
                    egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(0, 153, 51, 255)),
                    egui::StrokeKind::Inside,
                );
            }

            // Fire and forget, a browser that fails to open is not observable here
            if response.clicked() {
                ctx.open_url(egui::OpenUrl::new_tab(HOMEPAGE_URL));
            }
        });
}

fn draw_caption(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("caption")));
    let color = egui::Color32::from_rgba_unmultiplied(13, 64, 38, 204);
    let galley = painter.layout_no_wrap(
        CAPTION.to_owned(),
        egui::FontId::proportional(CAPTION_FONT_SIZE),
        color,
    );
    let screen = ctx.screen_rect();
    let (x, y) = caption_position(
        screen.width(),
        screen.height(),
        galley.size().x,
        galley.size().y,
    );
    painter.galley(egui::Pos2::new(x, y), galley, color);
}

/// Top-left corner for a caption of the given size: horizontally centered,
/// anchored just above the bottom edge. Evaluated every frame, so resizes
/// reposition the caption without any extra bookkeeping.
pub fn caption_position(screen_w: f32, screen_h: f32, text_w: f32, text_h: f32) -> (f32, f32) {
    (
        (screen_w - text_w) / 2.0,
        screen_h - text_h - CAPTION_BOTTOM_MARGIN,
    )
}
