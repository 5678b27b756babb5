// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and box annotation.
//!
//! This module shows the working canvas scaled to the available space and
//! turns primary-button mouse interaction on it into pointer events in
//! image pixel coordinates.

use crate::models::annotation::Point;
use crate::util::geometry::{denormalize_coordinates, fit_size};

/// Where the working canvas was drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    /// Screen rectangle covered by the image.
    pub image_rect: egui::Rect,
    /// Image size in pixels.
    pub image_size: (u32, u32),
}

impl CanvasView {
    pub fn contains(&self, pos: egui::Pos2) -> bool {
        self.image_rect.contains(pos)
    }

    /// Map a screen position to image pixels, clamped to the image.
    pub fn to_image(&self, pos: egui::Pos2) -> Point {
        let (img_width, img_height) = self.image_size;
        let rel_x = (pos.x - self.image_rect.min.x) / self.image_rect.width().max(1.0);
        let rel_y = (pos.y - self.image_rect.min.y) / self.image_rect.height().max(1.0);
        denormalize_coordinates(rel_x as f64, rel_y as f64, img_width, img_height)
    }
}

/// Display the working canvas, fitted and centered in the available space.
///
/// Returns `None` while there is no texture to show.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    image_size: (u32, u32),
) -> Option<CanvasView> {
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style())
        .show(ui, |ui| {
            ui.set_min_size(available_size);

            let Some(texture) = texture else {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Loading image...").color(egui::Color32::WHITE));
                });
                return None;
            };

            let (img_width, img_height) = image_size;
            let available = ui.available_size();
            let (display_width, display_height) = fit_size(img_width, img_height, (available.x, available.y));

            // Center the image
            let x_offset = (available.x - display_width) / 2.0;
            let y_offset = (available.y - display_height) / 2.0;

            let image_rect = egui::Rect::from_min_size(
                ui.min_rect().min + egui::vec2(x_offset, y_offset),
                egui::vec2(display_width, display_height),
            );

            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            // Claims the drag so panels underneath don't react to it
            let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
            if response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
            }

            Some(CanvasView { image_rect, image_size })
        })
        .inner
}
