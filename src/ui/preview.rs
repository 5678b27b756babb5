// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floating preview window with every committed box.

use crate::util::geometry::fit_size;

/// Display the preview window.
pub fn show(ctx: &egui::Context, texture: &egui::TextureHandle) {
    egui::Window::new("Preview")
        .default_size([480.0, 360.0])
        .resizable(true)
        .show(ctx, |ui| {
            let [width, height] = texture.size();
            let available = ui.available_size().min(egui::vec2(960.0, 720.0));
            let (display_width, display_height) = fit_size(width as u32, height as u32, (available.x, available.y));
            ui.image((texture.id(), egui::vec2(display_width, display_height)));
        });
}
