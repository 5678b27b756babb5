// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Status bar with the current image, box count and key bindings.

use crate::session::Session;

/// Display the status bar for the active session.
pub fn show(ui: &mut egui::Ui, session: &Session, position: (usize, usize)) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label(format!("[{}/{}]", position.0, position.1));
        ui.label(session.image_path().display().to_string());

        ui.separator();

        ui.label(format!("Boxes: {}", session.boxes().len()));

        if let Some(rect) = session.candidate() {
            ui.separator();
            ui.label(format!("Candidate: {} {} {} {}", rect.x, rect.y, rect.width, rect.height));
        }

        if let Some(index) = session.pending_index() {
            ui.separator();
            ui.label(egui::RichText::new(format!("Index: {}", index)).strong());
        }

        ui.separator();

        ui.label(
            egui::RichText::new("Space commit · Esc discard · 0-9 then D delete · P preview · Enter next · Q quit")
                .italics()
                .weak(),
        );
    });
}
