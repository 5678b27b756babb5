// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the application structure that implements the
//! eframe::App trait. Each frame it translates egui input into session
//! events, dispatches them to the batch in order, and keeps the canvas and
//! preview textures in step with the session's rendered buffers.

use crate::batch::{Batch, Progress};
use crate::session::{gesture::PointerEvent, Command, Event};
use crate::ui::canvas::{self, CanvasView};
use crate::ui::{preview, toolbar};
use image::RgbaImage;
use std::sync::mpsc::Sender;

/// Map a key press to a session command.
pub fn command_for_key(key: egui::Key) -> Option<Command> {
    use egui::Key;

    let command = match key {
        Key::Q => Command::Quit,
        Key::Enter => Command::Submit,
        Key::Escape => Command::Discard,
        Key::Space => Command::Commit,
        Key::D => Command::Delete,
        Key::P => Command::TogglePreview,
        Key::Num0 => Command::Digit(0),
        Key::Num1 => Command::Digit(1),
        Key::Num2 => Command::Digit(2),
        Key::Num3 => Command::Digit(3),
        Key::Num4 => Command::Digit(4),
        Key::Num5 => Command::Digit(5),
        Key::Num6 => Command::Digit(6),
        Key::Num7 => Command::Digit(7),
        Key::Num8 => Command::Digit(8),
        Key::Num9 => Command::Digit(9),
        _ => return None,
    };
    Some(command)
}

/// Turns one frame of raw egui input into session events, in arrival order.
///
/// A primary press starts a drag only when `on_canvas` accepts its position;
/// moves and the release are then reported until the button goes up, even
/// outside the image.
#[derive(Debug, Default)]
struct InputTranslator {
    dragging: bool,
}

impl InputTranslator {
    fn translate(
        &mut self,
        raw: &[egui::Event],
        view: Option<&CanvasView>,
        on_canvas: impl Fn(egui::Pos2) -> bool,
    ) -> Vec<Event> {
        let primary = egui::PointerButton::Primary;
        let mut events = Vec::new();

        for event in raw {
            let translated = match (event, view) {
                (
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    },
                    _,
                ) => command_for_key(*key).map(Event::Command),
                (
                    egui::Event::PointerButton {
                        pos,
                        button,
                        pressed: true,
                        ..
                    },
                    Some(view),
                ) if *button == primary && view.contains(*pos) && on_canvas(*pos) => {
                    self.dragging = true;
                    Some(Event::Pointer(PointerEvent::Down(view.to_image(*pos))))
                }
                (egui::Event::PointerMoved(pos), Some(view)) if self.dragging => {
                    Some(Event::Pointer(PointerEvent::Move {
                        pos: view.to_image(*pos),
                        primary_held: true,
                    }))
                }
                (
                    egui::Event::PointerButton {
                        pos,
                        button,
                        pressed: false,
                        ..
                    },
                    Some(view),
                ) if *button == primary && self.dragging => {
                    self.dragging = false;
                    Some(Event::Pointer(PointerEvent::Up(view.to_image(*pos))))
                }
                _ => None,
            };
            events.extend(translated);
        }
        events
    }
}

/// A GPU texture mirroring one of the session's image buffers.
#[derive(Default)]
struct Surface {
    texture: Option<egui::TextureHandle>,
    /// Image position and render revision currently uploaded.
    shown: Option<(usize, u64)>,
}

impl Surface {
    fn sync(&mut self, ctx: &egui::Context, name: &str, key: (usize, u64), image: Option<&RgbaImage>) {
        let Some(image) = image else {
            self.texture = None;
            self.shown = None;
            return;
        };
        if self.shown == Some(key) {
            return;
        }

        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        match self.texture.as_mut() {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR));
            }
        }
        self.shown = Some(key);
    }
}

/// Main application state.
pub struct MarkerApp {
    batch: Batch,
    canvas: Surface,
    preview: Surface,
    /// Reports a fatal batch error back to `main`
    errors: Sender<anyhow::Error>,
    input: InputTranslator,
    closing: bool,
}

impl MarkerApp {
    /// Create the application around a started batch.
    pub fn new(batch: Batch, errors: Sender<anyhow::Error>) -> Self {
        Self {
            batch,
            canvas: Surface::default(),
            preview: Surface::default(),
            errors,
            input: InputTranslator::default(),
            closing: false,
        }
    }

    fn sync_textures(&mut self, ctx: &egui::Context) {
        let Some(session) = self.batch.session() else {
            return;
        };
        let (index, _) = self.batch.position();

        self.canvas.sync(
            ctx,
            "working_canvas",
            (index, session.canvas_revision()),
            Some(session.working_canvas()),
        );
        self.preview.sync(
            ctx,
            "preview",
            (index, session.preview_revision()),
            session.visible_preview(),
        );
    }

    fn dispatch(&mut self, ctx: &egui::Context, events: Vec<Event>) {
        for event in events {
            log::debug!("Event: {:?}", event);
            match self.batch.dispatch(event) {
                Ok(Progress::Annotating) => {}
                Ok(Progress::Finished) | Ok(Progress::Quit) => {
                    self.close(ctx);
                    return;
                }
                Err(err) => {
                    log::error!("{:#}", err);
                    if let Err(unsent) = self.errors.send(err) {
                        log::debug!("Error receiver already gone: {:#}", unsent.0);
                    }
                    self.close(ctx);
                    return;
                }
            }
        }
    }

    fn close(&mut self, ctx: &egui::Context) {
        self.closing = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

impl eframe::App for MarkerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.closing {
            return;
        }

        self.sync_textures(ctx);

        let Some(session) = self.batch.session() else {
            self.close(ctx);
            return;
        };
        let image_size = session.image_size();

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            toolbar::show(ui, session, self.batch.position());
        });

        // Preview window
        if let Some(texture) = self.preview.texture.as_ref() {
            preview::show(ctx, texture);
        }

        // Main canvas (center)
        let view = egui::CentralPanel::default()
            .show(ctx, |ui| canvas::show(ui, self.canvas.texture.as_ref(), image_size))
            .inner;

        // Keys and pointer input share one queue so their order survives
        let raw = ctx.input(|i| i.events.clone());
        let events = self.input.translate(&raw, view.as_ref(), |pos| {
            // Presses over the preview window stay there
            ctx.layer_id_at(pos)
                .map_or(true, |layer| layer.order == egui::Order::Background)
        });

        if !events.is_empty() {
            self.dispatch(ctx, events);
            ctx.request_repaint();
        }
    }
}
