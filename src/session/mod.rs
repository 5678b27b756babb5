// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-image annotation session.
//!
//! A `Session` owns everything that belongs to the image being marked: the
//! clean base image, the working canvas, the optional preview, the gesture
//! tracker and the committed boxes. Events are handled one at a time and
//! each call reports whether the session keeps going, finished its image,
//! or asked the whole program to stop.

pub mod gesture;

use crate::models::{
    annotation::{BoxStore, Rectangle},
    record::AnnotationRecord,
};
use crate::render::{self, RenderStyle};
use gesture::{GestureConfig, GestureTracker, PointerEvent};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Keyboard commands understood by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Submit,
    Discard,
    Commit,
    Digit(u8),
    Delete,
    TogglePreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Pointer(PointerEvent),
    Command(Command),
}

/// Outcome of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    NextImage,
    Quit,
}

/// Settings that stay the same for every image of a batch.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub gesture: GestureConfig,
    /// Enables the secondary preview surface.
    pub preview: bool,
    pub style: RenderStyle,
}

struct Preview {
    image: RgbaImage,
    visible: bool,
}

pub struct Session {
    image_path: PathBuf,
    base: RgbaImage,
    working: RgbaImage,
    preview: Option<Preview>,
    tracker: GestureTracker,
    candidate: Option<Rectangle>,
    boxes: BoxStore,
    pending_index: Option<usize>,
    style: RenderStyle,
    canvas_revision: u64,
    preview_revision: u64,
}

impl Session {
    pub fn new(image_path: PathBuf, base: RgbaImage, options: &SessionOptions) -> Self {
        let boxes = BoxStore::new();
        let preview = options.preview.then(|| Preview {
            image: render::render_preview(&base, &boxes, &options.style),
            visible: true,
        });

        Self {
            image_path,
            working: base.clone(),
            base,
            preview,
            tracker: GestureTracker::new(options.gesture),
            candidate: None,
            boxes,
            pending_index: None,
            style: options.style.clone(),
            canvas_revision: 0,
            preview_revision: 0,
        }
    }

    /// Handle one pointer or keyboard event.
    pub fn handle(&mut self, event: Event) -> Transition {
        match event {
            Event::Pointer(pointer) => {
                let size = self.image_size();
                if let Some(candidate) = self.tracker.handle(pointer, size) {
                    self.set_candidate(Some(candidate));
                }
                Transition::Continue
            }
            Event::Command(command) => self.run_command(command),
        }
    }

    fn run_command(&mut self, command: Command) -> Transition {
        // Every command except a digit consumes the pending index.
        let pending = match command {
            Command::Digit(digit) => {
                self.accumulate_digit(digit);
                return Transition::Continue;
            }
            _ => self.pending_index.take(),
        };

        match command {
            Command::Quit => {
                log::info!("Quit requested on {}", self.image_path.display());
                return Transition::Quit;
            }
            Command::Submit => {
                self.set_candidate(None);
                log::info!("Submitted {} with {} boxes", self.image_path.display(), self.boxes.len());
                return Transition::NextImage;
            }
            Command::Discard => self.set_candidate(None),
            Command::Commit => self.commit_candidate(),
            Command::Delete => self.delete_box(pending),
            Command::TogglePreview => self.toggle_preview(),
            Command::Digit(_) => {}
        }
        Transition::Continue
    }

    fn accumulate_digit(&mut self, digit: u8) {
        let digit = usize::from(digit);
        let next = match self.pending_index {
            None => digit,
            Some(acc) => acc.saturating_mul(10).saturating_add(digit),
        };
        self.pending_index = Some(next);
        log::debug!("Pending index: {}", next);
    }

    fn set_candidate(&mut self, candidate: Option<Rectangle>) {
        self.candidate = candidate;
        self.working = render::render_candidate(&self.base, self.candidate.as_ref(), &self.style);
        self.canvas_revision += 1;
    }

    fn commit_candidate(&mut self) {
        let Some(rect) = self.candidate.filter(|rect| !rect.is_empty()) else {
            log::debug!("Nothing to commit");
            return;
        };

        let index = self.boxes.push(rect);
        self.set_candidate(None);
        log::info!("Committed box {} at {:?}, total: {}", index, rect, self.boxes.len());

        // Appending never shifts earlier indices, so drawing the new box is enough.
        if let Some(preview) = self.preview.as_mut() {
            render::draw_annotation(&mut preview.image, &rect, index, &self.style);
            self.preview_revision += 1;
        }
    }

    fn delete_box(&mut self, pending: Option<usize>) {
        let removed = pending.and_then(|index| self.boxes.remove(index).map(|rect| (index, rect)));
        match removed {
            Some((index, rect)) => {
                log::info!("Deleted box {} at {:?}, total: {}", index, rect, self.boxes.len());
                self.rerender_preview();
            }
            None => log::warn!("No box at index {:?}, {} boxes committed", pending, self.boxes.len()),
        }
    }

    fn toggle_preview(&mut self) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        preview.visible = !preview.visible;
        if preview.visible {
            self.rerender_preview();
        }
    }

    fn rerender_preview(&mut self) {
        if let Some(preview) = self.preview.as_mut() {
            preview.image = render::render_preview(&self.base, &self.boxes, &self.style);
            self.preview_revision += 1;
        }
    }

    /// Finish the image and hand over its boxes for persistence.
    pub fn into_record(self) -> AnnotationRecord {
        AnnotationRecord::new(self.image_path, self.boxes)
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn image_size(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    pub fn boxes(&self) -> &BoxStore {
        &self.boxes
    }

    pub fn candidate(&self) -> Option<&Rectangle> {
        self.candidate.as_ref()
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.pending_index
    }

    pub fn working_canvas(&self) -> &RgbaImage {
        &self.working
    }

    /// The preview image, if the feature is enabled and currently shown.
    pub fn visible_preview(&self) -> Option<&RgbaImage> {
        self.preview.as_ref().filter(|p| p.visible).map(|p| &p.image)
    }

    /// Bumped whenever the working canvas is redrawn.
    pub fn canvas_revision(&self) -> u64 {
        self.canvas_revision
    }

    /// Bumped whenever the preview is redrawn.
    pub fn preview_revision(&self) -> u64 {
        self.preview_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Point;
    use image::Rgba;

    fn session_with(options: SessionOptions) -> Session {
        let base = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        Session::new(PathBuf::from("image.png"), base, &options)
    }

    fn session() -> Session {
        session_with(SessionOptions::default())
    }

    fn previewed() -> Session {
        session_with(SessionOptions {
            preview: true,
            ..SessionOptions::default()
        })
    }

    fn draw(session: &mut Session, rect: Rectangle) {
        let start = Point::new(rect.x, rect.y);
        let end = Point::new(rect.x + rect.width as i32, rect.y + rect.height as i32);
        session.handle(Event::Pointer(PointerEvent::Down(start)));
        session.handle(Event::Pointer(PointerEvent::Move {
            pos: end,
            primary_held: true,
        }));
        session.handle(Event::Pointer(PointerEvent::Up(end)));
    }

    fn command(session: &mut Session, command: Command) -> Transition {
        session.handle(Event::Command(command))
    }

    fn add_box(session: &mut Session, rect: Rectangle) {
        draw(session, rect);
        assert_eq!(command(session, Command::Commit), Transition::Continue);
    }

    fn delete(session: &mut Session, digits: &[u8]) {
        for &digit in digits {
            command(session, Command::Digit(digit));
        }
        command(session, Command::Delete);
    }

    fn numbered(n: i32) -> Rectangle {
        Rectangle::new(n, n, 5, 5)
    }

    #[test]
    fn test_commit_appends_in_call_order() {
        let mut session = session();
        for n in 0..4 {
            add_box(&mut session, numbered(n));
            assert_eq!(session.boxes().len(), n as usize + 1);
            assert_eq!(session.boxes().get(n as usize), Some(&numbered(n)));
        }
        assert_eq!(session.candidate(), None);
    }

    #[test]
    fn test_commit_without_candidate_is_noop() {
        let mut session = session();
        command(&mut session, Command::Commit);
        assert!(session.boxes().is_empty());

        // A click without drag leaves an empty candidate
        draw(&mut session, Rectangle::new(10, 10, 0, 0));
        command(&mut session, Command::Commit);
        assert!(session.boxes().is_empty());
    }

    #[test]
    fn test_discard_keeps_boxes() {
        let mut session = session();
        add_box(&mut session, numbered(1));
        draw(&mut session, numbered(2));
        assert!(session.candidate().is_some());

        command(&mut session, Command::Discard);
        assert_eq!(session.candidate(), None);
        assert_eq!(session.boxes().len(), 1);
        assert_eq!(*session.working_canvas().get_pixel(2, 2), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut session = session();
        add_box(&mut session, numbered(0));
        add_box(&mut session, numbered(1));

        delete(&mut session, &[2]);
        assert_eq!(session.boxes().len(), 2);

        // No pending index at all
        command(&mut session, Command::Delete);
        assert_eq!(session.boxes().len(), 2);
    }

    #[test]
    fn test_delete_shifts_indices() {
        let mut session = session();
        for n in 0..4 {
            add_box(&mut session, numbered(n));
        }

        delete(&mut session, &[1]);
        assert_eq!(session.boxes().as_slice(), &[numbered(0), numbered(2), numbered(3)]);

        // The stale index now refers to the new occupant
        delete(&mut session, &[1]);
        assert_eq!(session.boxes().as_slice(), &[numbered(0), numbered(3)]);
    }

    #[test]
    fn test_digits_accumulate_multi_digit_index() {
        let mut session = session();
        for n in 0..13 {
            add_box(&mut session, numbered(n));
        }

        delete(&mut session, &[1, 2]);
        assert_eq!(session.boxes().len(), 12);
        assert!(session.boxes().iter().all(|rect| *rect != numbered(12)));
        assert_eq!(session.boxes().get(1), Some(&numbered(1)));
        assert_eq!(session.boxes().get(2), Some(&numbered(2)));
        assert_eq!(session.pending_index(), None);
    }

    #[test]
    fn test_other_commands_reset_accumulator() {
        let mut session = session();
        add_box(&mut session, numbered(0));
        add_box(&mut session, numbered(1));

        command(&mut session, Command::Digit(1));
        command(&mut session, Command::Discard);
        assert_eq!(session.pending_index(), None);

        // Starts over from 0 instead of targeting 10
        command(&mut session, Command::Digit(1));
        command(&mut session, Command::TogglePreview);
        delete(&mut session, &[0]);
        assert_eq!(session.boxes().as_slice(), &[numbered(1)]);
    }

    #[test]
    fn test_pointer_events_keep_accumulator() {
        let mut session = session();
        command(&mut session, Command::Digit(4));
        draw(&mut session, numbered(3));
        assert_eq!(session.pending_index(), Some(4));
    }

    #[test]
    fn test_huge_index_saturates() {
        let mut session = session();
        add_box(&mut session, numbered(0));
        delete(&mut session, &[9; 40]);
        assert_eq!(session.boxes().len(), 1);
    }

    #[test]
    fn test_submit_and_quit_transitions() {
        let mut session = session();
        add_box(&mut session, numbered(3));
        draw(&mut session, numbered(8));

        assert_eq!(command(&mut session, Command::Quit), Transition::Quit);
        assert_eq!(command(&mut session, Command::Submit), Transition::NextImage);
        assert_eq!(session.candidate(), None);

        let record = session.into_record();
        assert_eq!(record.image_path, PathBuf::from("image.png"));
        assert_eq!(record.boxes.as_slice(), &[numbered(3)]);
    }

    #[test]
    fn test_working_canvas_follows_candidate() {
        let mut session = session();
        let color = RenderStyle::default().color;
        let revision = session.canvas_revision();

        draw(&mut session, Rectangle::new(10, 10, 20, 20));
        assert_eq!(*session.working_canvas().get_pixel(10, 10), color);
        assert!(session.canvas_revision() > revision);

        draw(&mut session, Rectangle::new(50, 50, 20, 20));
        assert_eq!(*session.working_canvas().get_pixel(10, 10), Rgba([0, 0, 0, 255]));
        assert_eq!(*session.working_canvas().get_pixel(50, 50), color);
    }

    #[test]
    fn test_preview_tracks_box_store() {
        let mut session = previewed();
        let base = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        let style = RenderStyle::default();

        add_box(&mut session, numbered(10));
        add_box(&mut session, numbered(40));
        let expected = render::render_preview(&base, session.boxes(), &style);
        assert_eq!(session.visible_preview(), Some(&expected));

        delete(&mut session, &[0]);
        let expected = render::render_preview(&base, session.boxes(), &style);
        assert_eq!(session.visible_preview(), Some(&expected));
    }

    #[test]
    fn test_toggle_preview() {
        let mut session = previewed();
        assert!(session.visible_preview().is_some());

        command(&mut session, Command::TogglePreview);
        assert!(session.visible_preview().is_none());

        add_box(&mut session, numbered(20));
        command(&mut session, Command::TogglePreview);
        let preview = session.visible_preview().unwrap();
        assert_eq!(*preview.get_pixel(20, 20), RenderStyle::default().color);
    }

    #[test]
    fn test_toggle_without_preview_feature() {
        let mut session = session();
        command(&mut session, Command::TogglePreview);
        assert!(session.visible_preview().is_none());
    }
}
