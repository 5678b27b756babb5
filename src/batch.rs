// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Batch driver.
//!
//! Walks the resolved image list, keeps exactly one `Session` alive for the
//! image being marked, and hands every submitted session to the writer.

use crate::io::{media, serialization::AnnotationWriter};
use crate::session::{Event, Session, SessionOptions, Transition};
use anyhow::Result;
use std::path::PathBuf;

/// Where the batch stands after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Annotating,
    Finished,
    Quit,
}

pub struct Batch {
    images: Vec<PathBuf>,
    /// Index of the next image to load.
    next: usize,
    writer: AnnotationWriter,
    options: SessionOptions,
    session: Option<Session>,
}

impl Batch {
    pub fn new(images: Vec<PathBuf>, writer: AnnotationWriter, options: SessionOptions) -> Self {
        Self {
            images,
            next: 0,
            writer,
            options,
            session: None,
        }
    }

    /// Load the first image.
    pub fn start(&mut self) -> Result<Progress> {
        self.advance()
    }

    /// Forward one event to the active session.
    ///
    /// A decode or write failure aborts the batch; records submitted before
    /// it stay on disk.
    pub fn dispatch(&mut self, event: Event) -> Result<Progress> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Progress::Finished);
        };

        match session.handle(event) {
            Transition::Continue => Ok(Progress::Annotating),
            Transition::NextImage => {
                if let Some(session) = self.session.take() {
                    self.writer.write(&session.into_record())?;
                }
                self.advance()
            }
            Transition::Quit => {
                self.session = None;
                self.writer.finish()?;
                log::info!("Quit after {} of {} images", self.writer.written(), self.images.len());
                Ok(Progress::Quit)
            }
        }
    }

    fn advance(&mut self) -> Result<Progress> {
        let Some(path) = self.images.get(self.next).cloned() else {
            self.session = None;
            self.writer.finish()?;
            log::info!("Batch finished, {} images annotated", self.writer.written());
            return Ok(Progress::Finished);
        };

        let image = match media::load_image(&path) {
            Ok(image) => image,
            Err(err) => {
                self.session = None;
                self.writer.finish()?;
                log::error!("Aborting batch at image {} of {}", self.next + 1, self.images.len());
                return Err(err);
            }
        };

        self.session = Some(Session::new(path, image, &self.options));
        self.next += 1;
        Ok(Progress::Annotating)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// One-based position of the active image and the batch size.
    pub fn position(&self) -> (usize, usize) {
        (self.next, self.images.len())
    }
}
