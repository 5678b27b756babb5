// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation records, the unit of persistence.

use super::annotation::{BoxStore, Rectangle};
use std::path::PathBuf;

/// Finished annotations of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub image_path: PathBuf,
    pub boxes: BoxStore,
}

impl AnnotationRecord {
    pub fn new(image_path: PathBuf, boxes: BoxStore) -> Self {
        Self { image_path, boxes }
    }

    /// Boxes that are written to disk; empty rectangles are skipped.
    pub fn persisted_boxes(&self) -> impl Iterator<Item = &Rectangle> {
        self.boxes.iter().filter(|rect| !rect.is_empty())
    }
}
