// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides utilities for coordinate transformations between
//! the scaled on-screen image and image pixel coordinates.

use crate::models::annotation::Point;

/// Convert a position relative to the displayed image (0.0 to 1.0 on each
/// axis) into image pixel coordinates, clamped to `[0, width] x [0, height]`.
pub fn denormalize_coordinates(rel_x: f64, rel_y: f64, width: u32, height: u32) -> Point {
    let x = (rel_x * width as f64).floor().clamp(0.0, width as f64);
    let y = (rel_y * height as f64).floor().clamp(0.0, height as f64);
    Point::new(x as i32, y as i32)
}

/// Largest size with the image's aspect ratio that fits into `available`.
pub fn fit_size(image_width: u32, image_height: u32, available: (f32, f32)) -> (f32, f32) {
    let img_aspect = image_width as f32 / image_height.max(1) as f32;
    let available_aspect = available.0 / available.1.max(1.0);

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available.0, available.0 / img_aspect)
    } else {
        // Image is taller - fit to height
        (available.1 * img_aspect, available.1)
    }
}
