// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer gesture tracking.
//!
//! Turns a press/drag/release sequence into one candidate rectangle, either
//! by dragging out two corners or by stamping a fixed-size box at the
//! release point.

use crate::models::annotation::{Point, Rectangle};

/// Pointer input in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(Point),
    Move { pos: Point, primary_held: bool },
    Up(Point),
}

/// How a gesture produces its rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureConfig {
    pub fixed_size: Option<(u32, u32)>,
}

impl GestureConfig {
    /// Fixed size applies only when both sides are positive.
    pub fn new(fixed_width: u32, fixed_height: u32) -> Self {
        let fixed_size = (fixed_width > 0 && fixed_height > 0).then_some((fixed_width, fixed_height));
        Self { fixed_size }
    }
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    anchor: Option<Point>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self { config, anchor: None }
    }

    /// Feed one pointer event. Returns the new candidate when it changed.
    pub fn handle(&mut self, event: PointerEvent, image_size: (u32, u32)) -> Option<Rectangle> {
        match (self.config.fixed_size, event) {
            (None, PointerEvent::Down(pos)) => {
                self.anchor = Some(pos);
                Some(Rectangle::new(pos.x, pos.y, 0, 0))
            }
            (None, PointerEvent::Move { pos, primary_held: true }) => {
                self.anchor.map(|anchor| Rectangle::from_corners(anchor, pos))
            }
            (None, PointerEvent::Up(pos)) => {
                self.anchor.take().map(|anchor| Rectangle::from_corners(anchor, pos))
            }
            (Some(_), PointerEvent::Down(pos)) => {
                self.anchor = Some(pos);
                None
            }
            (Some(size), PointerEvent::Up(pos)) => {
                self.anchor = None;
                Some(fixed_at(pos, size, image_size))
            }
            (_, PointerEvent::Move { .. }) => None,
        }
    }
}

/// Fixed-size box at `origin`, shrunk so it ends inside the image.
fn fixed_at(origin: Point, size: (u32, u32), image_size: (u32, u32)) -> Rectangle {
    let room_x = (image_size.0 as i64 - origin.x as i64).max(0) as u32;
    let room_y = (image_size.1 as i64 - origin.y as i64).max(0) as u32;
    Rectangle::new(origin.x, origin.y, size.0.min(room_x), size.1.min(room_y))
}
