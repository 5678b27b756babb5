// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the rectangle type and the ordered box store that
//! holds the committed annotations of the image being marked.

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Bounding box of two corner points, regardless of drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    /// A rectangle with no area is unset and never persisted.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Center of the rectangle, rounded towards the origin.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + (self.width / 2) as i32,
            y: self.y + (self.height / 2) as i32,
        }
    }
}

/// Committed boxes of one image. The position of a box is its identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxStore {
    boxes: Vec<Rectangle>,
}

impl BoxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a box and return its index.
    pub fn push(&mut self, rect: Rectangle) -> usize {
        self.boxes.push(rect);
        self.boxes.len() - 1
    }

    /// Remove the box at `index`, shifting later boxes down by one.
    pub fn remove(&mut self, index: usize) -> Option<Rectangle> {
        if index < self.boxes.len() {
            Some(self.boxes.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Rectangle> {
        self.boxes.get(index)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rectangle> {
        self.boxes.iter()
    }

    pub fn as_slice(&self) -> &[Rectangle] {
        &self.boxes
    }
}

impl From<Vec<Rectangle>> for BoxStore {
    fn from(boxes: Vec<Rectangle>) -> Self {
        Self { boxes }
    }
}
