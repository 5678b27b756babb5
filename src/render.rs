// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Off-screen rendering of boxes onto image buffers.
//!
//! The working canvas and the preview are plain `RgbaImage` buffers. Both
//! are always derived from the clean base image, so drawing never stacks on
//! top of an earlier overlay.

use crate::models::annotation::{BoxStore, Point, Rectangle};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::pixelops::interpolate;
use imageproc::rect::Rect;

/// Width in pixels of a box outline.
pub const OUTLINE_WIDTH: u32 = 2;

/// Side of a font8x8 glyph cell.
const GLYPH_SIZE: i32 = 8;

/// Outline rasterization mode, using the OpenCV line type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Four,
    Eight,
    AntiAliased,
}

impl LineType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(LineType::Four),
            8 => Some(LineType::Eight),
            16 => Some(LineType::AntiAliased),
            _ => None,
        }
    }
}

/// Cosmetic settings shared by the working canvas and the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub color: Rgba<u8>,
    /// Draw each box's index at its center.
    pub draw_text: bool,
    pub font_scale: f32,
    pub font_thickness: u32,
    pub line_type: LineType,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            color: Rgba([255, 0, 0, 255]),
            draw_text: false,
            font_scale: 1.0,
            font_thickness: 1,
            line_type: LineType::Eight,
        }
    }
}

impl RenderStyle {
    /// Pixel size of one glyph dot.
    fn glyph_scale(&self) -> i32 {
        ((self.font_scale * 2.0).round() as i32).max(1)
    }
}

/// Draw the outline of `rect`, growing outwards from its edges.
pub fn draw_outline(image: &mut RgbaImage, rect: &Rectangle, style: &RenderStyle) {
    if rect.is_empty() {
        return;
    }

    for i in 0..OUTLINE_WIDTH {
        draw_hollow_rect_mut(image, grown(rect, i), style.color);
    }

    if style.line_type == LineType::AntiAliased {
        blend_ring(image, grown(rect, OUTLINE_WIDTH), style.color);
    }
}

fn grown(rect: &Rectangle, by: u32) -> Rect {
    Rect::at(rect.x - by as i32, rect.y - by as i32).of_size(rect.width + 2 * by, rect.height + 2 * by)
}

/// Half-blend `color` onto the one pixel wide border of `ring`.
fn blend_ring(image: &mut RgbaImage, ring: Rect, color: Rgba<u8>) {
    let (left, top, right, bottom) = (ring.left(), ring.top(), ring.right(), ring.bottom());
    let mut blend = |x: i32, y: i32| {
        if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
            let dst = *image.get_pixel(x as u32, y as u32);
            image.put_pixel(x as u32, y as u32, interpolate(color, dst, 0.5));
        }
    };

    for x in left..=right {
        blend(x, top);
        if bottom != top {
            blend(x, bottom);
        }
    }
    for y in (top + 1)..bottom {
        blend(left, y);
        if right != left {
            blend(right, y);
        }
    }
}

/// Draw `text` with its center at `center`.
pub fn draw_label(image: &mut RgbaImage, text: &str, center: Point, style: &RenderStyle) {
    let scale = style.glyph_scale();
    let dot = GLYPH_SIZE.saturating_mul(scale);
    // Extra columns widen each dot horizontally for thicker strokes
    let stroke = i32::try_from(style.font_thickness.max(1)).unwrap_or(i32::MAX) - 1;
    let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    let text_width = chars.saturating_mul(dot).saturating_add(stroke);
    let origin_x = center.x.saturating_sub(text_width / 2);
    let origin_y = center.y.saturating_sub(dot / 2);
    let dot_width = scale.saturating_add(stroke);

    for (n, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let n = i32::try_from(n).unwrap_or(i32::MAX);
        let cursor_x = origin_x.saturating_add(n.saturating_mul(dot));

        for (row_idx, &row_bits) in (0i32..).zip(glyph.iter()) {
            for col_idx in 0..GLYPH_SIZE {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x.saturating_add(col_idx.saturating_mul(scale));
                let py = origin_y.saturating_add(row_idx.saturating_mul(scale));
                fill_clipped(image, px, py, dot_width, scale, style.color);
            }
        }
    }
}

/// Fill a `width` x `height` block at (`x`, `y`), skipping what falls outside the image.
fn fill_clipped(image: &mut RgbaImage, x: i32, y: i32, width: i32, height: i32, color: Rgba<u8>) {
    let clip = |start: i32, len: i32, limit: u32| {
        let lo = i64::from(start).clamp(0, i64::from(limit));
        let hi = (i64::from(start) + i64::from(len)).clamp(0, i64::from(limit));
        lo as u32..hi as u32
    };
    for py in clip(y, height, image.height()) {
        for px in clip(x, width, image.width()) {
            image.put_pixel(px, py, color);
        }
    }
}

/// Draw one committed box and, if labels are enabled, its index.
pub fn draw_annotation(image: &mut RgbaImage, rect: &Rectangle, index: usize, style: &RenderStyle) {
    draw_outline(image, rect, style);
    if style.draw_text {
        draw_label(image, &index.to_string(), rect.center(), style);
    }
}

/// Full preview: every box of the store, in store order, on a copy of `base`.
pub fn render_preview(base: &RgbaImage, boxes: &BoxStore, style: &RenderStyle) -> RgbaImage {
    let mut preview = base.clone();
    for (index, rect) in boxes.iter().enumerate() {
        draw_annotation(&mut preview, rect, index, style);
    }
    preview
}

/// Working canvas: a copy of `base` with only the candidate outlined.
pub fn render_candidate(base: &RgbaImage, candidate: Option<&Rectangle>, style: &RenderStyle) -> RgbaImage {
    let mut canvas = base.clone();
    if let Some(rect) = candidate {
        draw_outline(&mut canvas, rect, style);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn base() -> RgbaImage {
        RgbaImage::from_pixel(64, 48, BLACK)
    }

    fn labeled() -> RenderStyle {
        RenderStyle {
            draw_text: true,
            ..RenderStyle::default()
        }
    }

    #[test]
    fn test_outline_pixels() {
        let style = RenderStyle::default();
        let mut image = base();
        draw_outline(&mut image, &Rectangle::new(10, 10, 20, 10), &style);

        assert_eq!(*image.get_pixel(10, 10), style.color);
        assert_eq!(*image.get_pixel(9, 9), style.color);
        assert_eq!(*image.get_pixel(29, 19), style.color);
        // Interior stays untouched
        assert_eq!(*image.get_pixel(20, 15), BLACK);
    }

    #[test]
    fn test_empty_rectangle_draws_nothing() {
        let mut image = base();
        draw_outline(&mut image, &Rectangle::new(10, 10, 0, 5), &RenderStyle::default());
        assert_eq!(image, base());
    }

    #[test]
    fn test_outline_at_image_edge_is_clipped() {
        let style = RenderStyle::default();
        let mut image = base();
        draw_outline(&mut image, &Rectangle::new(0, 0, 64, 48), &style);
        assert_eq!(*image.get_pixel(0, 0), style.color);
        assert_eq!(*image.get_pixel(63, 47), style.color);
    }

    #[test]
    fn test_antialiased_ring_is_blended() {
        let style = RenderStyle {
            line_type: LineType::AntiAliased,
            ..RenderStyle::default()
        };
        let mut image = base();
        draw_outline(&mut image, &Rectangle::new(10, 10, 20, 10), &style);

        let ring = image.get_pixel(8, 15);
        assert!(ring[0] > 0 && ring[0] < 255);
        assert_eq!(*image.get_pixel(7, 15), BLACK);
    }

    #[test]
    fn test_label_drawn_inside_box() {
        let style = labeled();
        let rect = Rectangle::new(10, 10, 40, 30);
        let mut image = base();
        draw_annotation(&mut image, &rect, 7, &style);

        let inside = (rect.x + 2..rect.x + rect.width as i32 - 2)
            .flat_map(|x| (rect.y + 2..rect.y + rect.height as i32 - 2).map(move |y| (x, y)))
            .any(|(x, y)| *image.get_pixel(x as u32, y as u32) == style.color);
        assert!(inside);
    }

    #[test]
    fn test_oversized_label_is_clipped() {
        let rect = Rectangle::new(10, 10, 40, 30);
        for (font_scale, font_thickness) in [(1e9, 1), (1.0, u32::MAX), (f32::MAX, u32::MAX)] {
            let style = RenderStyle {
                font_scale,
                font_thickness,
                ..labeled()
            };
            let mut image = base();
            draw_annotation(&mut image, &rect, 12, &style);
            assert_eq!(image.dimensions(), (64, 48));
            assert_eq!(*image.get_pixel(10, 10), style.color);
        }
    }

    #[test]
    fn test_no_label_without_draw_text() {
        let style = RenderStyle::default();
        let rect = Rectangle::new(10, 10, 40, 30);
        let mut with_index = base();
        draw_annotation(&mut with_index, &rect, 3, &style);
        let mut outline_only = base();
        draw_outline(&mut outline_only, &rect, &style);
        assert_eq!(with_index, outline_only);
    }

    #[test]
    fn test_incremental_draw_matches_full_render() {
        let style = labeled();
        let first = Rectangle::new(2, 2, 20, 20);
        let second = Rectangle::new(30, 10, 25, 30);

        let mut incremental = render_preview(&base(), &BoxStore::from(vec![first]), &style);
        draw_annotation(&mut incremental, &second, 1, &style);
        let full = render_preview(&base(), &BoxStore::from(vec![first, second]), &style);

        assert_eq!(incremental, full);
    }

    #[test]
    fn test_candidate_render_never_accumulates() {
        let style = RenderStyle::default();
        let clean = base();
        let _first = render_candidate(&clean, Some(&Rectangle::new(5, 5, 10, 10)), &style);
        let second = render_candidate(&clean, Some(&Rectangle::new(30, 20, 10, 10)), &style);

        assert_eq!(*second.get_pixel(5, 5), BLACK);
        assert_eq!(*second.get_pixel(30, 20), style.color);
        assert_eq!(render_candidate(&clean, None, &style), clean);
    }
}
