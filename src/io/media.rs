// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading.
//!
//! This module decides which files count as images and decodes them into
//! RGBA buffers suitable for drawing and for display in egui.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

/// Image extensions accepted as annotation sources.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "jpg", "jpeg", "tif", "tiff"];

/// Extensions of text files listing one image path per line.
pub const LIST_EXTENSIONS: &[&str] = &["txt", "list", "db"];

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

pub fn is_image(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

/// Decode an image file into an RGBA buffer.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load image {}", path.display()))?
        .to_rgba8();
    log::info!("Loaded image: {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}
