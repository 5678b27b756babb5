// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Resolution of the annotation source into an ordered list of images.

use super::media::{has_extension, is_image, LIST_EXTENSIONS};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Expand `source` into the images to annotate, in processing order.
///
/// A single image yields itself, a list file yields its lines in file order,
/// and a directory yields every image below it, depth first with entries
/// sorted by name.
pub fn resolve_images(source: &Path) -> Result<Vec<PathBuf>> {
    if source.is_dir() {
        let mut images = Vec::new();
        walk(source, &mut images)?;
        log::info!("Found {} images under {}", images.len(), source.display());
        Ok(images)
    } else if source.is_file() {
        if is_image(source) {
            Ok(vec![source.to_path_buf()])
        } else if has_extension(source, LIST_EXTENSIONS) {
            read_list(source)
        } else {
            bail!(
                "File format of {} not supported. Specify an image file ({}) or a text file ({}) listing images",
                source.display(),
                super::media::IMAGE_EXTENSIONS.join(", "),
                LIST_EXTENSIONS.join(", ")
            )
        }
    } else {
        bail!("Source {} is neither a file nor a directory", source.display())
    }
}

/// Read a list file: one image path per line, blank lines ignored.
pub fn read_list(path: &Path) -> Result<Vec<PathBuf>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read image list {}", path.display()))?;
    let images: Vec<PathBuf> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect();
    log::info!("Read {} image paths from {}", images.len(), path.display());
    Ok(images)
}

fn walk(dir: &Path, images: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        if file_type.is_dir() {
            walk(&path, images)?;
        } else if file_type.is_file() && is_image(&path) {
            images.push(path);
        }
    }
    Ok(())
}
