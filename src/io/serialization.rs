// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation file writing and parsing.
//!
//! Two layouts are supported. Aggregate mode appends one line per image to a
//! single file:
//!
//! ```text
//! filename box_count x1 y1 w1 h1 x2 y2 w2 h2 ...
//! ```
//!
//! Per-image mode writes `<image stem>.txt` into a directory, one
//! `x y width height` line per box.

use crate::models::{
    annotation::{BoxStore, Rectangle},
    record::AnnotationRecord,
};
use anyhow::{anyhow, bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extension of files written in per-image mode.
pub const ANNOTATION_SUFFIX: &str = "txt";

/// On-disk layout, chosen once for the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Aggregate,
    PerImage,
}

impl TryFrom<u8> for OutputMode {
    type Error = anyhow::Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(OutputMode::Aggregate),
            1 => Ok(OutputMode::PerImage),
            other => Err(anyhow!("Unknown output mode {} (expected 0 or 1)", other)),
        }
    }
}

enum Target {
    Aggregate { path: PathBuf, out: BufWriter<File> },
    PerImage { dir: PathBuf },
}

/// Destination for finished annotation records.
pub struct AnnotationWriter {
    target: Target,
    written: usize,
}

impl AnnotationWriter {
    /// Open the destination, failing before any annotation work starts.
    pub fn open(mode: OutputMode, destination: &Path) -> Result<Self> {
        let target = match mode {
            OutputMode::Aggregate => {
                let file = File::create(destination)
                    .with_context(|| format!("Failed to open output file {}", destination.display()))?;
                Target::Aggregate {
                    path: destination.to_path_buf(),
                    out: BufWriter::new(file),
                }
            }
            OutputMode::PerImage => {
                if !destination.is_dir() {
                    bail!("Output directory {} does not exist", destination.display());
                }
                Target::PerImage {
                    dir: destination.to_path_buf(),
                }
            }
        };
        Ok(Self { target, written: 0 })
    }

    /// Persist one finished image.
    pub fn write(&mut self, record: &AnnotationRecord) -> Result<()> {
        match &mut self.target {
            Target::Aggregate { path, out } => {
                writeln!(out, "{}", format_aggregate_line(record))
                    .and_then(|_| out.flush())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Wrote {} boxes for {} to {}", record.boxes.len(), record.image_path.display(), path.display());
            }
            Target::PerImage { dir } => {
                let path = per_image_path(dir, &record.image_path)?;
                if path.exists() {
                    log::warn!("Overwriting {} with boxes for {}", path.display(), record.image_path.display());
                }
                std::fs::write(&path, format_per_image(record.boxes.as_slice()))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Wrote {} boxes to {}", record.boxes.len(), path.display());
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Flush buffered output. Called on completion and on quit.
    pub fn finish(&mut self) -> Result<()> {
        if let Target::Aggregate { path, out } = &mut self.target {
            out.flush()
                .with_context(|| format!("Failed to flush {}", path.display()))?;
        }
        log::info!("Annotation output closed after {} records", self.written);
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

/// File written for `image_path` in per-image mode.
pub fn per_image_path(dir: &Path, image_path: &Path) -> Result<PathBuf> {
    let stem = image_path
        .file_stem()
        .ok_or_else(|| anyhow!("Image path {} has no file name", image_path.display()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(ANNOTATION_SUFFIX);
    Ok(dir.join(name))
}

/// `filename count x y w h ...`, without a line terminator.
pub fn format_aggregate_line(record: &AnnotationRecord) -> String {
    let boxes: Vec<&Rectangle> = record.persisted_boxes().collect();
    let mut line = format!("{} {}", record.image_path.display(), boxes.len());
    for rect in boxes {
        line.push_str(&format!(" {} {} {} {}", rect.x, rect.y, rect.width, rect.height));
    }
    line
}

/// One `x y width height` line per box.
pub fn format_per_image(boxes: &[Rectangle]) -> String {
    boxes
        .iter()
        .filter(|rect| !rect.is_empty())
        .map(|rect| format!("{} {} {} {}\n", rect.x, rect.y, rect.width, rect.height))
        .collect()
}

/// Parse one aggregate line back into a record.
pub fn parse_aggregate_line(line: &str) -> Result<AnnotationRecord> {
    let mut fields = line.split_whitespace();
    let filename = fields.next().ok_or_else(|| anyhow!("Empty annotation line"))?;
    let count: usize = fields
        .next()
        .ok_or_else(|| anyhow!("Missing box count for {}", filename))?
        .parse()
        .with_context(|| format!("Invalid box count for {}", filename))?;
    let values: Vec<&str> = fields.collect();
    if values.len() != count * 4 {
        bail!("Expected {} box fields for {}, found {}", count * 4, filename, values.len());
    }

    let boxes = values
        .chunks(4)
        .map(parse_rectangle)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Invalid box for {}", filename))?;
    Ok(AnnotationRecord::new(PathBuf::from(filename), BoxStore::from(boxes)))
}

/// Parse the contents of a per-image annotation file.
pub fn parse_per_image(text: &str) -> Result<Vec<Rectangle>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(n, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                bail!("Line {}: expected 4 fields, found {}", n + 1, fields.len());
            }
            parse_rectangle(&fields).with_context(|| format!("Line {}", n + 1))
        })
        .collect()
}

fn parse_rectangle(fields: &[&str]) -> Result<Rectangle> {
    match fields {
        [x, y, width, height] => Ok(Rectangle::new(
            x.parse()?,
            y.parse()?,
            width.parse()?,
            height.parse()?,
        )),
        _ => bail!("Expected 4 fields, found {}", fields.len()),
    }
}
