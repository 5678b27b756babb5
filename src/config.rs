// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line options and the validated runtime configuration.

use crate::io::serialization::OutputMode;
use crate::render::{LineType, RenderStyle};
use crate::session::{gesture::GestureConfig, SessionOptions};
use anyhow::{anyhow, Result};
use clap::Parser;
use image::Rgba;
use std::path::PathBuf;

/// Largest accepted `--font-scale`.
pub const MAX_FONT_SCALE: f32 = 64.0;
/// Largest accepted `--font-thickness`.
pub const MAX_FONT_THICKNESS: u32 = 64;

/// Draw bounding boxes on images and save them as text annotations.
///
/// Keys: drag to draw, Space commits the box, Escape discards it, digits
/// followed by D delete the box with that index, P toggles the preview,
/// Enter saves and moves to the next image, Q quits without saving the
/// current image.
#[derive(Debug, Parser)]
#[command(name = "object-marker", version, disable_help_flag = true)]
pub struct Cli {
    /// Source to mark: an image, a list of images (txt, list, db) or a directory
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Where to store annotations: a file in mode 0, an existing directory in mode 1
    #[arg(short = 'o', long = "destinate")]
    pub destinate: Option<PathBuf>,

    /// Show a preview of the committed boxes
    #[arg(short, long)]
    pub preview: bool,

    /// Draw each box's index in the preview
    #[arg(short = 't', long)]
    pub draw_text: bool,

    /// Fixed box width; together with --fixed-height a click stamps a box
    #[arg(short = 'w', long, default_value_t = 0)]
    pub fixed_width: u32,

    /// Fixed box height
    #[arg(short = 'h', long, default_value_t = 0)]
    pub fixed_height: u32,

    /// Output layout: 0 writes one line per image to a single file, 1 writes one file per image
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub mode: u8,

    /// Color of boxes and labels (name or #rrggbb)
    #[arg(short, long, default_value = "red", value_parser = parse_color)]
    pub color: Rgba<u8>,

    /// Scale of index labels
    #[arg(long, default_value_t = 1.0)]
    pub font_scale: f32,

    /// Stroke thickness of index labels
    #[arg(long, default_value_t = 1)]
    pub font_thickness: u32,

    /// Outline line type: 4, 8 or 16 (anti-aliased)
    #[arg(long, default_value = "8", value_parser = parse_line_type)]
    pub line_type: LineType,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

/// Everything the program needs once the options are validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: OutputMode,
    pub session: SessionOptions,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let source = cli
            .source
            .ok_or_else(|| anyhow!("source must be given (--source/-s)"))?;
        let destination = cli
            .destinate
            .ok_or_else(|| anyhow!("destinate must be given (--destinate/-o)"))?;
        if cli.font_scale.is_nan() || cli.font_scale <= 0.0 || cli.font_scale > MAX_FONT_SCALE {
            return Err(anyhow!(
                "--font-scale must be in (0, {}], got {}",
                MAX_FONT_SCALE,
                cli.font_scale
            ));
        }
        if cli.font_thickness > MAX_FONT_THICKNESS {
            return Err(anyhow!(
                "--font-thickness must be at most {}, got {}",
                MAX_FONT_THICKNESS,
                cli.font_thickness
            ));
        }

        let style = RenderStyle {
            color: cli.color,
            draw_text: cli.draw_text,
            font_scale: cli.font_scale,
            font_thickness: cli.font_thickness.max(1),
            line_type: cli.line_type,
        };

        Ok(Self {
            source,
            destination,
            mode: OutputMode::try_from(cli.mode)?,
            session: SessionOptions {
                gesture: GestureConfig::new(cli.fixed_width, cli.fixed_height),
                preview: cli.preview,
                style,
            },
        })
    }
}

fn parse_color(value: &str) -> Result<Rgba<u8>, String> {
    let rgb = match value.to_ascii_lowercase().as_str() {
        "red" => [255, 0, 0],
        "green" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" => [0, 255, 255],
        "magenta" => [255, 0, 255],
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        hex => {
            let digits = hex.strip_prefix('#').unwrap_or(hex);
            let channel = |i: usize| {
                digits
                    .get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            };
            match (digits.len(), channel(0), channel(2), channel(4)) {
                (6, Some(r), Some(g), Some(b)) => [r, g, b],
                _ => return Err(format!("unknown color '{}'", value)),
            }
        }
    };
    Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

fn parse_line_type(value: &str) -> Result<LineType, String> {
    value
        .parse::<u8>()
        .ok()
        .and_then(LineType::from_code)
        .ok_or_else(|| format!("line type must be 4, 8 or 16, got '{}'", value))
}
