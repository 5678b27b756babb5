// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Object Marker
//!
//! An interactive tool for drawing bounding boxes on a single image, a list
//! of images or a directory tree, saving them as plain text annotations.

mod app;
mod batch;
mod config;
mod io;
mod models;
mod render;
mod session;
mod ui;
mod util;

use anyhow::Result;
use app::MarkerApp;
use batch::{Batch, Progress};
use clap::{CommandFactory, Parser};
use config::{Cli, Config};
use io::serialization::AnnotationWriter;
use std::sync::mpsc::channel;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let config = Config::from_cli(Cli::parse())?;
    log::debug!("{:?}", config);

    // Configuration errors surface here, before any window opens
    let images = io::source::resolve_images(&config.source)?;
    let writer = AnnotationWriter::open(config.mode, &config.destination)?;
    if images.is_empty() {
        log::warn!("No images found in {}", config.source.display());
        return Ok(());
    }

    let mut batch = Batch::new(images, writer, config.session);
    if batch.start()? == Progress::Finished {
        return Ok(());
    }

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Object Marker"),
        ..Default::default()
    };

    let (sender, receiver) = channel();

    // Run the application
    eframe::run_native(
        "Object Marker",
        options,
        Box::new(|_cc| Ok(Box::new(MarkerApp::new(batch, sender)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    match receiver.try_recv() {
        Ok(err) => Err(err),
        Err(_) => Ok(()),
    }
}
