// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, sources and annotation files.

pub mod media;
pub mod serialization;
pub mod source;
