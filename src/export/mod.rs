//! Export module for saving heightmaps to image and engine formats.
//!
//! Supports 16-bit PNG for viewing and RAW formats for game engine imports.

mod png;
mod raw;

pub use png::{export_heightmap_png, PngExportError, PngExportOptions};
pub use raw::{expected_file_size, export_heightmap_raw, RawExportError, RawFormat};
