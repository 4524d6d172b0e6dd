//! Decoding backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the contract between the
//! [`Photo`](crate::record::Photo) record and whatever actually decodes
//! pixels. The record never touches codecs itself — it builds parameter
//! structs, delegates, and keeps the results.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust via the
//! `image` crate, statically linked into the binary.

use super::params::{LoadParams, ThumbnailParams};
use crate::pages::PageBuffer;
use image::DynamicImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("no decoder for {0}")]
    UnsupportedFormat(String),
}

/// Camera metadata pulled from an image's EXIF block.
///
/// Field mapping (IFD0 tags):
/// - `camera_make`: Make (`0x010F`)
/// - `camera_model`: Model (`0x0110`)
/// - `taken_at`: DateTime (`0x0132`), as the raw `YYYY:MM:DD HH:MM:SS` string
/// - `orientation`: Orientation (`0x0112`), values 1-8
/// - `description`: ImageDescription (`0x010E`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExifSummary {
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub taken_at: Option<String>,
    pub orientation: Option<u16>,
    pub description: Option<String>,
}

impl ExifSummary {
    pub fn is_empty(&self) -> bool {
        *self == ExifSummary::default()
    }
}

/// Where a [`ColorProfile`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    /// Embedded ICC profile found in the file.
    Embedded,
    /// Profile named by the caller at load time.
    Requested,
}

/// Color profile associated with a decoded image.
///
/// This crate performs no color conversion — the profile travels as
/// metadata for the viewer's color pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorProfile {
    pub description: Option<String>,
    pub source: ProfileSource,
    /// Raw ICC bytes when the profile is embedded; empty for requested
    /// profiles, which are resolved by name upstream.
    #[serde(skip)]
    pub icc_bytes: Vec<u8>,
}

/// Everything a successful load hands back.
#[derive(Debug)]
pub struct DecodedImage {
    pub pages: PageBuffer,
    pub exif: Option<ExifSummary>,
    pub color_profile: Option<ColorProfile>,
}

/// Trait for image decoding backends.
///
/// `Send + Sync` so a backend can be shared behind an `Arc` and driven from
/// `spawn_blocking`.
pub trait ImageBackend: Send + Sync {
    /// Decode an image into pages plus metadata.
    fn load(&self, params: &LoadParams) -> Result<DecodedImage, BackendError>;

    /// Produce a small preview of an image.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<DynamicImage, BackendError>;

    /// Write every page of a multi-page image to `dest_dir` as individual
    /// files. Returns the written paths in page order.
    fn export_pages(&self, source: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, BackendError>;
}
