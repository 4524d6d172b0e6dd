//! # Simple View
//!
//! The image loading and page-selection core of a desktop photo viewer.
//! Each file the viewer shows is tracked by a [`record::Photo`]: a record
//! holding the source path, the decoded pages, per-image metadata (page
//! count, active page, EXIF, color profile), and the outcome of the last
//! load.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`record`] | The [`Photo`] record — async load/thumbnail/export plus captured load state |
//! | [`pages`] | [`PageBuffer`] and page selection — largest-page scan, wrap-around paging |
//! | [`imaging`] | Backend seam: [`ImageBackend`] trait, parameter types, the pure-Rust [`RustBackend`], EXIF/ICC parsers |
//!
//! # Design Decisions
//!
//! ## Captured Load Errors
//!
//! A viewer keeps showing its grid when one file is corrupt. `Photo::load`
//! therefore never lets a decode fault escape the record: after awaiting,
//! the record is complete and holds either pages or the error, and the
//! same error is surfaced in the returned `Result` for callers that prefer
//! it. Thumbnail fetches and page exports are one-shot operations with no
//! state to keep, so their failures propagate normally.
//!
//! ## Page Selection Wraps, Never Clamps
//!
//! Explicit page requests past the end resolve to the first page and
//! negative requests to the last one, so "next page" and "previous page"
//! cycle without bounds checks in the UI. The default page is the first,
//! except for `.ico` files where the widest resolution variant wins.
//!
//! ## Decoding Behind a Trait
//!
//! The record never names a codec. Everything pixel-shaped goes through
//! [`ImageBackend`], so tests drive the record with a scripted mock and
//! the production [`RustBackend`] (pure Rust, `image` crate) stays
//! swappable.
//!
//! [`Photo`]: record::Photo
//! [`PageBuffer`]: pages::PageBuffer
//! [`ImageBackend`]: imaging::ImageBackend
//! [`RustBackend`]: imaging::RustBackend

pub mod imaging;
pub mod pages;
pub mod record;

pub use imaging::{
    BackendError, Channel, ColorProfile, DecodedImage, ExifSummary, ImageBackend, LoadOptions,
    ProfileSource, RustBackend,
};
pub use pages::{LargestPage, PageBuffer, PageError, PageSelection};
pub use record::Photo;
