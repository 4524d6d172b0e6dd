//! Image decoding — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` crate decoders via [`RustBackend`] |
//! | **Multi-page** | `image` `AnimationDecoder` (GIF, animated WebP) |
//! | **EXIF / ICC** | custom parsers (TIFF IFD + ICC `desc` tag) |
//! | **Page export** | PNG per page, parallel via `rayon` |
//!
//! The module is split into:
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`] — the seam
//!   between the [`Photo`](crate::record::Photo) record and the codecs
//! - **Parameters**: Data structures describing decode requests
//! - **Metadata parsers**: minimal EXIF and ICC readers

pub mod backend;
pub(crate) mod exif_parser;
pub mod params;
pub mod rust_backend;

pub use backend::{
    BackendError, ColorProfile, DecodedImage, ExifSummary, ImageBackend, ProfileSource,
};
pub use params::{Channel, LoadOptions, LoadParams, ThumbnailParams};
pub use rust_backend::{RustBackend, supported_input_extensions};
