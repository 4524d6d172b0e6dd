//! Pure Rust decoding backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, BMP, ICO) | `image` crate (pure Rust decoders) |
//! | Multi-page decode (GIF, animated WebP) | `image` `AnimationDecoder` |
//! | EXIF / ICC blobs | `image` `ImageDecoder`, parsed by [`exif_parser`](super::exif_parser) |
//! | Downscale | `image::DynamicImage::resize` with `Lanczos3` filter |
//! | Embedded preview | bounded SOI/EOI scan over the file head |
//! | Page export | PNG encode per page, fanned out via `rayon` |

use super::backend::{BackendError, ColorProfile, DecodedImage, ImageBackend, ProfileSource};
use super::exif_parser;
use super::params::{Channel, LoadParams, ThumbnailParams};
use crate::pages::PageBuffer;
use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use image::imageops::FilterType;
use image::{
    AnimationDecoder, DynamicImage, GrayImage, ImageDecoder, ImageFormat, ImageReader, Luma,
};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in and known to work.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("bmp", ImageFormat::Bmp),
    ("ico", ImageFormat::Ico),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders
/// compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// How much of the file head is scanned for an embedded preview stream.
const PREVIEW_SCAN_LIMIT: usize = 512 * 1024;
/// Embedded streams smaller than this are assumed to be markers or
/// garbage, not a usable preview.
const PREVIEW_MIN_BYTES: usize = 4096;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Pages plus the raw metadata blobs pulled from the decoder.
struct DecodedSource {
    pages: Vec<DynamicImage>,
    exif: Option<Vec<u8>>,
    icc: Option<Vec<u8>>,
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode(format!("{}: {err}", path.display()))
}

/// Decode a file into its pages, dispatching multi-frame formats to the
/// animation decoders.
fn decode_source(path: &Path) -> Result<DecodedSource, BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))?;

    match format {
        ImageFormat::Gif => decode_gif(path),
        ImageFormat::WebP => decode_webp(path),
        _ => decode_single(path, reader),
    }
}

fn decode_single(
    path: &Path,
    reader: ImageReader<BufReader<File>>,
) -> Result<DecodedSource, BackendError> {
    let mut decoder = reader.into_decoder().map_err(|e| decode_error(path, e))?;
    // Metadata blobs must be pulled before the decoder is consumed by the
    // pixel decode.
    let exif = decoder.exif_metadata().ok().flatten();
    let icc = decoder.icc_profile().ok().flatten();
    let image = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;

    Ok(DecodedSource {
        pages: vec![image],
        exif,
        icc,
    })
}

fn decode_gif(path: &Path) -> Result<DecodedSource, BackendError> {
    let file = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(file).map_err(|e| decode_error(path, e))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| decode_error(path, e))?;
    let pages = frames
        .into_iter()
        .map(|frame| DynamicImage::ImageRgba8(frame.into_buffer()))
        .collect();

    Ok(DecodedSource {
        pages,
        exif: None,
        icc: None,
    })
}

fn decode_webp(path: &Path) -> Result<DecodedSource, BackendError> {
    let file = BufReader::new(File::open(path)?);
    let mut decoder = WebPDecoder::new(file).map_err(|e| decode_error(path, e))?;
    let exif = decoder.exif_metadata().ok().flatten();
    let icc = decoder.icc_profile().ok().flatten();

    let pages = if decoder.has_animation() {
        decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| decode_error(path, e))?
            .into_iter()
            .map(|frame| DynamicImage::ImageRgba8(frame.into_buffer()))
            .collect()
    } else {
        vec![DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?]
    };

    Ok(DecodedSource { pages, exif, icc })
}

/// Map one channel of a page to a grayscale view.
fn channel_view(image: &DynamicImage, channel: Channel) -> DynamicImage {
    let rgba = image.to_rgba8();
    let index = channel.rgba_index();
    let gray = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        Luma([rgba.get_pixel(x, y).0[index]])
    });
    DynamicImage::ImageLuma8(gray)
}

/// Downscale so neither edge exceeds `limit`. Never upscales.
fn downscale(image: DynamicImage, limit: u32) -> DynamicImage {
    if image.width() <= limit && image.height() <= limit {
        image
    } else {
        image.resize(limit, limit, FilterType::Lanczos3)
    }
}

/// Find an embedded JPEG stream (SOI..EOI) in `data`, ignoring a stream
/// starting at the very beginning — that is the container itself, not an
/// embedded preview. Returns the first candidate of at least `min_len`
/// bytes.
fn find_embedded_jpeg(data: &[u8], min_len: usize) -> Option<&[u8]> {
    const SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];
    const EOI: [u8; 2] = [0xFF, 0xD9];

    let mut starts = Vec::new();
    for (i, window) in data.windows(3).enumerate().skip(2) {
        if window == SOI {
            starts.push(i);
            if starts.len() >= 4 {
                break;
            }
        }
    }

    for start in starts {
        if let Some(rel) = data[start..].windows(2).position(|w| w == EOI) {
            let end = start + rel + 1;
            if end + 1 - start >= min_len {
                return Some(&data[start..=end]);
            }
        }
    }

    None
}

/// Decode an embedded preview from the head of the file, if one exists.
fn embedded_preview(path: &Path) -> Option<DynamicImage> {
    let mut file = File::open(path).ok()?;
    let mut data = vec![0u8; PREVIEW_SCAN_LIMIT];
    let read = file.read(&mut data).ok()?;
    data.truncate(read);

    let jpeg = find_embedded_jpeg(&data, PREVIEW_MIN_BYTES)?;
    image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg).ok()
}

fn decode_with_preview(params: &LoadParams) -> Result<DecodedSource, BackendError> {
    if params.use_embedded_thumbnail {
        if let Some(preview) = embedded_preview(&params.source) {
            log::debug!("{}: using embedded preview", params.source.display());
            return Ok(DecodedSource {
                pages: vec![preview],
                exif: None,
                icc: None,
            });
        }
    }
    decode_source(&params.source)
}

fn resolve_profile(params: &LoadParams, icc: Option<Vec<u8>>) -> Option<ColorProfile> {
    if let Some(name) = &params.color_profile {
        return Some(ColorProfile {
            description: Some(name.clone()),
            source: ProfileSource::Requested,
            icc_bytes: Vec::new(),
        });
    }
    icc.map(|bytes| ColorProfile {
        description: exif_parser::icc_description(&bytes),
        source: ProfileSource::Embedded,
        icc_bytes: bytes,
    })
}

impl ImageBackend for RustBackend {
    fn load(&self, params: &LoadParams) -> Result<DecodedImage, BackendError> {
        let source = decode_with_preview(params)?;
        if source.pages.is_empty() {
            return Err(decode_error(&params.source, "no pages in image"));
        }

        let mut pages = source.pages;
        if let Some(channel) = params.channel {
            pages = pages.iter().map(|p| channel_view(p, channel)).collect();
        }
        if let Some(limit) = params.target_size {
            pages = pages.into_iter().map(|p| downscale(p, limit)).collect();
        }

        let exif = source.exif.as_deref().and_then(exif_parser::parse_exif);
        let color_profile = resolve_profile(params, source.icc);
        log::debug!(
            "{}: decoded {} page(s), profile for {}",
            params.source.display(),
            pages.len(),
            if params.profile_all_pages {
                "all pages"
            } else {
                "active page"
            },
        );

        Ok(DecodedImage {
            pages: PageBuffer::new(pages),
            exif,
            color_profile,
        })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<DynamicImage, BackendError> {
        if params.use_embedded_thumbnail {
            if let Some(preview) = embedded_preview(&params.source) {
                return Ok(downscale(preview, params.size));
            }
        }

        let decoded = decode_source(&params.source)?;
        let first = decoded
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| decode_error(&params.source, "no pages in image"))?;
        Ok(downscale(first, params.size))
    }

    fn export_pages(&self, source: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
        let decoded = decode_source(source)?;
        if decoded.pages.is_empty() {
            return Err(decode_error(source, "no pages to export"));
        }

        std::fs::create_dir_all(dest_dir)?;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page")
            .to_string();

        let pages: Vec<(usize, DynamicImage)> = decoded.pages.into_iter().enumerate().collect();
        pages
            .par_iter()
            .map(|(index, page)| {
                let out = dest_dir.join(format!("{stem}-{:03}.png", index + 1));
                page.save_with_format(&out, ImageFormat::Png)
                    .map_err(|e| BackendError::Encode(format!("{}: {e}", out.display())))?;
                Ok(out)
            })
            .collect()
    }
}
