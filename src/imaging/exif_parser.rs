//! Minimal EXIF and ICC metadata parsers.
//!
//! Extracts a handful of fields from the raw metadata blobs the decoders
//! hand back:
//!
//! - EXIF (TIFF structure): Make (0x010F), Model (0x0110), DateTime
//!   (0x0132), Orientation (0x0112), ImageDescription (0x010E) from IFD0.
//! - ICC: the profile description from the `desc` tag (both the v2
//!   `desc` text type and the v4 `mluc` multi-localized type).
//!
//! Zero external dependencies — pure Rust. Any structural failure parses
//! to `None`; a viewer showing no metadata beats a viewer refusing a file.

use super::backend::ExifSummary;

// ---------------------------------------------------------------------------
// EXIF: IFD0 walk
// ---------------------------------------------------------------------------

const TAG_DESCRIPTION: u16 = 0x010E;
const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_ORIENTATION: u16 = 0x0112;
const TAG_DATETIME: u16 = 0x0132;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;

/// Parse a raw EXIF blob into a summary.
///
/// Accepts either bare TIFF bytes or the APP1 payload with its
/// `Exif\0\0` prefix still attached. Returns `None` when nothing useful
/// could be extracted.
pub(crate) fn parse_exif(data: &[u8]) -> Option<ExifSummary> {
    let data = data.strip_prefix(b"Exif\0\0").unwrap_or(data);
    if data.len() < 8 {
        return None;
    }

    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };
    let tiff = Tiff { data, big_endian };

    // TIFF magic
    if tiff.u16_at(2)? != 42 {
        return None;
    }

    let ifd_offset = tiff.u32_at(4)? as usize;
    let entry_count = tiff.u16_at(ifd_offset)? as usize;
    let entries_start = ifd_offset + 2;

    let mut summary = ExifSummary::default();
    for i in 0..entry_count {
        let entry = entries_start + i * 12;
        let Some(tag) = tiff.u16_at(entry) else {
            break;
        };

        match tag {
            TAG_MAKE => summary.camera_make = tiff.ascii_value(entry),
            TAG_MODEL => summary.camera_model = tiff.ascii_value(entry),
            TAG_DATETIME => summary.taken_at = tiff.ascii_value(entry),
            TAG_DESCRIPTION => summary.description = tiff.ascii_value(entry),
            TAG_ORIENTATION => summary.orientation = tiff.short_value(entry),
            _ => {}
        }
    }

    if summary.is_empty() { None } else { Some(summary) }
}

/// Bounds-checked reads over a TIFF-structured byte slice.
struct Tiff<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl Tiff<'_> {
    fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset + 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset + 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    /// ASCII value of an IFD entry. Values of four bytes or fewer are
    /// stored inline in the offset field; longer ones live at the offset.
    fn ascii_value(&self, entry: usize) -> Option<String> {
        if self.u16_at(entry + 2)? != TYPE_ASCII {
            return None;
        }
        let count = self.u32_at(entry + 4)? as usize;
        let bytes = if count <= 4 {
            self.data.get(entry + 8..entry + 8 + count)?
        } else {
            let offset = self.u32_at(entry + 8)? as usize;
            self.data.get(offset..offset + count)?
        };

        let text = String::from_utf8_lossy(bytes)
            .trim_end_matches('\0')
            .trim()
            .to_string();
        (!text.is_empty()).then_some(text)
    }

    /// Single SHORT value of an IFD entry (always stored inline).
    fn short_value(&self, entry: usize) -> Option<u16> {
        if self.u16_at(entry + 2)? != TYPE_SHORT || self.u32_at(entry + 4)? != 1 {
            return None;
        }
        self.u16_at(entry + 8)
    }
}

// ---------------------------------------------------------------------------
// ICC: profile description
// ---------------------------------------------------------------------------

const ICC_HEADER_LEN: usize = 128;

/// Extract the human-readable description from an ICC profile.
///
/// The header is 128 bytes, followed by a big-endian tag table. The
/// description lives in the `desc` tag, encoded either as a v2
/// textDescriptionType (`desc`) or a v4 multiLocalizedUnicodeType
/// (`mluc`, first record wins).
pub(crate) fn icc_description(data: &[u8]) -> Option<String> {
    let tag_count = be_u32(data, ICC_HEADER_LEN)? as usize;

    for i in 0..tag_count {
        let entry = ICC_HEADER_LEN + 4 + i * 12;
        let Some(signature) = data.get(entry..entry + 4) else {
            break;
        };
        if signature != b"desc" {
            continue;
        }

        let offset = be_u32(data, entry + 4)? as usize;
        let size = be_u32(data, entry + 8)? as usize;
        return parse_desc_tag(data.get(offset..offset + size)?);
    }

    None
}

fn parse_desc_tag(tag: &[u8]) -> Option<String> {
    match tag.get(0..4)? {
        b"desc" => {
            // textDescriptionType: ASCII count at 8, string (NUL-terminated)
            // at 12.
            let count = be_u32(tag, 8)? as usize;
            let bytes = tag.get(12..12 + count)?;
            clean_text(&String::from_utf8_lossy(bytes))
        }
        b"mluc" => {
            // multiLocalizedUnicodeType: record count at 8, records at 16;
            // each record is language(2) country(2) length(4) offset(4),
            // offset relative to the tag start, string UTF-16BE.
            if be_u32(tag, 8)? == 0 {
                return None;
            }
            let length = be_u32(tag, 20)? as usize;
            let offset = be_u32(tag, 24)? as usize;
            let bytes = tag.get(offset..offset + length)?;
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            clean_text(&String::from_utf16_lossy(&units))
        }
        _ => None,
    }
}

fn be_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

fn clean_text(raw: &str) -> Option<String> {
    let text = raw.trim_end_matches('\0').trim().to_string();
    (!text.is_empty()).then_some(text)
}
