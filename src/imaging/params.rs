//! Parameter types for decode operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`Photo`](crate::record::Photo) record (which
//! decides what to ask for) and the [`backend`](super::backend) (which does
//! the actual decode work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing record logic.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Color channel of a decoded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    /// Index of this channel within an RGBA pixel.
    pub fn rgba_index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Alpha => 3,
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Channel::Red),
            "green" | "g" => Ok(Channel::Green),
            "blue" | "b" => Ok(Channel::Blue),
            "alpha" | "a" => Ok(Channel::Alpha),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// Caller-facing load options. The source path comes from the record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadOptions {
    /// Downscale pages so neither edge exceeds this (never upscales).
    pub target_size: Option<u32>,
    /// Color profile to associate with the image. Without one, the
    /// embedded ICC profile (if any) is reported instead.
    pub color_profile: Option<String>,
    /// Associate the requested profile with every page, not just the
    /// active one.
    pub profile_all_pages: bool,
    /// View a single channel as grayscale instead of the full image.
    pub channel: Option<Channel>,
    /// Prefer an embedded preview stream over a full decode.
    pub use_embedded_thumbnail: bool,
}

impl LoadOptions {
    pub fn into_params(self, source: &Path) -> LoadParams {
        LoadParams {
            source: source.to_path_buf(),
            target_size: self.target_size,
            color_profile: self.color_profile,
            profile_all_pages: self.profile_all_pages,
            channel: self.channel,
            use_embedded_thumbnail: self.use_embedded_thumbnail,
        }
    }
}

/// Full specification for a load, handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadParams {
    pub source: PathBuf,
    pub target_size: Option<u32>,
    pub color_profile: Option<String>,
    pub profile_all_pages: bool,
    pub channel: Option<Channel>,
    pub use_embedded_thumbnail: bool,
}

/// Full specification for a thumbnail fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    /// Bounding box edge for the thumbnail (aspect ratio is kept).
    pub size: u32,
    pub use_embedded_thumbnail: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_rgba_indices() {
        assert_eq!(Channel::Red.rgba_index(), 0);
        assert_eq!(Channel::Green.rgba_index(), 1);
        assert_eq!(Channel::Blue.rgba_index(), 2);
        assert_eq!(Channel::Alpha.rgba_index(), 3);
    }

    #[test]
    fn channel_parses_names_and_shorthands() {
        assert_eq!("red".parse::<Channel>(), Ok(Channel::Red));
        assert_eq!("G".parse::<Channel>(), Ok(Channel::Green));
        assert_eq!("Alpha".parse::<Channel>(), Ok(Channel::Alpha));
        assert!("luminance".parse::<Channel>().is_err());
    }

    #[test]
    fn options_into_params_carries_source() {
        let options = LoadOptions {
            target_size: Some(2048),
            channel: Some(Channel::Blue),
            ..LoadOptions::default()
        };
        let params = options.into_params(Path::new("/photos/dawn.jpg"));
        assert_eq!(params.source, PathBuf::from("/photos/dawn.jpg"));
        assert_eq!(params.target_size, Some(2048));
        assert_eq!(params.channel, Some(Channel::Blue));
        assert!(!params.use_embedded_thumbnail);
    }
}
