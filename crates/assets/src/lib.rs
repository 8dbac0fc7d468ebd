//! Image assets: decoding into pixel buffers, mip chains, placeholders.
//!
//! Images are decoded on the CPU into tightly packed 8-bit buffers. The
//! renderer uploads [`PixelBuffer`]s and never touches file paths itself.
//!
//! # Invariants
//! - `data.len() == width * height * channels` for every buffer handed out.
//! - Mip generation never changes the base level.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported channel count {0} (expected 1..=4)")]
    UnsupportedChannels(u8),
    #[error("pixel data is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// How an image file is turned into a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Store the bottom row first. Matches texture coordinates whose `v = 0`
    /// is the bottom of the image.
    pub flip_vertically: bool,
    /// Convert to this many channels instead of the file's own count.
    pub forced_channels: Option<u8>,
}

impl LoadOptions {
    /// Flipped RGBA, the layout every texture upload uses.
    pub fn texture() -> Self {
        Self {
            flip_vertically: true,
            forced_channels: Some(4),
        }
    }
}

/// Decoded image: 8 bits per channel, interleaved, rows top to bottom
/// (or bottom to top when loaded flipped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw pixel data, checking that the length matches the dimensions.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, AssetError> {
        if !(1..=4).contains(&channels) {
            return Err(AssetError::UnsupportedChannels(channels));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(AssetError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    fn from_dynamic(img: DynamicImage, channels: u8) -> Result<Self, AssetError> {
        let (width, height) = (img.width(), img.height());
        let data = match channels {
            1 => img.into_luma8().into_raw(),
            2 => img.into_luma_alpha8().into_raw(),
            3 => img.into_rgb8().into_raw(),
            4 => img.into_rgba8().into_raw(),
            other => return Err(AssetError::UnsupportedChannels(other)),
        };
        Self::new(width, height, channels, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes in one row of pixels.
    pub fn row_bytes(&self) -> u32 {
        self.width * self.channels as u32
    }

    /// Expand to RGBA8. Gray is replicated, missing alpha becomes opaque.
    pub fn to_rgba8(&self) -> PixelBuffer {
        if self.channels == 4 {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.data.chunks_exact(self.channels as usize) {
            let rgba = match *px {
                [l] => [l, l, l, 255],
                [l, a] => [l, l, l, a],
                [r, g, b] => [r, g, b, 255],
                _ => unreachable!("channel count checked on construction"),
            };
            out.extend_from_slice(&rgba);
        }
        PixelBuffer {
            width: self.width,
            height: self.height,
            channels: 4,
            data: out,
        }
    }

    fn to_rgba_image(&self) -> RgbaImage {
        let rgba = self.to_rgba8();
        // Length is guaranteed by the constructor invariant.
        RgbaImage::from_raw(rgba.width, rgba.height, rgba.data)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

/// Decode an image file.
///
/// A missing or unreadable path returns [`AssetError::Io`]; corrupt data
/// returns [`AssetError::Decode`].
pub fn load_image(path: impl AsRef<Path>, options: LoadOptions) -> Result<PixelBuffer, AssetError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => AssetError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let native = img.color().channel_count();
    let img = if options.flip_vertically { img.flipv() } else { img };
    let channels = options.forced_channels.unwrap_or(native.min(4));
    let buffer = PixelBuffer::from_dynamic(img, channels)?;
    tracing::debug!(
        path = %path.display(),
        width = buffer.width,
        height = buffer.height,
        channels = buffer.channels,
        native_channels = native,
        "loaded image"
    );
    Ok(buffer)
}

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    32 - largest.leading_zeros()
}

/// Build the full RGBA mip chain of an image.
///
/// Level 0 has the base dimensions; each next level halves both sides
/// (never below 1) using a triangle filter on the base image.
pub fn mip_chain(base: &PixelBuffer) -> Vec<PixelBuffer> {
    let source = base.to_rgba_image();
    let count = mip_level_count(base.width, base.height);
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(base.to_rgba8());
    for level in 1..count {
        let w = (base.width >> level).max(1);
        let h = (base.height >> level).max(1);
        let resized = image::imageops::resize(&source, w, h, FilterType::Triangle);
        levels.push(PixelBuffer {
            width: w,
            height: h,
            channels: 4,
            data: resized.into_raw(),
        });
    }
    levels
}

/// Magenta/black checkerboard used in place of an image that failed to load.
pub fn placeholder_checkerboard(size: u32, cell: u32) -> PixelBuffer {
    let size = size.max(1);
    let cell = cell.max(1);
    let mut data = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            let px = if on {
                [255, 0, 255, 255]
            } else {
                [0, 0, 0, 255]
            };
            data.extend_from_slice(&px);
        }
    }
    PixelBuffer {
        width: size,
        height: size,
        channels: 4,
        data,
    }
}

pub fn crate_info() -> &'static str {
    "hellogpu-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 RGB image: top row red, bottom row blue.
    fn write_rgb_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("fixture.png");
        let mut img = image::RgbImage::new(3, 2);
        for x in 0..3 {
            img.put_pixel(x, 0, image::Rgb([255, 0, 0]));
            img.put_pixel(x, 1, image::Rgb([0, 0, 255]));
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn forced_rgba_has_four_bytes_per_pixel() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rgb_fixture(dir.path());
        let options = LoadOptions {
            flip_vertically: false,
            forced_channels: Some(4),
        };
        let buf = load_image(&path, options).unwrap();
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.channels(), 4);
        assert_eq!(buf.data().len(), 3 * 2 * 4);
    }

    #[test]
    fn native_channel_count_kept_without_forcing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rgb_fixture(dir.path());
        let buf = load_image(&path, LoadOptions::default()).unwrap();
        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.data().len(), 3 * 2 * 3);
    }

    #[test]
    fn flip_puts_bottom_row_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rgb_fixture(dir.path());
        let upright = load_image(&path, LoadOptions::default()).unwrap();
        assert_eq!(&upright.data()[..3], &[255, 0, 0]);

        let flipped = load_image(
            &path,
            LoadOptions {
                flip_vertically: true,
                forced_channels: None,
            },
        )
        .unwrap();
        assert_eq!(&flipped.data()[..3], &[0, 0, 255]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(dir.path().join("nope.png"), LoadOptions::texture()).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(load_image(&path, LoadOptions::texture()).is_err());
    }

    #[test]
    fn invalid_forced_channels_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rgb_fixture(dir.path());
        let err = load_image(
            &path,
            LoadOptions {
                flip_vertically: false,
                forced_channels: Some(5),
            },
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedChannels(5)));
    }

    #[test]
    fn pixel_buffer_checks_length() {
        assert!(PixelBuffer::new(2, 2, 4, vec![0; 16]).is_ok());
        let err = PixelBuffer::new(2, 2, 4, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            AssetError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn rgba_expansion() {
        let gray = PixelBuffer::new(1, 1, 1, vec![7]).unwrap();
        assert_eq!(gray.to_rgba8().data(), &[7, 7, 7, 255]);
        let rgb = PixelBuffer::new(1, 1, 3, vec![1, 2, 3]).unwrap();
        assert_eq!(rgb.to_rgba8().data(), &[1, 2, 3, 255]);
    }

    #[test]
    fn mip_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(640, 480), 10);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn mip_chain_keeps_base_dimensions() {
        let base = placeholder_checkerboard(16, 4);
        let chain = mip_chain(&base);
        assert_eq!(chain.len(), 5);
        assert_eq!(chain[0].width(), 16);
        assert_eq!(chain[0].height(), 16);
        assert_eq!(chain[0], base);
        let last = chain.last().unwrap();
        assert_eq!((last.width(), last.height()), (1, 1));
    }

    #[test]
    fn mip_chain_non_square() {
        let base = PixelBuffer::new(8, 2, 4, vec![128; 8 * 2 * 4]).unwrap();
        let dims: Vec<(u32, u32)> = mip_chain(&base)
            .iter()
            .map(|l| (l.width(), l.height()))
            .collect();
        assert_eq!(dims, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn checkerboard_alternates() {
        let board = placeholder_checkerboard(4, 2);
        assert_eq!(board.data().len(), 4 * 4 * 4);
        assert_eq!(&board.data()[..4], &[255, 0, 255, 255]);
        // Pixel (2, 0) is in the next cell.
        assert_eq!(&board.data()[8..12], &[0, 0, 0, 255]);
    }
}
