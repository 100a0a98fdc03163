use std::ops::Range;

use image::{GrayImage, imageops};

/// Start-of-image marker that opens every embedded segment.
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// End-of-image marker that terminates a segment's entropy-coded data.
pub const EOI: [u8; 2] = [0xFF, 0xD9];
/// Leading bytes every accepted container must start with.
pub const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];
/// Signature of the depth record, found three bytes into the record.
pub const EDOF_SIGNATURE: [u8; 6] = [0x00, b'e', b'd', b'o', b'f', 0x00];
/// Tag checked at bytes 4..8 of the depth record.
pub const EDOF_TAG: &[u8; 4] = b"edof";

/// A marker-delimited image embedded in the container, as a half-open byte range.
///
/// `end` points one byte past the end-of-scan marker, so `start..end` is the
/// complete JPEG stream including both SOI and EOI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How the sensor stored the depth samples relative to the color image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Identity,
    FlipVertical,
    FlipHorizontal,
    Transpose,
}

impl Orientation {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x10 => Self::FlipVertical,
            0x12 => Self::FlipHorizontal,
            0x13 => Self::Transpose,
            _ => Self::Identity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::FlipVertical => "flip top-bottom",
            Self::FlipHorizontal => "flip left-right",
            Self::Transpose => "transpose",
        }
    }

    /// Apply the transform. Transpose swaps width and height.
    pub fn apply(&self, img: GrayImage) -> GrayImage {
        match self {
            Self::Identity => img,
            Self::FlipVertical => imageops::flip_vertical(&img),
            Self::FlipHorizontal => imageops::flip_horizontal(&img),
            Self::Transpose => {
                let (w, h) = img.dimensions();
                GrayImage::from_fn(h, w, |x, y| *img.get_pixel(y, x))
            }
        }
    }
}

/// Header of the depth record as found in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRecord {
    /// Start of the record (three bytes before the signature).
    pub offset: usize,
    pub columns: u16,
    pub rows: u16,
    /// Raw orientation byte; see [`Orientation::from_code`].
    pub orientation_code: u8,
    /// Offset of the first depth sample.
    pub samples_offset: usize,
}

impl DepthRecord {
    pub fn orientation(&self) -> Orientation {
        Orientation::from_code(self.orientation_code)
    }

    pub fn sample_count(&self) -> usize {
        usize::from(self.columns) * usize::from(self.rows)
    }
}

/// Decoded single-channel depth raster: inverted and oriented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthMap {
    image: GrayImage,
}

impl DepthMap {
    /// Build the raster from raw row-major samples (`columns * rows` bytes).
    ///
    /// Returns `None` when `samples` does not match the geometry.
    pub fn from_samples(
        columns: u16,
        rows: u16,
        samples: &[u8],
        orientation: Orientation,
    ) -> Option<Self> {
        let mut image = GrayImage::from_raw(columns.into(), rows.into(), samples.to_vec())?;
        imageops::invert(&mut image);
        Some(Self {
            image: orientation.apply(image),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.image.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    /// Row-major sample bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}
