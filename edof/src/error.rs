use std::path::PathBuf;

use thiserror::Error;

/// Error produced while extracting the primary image and depth map from an EDOF container.
#[derive(Debug, Error)]
pub enum Error {
    /// The input path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The buffer does not start with the `FF D8 FF` start-of-image signature.
    #[error("no JPEG header found")]
    NotAJpeg,

    /// The EDOF signature occurs nowhere in the buffer; not a bokeh-mode capture.
    #[error("no EDOF header found, use a bokeh mode image")]
    NoDepthHeader,

    /// Fewer than two image segments were found before the scan stopped.
    #[error("found {found} image segment(s), need at least 2")]
    InsufficientSegments { found: usize },

    /// The record located at `offset` does not carry the `edof` tag.
    #[error("frame at offset {offset} is not an EDOF frame")]
    NotEdofFrame { offset: usize },

    /// A depth record field or its sample data extends past the end of the buffer.
    #[error("depth record truncated: {needed} bytes needed at offset {offset}, {available} available")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A segment's marker walk reached the end of the buffer without an end-of-scan marker.
    #[error("segment {index} starting at offset {start} has no end-of-scan marker")]
    UnterminatedSegment { index: usize, start: usize },

    /// The depth record declares a zero-sized raster.
    #[error("invalid depth map geometry {columns}x{rows}")]
    InvalidGeometry { columns: u16, rows: u16 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn truncated(offset: usize, needed: usize, len: usize) -> Self {
        Self::TruncatedRecord {
            offset,
            needed,
            available: len.saturating_sub(offset),
        }
    }

    /// Whether the error means the input is not a usable bokeh capture, as opposed to an I/O fault.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Image(_) | Self::FileNotFound(_))
    }
}
