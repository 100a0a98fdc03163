use std::{fs, io, path::Path};

use bytes::Bytes;
use tracing::debug;

use crate::config::ScanConfig;
use crate::depth::{extract_depth, has_depth_signature};
use crate::error::{Error, Result};
use crate::scanner::{ScanOutcome, scan_segment};
use crate::types::{DepthMap, DepthRecord, JPEG_SIGNATURE, Segment};

/// Index of the segment holding the unaltered color image.
pub const PRIMARY_SEGMENT: usize = 1;

/// Parses EDOF containers into their segments and depth map. Performs no writes.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: ScanConfig,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Read `path` into memory and decode it.
    pub fn decode_file(&self, path: &Path) -> Result<Extraction> {
        let data = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        self.decode(data)
    }

    pub fn decode(&self, data: impl Into<Bytes>) -> Result<Extraction> {
        let source: Bytes = data.into();

        if !source.starts_with(&JPEG_SIGNATURE) {
            return Err(Error::NotAJpeg);
        }
        if !has_depth_signature(&source) {
            return Err(Error::NoDepthHeader);
        }

        let (segments, cursor) = self.scan_segments(&source)?;
        if segments.len() <= PRIMARY_SEGMENT {
            return Err(Error::InsufficientSegments {
                found: segments.len(),
            });
        }

        let (record, depth) = extract_depth(&source, cursor, &self.config)?;
        Ok(Extraction {
            source,
            segments,
            record,
            depth,
        })
    }

    /// Scan consecutive segments from the start of `data`.
    ///
    /// Returns the segments and the offset just past the last one, where the
    /// depth record is expected.
    pub fn scan_segments(&self, data: &[u8]) -> Result<(Vec<Segment>, usize)> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        loop {
            match scan_segment(data, cursor, segments.len(), &self.config) {
                ScanOutcome::Found(segment) => {
                    cursor = segment.end;
                    segments.push(segment);
                }
                ScanOutcome::NotFound { offset } => {
                    debug!(count = segments.len(), offset, "segment scan finished");
                    return Ok((segments, cursor));
                }
                ScanOutcome::Unterminated { start } => {
                    return Err(Error::UnterminatedSegment {
                        index: segments.len(),
                        start,
                    });
                }
            }
        }
    }
}

/// Everything recovered from one container.
#[derive(Debug, Clone)]
pub struct Extraction {
    source: Bytes,
    segments: Vec<Segment>,
    record: DepthRecord,
    depth: DepthMap,
}

impl Extraction {
    /// All segments in discovery order; always at least two.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Verbatim bytes of segment `index`, terminator included.
    pub fn segment_bytes(&self, index: usize) -> Option<Bytes> {
        self.segments
            .get(index)
            .map(|segment| self.source.slice(segment.range()))
    }

    /// Verbatim bytes of the unaltered color image.
    pub fn primary(&self) -> Bytes {
        self.source.slice(self.segments[PRIMARY_SEGMENT].range())
    }

    pub fn depth_record(&self) -> &DepthRecord {
        &self.record
    }

    pub fn depth_map(&self) -> &DepthMap {
        &self.depth
    }
}
