use std::{
    ffi::{OsStr, OsString},
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use image::ImageFormat;
use tracing::{info, warn};

use crate::decoder::{Extraction, PRIMARY_SEGMENT};
use crate::error::Result;
use crate::types::DepthMap;

/// Output file naming derived from an input path.
///
/// `IMG_1234.jpg` yields `IMG_1234-1.JPG` for the primary image and
/// `IMG_1234-1_depth.png` for the depth map, next to the input unless an
/// output directory is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
    stem: OsString,
}

impl OutputLayout {
    pub fn for_input(input: &Path, out_dir: Option<&Path>) -> Self {
        let dir = out_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let stem = input
            .file_stem()
            .unwrap_or_else(|| OsStr::new("image"))
            .to_os_string();
        Self { dir, stem }
    }

    /// `<stem>-<index>.JPG`
    pub fn segment(&self, index: usize) -> PathBuf {
        self.with_suffix(&format!("-{index}.JPG"))
    }

    /// `<stem>-1_depth.png`
    pub fn depth(&self) -> PathBuf {
        self.with_suffix(&format!("-{PRIMARY_SEGMENT}_depth.png"))
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut filename = self.stem.clone();
        filename.push(suffix);
        self.dir.join(filename)
    }
}

/// Writes the artifacts of an [`Extraction`] to disk.
#[derive(Debug, Clone)]
pub struct Encoder {
    layout: OutputLayout,
    all_segments: bool,
}

impl Encoder {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            all_segments: false,
        }
    }

    /// Also write every non-primary segment as `<stem>-<index>.JPG`.
    pub fn with_all_segments(mut self, enabled: bool) -> Self {
        self.all_segments = enabled;
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Write the primary image, the depth map, and optionally the other
    /// segments. Returns the written paths in order.
    ///
    /// All-or-nothing: when any write fails, files already written by this
    /// call are removed before the error is returned.
    pub fn write(&self, extraction: &Extraction) -> Result<Vec<PathBuf>> {
        let mut outputs = vec![
            (self.layout.segment(PRIMARY_SEGMENT), extraction.primary()),
            (self.layout.depth(), encode_png(extraction.depth_map())?),
        ];
        if self.all_segments {
            outputs.extend(
                extraction
                    .segments()
                    .iter()
                    .filter(|segment| segment.index != PRIMARY_SEGMENT)
                    .filter_map(|segment| {
                        let bytes = extraction.segment_bytes(segment.index)?;
                        Some((self.layout.segment(segment.index), bytes))
                    }),
            );
        }

        let mut written = Vec::with_capacity(outputs.len());
        for (path, bytes) in outputs {
            info!(path = %path.display(), "saving");
            if let Err(err) = fs::write(&path, &bytes) {
                discard(&written);
                return Err(err.into());
            }
            written.push(path);
        }
        Ok(written)
    }
}

/// Encode the depth map as an 8-bit grayscale PNG.
pub fn encode_png(map: &DepthMap) -> Result<Bytes> {
    let mut buf = Cursor::new(Vec::new());
    map.as_image().write_to(&mut buf, ImageFormat::Png)?;
    Ok(Bytes::from(buf.into_inner()))
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = fs::remove_file(path) {
            warn!(path = %path.display(), %err, "failed to remove partial output");
        }
    }
}
