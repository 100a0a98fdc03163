//! Extraction of the unaltered color image and the depth map from the EDOF
//! containers written by Huawei phones (P9, P10, P20, P30, Mate20) in bokeh mode.
//!
//! Such a file is a chain of complete JPEG streams separated by vendor padding,
//! followed by a fixed-layout depth record:
//! - [`scan_segment`] finds one JPEG stream, resynchronizing over small padding.
//! - [`extract_depth`] locates the depth record and materializes it as a
//!   [`DepthMap`] (inverted, oriented grayscale).
//! - [`Decoder`] runs both over a whole buffer and returns an [`Extraction`]
//!   without touching the filesystem; [`Encoder`] writes its artifacts.
//!
//! The recovered pair (`<name>-1.JPG`, `<name>-1_depth.png`) can be uploaded
//! as-is to services that build 3D photos from an image and its depth map.
//! See the `edof-extract` CLI for batch use.

mod config;
mod decoder;
mod depth;
mod encoder;
mod error;
mod reader;
mod scanner;
mod types;

pub use config::{DEFAULT_DRIFT_TOLERANCE, DEFAULT_PREAMBLE_LEN, ScanConfig};
pub use decoder::{Decoder, Extraction, PRIMARY_SEGMENT};
pub use depth::{decode_samples, extract_depth, has_depth_signature, locate_record};
pub use encoder::{Encoder, OutputLayout, encode_png};
pub use error::{Error, Result};
pub use scanner::{ScanOutcome, scan_segment};
pub use types::*;
