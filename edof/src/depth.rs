//! Depth record location and decoding.

use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::types::{DepthMap, DepthRecord, EDOF_SIGNATURE, EDOF_TAG};

/// Distance from the record start to its signature.
const SIGNATURE_OFFSET: usize = 3;
/// Distance from the record start to the tag.
const TAG_OFFSET: usize = 4;
/// Distance from the record start to the header base all fields are relative to.
const HEADER_OFFSET: usize = 8;

const ORIENTATION_FIELD: usize = 7;
const COLUMNS_FIELD: usize = 16;
const ROWS_FIELD: usize = 18;

/// Whether the EDOF signature occurs anywhere in `data`.
pub fn has_depth_signature(data: &[u8]) -> bool {
    Reader::new(data).find(&EDOF_SIGNATURE, 0).is_some()
}

/// Locate and parse the depth record header expected at `offset`.
///
/// When the signature sits elsewhere in the buffer, the record is taken to
/// start three bytes before it.
pub fn locate_record(data: &[u8], offset: usize, config: &ScanConfig) -> Result<DepthRecord> {
    let reader = Reader::new(data);

    let offset = match reader
        .find(&EDOF_SIGNATURE, 0)
        .and_then(|pos| pos.checked_sub(SIGNATURE_OFFSET))
    {
        Some(found) if found != offset => {
            debug!(expected = offset, found, "corrected depth record drift");
            found
        }
        _ => offset,
    };

    let tag_at = offset.saturating_add(TAG_OFFSET);
    if !reader.starts_with_at(tag_at, EDOF_TAG) {
        return Err(Error::NotEdofFrame { offset });
    }

    let header = offset + HEADER_OFFSET;
    let orientation_code = reader
        .u8_at(header + ORIENTATION_FIELD)
        .ok_or_else(|| Error::truncated(header, ORIENTATION_FIELD + 1, reader.len()))?;
    let columns = reader
        .u16_le_at(header + COLUMNS_FIELD)
        .ok_or_else(|| Error::truncated(header, COLUMNS_FIELD + 2, reader.len()))?;
    let rows = reader
        .u16_le_at(header + ROWS_FIELD)
        .ok_or_else(|| Error::truncated(header, ROWS_FIELD + 2, reader.len()))?;

    let record = DepthRecord {
        offset,
        columns,
        rows,
        orientation_code,
        samples_offset: header.saturating_add(config.preamble_len),
    };
    info!(
        offset = header,
        columns,
        rows,
        orientation = record.orientation().as_str(),
        "found EDOF record"
    );
    Ok(record)
}

/// Locate the depth record near `offset` and materialize its raster.
pub fn extract_depth(
    data: &[u8],
    offset: usize,
    config: &ScanConfig,
) -> Result<(DepthRecord, DepthMap)> {
    let record = locate_record(data, offset, config)?;
    let map = decode_samples(data, &record)?;
    Ok((record, map))
}

/// Decode the record's samples: invert, then orient.
pub fn decode_samples(data: &[u8], record: &DepthRecord) -> Result<DepthMap> {
    if record.columns == 0 || record.rows == 0 {
        return Err(Error::InvalidGeometry {
            columns: record.columns,
            rows: record.rows,
        });
    }

    let reader = Reader::new(data);
    let needed = record.sample_count();
    let samples = reader
        .slice(record.samples_offset, needed)
        .ok_or_else(|| Error::truncated(record.samples_offset, needed, reader.len()))?;

    DepthMap::from_samples(record.columns, record.rows, samples, record.orientation()).ok_or(
        Error::InvalidGeometry {
            columns: record.columns,
            rows: record.rows,
        },
    )
}
