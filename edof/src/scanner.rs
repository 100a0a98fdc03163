//! Segment boundary detection.
//!
//! A segment opens with `FF D8` and runs until the first `FF D9` inside the
//! entropy-coded data that follows the start-of-scan marker. Marker segments
//! before the scan are skipped by their length prefix, so `FF D9` bytes inside
//! EXIF thumbnails or other payloads never end the walk early.

use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::reader::Reader;
use crate::types::{EOI, SOI, Segment};

const MARKER: u8 = 0xFF;
const SOS: u8 = 0xDA;

/// Result of scanning for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(Segment),
    /// No start marker at `offset`, even after drift correction.
    NotFound { offset: usize },
    /// A start marker was confirmed at `start`, but the buffer ended before the terminator.
    Unterminated { start: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerClass {
    /// `FF D8` / `FF D9` outside scan data; carries no payload.
    Standalone,
    StartOfScan,
    /// Length field value, which counts its own two bytes.
    LengthPrefixed(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    ScanningMarkers(usize),
    InEntropyData(usize),
    Done(usize),
    Failed,
}

/// Scan for the segment starting at (or shortly after) `offset`.
///
/// Never reads outside `data`; a walk that runs out of bytes is reported as
/// [`ScanOutcome::Unterminated`].
pub fn scan_segment(data: &[u8], offset: usize, index: usize, config: &ScanConfig) -> ScanOutcome {
    let reader = Reader::new(data);
    let start = resync(reader, offset, config.drift_tolerance);

    if !reader.starts_with_at(start, &SOI) {
        debug!(index, offset = start, "no segment start marker");
        return ScanOutcome::NotFound { offset: start };
    }

    match walk(reader, start) {
        Some(end) => {
            debug!(index, start, end, len = end - start, "found segment");
            ScanOutcome::Found(Segment { index, start, end })
        }
        None => ScanOutcome::Unterminated { start },
    }
}

/// Jump forward to the next start marker when it is close enough to be vendor padding.
fn resync(reader: Reader<'_>, offset: usize, tolerance: usize) -> usize {
    match reader.find(&SOI, offset) {
        Some(found) if found - offset < tolerance => {
            if found != offset {
                debug!(expected = offset, found, drift = found - offset, "corrected segment drift");
            }
            found
        }
        Some(found) => {
            warn!(
                expected = offset,
                found,
                drift = found - offset,
                tolerance,
                "start marker beyond drift tolerance, not resynchronizing"
            );
            offset
        }
        None => offset,
    }
}

fn classify(reader: Reader<'_>, marker_pos: usize) -> Option<MarkerClass> {
    match reader.u8_at(marker_pos + 1)? {
        0xD8 | 0xD9 => Some(MarkerClass::Standalone),
        SOS => Some(MarkerClass::StartOfScan),
        _ => reader
            .u16_be_at(marker_pos + 2)
            .map(MarkerClass::LengthPrefixed),
    }
}

/// Walk markers from just past the SOI at `start`; returns the exclusive segment end.
fn walk(reader: Reader<'_>, start: usize) -> Option<usize> {
    let mut state = WalkState::ScanningMarkers(start + SOI.len());
    loop {
        state = match state {
            WalkState::ScanningMarkers(pos) => match reader.find_byte(MARKER, pos) {
                Some(marker) => match classify(reader, marker) {
                    Some(MarkerClass::Standalone) => WalkState::ScanningMarkers(marker + 2),
                    Some(MarkerClass::StartOfScan) => WalkState::InEntropyData(marker + 2),
                    Some(MarkerClass::LengthPrefixed(len)) => {
                        WalkState::ScanningMarkers(marker + 2 + usize::from(len))
                    }
                    None => WalkState::Failed,
                },
                None => WalkState::Failed,
            },
            // Entropy-coded data may hold stuffed `FF 00` and restart markers;
            // only the exact terminator ends it.
            WalkState::InEntropyData(pos) => match reader.find(&EOI, pos) {
                Some(eoi) => WalkState::Done(eoi + EOI.len()),
                None => WalkState::Failed,
            },
            WalkState::Done(end) => return Some(end),
            WalkState::Failed => return None,
        };
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn segment() -> Vec<u8> {
        let mut s = SOI.to_vec();
        // APP0 "JFIF\0"
        s.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x07, b'J', b'F', b'I', b'F', 0x00]);
        // payload holding terminator bytes, skipped by length
        s.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x04, 0xFF, 0xD9]);
        s.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x03, 0x01]);
        s.extend_from_slice(&[0x12, 0xFF, 0x00, 0x34, 0xFF, 0xD0, 0x56]);
        s.extend_from_slice(&EOI);
        s
    }

    fn scan(data: &[u8], offset: usize) -> ScanOutcome {
        scan_segment(data, offset, 0, &ScanConfig::default())
    }

    #[test]
    fn finds_segment_end_after_terminator() {
        let seg = segment();
        let mut data = seg.clone();
        data.extend_from_slice(&[0xAA; 8]);

        assert_eq!(
            scan(&data, 0),
            ScanOutcome::Found(Segment {
                index: 0,
                start: 0,
                end: seg.len()
            })
        );
    }

    #[test]
    fn skips_duplicate_start_markers() {
        let mut data = SOI.to_vec();
        data.extend_from_slice(&SOI);
        data.extend_from_slice(&segment()[2..]);
        let len = data.len();

        assert!(matches!(scan(&data, 0), ScanOutcome::Found(s) if s.end == len));
    }

    #[test]
    fn missing_start_marker_is_not_found() {
        let data = [0x00u8; 32];
        assert_eq!(scan(&data, 4), ScanOutcome::NotFound { offset: 4 });
        assert_eq!(scan(&data, 64), ScanOutcome::NotFound { offset: 64 });
        assert_eq!(scan(&[], 0), ScanOutcome::NotFound { offset: 0 });
    }

    #[test]
    fn marker_at_buffer_end_is_unterminated() {
        let data = [0xFF, 0xD8, 0xFF];
        assert_eq!(scan(&data, 0), ScanOutcome::Unterminated { start: 0 });

        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0x00];
        assert_eq!(scan(&data, 0), ScanOutcome::Unterminated { start: 0 });
    }

    #[test]
    fn length_skip_past_end_is_unterminated() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0x40, 0x00, 0xFF, 0xD9];
        assert_eq!(scan(&data, 0), ScanOutcome::Unterminated { start: 0 });
    }

    #[test]
    fn custom_tolerance_limits_resync() {
        let mut data = vec![0u8; 100];
        data.extend_from_slice(&segment());
        let tight = ScanConfig::default().with_drift_tolerance(50);

        assert_eq!(
            scan_segment(&data, 0, 3, &tight),
            ScanOutcome::NotFound { offset: 0 }
        );
        assert!(matches!(
            scan_segment(&data, 0, 3, &ScanConfig::default()),
            ScanOutcome::Found(Segment { index: 3, start: 100, .. })
        ));
    }

    proptest! {
        #[test]
        fn small_drift_matches_direct_scan(drift in 1usize..15_000) {
            let mut data = vec![0u8; drift];
            data.extend_from_slice(&segment());

            let resynced = scan(&data, 0);
            prop_assert_eq!(resynced, scan(&data, drift));
            prop_assert!(
                matches!(resynced, ScanOutcome::Found(s) if s.start == drift),
                "expected a segment at {}",
                drift
            );
        }

        #[test]
        fn large_drift_is_not_followed(drift in 15_000usize..16_000) {
            let mut data = vec![0u8; drift];
            data.extend_from_slice(&segment());

            prop_assert_eq!(scan(&data, 0), ScanOutcome::NotFound { offset: 0 });
        }

        #[test]
        fn truncation_never_reads_past_end(cut in 0usize..31) {
            let seg = segment();
            let cut = cut.min(seg.len() - 1);
            let outcome = scan(&seg[..cut], 0);

            if cut < SOI.len() {
                prop_assert_eq!(outcome, ScanOutcome::NotFound { offset: 0 });
            } else {
                prop_assert_eq!(outcome, ScanOutcome::Unterminated { start: 0 });
            }
        }
    }
}
