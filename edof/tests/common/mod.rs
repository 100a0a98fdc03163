//! Synthetic EDOF container construction for integration tests.

#![allow(dead_code)]

use std::ops::Range;

use edof::{EDOF_SIGNATURE, EOI, SOI};

/// Byte layout of a built container.
pub struct Container {
    pub data: Vec<u8>,
    pub segments: Vec<Range<usize>>,
    pub record: Option<usize>,
}

impl Container {
    pub fn segment(&self, index: usize) -> &[u8] {
        &self.data[self.segments[index].clone()]
    }
}

#[derive(Default)]
pub struct ContainerBuilder {
    data: Vec<u8>,
    segments: Vec<Range<usize>>,
    record: Option<usize>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a complete JPEG stream whose APP1 payload carries an embedded
    /// thumbnail, and whose scan data holds stuffed bytes and restart markers.
    pub fn segment(mut self, fill: u8) -> Self {
        let start = self.data.len();
        let mut s = SOI.to_vec();

        let mut exif = b"Exif\0\0".to_vec();
        exif.extend_from_slice(&SOI);
        exif.extend_from_slice(&[fill; 6]);
        exif.extend_from_slice(&EOI);
        push_marker_segment(&mut s, 0xE1, &exif);

        push_marker_segment(&mut s, 0xDB, &[0x00; 65]);
        push_marker_segment(&mut s, 0xC0, &[0x08, 0x00, 0x10, 0x00, 0x10, 0x01, 0x01, 0x11, 0x00]);
        push_marker_segment(&mut s, 0xDA, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        for i in 0..32u8 {
            s.push(fill.wrapping_add(i) & 0x7F);
            if i % 8 == 0 {
                s.extend_from_slice(&[0xFF, 0x00]);
            }
            if i % 11 == 0 {
                s.extend_from_slice(&[0xFF, 0xD0 + (i % 8)]);
            }
        }
        s.extend_from_slice(&EOI);

        self.data.extend_from_slice(&s);
        self.segments.push(start..self.data.len());
        self
    }

    pub fn padding(mut self, len: usize) -> Self {
        self.data.resize(self.data.len() + len, 0x00);
        self
    }

    /// Append a depth record with `columns * rows` raw samples.
    pub fn depth_record(mut self, columns: u16, rows: u16, orientation: u8, samples: &[u8]) -> Self {
        assert_eq!(samples.len(), usize::from(columns) * usize::from(rows));
        self.record = Some(self.data.len());

        self.data.extend_from_slice(&[0x01, 0x00, 0x00]);
        self.data.extend_from_slice(&EDOF_SIGNATURE);
        // header base is the signature's last byte
        let mut header = [0u8; 68];
        header[7] = orientation;
        header[16..18].copy_from_slice(&columns.to_le_bytes());
        header[18..20].copy_from_slice(&rows.to_le_bytes());
        self.data.extend_from_slice(&header[1..]);
        self.data.extend_from_slice(samples);
        self
    }

    pub fn build(self) -> Container {
        Container {
            data: self.data,
            segments: self.segments,
            record: self.record,
        }
    }
}

fn push_marker_segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
    let len = u16::try_from(payload.len() + 2).expect("payload fits a marker segment");
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
}

/// Deterministic raw samples that never form a start marker.
pub fn raw_samples(columns: u16, rows: u16) -> Vec<u8> {
    (0..usize::from(columns) * usize::from(rows))
        .map(|i| ((i * 37 + 11) % 200) as u8)
        .collect()
}

/// A typical three-segment capture: original, primary, and a trailing segment.
pub fn bokeh_capture(columns: u16, rows: u16, orientation: u8) -> Container {
    ContainerBuilder::new()
        .segment(0x10)
        .padding(1208)
        .segment(0x20)
        .padding(1208)
        .segment(0x30)
        .padding(64)
        .depth_record(columns, rows, orientation, &raw_samples(columns, rows))
        .build()
}
