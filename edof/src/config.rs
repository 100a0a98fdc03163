/// Largest forward distance, in bytes, the scanner will jump to reach a start marker.
///
/// Vendor padding between segments measured 1208 bytes on P10/P20/Mate20 and
/// 11692 bytes on P30 captures.
pub const DEFAULT_DRIFT_TOLERANCE: usize = 15_000;

/// Bytes between the depth record header base and the first depth sample.
pub const DEFAULT_PREAMBLE_LEN: usize = 68;

/// Tunables for the device-family specific parts of the container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub drift_tolerance: usize,
    pub preamble_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            drift_tolerance: DEFAULT_DRIFT_TOLERANCE,
            preamble_len: DEFAULT_PREAMBLE_LEN,
        }
    }
}

impl ScanConfig {
    pub fn with_drift_tolerance(mut self, bytes: usize) -> Self {
        self.drift_tolerance = bytes;
        self
    }

    pub fn with_preamble_len(mut self, bytes: usize) -> Self {
        self.preamble_len = bytes;
        self
    }
}
