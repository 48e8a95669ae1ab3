//! Result values built from recognition events.

use capture_engine::ScanEvent;

/// One recognized barcode, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Decoded payload; empty when the engine reported none.
    pub raw_data: String,
    /// Human-readable format name.
    pub format_label: String,
}

impl ScanResult {
    /// Builds a result from the first entry of a recognition batch.
    ///
    /// First wins; the rest of the frame's batch is discarded. Returns `None`
    /// for an empty batch.
    pub fn from_event(event: &ScanEvent) -> Option<Self> {
        let first = event.batch.first()?;
        Some(Self {
            raw_data: first.data.clone().unwrap_or_default(),
            format_label: first.symbology.readable_name().to_string(),
        })
    }

    /// The two-line display string handed to the result sink.
    pub fn formatted(&self) -> String {
        format!("Scanned: {}\n({})", self.raw_data, self.format_label)
    }
}
