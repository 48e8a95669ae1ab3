//! Barcode symbology model: formats, per-format constraints, ordered sets.

use serde::{Deserialize, Serialize};

/// A barcode encoding standard the engine can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Symbology {
    Ean13UpcA,
    Ean8,
    UpcE,
    Qr,
    DataMatrix,
    Code39,
    Code128,
    InterleavedTwoOfFive,
    Pdf417,
}

impl Symbology {
    /// Human-readable name used in result labels.
    pub fn readable_name(&self) -> &'static str {
        match self {
            Symbology::Ean13UpcA => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::UpcE => "UPC-E",
            Symbology::Qr => "QR Code",
            Symbology::DataMatrix => "Data Matrix",
            Symbology::Code39 => "Code 39",
            Symbology::Code128 => "Code 128",
            Symbology::InterleavedTwoOfFive => "Interleaved 2 of 5",
            Symbology::Pdf417 => "PDF417",
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.readable_name())
    }
}

/// Per-symbology recognition constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbologySettings {
    pub symbology: Symbology,
    /// Accepted symbol lengths, when the format needs narrowing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_symbol_counts: Option<Vec<u32>>,
}

impl SymbologySettings {
    fn plain(symbology: Symbology) -> Self {
        Self {
            symbology,
            active_symbol_counts: None,
        }
    }
}

/// Ordered, deduplicated set of enabled symbologies.
///
/// Insertion order is preserved; enabling a symbology twice keeps the first
/// entry and its constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbologySet {
    entries: Vec<SymbologySettings>,
}

impl SymbologySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset A: the retail deployment (EAN/UPC family, QR, Data Matrix,
    /// Code 39 restricted to 7..=20 symbols, Code 128, Interleaved 2 of 5).
    pub fn retail() -> Self {
        let mut set = Self::new();
        set.enable(Symbology::Ean13UpcA);
        set.enable(Symbology::Ean8);
        set.enable(Symbology::UpcE);
        set.enable(Symbology::Qr);
        set.enable(Symbology::DataMatrix);
        set.enable(Symbology::Code39);
        set.set_active_symbol_counts(Symbology::Code39, (7..=20).collect());
        set.enable(Symbology::Code128);
        set.enable(Symbology::InterleavedTwoOfFive);
        set
    }

    /// Preset B: the document deployment (QR, PDF417).
    pub fn documents() -> Self {
        let mut set = Self::new();
        set.enable(Symbology::Qr);
        set.enable(Symbology::Pdf417);
        set
    }

    /// Enables a symbology with no constraints. Re-enabling is a no-op.
    pub fn enable(&mut self, symbology: Symbology) {
        if !self.contains(symbology) {
            self.entries.push(SymbologySettings::plain(symbology));
        }
    }

    /// Restricts an enabled symbology to the given symbol lengths.
    ///
    /// Enables the symbology first if it was not already in the set.
    pub fn set_active_symbol_counts(&mut self, symbology: Symbology, counts: Vec<u32>) {
        self.enable(symbology);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.symbology == symbology) {
            entry.active_symbol_counts = Some(counts);
        }
    }

    pub fn contains(&self, symbology: Symbology) -> bool {
        self.entries.iter().any(|e| e.symbology == symbology)
    }

    pub fn settings_for(&self, symbology: Symbology) -> Option<&SymbologySettings> {
        self.entries.iter().find(|e| e.symbology == symbology)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbologySettings> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retail_preset_keeps_declaration_order() {
        let set = SymbologySet::retail();
        let order: Vec<Symbology> = set.iter().map(|e| e.symbology).collect();
        assert_eq!(
            order,
            vec![
                Symbology::Ean13UpcA,
                Symbology::Ean8,
                Symbology::UpcE,
                Symbology::Qr,
                Symbology::DataMatrix,
                Symbology::Code39,
                Symbology::Code128,
                Symbology::InterleavedTwoOfFive,
            ]
        );
    }

    #[test]
    fn retail_preset_restricts_code39_symbol_counts() {
        let set = SymbologySet::retail();
        let code39 = set.settings_for(Symbology::Code39).unwrap();
        let counts = code39.active_symbol_counts.as_ref().unwrap();
        assert_eq!(counts.first(), Some(&7));
        assert_eq!(counts.last(), Some(&20));
        assert_eq!(counts.len(), 14);
    }

    #[test]
    fn documents_preset_is_qr_and_pdf417() {
        let set = SymbologySet::documents();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Symbology::Qr));
        assert!(set.contains(Symbology::Pdf417));
    }

    #[test]
    fn re_enabling_keeps_first_entry_and_constraints() {
        let mut set = SymbologySet::new();
        set.set_active_symbol_counts(Symbology::Code39, vec![7, 8]);
        set.enable(Symbology::Code39);
        assert_eq!(set.len(), 1);
        let entry = set.settings_for(Symbology::Code39).unwrap();
        assert_eq!(entry.active_symbol_counts, Some(vec![7, 8]));
    }

    #[test]
    fn preset_round_trips_through_json() {
        let set = SymbologySet::retail();
        let json = serde_json::to_string(&set).unwrap();
        let restored: SymbologySet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, set);
    }
}
