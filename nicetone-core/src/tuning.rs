//! # Musical Tuning Module
//!
//! Static chromatic reference data and target-note helpers for the
//! classifier: the folding anchor octave with both sharp and flat
//! spellings, the reference-relative name table, target-note frequency
//! resolution, gauge display bounds and cent deviation.
//!
//! The two name tables are deliberately anchored differently: the
//! chromatic table starts at C (it is a folding anchor for absolute
//! names), while the relative table starts at the reference pitch
//! class A. Keep them separate.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// One of the 12 equal-tempered pitch classes, with both spellings and
/// its frequency in the folding octave.
#[derive(Debug, Clone, Copy)]
pub struct PitchClass {
    /// Sharp spelling, e.g. "C♯".
    pub sharp: &'static str,
    /// Flat spelling, e.g. "D♭".
    pub flat: &'static str,
    /// Frequency in the folding anchor octave, Hz.
    pub frequency: f64,
}

/// The folding anchor octave: C (~16.35 Hz) up to B (~30.87 Hz).
/// Frequencies are strictly increasing and index 0 is C; absolute
/// frequency magnitude is recovered separately via the octave count.
pub const CHROMATIC_TABLE: [PitchClass; 12] = [
    PitchClass { sharp: "C", flat: "C", frequency: 16.35 },
    PitchClass { sharp: "C♯", flat: "D♭", frequency: 17.32 },
    PitchClass { sharp: "D", flat: "D", frequency: 18.35 },
    PitchClass { sharp: "D♯", flat: "E♭", frequency: 19.45 },
    PitchClass { sharp: "E", flat: "E", frequency: 20.60 },
    PitchClass { sharp: "F", flat: "F", frequency: 21.83 },
    PitchClass { sharp: "F♯", flat: "G♭", frequency: 23.12 },
    PitchClass { sharp: "G", flat: "G", frequency: 24.50 },
    PitchClass { sharp: "G♯", flat: "A♭", frequency: 25.96 },
    PitchClass { sharp: "A", flat: "A", frequency: 27.50 },
    PitchClass { sharp: "A♯", flat: "B♭", frequency: 29.14 },
    PitchClass { sharp: "B", flat: "B", frequency: 30.87 },
];

/// Note names anchored at the reference pitch class (A), used for
/// reference-relative naming.
pub const RELATIVE_NOTE_NAMES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// C-anchored ASCII pitch-class names, used for base-note naming and
/// target-note selection.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Canonical frequencies for the 12 selectable target notes, in the
/// one octave the target picker covers (C=261 Hz ... B=493 Hz).
pub const TARGET_FREQUENCIES: [f64; 12] = [
    261.0, 277.0, 293.0, 311.0, 329.0, 349.0, 370.0, 392.0, 415.0, 440.0, 466.0, 493.0,
];

/// Static map for target note name to frequency lookups.
static TARGET_MAP: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    NOTE_NAMES.iter().copied().zip(TARGET_FREQUENCIES).collect()
});

/// Strict lookup of a target note's canonical frequency.
///
/// # Returns
/// * `Some(frequency)` - the note is one of the 12 selectable names
/// * `None` - unknown note name
pub fn lookup_note_frequency(name: &str) -> Option<f64> {
    TARGET_MAP.get(name).copied()
}

/// Canonical frequency for a target note name.
///
/// Unknown names fall back to A = 440.0 Hz; the selection set is fixed,
/// so an unknown name can only come from an out-of-band caller. Use
/// [`lookup_note_frequency`] when the miss itself matters.
pub fn note_frequency(name: &str) -> f64 {
    lookup_note_frequency(name).unwrap_or(440.0)
}

/// Gauge display bounds an octave either side of the display frequency.
///
/// Both bounds are truncated to whole Hz before the halving/doubling:
/// `(trunc(f / 2), trunc(f) * 2)`.
pub fn gauge_bounds(display_hz: f64) -> (f64, f64) {
    ((display_hz / 2.0).trunc(), display_hz.trunc() * 2.0)
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where 100 cents is
/// one semitone and 1200 cents is one octave. Positive values indicate
/// sharpness, negative values flatness.
pub fn cents_deviation(freq: f64, target_freq: f64) -> f64 {
    1200.0 * (freq / target_freq).log2()
}
