// nicetone-core/src/lib.rs

//! The core logic for the NiceTone pitch classifier.
//! This crate turns (frequency, amplitude) samples from an external
//! pitch tracker into musical note classifications. It is completely
//! headless and contains no audio I/O or rendering code.

pub mod classify;
pub mod session;
pub mod tuning;

use serde::{Deserialize, Serialize};

/// A single (pitch, amplitude) reading from the external pitch tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchSample {
    /// Detected fundamental frequency in Hz.
    pub frequency: f64,
    /// Amplitude in the tracker's unit, where 0.1 is the silence threshold.
    pub amplitude: f64,
}

/// The latest classification result, replaced wholesale on every
/// accepted sample and left untouched on rejected ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSnapshot {
    /// The raw pitch that produced this classification, in Hz.
    pub pitch: f64,
    /// The amplitude of that sample.
    pub amplitude: f64,
    /// Absolute note name spelled with sharps, e.g. "A♯4".
    pub note_name_sharp: String,
    /// Absolute note name spelled with flats, e.g. "B♭4".
    pub note_name_flat: String,
    /// Note name relative to the adjustable reference frequency, e.g. "A#4".
    pub relative_note_name: String,
    /// Pitch-class name from the fixed 440 Hz anchor, no octave digit.
    pub base_note_name: String,
}

impl Default for ClassificationSnapshot {
    /// Placeholder values shown before the first sample is accepted.
    fn default() -> Self {
        Self {
            pitch: 0.0,
            amplitude: 0.0,
            note_name_sharp: "-".to_string(),
            note_name_flat: "-".to_string(),
            relative_note_name: "...".to_string(),
            base_note_name: "...".to_string(),
        }
    }
}
