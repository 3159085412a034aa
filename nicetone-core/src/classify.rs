//! # Pitch Classification Module
//!
//! Pure frequency-to-note computations: octave folding against the
//! chromatic anchor table, nearest-note matching, reference-relative
//! naming, base-note naming and the amplitude noise gate. Every
//! function here is O(12), allocation-light and side-effect free, so
//! it is safe to call inline on the audio dispatch path.

use crate::tuning::{CHROMATIC_TABLE, NOTE_NAMES, RELATIVE_NOTE_NAMES};

/// Samples at or below this amplitude are treated as room noise.
///
/// Suppresses classification churn from silence between notes.
pub const DEFAULT_AMPLITUDE_THRESHOLD: f64 = 0.1;

/// Returns true when the sample is loud enough to classify.
pub fn amplitude_open(amplitude: f64, threshold: f64) -> bool {
    amplitude > threshold
}

/// Folds a frequency into the chromatic anchor octave by repeated
/// halving/doubling.
///
/// Returns the folded frequency and the net number of halvings taken,
/// which doubles as the absolute octave number of the input (equal to
/// `log2(frequency / folded)`, exact because halving is exact in
/// binary floating point).
///
/// # Returns
/// * `Some((folded, octave_shift))` - folded lies within the table span
/// * `None` - non-positive or non-finite input, for which the folding
///   loop would never terminate
pub fn fold_to_reference_octave(frequency: f64) -> Option<(f64, i32)> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }

    let lo = CHROMATIC_TABLE[0].frequency;
    let hi = CHROMATIC_TABLE[CHROMATIC_TABLE.len() - 1].frequency;

    let mut folded = frequency;
    let mut shift = 0;
    while folded > hi {
        folded /= 2.0;
        shift += 1;
    }
    while folded < lo {
        folded *= 2.0;
        shift -= 1;
    }
    Some((folded, shift))
}

/// Index of the pitch class whose anchor frequency is closest to a
/// folded frequency. Ties go to the lower index.
pub fn nearest_pitch_class(folded: f64) -> usize {
    let mut index = 0;
    let mut min_distance = f64::INFINITY;

    for (possible_index, class) in CHROMATIC_TABLE.iter().enumerate() {
        let distance = (class.frequency - folded).abs();
        if distance < min_distance {
            index = possible_index;
            min_distance = distance;
        }
    }
    index
}

/// Absolute note names in both spellings for a raw frequency, e.g.
/// `("A4", "A4")` for 440 Hz or `("A♯4", "B♭4")` for 466.16 Hz.
///
/// # Returns
/// * `Some((sharp, flat))` - names with the octave digit appended
/// * `None` - the frequency cannot be folded (non-positive or non-finite)
pub fn absolute_note_names(frequency: f64) -> Option<(String, String)> {
    let (folded, octave) = fold_to_reference_octave(frequency)?;
    let class = &CHROMATIC_TABLE[nearest_pitch_class(folded)];
    Some((
        format!("{}{}", class.sharp, octave),
        format!("{}{}", class.flat, octave),
    ))
}

/// Note name relative to an adjustable reference frequency, using the
/// A-anchored name table.
///
/// The signed semitone count is `ln(frequency / reference)` divided by
/// `ln(2^(1/12))`, rounded to the nearest integer. Euclidean modulus
/// keeps the name index valid below the reference, and octave
/// numbering is anchored so the reference itself names as "A4"
/// whatever its numeric value.
///
/// # Returns
/// * `Some(name)` - e.g. "A#4"
/// * `None` - either frequency is non-positive or non-finite
pub fn relative_note_name(frequency: f64, reference: f64) -> Option<String> {
    if !frequency.is_finite() || !reference.is_finite() {
        return None;
    }
    if frequency <= 0.0 || reference <= 0.0 {
        return None;
    }

    let semitone_ratio = 2.0_f64.powf(1.0 / 12.0);
    let half_steps = (frequency / reference).ln() / semitone_ratio.ln();
    let rounded = half_steps.round() as i64;

    let note_index = rounded.rem_euclid(12) as usize;
    let octave = 4 + (rounded + 9).div_euclid(12);
    Some(format!("{}{}", RELATIVE_NOTE_NAMES[note_index], octave))
}

/// Pitch-class name (no octave digit) from the fixed 440 Hz anchor.
///
/// Computed via the rounded MIDI note number `12 * log2(f / 440) + 69`.
/// `None` for non-positive or non-finite input.
pub fn base_note_name(frequency: f64) -> Option<&'static str> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }
    let note_number = 12.0 * (frequency / 440.0).log2() + 69.0;
    let index = (note_number.round() as i64).rem_euclid(12) as usize;
    Some(NOTE_NAMES[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_is_identity_inside_the_anchor_octave() {
        for class in &CHROMATIC_TABLE {
            assert_eq!(
                fold_to_reference_octave(class.frequency),
                Some((class.frequency, 0))
            );
        }
        assert_eq!(fold_to_reference_octave(20.0), Some((20.0, 0)));
    }

    #[test]
    fn folding_lands_in_span_and_preserves_magnitude() {
        let lo = CHROMATIC_TABLE[0].frequency;
        let hi = CHROMATIC_TABLE[11].frequency;
        for &freq in &[27.5, 55.0, 440.0, 466.16, 1975.5, 17.0, 8.2, 12543.85] {
            let (folded, shift) = fold_to_reference_octave(freq).unwrap();
            assert!(folded >= lo && folded <= hi, "{freq} folded to {folded}");
            assert_eq!(folded * 2.0_f64.powi(shift), freq);
        }
    }

    #[test]
    fn folding_rejects_unusable_input() {
        assert_eq!(fold_to_reference_octave(0.0), None);
        assert_eq!(fold_to_reference_octave(-440.0), None);
        assert_eq!(fold_to_reference_octave(f64::NAN), None);
        assert_eq!(fold_to_reference_octave(f64::INFINITY), None);
    }

    #[test]
    fn matcher_is_idempotent_on_table_entries() {
        for (i, class) in CHROMATIC_TABLE.iter().enumerate() {
            assert_eq!(nearest_pitch_class(class.frequency), i);
        }
    }

    #[test]
    fn absolute_names_for_known_pitches() {
        assert_eq!(
            absolute_note_names(440.0),
            Some(("A4".to_string(), "A4".to_string()))
        );
        // A#4 / Bb4, both spellings.
        assert_eq!(
            absolute_note_names(466.16),
            Some(("A♯4".to_string(), "B♭4".to_string()))
        );
        // Two octaves below A4.
        assert_eq!(
            absolute_note_names(110.0),
            Some(("A2".to_string(), "A2".to_string()))
        );
        assert_eq!(absolute_note_names(0.0), None);
    }

    #[test]
    fn relative_name_anchors_reference_at_a4() {
        assert_eq!(relative_note_name(440.0, 440.0), Some("A4".to_string()));
        // The anchor tracks the reference, not 440.
        assert_eq!(relative_note_name(432.0, 432.0), Some("A4".to_string()));
    }

    #[test]
    fn relative_name_octave_arithmetic() {
        assert_eq!(relative_note_name(880.0, 440.0), Some("A5".to_string()));
        assert_eq!(relative_note_name(220.0, 440.0), Some("A3".to_string()));
        // One semitone up: A#4. Three up crosses into C5.
        assert_eq!(relative_note_name(466.16, 440.0), Some("A#4".to_string()));
        assert_eq!(relative_note_name(523.25, 440.0), Some("C5".to_string()));
        // One semitone down stays in octave 4.
        assert_eq!(relative_note_name(415.3, 440.0), Some("G#4".to_string()));
        // Two semitones below the reference octave boundary.
        assert_eq!(relative_note_name(246.94, 440.0), Some("B3".to_string()));
    }

    #[test]
    fn relative_name_rejects_unusable_input() {
        assert_eq!(relative_note_name(0.0, 440.0), None);
        assert_eq!(relative_note_name(440.0, 0.0), None);
        assert_eq!(relative_note_name(-1.0, 440.0), None);
        assert_eq!(relative_note_name(440.0, f64::NAN), None);
    }

    #[test]
    fn base_note_is_a_pitch_class_from_the_fixed_anchor() {
        assert_eq!(base_note_name(440.0), Some("A"));
        assert_eq!(base_note_name(880.0), Some("A"));
        assert_eq!(base_note_name(261.63), Some("C"));
        assert_eq!(base_note_name(466.16), Some("A#"));
        assert_eq!(base_note_name(0.0), None);
    }

    #[test]
    fn amplitude_gate_threshold_is_exclusive() {
        assert!(!amplitude_open(0.05, DEFAULT_AMPLITUDE_THRESHOLD));
        assert!(!amplitude_open(0.1, DEFAULT_AMPLITUDE_THRESHOLD));
        assert!(amplitude_open(0.2, DEFAULT_AMPLITUDE_THRESHOLD));
    }
}
