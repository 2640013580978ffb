//! Note names and equal-tempered frequency resolution.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Equal Temperament
=================

An octave doubles the frequency. Twelve-tone equal temperament splits that
doubling into 12 identical steps (semitones), so each step multiplies the
frequency by the twelfth root of two:

    ratio = 2^(1/12) ≈ 1.059463

Every pitch is then described by how many semitones it sits away from a
single reference pitch. We use concert pitch, A4 = 440 Hz:

    distance  = pitch_index - 9 + 12 * (octave - 4)
    frequency = 440 * 2^(distance / 12)

The pitch index is the position within the fixed chromatic table below.
A is at index 9, which is why 9 is subtracted.

    C  C# D  D# E  F  F# G  G# A  A# B
    0  1  2  3  4  5  6  7  8  9  10 11

Examples:
    A4  -> distance  0  -> 440.00 Hz
    A5  -> distance 12  -> 880.00 Hz
    C#4 -> distance -8  -> 277.18 Hz
*/

/// Concert pitch, the frequency every other note is tuned against.
pub const REFERENCE_FREQUENCY: f64 = 440.0;
/// Index of A in the chromatic table.
pub const REFERENCE_INDEX: i32 = 9;
pub const REFERENCE_OCTAVE: i32 = 4;
pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// One of the twelve note names within an octave.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order, starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Position in the chromatic table (C = 0, B = 11).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Look up a pitch class by its written name ("C", "C#", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|pc| pc.name() == name)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while reading a note identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    /// The string is not shaped like `<PitchClass><Digits>`.
    InvalidFormat { note: String },
    /// The string has the right shape but the name is not one of the 12.
    InvalidPitchClass { note: String, token: String },
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::InvalidFormat { note } => write!(
                f,
                "invalid note format {note:?}: expected a pitch class followed by an octave, like A4 or C#3"
            ),
            NoteError::InvalidPitchClass { note, token } => {
                write!(f, "invalid note name {token:?} in {note:?}")
            }
        }
    }
}

impl std::error::Error for NoteError {}

/// A parsed note: pitch class plus octave number.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: u32,
}

impl Note {
    pub fn new(pitch_class: PitchClass, octave: u32) -> Self {
        Self {
            pitch_class,
            octave,
        }
    }

    /// Signed distance in semitones from A4.
    pub fn semitones_from_a4(&self) -> i64 {
        self.pitch_class.index() as i64 - i64::from(REFERENCE_INDEX)
            + i64::from(SEMITONES_PER_OCTAVE) * (i64::from(self.octave) - i64::from(REFERENCE_OCTAVE))
    }

    /// Equal-tempered frequency in Hz.
    pub fn frequency(&self) -> f64 {
        let distance = self.semitones_from_a4() as f64;
        REFERENCE_FREQUENCY * 2.0_f64.powf(distance / f64::from(SEMITONES_PER_OCTAVE))
    }
}

impl FromStr for Note {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_error = || NoteError::InvalidFormat { note: s.to_string() };

        if !s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(format_error());
        }

        // Token is one letter plus an optional sharp.
        let token_end = if s[1..].starts_with('#') { 2 } else { 1 };
        let (token, digits) = s.split_at(token_end);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format_error());
        }
        let octave = digits.parse::<u32>().map_err(|_| format_error())?;

        let pitch_class = PitchClass::from_name(token).ok_or_else(|| NoteError::InvalidPitchClass {
            note: s.to_string(),
            token: token.to_string(),
        })?;

        Ok(Note::new(pitch_class, octave))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Resolve a note identifier such as `"A4"` or `"C#3"` to its frequency in Hz.
///
/// # Example
/// ```
/// use keynote::pitch::resolve;
/// assert_eq!(resolve("A4").unwrap(), 440.0);
/// assert!(resolve("4A").is_err());
/// ```
pub fn resolve(note: &str) -> Result<f64, NoteError> {
    note.parse::<Note>().map(|n| n.frequency())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_exactly_440() {
        assert_eq!(resolve("A4").unwrap(), 440.0);
    }

    #[test]
    fn octaves_double_and_halve() {
        assert_eq!(resolve("A5").unwrap(), 880.0);
        assert_eq!(resolve("A3").unwrap(), 220.0);
    }

    #[test]
    fn c_sharp_4_is_eight_semitones_below_a4() {
        let expected = 440.0 * 2.0_f64.powf(-8.0 / 12.0);
        let actual = resolve("C#4").unwrap();
        assert!((actual - expected).abs() < 1e-9);
        assert!((actual - 277.18).abs() < 0.01, "got {actual}");
    }

    #[test]
    fn middle_c() {
        assert!((resolve("C4").unwrap() - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn unknown_name_is_invalid_pitch_class() {
        assert!(matches!(
            resolve("H4"),
            Err(NoteError::InvalidPitchClass { ref token, .. }) if token == "H"
        ));
        assert!(matches!(resolve("E#4"), Err(NoteError::InvalidPitchClass { .. })));
        assert!(matches!(resolve("a4"), Err(NoteError::InvalidPitchClass { .. })));
    }

    #[test]
    fn malformed_strings_are_invalid_format() {
        for bad in ["4A", "", "A", "A#", "Ab4", "A4 ", " A4", "#4", "A-1", "C##4"] {
            assert!(
                matches!(resolve(bad), Err(NoteError::InvalidFormat { .. })),
                "{bad:?} should be a format error"
            );
        }
    }

    #[test]
    fn multi_digit_octaves_parse() {
        let note: Note = "C10".parse().unwrap();
        assert_eq!(note.octave, 10);
        assert_eq!(note.semitones_from_a4(), -9 + 72);
    }

    #[test]
    fn display_round_trips_written_form() {
        for name in ["A4", "C#3", "F#0", "B7"] {
            let note: Note = name.parse().unwrap();
            assert_eq!(note.to_string(), name);
        }
    }

    #[test]
    fn chromatic_table_order() {
        assert_eq!(PitchClass::C.index(), 0);
        assert_eq!(PitchClass::A.index(), 9);
        assert_eq!(PitchClass::B.index(), 11);
        assert_eq!(PitchClass::from_name("C#"), Some(PitchClass::Cs));
        assert_eq!(PitchClass::from_name("Db"), None);
    }
}
