//! Key layout and static info shared between the app and the UI

use keynote::{Note, PitchClass};

/// Bottom-row keys, left to right: thirteen chromatic notes from C.
pub const KEYS: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];

/// Maps keyboard characters to voices and voices to note names
#[derive(Debug, Clone)]
pub struct KeyLayout {
    notes: Vec<Note>,
}

impl KeyLayout {
    /// Layout whose first key is C of `octave`
    pub fn new(octave: u32) -> Self {
        let notes = (0..KEYS.len())
            .map(|i| {
                let pitch_class = PitchClass::ALL[i % PitchClass::ALL.len()];
                Note::new(pitch_class, octave + (i / PitchClass::ALL.len()) as u32)
            })
            .collect();
        Self { notes }
    }

    /// Note names in voice order
    pub fn notes(&self) -> Vec<String> {
        self.notes.iter().map(Note::to_string).collect()
    }

    pub fn note(&self, voice: usize) -> Option<&Note> {
        self.notes.get(voice)
    }

    /// Voice index for a key, case-insensitive
    pub fn voice_for(&self, key: char) -> Option<usize> {
        let key = key.to_ascii_lowercase();
        KEYS.iter().position(|&k| k == key)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }
}

/// Audio device facts shown in the status bar
#[derive(Debug, Clone, Copy)]
pub struct AudioInfo {
    pub sample_rate: f32,
    pub channels: usize,
}
