// Purpose: note voices and the bank that mixes them
// This layer sits above the audio graph and owns one context per voice

pub mod bank;
pub mod message;
pub mod note_voice;
pub mod timer;
