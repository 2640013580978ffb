use log::warn;

use crate::synth::message::{MessageReceiver, VoiceMessage};
use crate::synth::note_voice::{NoteVoice, PlayingSignal, VoiceError};
use crate::voices::InstrumentSelector;
use crate::MAX_BLOCK_SIZE;

/// A fixed row of [`NoteVoice`]s mixed into one output.
///
/// Every voice shares the bank's instrument selector and is rendered every
/// block, idle or not, so all their clocks stay in step. Control arrives
/// through a [`MessageReceiver`] and is applied at the start of each block.
pub struct VoiceBank<R: MessageReceiver> {
    voices: Vec<NoteVoice>,
    selector: InstrumentSelector,
    rx: R,
    temp_buffer: Vec<f32>,
}

impl<R: MessageReceiver> VoiceBank<R> {
    pub fn new<I, S>(notes: I, selector: InstrumentSelector, sample_rate: f32, rx: R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let voices = notes
            .into_iter()
            .map(|note| NoteVoice::new(note, selector.clone(), sample_rate))
            .collect();

        Self {
            voices,
            selector,
            rx,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn voice(&self, index: usize) -> Option<&NoteVoice> {
        self.voices.get(index)
    }

    pub fn selector(&self) -> &InstrumentSelector {
        &self.selector
    }

    /// One playing signal per voice, in voice order.
    pub fn signals(&self) -> Vec<PlayingSignal> {
        self.voices.iter().map(NoteVoice::playing_signal).collect()
    }

    /// Apply one control message immediately.
    pub fn handle(&mut self, msg: VoiceMessage) -> Result<(), VoiceError> {
        match msg {
            VoiceMessage::Toggle { voice, duration } => match self.voices.get_mut(voice) {
                Some(v) => v.play_note(duration).map(|_| ()),
                None => {
                    warn!("toggle for voice {voice} ignored: bank has {}", self.voices.len());
                    Ok(())
                }
            },
            VoiceMessage::StopAll => self.voices.iter_mut().try_for_each(NoteVoice::stop),
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        // Process control messages
        while let Some(msg) = self.rx.pop() {
            if let Err(err) = self.handle(msg) {
                warn!("{msg:?} failed: {err}");
            }
        }

        // Mix voices
        out.fill(0.0);
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let temp = &mut self.temp_buffer[..chunk.len()];
            for voice in &mut self.voices {
                voice.render(temp);
                for (o, v) in chunk.iter_mut().zip(temp.iter()) {
                    *o += v;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::voices::Instrument;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn bank(notes: &[&str]) -> VoiceBank<VecDeque<VoiceMessage>> {
        VoiceBank::new(
            notes.iter().copied(),
            InstrumentSelector::new(Instrument::Bass),
            SAMPLE_RATE,
            VecDeque::new(),
        )
    }

    #[test]
    fn silent_until_toggled() {
        let mut bank = bank(&["C4", "E4"]);
        let mut out = vec![1.0f32; 128];
        bank.render_block(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn queued_toggle_starts_voice_at_block_start() {
        let mut bank = bank(&["C4", "E4"]);
        let signals = bank.signals();
        bank.rx.push_back(VoiceMessage::Toggle { voice: 1, duration: 0.5 });

        let mut out = vec![0.0f32; 128];
        bank.render_block(&mut out);

        assert!(!signals[0].get());
        assert!(signals[1].get());
        assert!(out.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn voices_share_one_clock() {
        let mut bank = bank(&["C4", "E4", "G4"]);
        let mut out = vec![0.0f32; 300];
        bank.render_block(&mut out);

        for i in 0..bank.len() {
            assert_eq!(bank.voice(i).unwrap().context().current_frame(), 300);
        }
    }

    #[test]
    fn stop_all_silences_every_voice() {
        let mut bank = bank(&["C4", "E4"]);
        bank.handle(VoiceMessage::Toggle { voice: 0, duration: 1.0 }).unwrap();
        bank.handle(VoiceMessage::Toggle { voice: 1, duration: 1.0 }).unwrap();

        bank.handle(VoiceMessage::StopAll).unwrap();
        assert!(bank.signals().iter().all(|s| !s.get()));
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut bank = bank(&["C4"]);
        assert!(bank.handle(VoiceMessage::Toggle { voice: 7, duration: 1.0 }).is_ok());
    }

    #[test]
    fn failed_message_does_not_stall_the_queue() {
        let mut bank = bank(&["X4", "A4"]);
        bank.rx.push_back(VoiceMessage::Toggle { voice: 0, duration: 1.0 });
        bank.rx.push_back(VoiceMessage::Toggle { voice: 1, duration: 1.0 });

        let mut out = vec![0.0f32; 64];
        bank.render_block(&mut out);
        assert!(!bank.voice(0).unwrap().is_playing());
        assert!(bank.voice(1).unwrap().is_playing());
    }
}
