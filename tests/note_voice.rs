use keynote::synth::bank::VoiceBank;
use keynote::synth::message::VoiceMessage;
use keynote::{resolve, Instrument, InstrumentSelector, NoteError, NoteVoice, VoiceError};

const SAMPLE_RATE: f32 = 48_000.0;

fn render_seconds(voice: &mut NoteVoice, seconds: f64) -> Vec<f32> {
    let mut out = vec![0.0f32; (seconds * SAMPLE_RATE as f64).round() as usize];
    for block in out.chunks_mut(256) {
        voice.render(block);
    }
    out
}

fn window(samples: &[f32], from: f64, to: f64) -> &[f32] {
    let at = |t: f64| (t * SAMPLE_RATE as f64).round() as usize;
    &samples[at(from)..at(to)]
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

#[test]
fn reference_frequencies() {
    let cases = [
        ("A4", 440.0),
        ("A5", 880.0),
        ("A3", 220.0),
        ("C4", 261.6256),
        ("C#4", 277.1826),
        ("A0", 27.5),
        ("C8", 4186.009),
    ];
    for (note, expected) in cases {
        let hz = resolve(note).unwrap();
        assert!((hz - expected).abs() < 1e-3, "{note}: {hz}");
    }
}

#[test]
fn malformed_notes_are_rejected() {
    for note in ["", "A", "4A", "A#", "Ab4", "A4 "] {
        assert!(
            matches!(resolve(note), Err(NoteError::InvalidFormat { .. })),
            "{note:?}"
        );
    }
    assert!(matches!(
        resolve("H4"),
        Err(NoteError::InvalidPitchClass { .. })
    ));
}

#[test]
fn bass_note_follows_the_envelope() {
    let mut voice = NoteVoice::new("A4", InstrumentSelector::new(Instrument::Bass), SAMPLE_RATE);
    assert_eq!(voice.play(), Ok(true));

    let out = render_seconds(&mut voice, 1.2);

    // attack peak
    assert!(peak(window(&out, 0.015, 0.025)) > 0.9);
    // decay reached half level
    let decay = peak(window(&out, 0.1, 0.11));
    assert!((decay - 0.5).abs() < 0.05, "decay {decay}");
    // midway through the sustain ramp, 0.5 * 0.4^(0.45/0.8)
    let sustain = peak(window(&out, 0.54, 0.56));
    assert!((sustain - 0.299).abs() < 0.02, "sustain {sustain}");
    // released and stopped
    assert!(window(&out, 1.0, 1.2).iter().all(|&s| s == 0.0));
    assert!(!voice.is_playing());
}

#[test]
fn bass_note_has_the_right_pitch() {
    let mut voice = NoteVoice::new("A4", InstrumentSelector::new(Instrument::Bass), SAMPLE_RATE);
    voice.play_note(2.0).unwrap();

    let out = render_seconds(&mut voice, 1.0);
    let span = window(&out, 0.2, 0.7);
    let rising = span.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count();

    // 440 Hz over half a second
    assert!((219..=221).contains(&rising), "{rising} cycles");
}

#[test]
fn output_stays_in_range() {
    for instrument in Instrument::ALL {
        let mut voice = NoteVoice::new("C3", InstrumentSelector::new(instrument), SAMPLE_RATE);
        voice.play().unwrap();
        let out = render_seconds(&mut voice, 1.1);

        assert!(out.iter().any(|&s| s != 0.0), "{instrument} is silent");
        assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 1.5), "{instrument}");
    }
}

#[test]
fn second_press_cuts_the_note() {
    let mut voice = NoteVoice::new("E2", InstrumentSelector::new(Instrument::Bass), SAMPLE_RATE);
    voice.play_note(5.0).unwrap();
    render_seconds(&mut voice, 0.3);

    assert_eq!(voice.play_note(5.0), Ok(false));
    let after = render_seconds(&mut voice, 0.3);
    assert!(after.iter().all(|&s| s == 0.0));
    // the whole chain is collected once the oscillator has stopped
    assert_eq!(voice.context().node_count(), 1);
}

#[test]
fn short_notes_play_and_end() {
    let mut voice = NoteVoice::new("A4", InstrumentSelector::default(), SAMPLE_RATE);
    voice.play_note(0.05).unwrap();

    let out = render_seconds(&mut voice, 0.1);
    assert!(out.iter().all(|s| s.is_finite()));
    assert!(window(&out, 0.05, 0.1).iter().all(|&s| s == 0.0));
    assert!(!voice.is_playing());
}

#[test]
fn invalid_note_surfaces_on_play() {
    let mut voice = NoteVoice::new("Z9", InstrumentSelector::default(), SAMPLE_RATE);
    assert!(matches!(voice.play(), Err(VoiceError::Note(_))));
    assert!(!voice.is_playing());
}

#[cfg(feature = "rtrb")]
#[test]
fn bank_plays_messages_from_a_ring_buffer() {
    let (mut tx, rx) = rtrb::RingBuffer::new(8);
    let selector = InstrumentSelector::new(Instrument::Bass);
    let mut bank = VoiceBank::new(["C4", "E4", "G4"], selector, SAMPLE_RATE, rx);
    let signals = bank.signals();

    tx.push(VoiceMessage::Toggle { voice: 0, duration: 0.5 }).unwrap();
    tx.push(VoiceMessage::Toggle { voice: 2, duration: 0.5 }).unwrap();

    let mut out = vec![0.0f32; 4_800];
    bank.render_block(&mut out);
    assert!(signals[0].get() && !signals[1].get() && signals[2].get());
    assert!(out.iter().any(|&s| s != 0.0));

    // run past the notes' end
    for _ in 0..10 {
        bank.render_block(&mut out);
    }
    assert!(signals.iter().all(|s| !s.get()));
    assert!(out.iter().all(|&s| s == 0.0));
}
