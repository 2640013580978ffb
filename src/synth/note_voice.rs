use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::graph::{AudioContext, AudioNodeHandle, GraphError, NodeId, OscillatorHandle};
use crate::pitch::{self, NoteError};
use crate::synth::timer::{TimerId, TimerQueue};
use crate::voices::{self, Instrument, InstrumentSelector};

/*
Note Voice
==========

One note name, one sound at a time. Every call to `play_note` flips the
voice between two states:

  IDLE ──play_note(d)──→ PLAYING ──play_note(_)──→ IDLE
                            │
                            └── auto-stop timer after d seconds ──→ IDLE

Starting a note resolves the frequency, builds a fresh oscillator through the
currently selected instrument, starts it now and schedules it to stop at
now + d. A timer on the context's frame clock clears the playing flag when
the note runs out.

Stopping early cuts the oscillator off immediately and cancels the timer. The
duration passed to a stopping call is ignored.

Timers carry the id of the oscillator they were armed for. A timer that fires
for anything other than the current oscillator is stale and does nothing.

The playing flag lives in an `Arc<AtomicBool>` so a UI thread can observe it
through a `PlayingSignal` while the voice itself lives on the audio thread.
*/

/// Note length used by [`NoteVoice::play`], in seconds.
pub const DEFAULT_DURATION: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceError {
    Note(NoteError),
    Graph(GraphError),
    /// Durations must be finite, greater than zero, and short enough that
    /// the end frame still fits the frame clock.
    InvalidDuration(f64),
}

impl fmt::Display for VoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceError::Note(err) => write!(f, "cannot resolve note: {err}"),
            VoiceError::Graph(err) => write!(f, "audio graph error: {err}"),
            VoiceError::InvalidDuration(d) => write!(f, "invalid note duration {d}s"),
        }
    }
}

impl std::error::Error for VoiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VoiceError::Note(err) => Some(err),
            VoiceError::Graph(err) => Some(err),
            VoiceError::InvalidDuration(_) => None,
        }
    }
}

impl From<NoteError> for VoiceError {
    fn from(err: NoteError) -> Self {
        VoiceError::Note(err)
    }
}

impl From<GraphError> for VoiceError {
    fn from(err: GraphError) -> Self {
        VoiceError::Graph(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Playing,
}

/// Read-only view of a voice's playing flag, safe to hand to another thread.
#[derive(Debug, Clone)]
pub struct PlayingSignal(Arc<AtomicBool>);

impl PlayingSignal {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct ActiveNote {
    oscillator: OscillatorHandle,
    instrument: Instrument,
    stop_time: f64,
    timer: TimerId,
}

pub struct NoteVoice {
    note: String,
    selector: InstrumentSelector,
    ctx: AudioContext,
    timers: TimerQueue<NodeId>,
    active: Option<ActiveNote>,
    playing: Arc<AtomicBool>,
}

impl NoteVoice {
    /// Create an idle voice for `note`.
    ///
    /// The note name is not checked here; a bad name surfaces as
    /// [`VoiceError::Note`] on the first `play_note`.
    pub fn new(note: impl Into<String>, selector: InstrumentSelector, sample_rate: f32) -> Self {
        Self {
            note: note.into(),
            selector,
            ctx: AudioContext::new(sample_rate),
            timers: TimerQueue::new(),
            active: None,
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Toggle the voice.
    ///
    /// Idle: start a note lasting `duration` seconds and return `Ok(true)`.
    /// Playing: stop the current note right away and return `Ok(false)`.
    /// On error nothing is started and the voice stays idle.
    pub fn play_note(&mut self, duration: f64) -> Result<bool, VoiceError> {
        if self.active.is_some() {
            self.stop()?;
            return Ok(false);
        }
        self.start(duration)?;
        Ok(true)
    }

    /// [`play_note`](Self::play_note) with [`DEFAULT_DURATION`].
    pub fn play(&mut self) -> Result<bool, VoiceError> {
        self.play_note(DEFAULT_DURATION)
    }

    fn start(&mut self, duration: f64) -> Result<(), VoiceError> {
        let frequency = pitch::resolve(&self.note)?;
        if !(duration.is_finite() && duration > 0.0) {
            return Err(VoiceError::InvalidDuration(duration));
        }

        let deadline = self
            .deadline_after(duration)
            .ok_or(VoiceError::InvalidDuration(duration))?;

        let instrument = self.selector.get();
        let now = self.ctx.current_time();
        let stop_time = now + duration;

        let oscillator = self.ctx.create_oscillator()?;
        if let Err(err) = self.wire(oscillator, instrument, frequency, now, duration) {
            // drop the half-built chain so the context does not keep it
            self.ctx.release(&oscillator);
            return Err(err.into());
        }
        let timer = self.timers.schedule(deadline, oscillator.id());

        debug!(
            "{} {instrument} on at {now:.3}s for {duration}s ({frequency:.2} Hz, oscillator {})",
            self.note,
            oscillator.id()
        );

        self.active = Some(ActiveNote {
            oscillator,
            instrument,
            stop_time,
            timer,
        });
        self.playing.store(true, Ordering::Release);
        Ok(())
    }

    /// Frame at which a note of `duration` seconds started now runs out.
    fn deadline_after(&self, duration: f64) -> Option<u64> {
        let frames = (duration * f64::from(self.ctx.sample_rate())).round();
        if frames >= u64::MAX as f64 {
            return None;
        }
        self.ctx.current_frame().checked_add(frames as u64)
    }

    fn wire(
        &mut self,
        oscillator: OscillatorHandle,
        instrument: Instrument,
        frequency: f64,
        now: f64,
        duration: f64,
    ) -> Result<(), GraphError> {
        voices::build(&mut self.ctx, instrument, oscillator, frequency, now, duration)?;
        let node = self.ctx.oscillator_mut(&oscillator)?;
        node.start(now)?;
        node.stop(now + duration)
    }

    /// Cut the current note off now. Does nothing when idle.
    pub fn stop(&mut self) -> Result<(), VoiceError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        self.timers.cancel(active.timer);
        self.playing.store(false, Ordering::Release);

        let now = self.ctx.current_time();
        match self.ctx.oscillator_mut(&active.oscillator) {
            Ok(node) => node.stop(now)?,
            // already ran out and was collected before its timer fired
            Err(GraphError::UnknownNode(_)) => {}
            Err(err) => return Err(err.into()),
        }

        debug!("{} stopped early at {now:.3}s", self.note);
        Ok(())
    }

    /// Render the next block of audio, then fire any timers that came due.
    pub fn render(&mut self, out: &mut [f32]) {
        self.ctx.render_block(out);
        self.poll();
    }

    /// Fire every timer due at the current frame.
    pub fn poll(&mut self) {
        let now = self.ctx.current_frame();
        while let Some((_, oscillator)) = self.timers.pop_due(now) {
            self.expire(oscillator);
        }
    }

    fn expire(&mut self, oscillator: NodeId) {
        let current = self.active.as_ref().map(|a| a.oscillator.id());
        if current != Some(oscillator) {
            trace!("{}: ignoring stale timer for oscillator {oscillator}", self.note);
            return;
        }
        self.active = None;
        self.playing.store(false, Ordering::Release);
        debug!("{} ran out at {:.3}s", self.note, self.ctx.current_time());
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn state(&self) -> VoiceState {
        if self.active.is_some() {
            VoiceState::Playing
        } else {
            VoiceState::Idle
        }
    }

    pub fn playing_signal(&self) -> PlayingSignal {
        PlayingSignal(Arc::clone(&self.playing))
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// The instrument the next note will use.
    pub fn instrument(&self) -> Instrument {
        self.selector.get()
    }

    /// The instrument of the note currently sounding, if any.
    pub fn sounding_instrument(&self) -> Option<Instrument> {
        self.active.as_ref().map(|a| a.instrument)
    }

    /// When the current note is scheduled to end, in context seconds.
    pub fn scheduled_stop(&self) -> Option<f64> {
        self.active.as_ref().map(|a| a.stop_time)
    }

    pub fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    pub fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate()
    }

    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    /// Silence the voice and release its context. Further `play_note` calls
    /// fail with [`GraphError::Closed`].
    pub fn close(&mut self) {
        self.active = None;
        self.timers.clear();
        self.playing.store(false, Ordering::Release);
        self.ctx.close();
    }
}

impl Drop for NoteVoice {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ContextState;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn voice(note: &str) -> NoteVoice {
        NoteVoice::new(note, InstrumentSelector::default(), SAMPLE_RATE)
    }

    fn advance(voice: &mut NoteVoice, seconds: f64) -> Vec<f32> {
        let mut out = vec![0.0f32; (seconds * SAMPLE_RATE as f64).round() as usize];
        for chunk in out.chunks_mut(64) {
            voice.render(chunk);
        }
        out
    }

    #[test]
    fn toggles_between_playing_and_idle() {
        let mut v = voice("A4");

        assert_eq!(v.play_note(1.0), Ok(true));
        assert!(v.is_playing());
        assert_eq!(v.state(), VoiceState::Playing);

        assert_eq!(v.play_note(1.0), Ok(false));
        assert!(!v.is_playing());
        assert_eq!(v.state(), VoiceState::Idle);

        assert_eq!(v.play_note(1.0), Ok(true));
    }

    #[test]
    fn clears_itself_when_the_note_runs_out() {
        let mut v = voice("C4");
        v.play_note(0.5).unwrap();

        advance(&mut v, 0.45);
        assert!(v.is_playing());
        advance(&mut v, 0.1);
        assert!(!v.is_playing());
        assert_eq!(v.scheduled_stop(), None);
    }

    #[test]
    fn early_stop_silences_immediately() {
        // bass has no filter tail to ring on after the cut
        let mut v = NoteVoice::new("A4", InstrumentSelector::new(Instrument::Bass), SAMPLE_RATE);
        v.play_note(2.0).unwrap();
        let sounding = advance(&mut v, 0.2);
        assert!(sounding.iter().any(|&s| s != 0.0));

        v.play_note(2.0).unwrap();
        let after = advance(&mut v, 0.2);
        assert!(after.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn stopping_ignores_the_duration() {
        let mut v = voice("A4");
        v.play_note(1.0).unwrap();
        assert_eq!(v.play_note(f64::NAN), Ok(false));
    }

    #[test]
    fn stale_timer_does_not_clear_a_newer_note() {
        let mut v = voice("A4");
        v.play_note(1.0).unwrap();
        let old = v.active.as_ref().unwrap().oscillator.id();
        v.play_note(1.0).unwrap();
        v.play_note(1.0).unwrap();

        v.expire(old);
        assert!(v.is_playing());
    }

    #[test]
    fn cancelled_timer_leaves_no_pending_work() {
        let mut v = voice("A4");
        v.play_note(0.3).unwrap();
        v.play_note(0.3).unwrap();
        assert!(v.timers.is_empty());

        v.play_note(1.0).unwrap();
        advance(&mut v, 0.5);
        assert!(v.is_playing());
    }

    #[test]
    fn bad_note_starts_nothing() {
        let mut v = voice("H4");
        assert!(matches!(v.play(), Err(VoiceError::Note(NoteError::InvalidPitchClass { .. }))));
        assert!(!v.is_playing());
        // destination only
        assert_eq!(v.context().node_count(), 1);
    }

    #[test]
    fn bad_duration_starts_nothing() {
        let mut v = voice("A4");
        for duration in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            assert!(matches!(v.play_note(duration), Err(VoiceError::InvalidDuration(_))));
        }
        assert!(!v.is_playing());
        assert_eq!(v.context().node_count(), 1);
    }

    #[test]
    fn duration_past_the_frame_clock_is_rejected() {
        let mut v = voice("A4");
        advance(&mut v, 0.064);

        // 1e17 s at 1 kHz is more frames than a u64 holds
        assert_eq!(v.play_note(1e17), Err(VoiceError::InvalidDuration(1e17)));
        assert!(!v.is_playing());
        assert_eq!(v.context().node_count(), 1);
        assert!(v.timers.is_empty());

        // long but representable is fine
        assert_eq!(v.play_note(1e12), Ok(true));
    }

    #[test]
    fn failed_build_leaves_no_nodes_behind() {
        // far above anything an f32 frequency can hold
        let mut v = voice("A130");
        for _ in 0..5 {
            assert!(matches!(v.play(), Err(VoiceError::Graph(GraphError::InvalidRampTarget(_)))));
        }
        assert!(!v.is_playing());
        assert_eq!(v.context().node_count(), 1);

        let mut v = NoteVoice::new("A130", InstrumentSelector::new(Instrument::Bass), SAMPLE_RATE);
        assert!(v.play().is_err());
        assert_eq!(v.context().node_count(), 1);
    }

    #[test]
    fn replaying_reuses_released_nodes() {
        let mut v = voice("A4");
        v.play_note(0.1).unwrap();
        advance(&mut v, 0.2);
        let slots = v.context().slot_count();

        for _ in 0..5 {
            v.play_note(0.1).unwrap();
            advance(&mut v, 0.2);
        }
        assert_eq!(v.context().slot_count(), slots);
        assert_eq!(v.context().node_count(), 1);
    }

    #[test]
    fn instrument_is_read_when_the_note_starts() {
        let selector = InstrumentSelector::new(Instrument::Bass);
        let mut v = NoteVoice::new("E2", selector.clone(), SAMPLE_RATE);

        v.play().unwrap();
        selector.set(Instrument::Piano);
        assert_eq!(v.sounding_instrument(), Some(Instrument::Bass));
        assert_eq!(v.instrument(), Instrument::Piano);
    }

    #[test]
    fn signal_follows_the_voice() {
        let mut v = voice("A4");
        let signal = v.playing_signal();

        v.play_note(0.1).unwrap();
        assert!(signal.get());
        advance(&mut v, 0.2);
        assert!(!signal.get());
    }

    #[test]
    fn finished_notes_are_collected() {
        let mut v = voice("A4");
        v.play_note(0.1).unwrap();
        // destination + oscillator + filter + gain
        assert_eq!(v.context().node_count(), 4);

        advance(&mut v, 0.2);
        assert_eq!(v.context().node_count(), 1);
    }

    #[test]
    fn closed_voice_refuses_to_play() {
        let mut v = voice("A4");
        v.play().unwrap();
        v.close();

        assert!(!v.is_playing());
        assert_eq!(v.context().state(), ContextState::Closed);
        assert_eq!(v.play(), Err(VoiceError::Graph(GraphError::Closed)));
    }
}
