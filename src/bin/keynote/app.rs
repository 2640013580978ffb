//! Keynote - application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};
use rtrb::RingBuffer;

use keynote::synth::bank::VoiceBank;
use keynote::synth::message::VoiceMessage;
use keynote::{Instrument, InstrumentSelector, MAX_BLOCK_SIZE};

use super::ui::state::{self, KeyLayout};
use super::ui::UiApp;

/// Headroom so a full chord of voices does not clip
const MASTER_GAIN: f32 = 0.25;

/// Main application builder
pub struct Keynote {
    octave: u32,
    instrument: Instrument,
    duration: f64,
}

impl Keynote {
    pub fn new() -> Self {
        Self {
            octave: 4,
            instrument: Instrument::default(),
            duration: keynote::DEFAULT_DURATION,
        }
    }

    /// Octave of the leftmost key
    pub fn octave(mut self, octave: u32) -> Self {
        self.octave = octave;
        self
    }

    pub fn instrument(mut self, instrument: Instrument) -> Self {
        self.instrument = instrument;
        self
    }

    /// Note length in seconds
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(eyre!("note duration must be a positive number of seconds"));
        }

        // Set up audio
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!("output at {sample_rate} Hz, {channels} channel(s)");

        let layout = KeyLayout::new(self.octave);
        let selector = InstrumentSelector::new(self.instrument);

        let (msg_tx, msg_rx) = RingBuffer::<VoiceMessage>::new(64);
        let (mut level_tx, level_rx) = RingBuffer::<f32>::new(256);

        let mut bank = VoiceBank::new(layout.notes(), selector.clone(), sample_rate, msg_rx);
        let signals = bank.signals();

        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;
                    let mut peak = 0.0f32;

                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames_to_render];
                        bank.render_block(block);

                        // Copy to output (mono to all channels)
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            let s = s * MASTER_GAIN;
                            peak = peak.max(s.abs());
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }

                        frames_written += frames_to_render;
                    }

                    // meter is best-effort; drop readings if the UI lags
                    let _ = level_tx.push(peak);
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;

        let mut app = UiApp::new(
            msg_tx,
            level_rx,
            selector,
            signals,
            layout,
            self.duration,
            state::AudioInfo {
                sample_rate,
                channels,
            },
        );

        let mut terminal = ratatui::init();
        let result = app.run(&mut terminal);
        ratatui::restore();
        result
    }
}

impl Default for Keynote {
    fn default() -> Self {
        Self::new()
    }
}
