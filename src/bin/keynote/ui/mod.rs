//! TUI module for keynote
//!
//! Draws the key row and forwards key presses to the audio thread.

mod keyboard;
pub mod state;

use std::io::stdout;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent as TermKeyEvent, KeyEventKind as TermKeyEventKind,
    KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use log::{debug, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use keynote::input::{KeyEvent, KeyboardTracker};
use keynote::synth::message::VoiceMessage;
use keynote::{InstrumentSelector, PlayingSignal};

use keyboard::{render_keyboard, KeyLight};
use state::{AudioInfo, KeyLayout};

/// UI application state
pub struct UiApp {
    /// Control messages to the voice bank
    tx: Producer<VoiceMessage>,
    /// Peak level per audio callback
    level_rx: Consumer<f32>,
    selector: InstrumentSelector,
    signals: Vec<PlayingSignal>,
    keys: KeyboardTracker<char>,
    layout: KeyLayout,
    duration: f64,
    info: AudioInfo,
    peak: f32,
    /// Whether the terminal reports key releases
    enhanced: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        tx: Producer<VoiceMessage>,
        level_rx: Consumer<f32>,
        selector: InstrumentSelector,
        signals: Vec<PlayingSignal>,
        layout: KeyLayout,
        duration: f64,
        info: AudioInfo,
    ) -> Self {
        Self {
            tx,
            level_rx,
            selector,
            signals,
            keys: KeyboardTracker::new(),
            layout,
            duration,
            info,
            peak: 0.0,
            enhanced: false,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        debug!("keyboard enhancement: {}", self.enhanced);

        let result = self.event_loop(terminal);

        if self.enhanced {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_level();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::FocusLost => self.keys.clear(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Keep the loudest reading since the last frame
    fn poll_level(&mut self) {
        let mut peak = None;
        while let Ok(level) = self.level_rx.pop() {
            peak = Some(peak.map_or(level, |p: f32| p.max(level)));
        }
        if let Some(peak) = peak {
            self.peak = peak;
        }
    }

    fn handle_key(&mut self, key: TermKeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Tab if key.kind == TermKeyEventKind::Press => {
                let next = self.selector.get().next();
                self.selector.set(next);
                debug!("instrument switched to {next}");
            }
            KeyCode::Char(c) => {
                if let Some(voice) = self.layout.voice_for(c) {
                    self.handle_note_key(c.to_ascii_lowercase(), voice, key.kind);
                }
            }
            _ => {}
        }
    }

    fn handle_note_key(&mut self, c: char, voice: usize, kind: TermKeyEventKind) {
        match kind {
            TermKeyEventKind::Release => {
                self.keys.handle(KeyEvent::release(c));
            }
            TermKeyEventKind::Repeat => {
                self.keys.handle(KeyEvent::repeat(c));
            }
            TermKeyEventKind::Press => {
                if !self.keys.handle(KeyEvent::press(c)) {
                    return;
                }

                let msg = VoiceMessage::Toggle {
                    voice,
                    duration: self.duration,
                };
                if self.tx.push(msg).is_err() {
                    warn!("control queue full, dropped {msg:?}");
                }

                // without release events a key would stay held forever
                if !self.enhanced {
                    self.keys.handle(KeyEvent::release(c));
                }
            }
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(5),    // Keys
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        self.render_status(frame, chunks[0]);

        let lights: Vec<KeyLight> = (0..self.layout.len())
            .map(|voice| KeyLight {
                held: self.keys.is_held(&state::KEYS[voice]),
                sounding: self.signals.get(voice).is_some_and(PlayingSignal::get),
            })
            .collect();
        render_keyboard(frame, chunks[1], &self.layout, &lights);

        let help = Paragraph::new(" [A-K] Play/stop note  [Tab] Switch instrument  [Esc] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }

    fn render_status(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let block = Block::default().title(" keynote ").borders(Borders::ALL);

        let line = Line::from(vec![
            Span::styled(
                format!(" {}  ", self.selector.get()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("{:.2}s notes  ", self.duration),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!(
                    "{:.1}kHz {}ch  ",
                    self.info.sample_rate / 1000.0,
                    self.info.channels
                ),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("Peak: {:.2}  ", self.peak),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(
                format!("Held: {}", self.keys.held().collect::<String>()),
                Style::default().fg(Color::Yellow),
            ),
        ]);

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
