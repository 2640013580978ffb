//! Keyboard widget - one cell per key, lit while held or sounding

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state::{KeyLayout, KEYS};

/// Per-key display state
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLight {
    pub held: bool,
    pub sounding: bool,
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, layout: &KeyLayout, lights: &[KeyLight]) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, layout.len() as u32); layout.len()])
        .split(area);

    for (voice, cell) in cells.iter().enumerate() {
        let Some(note) = layout.note(voice) else {
            continue;
        };
        let light = lights.get(voice).copied().unwrap_or_default();
        let sharp = note.pitch_class.name().ends_with('#');

        let style = match (light.sounding, light.held) {
            (true, _) => Style::default().fg(Color::Black).bg(Color::Green),
            (false, true) => Style::default().fg(Color::Black).bg(Color::Yellow),
            _ if sharp => Style::default().fg(Color::White).bg(Color::DarkGray),
            _ => Style::default().fg(Color::Black).bg(Color::White),
        };

        let text = vec![
            Line::from(note.to_string()),
            Line::from(""),
            Line::from(KEYS[voice].to_ascii_uppercase().to_string())
                .style(Style::default().add_modifier(Modifier::BOLD)),
        ];
        let key = Paragraph::new(text)
            .centered()
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(key, *cell);
    }
}
