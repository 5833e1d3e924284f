//! On-screen keyboard - highlights the held key

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use monosynth::io::keyboard::{frequency_for_key, note_name, KEY_LAYOUT};

use super::state::{UiState, VoiceSnapshot};

const CELL_WIDTH: usize = 5;

fn is_sharp(index: usize) -> bool {
    note_name(index).is_some_and(|name| name.contains('#'))
}

/// Render the sixteen note keys with their note names and pitches
pub fn render_keys(frame: &mut Frame, area: Rect, state: &UiState, voice: &VoiceSnapshot) {
    let block = Block::default().title(" Keys ").borders(Borders::ALL);

    let cell_style = |index: usize| {
        let base = if is_sharp(index) {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Black).bg(Color::Gray)
        };
        if voice.key == Some(index) {
            base.bg(Color::LightCyan).add_modifier(Modifier::BOLD)
        } else {
            base
        }
    };

    let keys: Vec<Span> = KEY_LAYOUT
        .iter()
        .enumerate()
        .map(|(i, &c)| Span::styled(format!("{c:^CELL_WIDTH$}"), cell_style(i)))
        .collect();

    let names: Vec<Span> = (0..KEY_LAYOUT.len())
        .map(|i| {
            let name = note_name(i).unwrap_or("");
            Span::styled(format!("{name:^CELL_WIDTH$}"), cell_style(i))
        })
        .collect();

    let pitches: Vec<Span> = (0..KEY_LAYOUT.len())
        .map(|i| {
            let hz = frequency_for_key(i, state.base_frequency);
            Span::styled(
                format!("{:^CELL_WIDTH$}", format!("{hz:.0}")),
                Style::default().fg(Color::DarkGray),
            )
        })
        .collect();

    let paragraph = Paragraph::new(vec![Line::from(keys), Line::from(names), Line::from(pitches)])
        .block(block);
    frame.render_widget(paragraph, area);
}
