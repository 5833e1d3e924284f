//! Status bar - held note, pitch, envelope stage and level

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use monosynth::{dsp::EnvelopeStage, io::keyboard::note_name};

use super::state::{UiState, VoiceSnapshot};

fn stage_color(stage: EnvelopeStage) -> Color {
    match stage {
        EnvelopeStage::Idle => Color::DarkGray,
        EnvelopeStage::Attack => Color::LightRed,
        EnvelopeStage::Decay => Color::LightYellow,
        EnvelopeStage::Sustain => Color::LightGreen,
        EnvelopeStage::Release => Color::LightBlue,
    }
}

/// Render the status bar
pub fn render_status(frame: &mut Frame, area: Rect, state: &UiState, voice: &VoiceSnapshot) {
    let block = Block::default().title(" monosynth ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(24)])
        .split(inner);

    let note = voice
        .key
        .and_then(note_name)
        .map(|name| format!("{name:<4}"))
        .unwrap_or_else(|| "--  ".to_string());

    let layers = state
        .layers
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join("+");

    let line = Line::from(vec![
        Span::styled(format!(" {note} "), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{:>8.2} Hz  ", voice.frequency),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:<8}", format!("{:?}", voice.stage)),
            Style::default().fg(stage_color(voice.stage)),
        ),
        Span::styled(
            format!("  {layers}  "),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("{:.1}s  {:.1}kHz", voice.time, state.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), columns[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(stage_color(voice.stage)))
        .ratio(voice.level.clamp(0.0, 1.0))
        .label(format!("{:.2}", voice.level));
    frame.render_widget(gauge, columns[1]);
}
