use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::editor::EditorState;
use crate::state::mode::Mode;

pub fn render(frame: &mut Frame, area: Rect, state: &EditorState) {
    let mode_color = match state.mode {
        Mode::Normal => Color::Rgb(122, 162, 247), // blue
        Mode::Insert => Color::Rgb(158, 206, 106), // green
        Mode::Filter => Color::Rgb(224, 175, 104), // orange
    };

    let mode_span = Span::styled(
        format!(" {} ", state.mode.label()),
        Style::default()
            .fg(Color::Black)
            .bg(mode_color)
            .add_modifier(Modifier::BOLD),
    );

    let mut spans = vec![mode_span];
    if state.mode == Mode::Filter || !state.filter.is_empty() {
        spans.push(Span::styled(
            format!(" /{} ", state.filter),
            Style::default().fg(Color::Rgb(224, 175, 104)),
        ));
    }
    let tail = match &state.status {
        Some(message) => Span::styled(format!("  {message}"), Style::default().fg(Color::Rgb(247, 118, 142))),
        None => Span::styled(
            "  · Tab:domain · i:edit · d:del · Space:toggle · J/K:move · /:filter · P:preview · E:export · q:quit",
            Style::default().fg(Color::Rgb(65, 72, 104)),
        ),
    };
    spans.push(tail);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
