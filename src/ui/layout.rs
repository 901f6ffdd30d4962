use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use mockdeck::domain::RowDomain;

use super::{preview, rows_editor, rows_editor::RowsLayout, status_bar};
use crate::state::editor::EditorState;

// TokyoNight palette
pub const ACCENT_BLUE: Color = Color::Rgb(122, 162, 247); // #7aa2f7
pub const BORDER_INACTIVE: Color = Color::Rgb(65, 72, 104); // #414868

/// Draw the whole screen and report where the rows landed.
pub fn render(frame: &mut Frame, state: &EditorState) -> RowsLayout {
    let area = frame.area();

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_domain_tabs(frame, vertical[0], state);

    let editor_area = if state.show_preview {
        let horiz = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(vertical[1]);
        preview::render(frame, horiz[1], state);
        horiz[0]
    } else {
        vertical[1]
    };

    let layout = rows_editor::render(frame, editor_area, state);
    status_bar::render(frame, vertical[2], state);
    layout
}

fn render_domain_tabs(frame: &mut Frame, area: Rect, state: &EditorState) {
    let spans: Vec<Span> = RowDomain::ALL
        .iter()
        .map(|domain| {
            let style = if *domain == state.domain {
                Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(BORDER_INACTIVE)
            };
            Span::styled(format!(" {} ", domain.label()), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
