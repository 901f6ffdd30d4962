use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use mockdeck::dictionary::merge;
use mockdeck::domain::{RowDomain, apply_query, cookie_header, enabled_pairs};

use crate::state::editor::EditorState;
use crate::ui::layout::BORDER_INACTIVE;

pub const PREVIEW_URL: &str = "https://api.example.test/v1/items";

/// What the current rows amount to once applied to a request.
pub fn preview_lines(state: &EditorState) -> Vec<String> {
    let Some(rows) = state.rows() else {
        return Vec::new();
    };
    let rows = rows.real_rows();
    match state.domain {
        RowDomain::Query => vec![apply_query(PREVIEW_URL, rows)],
        RowDomain::Header | RowDomain::Auth => enabled_pairs(rows)
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect(),
        RowDomain::Cookie => cookie_header(rows)
            .map(|c| vec![format!("Cookie: {c}")])
            .unwrap_or_default(),
        RowDomain::Context => {
            let entries: Vec<_> = rows.iter().map(|r| r.to_entry()).collect();
            toml::to_string_pretty(&merge(&entries))
                .map(|text| text.lines().map(str::to_string).collect())
                .unwrap_or_default()
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &EditorState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_INACTIVE))
        .title(" Preview ");
    let lines: Vec<Line> = preview_lines(state).into_iter().map(Line::from).collect();
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::Rgb(192, 202, 245)))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use mockdeck::persist::NullSink;
    use mockdeck::rows::{RowCollection, RowContent, RowData};

    fn state(domain: RowDomain, pairs: &[(&str, &str)]) -> EditorState {
        let rows = pairs
            .iter()
            .enumerate()
            .map(|(i, (k, v))| RowData::new(RowContent::new(*k, *v).in_category("global"), i))
            .collect();
        let mut tables = HashMap::new();
        tables.insert(domain, RowCollection::with_rows(rows, Box::new(NullSink)));
        let mut state = EditorState::new(tables);
        state.domain = domain;
        state
    }

    #[test]
    fn test_query_preview_is_url() {
        let s = state(RowDomain::Query, &[("page", "2")]);
        assert_eq!(preview_lines(&s), vec![format!("{PREVIEW_URL}?page=2")]);
    }

    #[test]
    fn test_header_preview_lines() {
        let s = state(RowDomain::Header, &[("Accept", "*/*"), ("X-Id", "7")]);
        assert_eq!(preview_lines(&s), vec!["Accept: */*", "X-Id: 7"]);
    }

    #[test]
    fn test_context_preview_is_grouped() {
        let s = state(RowDomain::Context, &[("host", "a.test")]);
        let lines = preview_lines(&s);
        assert!(lines.iter().any(|l| l == "[global.host]"));
    }
}
