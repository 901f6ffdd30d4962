use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use mockdeck::domain::RowDomain;
use mockdeck::rows::{FocusField, Row, RowData};

use crate::state::editor::EditorState;
use crate::state::mode::Mode;
use crate::ui::layout::{ACCENT_BLUE, BORDER_INACTIVE};

const TEXT: Color = Color::Rgb(169, 177, 214);
const TEXT_MUTED: Color = Color::Rgb(86, 95, 137);
const SELECTED_BG: Color = Color::Rgb(41, 45, 62);
const DRAG_BG: Color = Color::Rgb(61, 89, 161);

const HANDLE_W: u16 = 2;
const CHECKBOX_W: u16 = 4;
const SEP_W: u16 = 1;

/// Where the rows ended up on screen, fed back to the drag engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowsLayout {
    pub container: Rect,
    /// Rendered real rows, keyed by their index in the full list.
    pub rows: Vec<(usize, Rect)>,
    /// Checkbox and text cells; only the handle column starts a drag.
    pub controls: Vec<Rect>,
    /// The trailing placeholder, selectable but never dragged.
    pub placeholder: Option<(usize, Rect)>,
}

impl RowsLayout {
    /// Selection index under row `y`; the placeholder answers `rows.len()`.
    pub fn row_at(&self, y: u16) -> Option<usize> {
        self.rows
            .iter()
            .chain(self.placeholder.iter())
            .find(|(_, r)| y >= r.y && y < r.y + r.height)
            .map(|(i, _)| *i)
    }
}

struct Columns {
    key_x: u16,
    key_w: u16,
    val_x: u16,
    val_w: u16,
}

fn columns(area: Rect) -> Columns {
    let rest = area.width.saturating_sub(HANDLE_W + CHECKBOX_W + SEP_W);
    let key_w = rest / 2;
    let key_x = area.x + HANDLE_W + CHECKBOX_W;
    Columns {
        key_x,
        key_w,
        val_x: key_x + key_w + SEP_W,
        val_w: rest - key_w,
    }
}

fn key_label(domain: RowDomain, row: &RowData) -> String {
    match (domain, &row.category) {
        (RowDomain::Context, Some(category)) => format!("[{category}] {}", row.key),
        _ => row.key.clone(),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &EditorState) -> RowsLayout {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT_BLUE))
        .title(format!(" {} ", state.domain.label()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut layout = RowsLayout { container: inner, ..Default::default() };
    if inner.width < HANDLE_W + CHECKBOX_W + 4 || inner.height < 1 {
        return layout;
    }
    let Some(rows) = state.rows() else {
        return layout;
    };
    let cols = columns(inner);
    let drop_line = state.dragging.map(|(_, target)| target);

    // Rows that pass the filter, then the placeholder, each with its index.
    let visible = state.visible_indices();
    let entries: Vec<(usize, Row)> = rows
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(index, row)| row.is_placeholder() || visible.binary_search(index).is_ok())
        .collect();

    // Scroll just far enough to keep the selection on screen.
    let height = usize::from(inner.height);
    let selected_pos = entries.iter().position(|(i, _)| *i == state.selected).unwrap_or(0);
    let skip = (selected_pos + 1).saturating_sub(height);

    let mut selected_y = None;
    for (y, (index, row)) in (inner.y..inner.y + inner.height).zip(entries.iter().skip(skip)) {
        let index = *index;
        let row_rect = Rect { x: inner.x, y, width: inner.width, height: 1 };
        let is_selected = index == state.selected;
        if is_selected {
            selected_y = Some(y);
        }

        match row {
            Row::Real(data) => {
                let is_dragged = state.dragging.is_some_and(|(source, _)| source == index);
                let bg = if is_dragged {
                    DRAG_BG
                } else if is_selected {
                    SELECTED_BG
                } else {
                    Color::Reset
                };
                let handle_style = if drop_line == Some(index) {
                    Style::default().fg(ACCENT_BLUE).bg(bg).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(TEXT_MUTED).bg(bg)
                };
                let (check, check_fg) = if data.enabled {
                    ("[✓] ", Color::Green)
                } else {
                    ("[ ] ", TEXT_MUTED)
                };
                let line = Line::from(vec![
                    Span::styled("⠿ ", handle_style),
                    Span::styled(check, Style::default().fg(check_fg).bg(bg)),
                    Span::styled(
                        pad(&key_label(state.domain, data), cols.key_w),
                        cell_style(state, is_selected, FocusField::Key, bg),
                    ),
                    Span::styled("│", Style::default().fg(BORDER_INACTIVE).bg(bg)),
                    Span::styled(
                        pad(&data.display_value(), cols.val_w),
                        cell_style(state, is_selected, FocusField::Value, bg),
                    ),
                ]);
                frame.render_widget(Paragraph::new(line), row_rect);

                layout.rows.push((index, row_rect));
                layout.controls.push(Rect {
                    x: inner.x + HANDLE_W,
                    y,
                    width: inner.width.saturating_sub(HANDLE_W),
                    height: 1,
                });
            }
            // Always present, never draggable.
            Row::Placeholder => {
                let bg = if is_selected { SELECTED_BG } else { Color::Reset };
                let hint = Style::default().fg(TEXT_MUTED).bg(bg).add_modifier(Modifier::DIM);
                let marker = if drop_line == Some(index) { "▔ " } else { "  " };
                let line = Line::from(vec![
                    Span::styled(marker, Style::default().fg(ACCENT_BLUE).bg(bg)),
                    Span::styled("[+] ", hint),
                    Span::styled(pad("key", cols.key_w), hint),
                    Span::styled("│", Style::default().fg(BORDER_INACTIVE).bg(bg)),
                    Span::styled(pad("value", cols.val_w), hint),
                ]);
                frame.render_widget(Paragraph::new(line), row_rect);
                layout.placeholder = Some((index, row_rect));
            }
        }
    }

    if let (Mode::Insert, Some(row_y)) = (state.mode, selected_y) {
        let text = state.selected_text();
        let offset = text.char_indices().take_while(|(i, _)| *i < state.cursor).count() as u16;
        let (cell_x, cell_w) = match state.column {
            FocusField::Key => (cols.key_x, cols.key_w),
            FocusField::Value => (cols.val_x, cols.val_w),
        };
        frame.set_cursor_position(Position {
            x: cell_x + offset.min(cell_w.saturating_sub(1)),
            y: row_y,
        });
    }

    layout
}

fn cell_style(state: &EditorState, is_selected: bool, field: FocusField, bg: Color) -> Style {
    let active = is_selected && state.column == field;
    let fg = if active { Color::White } else { TEXT };
    Style::default().fg(fg).bg(bg)
}

fn pad(text: &str, width: u16) -> String {
    let width = width as usize;
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use mockdeck::persist::NullSink;
    use mockdeck::rows::{RowCollection, RowContent};

    fn state(keys: &[&str]) -> EditorState {
        let rows = keys
            .iter()
            .enumerate()
            .map(|(i, k)| RowData::new(RowContent::new(*k, "v"), i))
            .collect();
        let mut tables = HashMap::new();
        tables.insert(RowDomain::Header, RowCollection::with_rows(rows, Box::new(NullSink)));
        EditorState::new(tables)
    }

    fn draw(state: &EditorState) -> (RowsLayout, String) {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let mut layout = RowsLayout::default();
        terminal
            .draw(|frame| {
                let area = frame.area();
                layout = render(frame, area, state);
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        (layout, text)
    }

    #[test]
    fn test_layout_lists_rendered_rows() {
        let (layout, text) = draw(&state(&["Accept", "X-Id"]));
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[0].0, 0);
        assert_eq!(layout.rows[1].1.y, layout.rows[0].1.y + 1);
        assert_eq!(layout.controls.len(), 2);
        assert!(text.contains("Accept"));
        assert!(text.contains("[+]"));
        let (index, rect) = layout.placeholder.unwrap();
        assert_eq!(index, 2);
        assert_eq!(layout.row_at(rect.y), Some(2));
    }

    #[test]
    fn test_filtered_rows_keep_real_indices() {
        let mut s = state(&["Accept", "X-Id", "X-Trace"]);
        s.filter = "trace".into();
        let (layout, _) = draw(&s);
        assert_eq!(layout.rows.len(), 1);
        assert_eq!(layout.rows[0].0, 2);
        assert_eq!(layout.row_at(layout.rows[0].1.y), Some(2));
    }

    #[test]
    fn test_grid_scrolls_to_keep_selection_visible() {
        let keys: Vec<String> = (0..10).map(|i| format!("k{i}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let mut s = state(&refs);
        s.selected = 10;
        let (layout, text) = draw(&s);

        // 6 inner rows: k5..k9 then the placeholder
        assert_eq!(layout.rows.first().map(|(i, _)| *i), Some(5));
        assert_eq!(layout.rows.last().map(|(i, _)| *i), Some(9));
        assert_eq!(layout.placeholder.map(|(i, _)| i), Some(10));
        assert!(!text.contains("k0"));

        s.selected = 0;
        let (layout, _) = draw(&s);
        assert_eq!(layout.rows.first().map(|(i, _)| *i), Some(0));
        assert!(layout.placeholder.is_none());
    }

    #[test]
    fn test_cursor_inside_multibyte_char_does_not_panic() {
        let mut s = state(&["é"]);
        s.mode = Mode::Insert;
        s.cursor = 1;
        let (layout, _) = draw(&s);
        assert_eq!(layout.rows.len(), 1);
    }

    #[test]
    fn test_pad_truncates_and_fills() {
        assert_eq!(pad("abcdef", 3), "abc");
        assert_eq!(pad("ab", 4), "ab  ");
    }
}
