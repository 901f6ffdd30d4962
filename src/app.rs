use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use mockdeck::Result;
use mockdeck::domain::{RowDomain, rows_from_url};
use mockdeck::flags::{FlagStore, set_show_preview, show_preview};
use mockdeck::persist::SaveRows;
use mockdeck::reorder::{DragEngine, DragHooks, DragOutcome, Indexed, route_mouse};
use mockdeck::rows::{FocusField, RowData, RowId, Slot};
use mockdeck::storage::export_json;

use crate::event::Event;
use crate::state::editor::EditorState;
use crate::state::mode::Mode;
use crate::ui::rows_editor::RowsLayout;

/// Collects the outcome of one drag gesture so it can be applied to the
/// collection after the engine lets go of the row slice.
#[derive(Default)]
struct RowDrag {
    order: Option<Vec<RowId>>,
    dragged: Option<RowId>,
}

impl DragHooks<RowData> for RowDrag {
    fn drag_started(&mut self, item: &RowData) {
        tracing::debug!(id = %item.id, key = %item.key, "row drag started");
        self.dragged = Some(item.id);
    }

    fn committed(&mut self, items: Vec<Indexed<RowData>>) {
        self.order = Some(items.into_iter().map(|i| i.item.id).collect());
    }
}

pub struct App {
    pub state: EditorState,
    engine: DragEngine<RowData>,
    layout: RowsLayout,
    flags: Box<dyn FlagStore>,
    /// Row grabbed by the gesture in progress.
    grabbed: Option<RowId>,
    export_dir: Option<PathBuf>,
}

impl App {
    pub fn new(state: EditorState, flags: Box<dyn FlagStore>) -> Self {
        let mut state = state;
        state.show_preview = show_preview(flags.as_ref());
        Self {
            state,
            engine: DragEngine::default(),
            layout: RowsLayout::default(),
            flags,
            grabbed: None,
            export_dir: None,
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Feed the rendered geometry back so the next pointer event measures
    /// against what is actually on screen.
    pub fn apply_layout(&mut self, layout: RowsLayout) {
        self.engine.set_layout(layout.container, &layout.rows);
        self.engine.set_controls(layout.controls.clone());
        self.engine.set_filter_active(!self.state.filter.trim().is_empty());
        self.layout = layout;
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.state.dirty = true;
                match self.state.mode {
                    Mode::Normal => self.handle_normal_key(key),
                    Mode::Insert => self.handle_insert_key(key),
                    Mode::Filter => self.handle_filter_key(key),
                }
            }
            Event::Key(_) | Event::Tick => {}
            Event::Mouse(mouse) => {
                self.state.dirty = true;
                self.handle_mouse(mouse);
            }
            Event::Paste(text) => {
                self.state.dirty = true;
                self.handle_paste(&text);
            }
            Event::Resize(_, _) => self.state.dirty = true,
        }
    }

    /// Report a write that failed after the edit was already applied.
    pub fn save_failed(&mut self, save: &SaveRows, error: &mockdeck::CoreError) {
        tracing::error!(domain = save.domain.label(), error = %error, "persisting rows failed");
        self.state.status = Some(format!("could not save {}: {error}", save.domain.label()));
        self.state.dirty = true;
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        self.state.status = None;
        let selected = self.state.selected;
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Tab => self.switch_domain(self.state.domain.next()),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Left => self.state.select_column(FocusField::Key),
            KeyCode::Char('l') | KeyCode::Right => self.state.select_column(FocusField::Value),
            KeyCode::Char('i') | KeyCode::Enter => {
                self.state.mode = Mode::Insert;
                self.state.cursor = self.state.selected_text().len();
            }
            KeyCode::Char(' ') => {
                let result = self.with_rows(|rows| rows.toggle_enabled(selected));
                self.report(result);
            }
            // The grouped context store has nowhere to keep the flag.
            KeyCode::Char('p') if self.state.domain == RowDomain::Context => {
                self.state.status = Some(String::from("context variables cannot be private"));
            }
            KeyCode::Char('p') => {
                let private = self.state.rows().and_then(|r| r.get(selected)).map(|r| !r.private);
                if let Some(private) = private {
                    let result = self.with_rows(|rows| rows.set_private(selected, private));
                    self.report(result);
                }
            }
            KeyCode::Char('d') | KeyCode::Char('x') => {
                let result = self.with_rows(|rows| rows.remove(selected));
                self.report(result);
                self.state.select(self.state.selected);
            }
            KeyCode::Char('J') => self.move_selected(selected + 1),
            KeyCode::Char('K') if selected > 0 => self.move_selected(selected - 1),
            KeyCode::Char('c') => self.cycle_category(),
            KeyCode::Char('/') => self.state.mode = Mode::Filter,
            KeyCode::Char('P') => self.toggle_preview(),
            KeyCode::Char('E') => self.export(),
            KeyCode::Esc => match self.engine.cancel(&mut RowDrag::default()) {
                DragOutcome::Cancelled => self.state.dragging = None,
                _ => self.state.filter.clear(),
            },
            _ => {}
        }
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.state.mode = Mode::Normal,
            KeyCode::Tab => self.state.select_column(match self.state.column {
                FocusField::Key => FocusField::Value,
                FocusField::Value => FocusField::Key,
            }),
            KeyCode::Char(c) => self.edit_selected(|text, cursor| {
                text.insert(*cursor, c);
                *cursor += c.len_utf8();
            }),
            KeyCode::Backspace => self.edit_selected(|text, cursor| {
                if *cursor > 0 {
                    let prev = prev_char_boundary(text, *cursor);
                    text.drain(prev..*cursor);
                    *cursor = prev;
                }
            }),
            KeyCode::Delete => self.edit_selected(|text, cursor| {
                if *cursor < text.len() {
                    let next = next_char_boundary(text, *cursor);
                    text.drain(*cursor..next);
                }
            }),
            KeyCode::Left => {
                let text = self.state.selected_text();
                self.state.cursor = prev_char_boundary(&text, self.state.cursor);
            }
            KeyCode::Right => {
                let text = self.state.selected_text();
                self.state.cursor = next_char_boundary(&text, self.state.cursor);
            }
            KeyCode::Home => self.state.cursor = 0,
            KeyCode::End => self.state.cursor = self.state.selected_text().len(),
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.filter.clear();
                self.state.mode = Mode::Normal;
            }
            KeyCode::Enter => self.state.mode = Mode::Normal,
            KeyCode::Backspace => {
                self.state.filter.pop();
            }
            KeyCode::Char(c) => self.state.filter.push(c),
            _ => {}
        }
        // A drag measured against the unfiltered list would land wrongly.
        self.engine.set_filter_active(!self.state.filter.trim().is_empty());
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let items: Vec<RowData> = self.state.rows().map(|r| r.real_rows().to_vec()).unwrap_or_default();
        let mut hooks = RowDrag::default();
        let consumed = route_mouse(&mut self.engine, mouse, &items, &mut hooks);
        if hooks.dragged.is_some() {
            self.grabbed = hooks.dragged;
        }

        if let Some(order) = hooks.order {
            let result = self.with_rows(|rows| rows.apply_order(&order));
            self.report(result);
            self.select_row(self.grabbed);
        }
        if !self.engine.is_dragging() && matches!(mouse.kind, MouseEventKind::Up(_)) {
            self.grabbed = None;
        }
        self.state.dragging = self.engine.session().map(|s| (s.source_index, s.target_index));

        if !consumed && mouse.kind == MouseEventKind::Down(MouseButton::Left) {
            if let Some(index) = self.layout.row_at(mouse.row) {
                self.state.select(index);
            }
        }
    }

    /// Apply a text edit to the selected cell. Typing into the placeholder
    /// appends a row; focus then follows the new row.
    fn edit_selected<F>(&mut self, f: F)
    where
        F: FnOnce(&mut String, &mut usize),
    {
        let slot = self.state.selected_slot();
        let column = self.state.column;
        let mut content = self.state.selected_content();
        let mut cursor = floor_char_boundary(&self.state.selected_text(), self.state.cursor);
        let text = match column {
            FocusField::Key => &mut content.key,
            FocusField::Value => &mut content.value,
        };
        let before = text.clone();
        f(text, &mut cursor);
        let changed = *text != before;
        self.state.cursor = cursor;
        if !changed {
            return;
        }

        let Some(rows) = self.state.tables.get_mut(&self.state.domain) else {
            return;
        };
        let result = rows.edit(slot, content, column).map(|_| ());
        if let Some(intent) = rows.take_focus() {
            // Not `select`: the cursor stays where the edit left it.
            if let Some(pos) = rows.real_rows().iter().position(|r| r.id == intent.row) {
                self.state.selected = pos;
                self.state.column = intent.field;
            }
        }
        if let Err(e) = result {
            self.fail(e);
        }
    }

    /// Pasted text goes into the edited cell. A URL pasted over the query
    /// rows imports its parameters as new rows.
    fn handle_paste(&mut self, text: &str) {
        match self.state.mode {
            Mode::Insert => {
                let text: String = text.chars().filter(|c| !c.is_control()).collect();
                self.edit_selected(|cell, cursor| {
                    cell.insert_str(*cursor, &text);
                    *cursor += text.len();
                });
            }
            Mode::Filter => self.state.filter.push_str(text.trim()),
            Mode::Normal if self.state.domain == RowDomain::Query => self.import_query(text.trim()),
            Mode::Normal => {}
        }
    }

    fn import_query(&mut self, url: &str) {
        let params = rows_from_url(url);
        if params.is_empty() {
            self.state.status = Some(String::from("no query parameters in pasted text"));
            return;
        }
        let count = params.len();
        let Some(rows) = self.state.tables.get_mut(&self.state.domain) else {
            return;
        };
        let mut last = None;
        for content in params {
            let result = rows.edit(Slot::Placeholder, content, FocusField::Value).map(|_| ());
            if let Err(e) = result {
                self.fail(e);
                return;
            }
            last = rows.take_focus().map(|intent| intent.row);
        }
        tracing::debug!(count, "query parameters imported");
        self.select_row(last);
        self.state.status = Some(format!("imported {count} query parameters"));
    }

    fn move_selected(&mut self, to: usize) {
        let from = self.state.selected;
        if from >= self.state.row_count() {
            return;
        }
        let to = to.min(self.state.row_count().saturating_sub(1));
        let id = self.state.rows().and_then(|r| r.get(from)).map(|r| r.id);
        let result = self.with_rows(|rows| rows.move_row(from, to));
        self.report(result);
        self.select_row(id);
    }

    fn cycle_category(&mut self) {
        if self.state.domain != RowDomain::Context {
            return;
        }
        let selected = self.state.selected;
        let Some(rows) = self.state.rows() else {
            return;
        };
        let Some(row) = rows.get(selected) else {
            return;
        };
        let categories = rows.categories();
        if categories.is_empty() {
            return;
        }
        let current = row.category.as_deref().and_then(|c| categories.iter().position(|x| x == c));
        let next = current.map_or(0, |i| (i + 1) % categories.len());
        let mut content = row.content();
        content.category = Some(categories[next].clone());

        let result = self.with_rows(|rows| {
            rows.upsert(content, FocusField::Key, Some(selected)).map(|_| true)
        });
        self.report(result);
    }

    fn toggle_preview(&mut self) {
        self.state.show_preview = !self.state.show_preview;
        if let Err(e) = set_show_preview(self.flags.as_mut(), self.state.show_preview) {
            self.fail(e);
        }
    }

    fn export(&mut self) {
        let (Some(dir), Some(rows)) = (&self.export_dir, self.state.rows()) else {
            return;
        };
        match export_json(dir, self.state.domain, &rows.persisted()) {
            Ok(path) => self.state.status = Some(format!("exported to {}", path.display())),
            Err(e) => self.fail(e),
        }
    }

    fn switch_domain(&mut self, domain: RowDomain) {
        // Also drops a press that has not moved yet.
        self.engine.cancel(&mut RowDrag::default());
        self.grabbed = None;
        self.state.switch_domain(domain);
    }

    fn select_row(&mut self, id: Option<RowId>) {
        let Some(id) = id else { return };
        if let Some(pos) = self.state.rows().and_then(|r| r.real_rows().iter().position(|row| row.id == id)) {
            self.state.select(pos);
        }
    }

    fn with_rows<F>(&mut self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut mockdeck::rows::RowCollection) -> Result<bool>,
    {
        match self.state.rows_mut() {
            Some(rows) => f(rows),
            None => Ok(false),
        }
    }

    fn report(&mut self, result: Result<bool>) {
        if let Err(e) = result {
            self.fail(e);
        }
    }

    fn fail(&mut self, error: mockdeck::CoreError) {
        tracing::warn!(error = %error, "edit not persisted");
        self.state.status = Some(error.to_string());
    }
}

fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut p = pos.min(text.len());
    while !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    let mut p = pos.min(text.len()).saturating_sub(1);
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos + 1;
    while p < text.len() && !text.is_char_boundary(p) {
        p += 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crossterm::event::{KeyModifiers, MouseEvent};
    use ratatui::layout::Rect;

    use super::*;
    use mockdeck::flags::MemoryFlags;
    use mockdeck::persist::MemorySink;
    use mockdeck::rows::{RowCollection, RowContent};

    fn app(keys: &[&str]) -> (App, MemorySink) {
        let sink = MemorySink::new();
        let rows = keys
            .iter()
            .enumerate()
            .map(|(i, k)| RowData::new(RowContent::new(*k, "v"), i))
            .collect();
        let mut tables = HashMap::new();
        tables.insert(RowDomain::Header, RowCollection::with_rows(rows, Box::new(sink.clone())));
        let app = App::new(EditorState::new(tables), Box::new(MemoryFlags::default()));
        (app, sink)
    }

    fn key(app: &mut App, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn typed(app: &mut App, text: &str) {
        for c in text.chars() {
            key(app, KeyCode::Char(c));
        }
    }

    fn mouse(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
        app.handle_event(Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }));
    }

    fn keys(app: &App) -> Vec<String> {
        app.state.rows().unwrap().real_rows().iter().map(|r| r.key.clone()).collect()
    }

    fn stacked(n: usize) -> RowsLayout {
        let rows = (0..n).map(|i| (i, Rect::new(1, 1 + i as u16, 30, 1))).collect();
        let controls = (0..n).map(|i| Rect::new(3, 1 + i as u16, 28, 1)).collect();
        RowsLayout { container: Rect::new(1, 1, 30, 10), rows, controls, placeholder: None }
    }

    #[test]
    fn test_typing_into_placeholder_appends_row_and_keeps_focus() {
        let (mut app, sink) = app(&["Accept"]);
        key(&mut app, KeyCode::Char('j'));
        key(&mut app, KeyCode::Char('i'));
        typed(&mut app, "X-Id");

        assert_eq!(keys(&app), vec!["Accept", "X-Id"]);
        assert_eq!(app.state.selected, 1);
        assert_eq!(app.state.column, FocusField::Key);
        assert_eq!(app.state.cursor, 4);
        assert_eq!(sink.save_count(), 4);
    }

    #[test]
    fn test_toggle_and_delete() {
        let (mut app, _sink) = app(&["a", "b"]);
        key(&mut app, KeyCode::Char(' '));
        assert!(!app.state.rows().unwrap().get(0).unwrap().enabled);

        key(&mut app, KeyCode::Char('j'));
        key(&mut app, KeyCode::Char('d'));
        assert_eq!(keys(&app), vec!["a"]);
        assert_eq!(app.state.selected, 1);
    }

    #[test]
    fn test_shift_j_moves_row_and_selection() {
        let (mut app, _sink) = app(&["a", "b", "c"]);
        key(&mut app, KeyCode::Char('J'));
        assert_eq!(keys(&app), vec!["b", "a", "c"]);
        assert_eq!(app.state.selected, 1);
    }

    #[test]
    fn test_handle_drag_reorders_rows() {
        let (mut app, sink) = app(&["a", "b", "c"]);
        app.apply_layout(stacked(3));

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 1, 1);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 1, 4);
        assert_eq!(app.state.dragging, Some((0, 3)));
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 1, 4);

        assert_eq!(keys(&app), vec!["b", "c", "a"]);
        assert_eq!(app.state.selected, 2);
        assert_eq!(app.state.dragging, None);
        assert_eq!(sink.save_count(), 1);
    }

    #[test]
    fn test_click_on_cell_selects_without_dragging() {
        let (mut app, sink) = app(&["a", "b", "c"]);
        app.apply_layout(stacked(3));

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 2);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 10, 4);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 10, 4);

        assert_eq!(app.state.selected, 1);
        assert_eq!(keys(&app), vec!["a", "b", "c"]);
        assert_eq!(sink.save_count(), 0);
    }

    #[test]
    fn test_click_in_insert_mode_moves_cursor_to_clicked_cell() {
        let (mut app, _sink) = app(&["a", "é"]);
        app.apply_layout(stacked(2));
        key(&mut app, KeyCode::Char('i'));
        assert_eq!(app.state.cursor, 1);

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 2);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 10, 2);
        assert_eq!(app.state.selected, 1);
        assert_eq!(app.state.cursor, "é".len());

        typed(&mut app, "x");
        assert_eq!(keys(&app), vec!["a", "éx"]);
    }

    #[test]
    fn test_stale_cursor_inside_multibyte_char_is_floored() {
        let (mut app, _sink) = app(&["é"]);
        key(&mut app, KeyCode::Char('i'));
        app.state.cursor = 1;
        typed(&mut app, "x");
        assert_eq!(keys(&app), vec!["xé"]);
    }

    #[test]
    fn test_switching_domain_drops_unmoved_press() {
        let (mut app, header_sink) = app(&["a", "b", "c"]);
        let cookie_sink = MemorySink::new();
        let cookies = ["x", "y", "z"]
            .iter()
            .enumerate()
            .map(|(i, k)| RowData::new(RowContent::new(*k, "v"), i))
            .collect();
        app.state.tables.insert(
            RowDomain::Cookie,
            RowCollection::with_rows(cookies, Box::new(cookie_sink.clone())),
        );
        app.apply_layout(stacked(3));

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 1, 1);
        key(&mut app, KeyCode::Tab);
        assert_eq!(app.state.domain, RowDomain::Cookie);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 1, 4);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 1, 4);

        assert_eq!(keys(&app), vec!["x", "y", "z"]);
        assert_eq!(app.state.dragging, None);
        assert_eq!(cookie_sink.save_count(), 0);
        assert_eq!(header_sink.save_count(), 0);
    }

    #[test]
    fn test_context_rows_refuse_private() {
        let (mut app, _sink) = app(&[]);
        let sink = MemorySink::new();
        let rows = vec![RowData::new(RowContent::new("host", "a.test").in_category("global"), 0)];
        app.state.tables.insert(RowDomain::Context, RowCollection::with_rows(rows, Box::new(sink.clone())));
        app.state.switch_domain(RowDomain::Context);

        key(&mut app, KeyCode::Char('p'));
        assert!(!app.state.rows().unwrap().get(0).unwrap().private);
        assert_eq!(sink.save_count(), 0);
        assert!(app.state.status.is_some());
    }

    #[test]
    fn test_pasted_url_imports_query_rows() {
        let (mut app, _sink) = app(&[]);
        let sink = MemorySink::new();
        app.state.tables.insert(RowDomain::Query, RowCollection::new(Box::new(sink.clone())));
        app.state.switch_domain(RowDomain::Query);

        app.handle_event(Event::Paste("https://api.test/items?page=2&q=rust".into()));
        assert_eq!(keys(&app), vec!["page", "q"]);
        assert_eq!(app.state.selected, 1);
        assert_eq!(sink.save_count(), 2);

        app.handle_event(Event::Paste("not a url".into()));
        assert_eq!(keys(&app), vec!["page", "q"]);
    }

    #[test]
    fn test_paste_in_insert_mode_fills_cell() {
        let (mut app, _sink) = app(&["X-"]);
        key(&mut app, KeyCode::Char('i'));
        app.handle_event(Event::Paste("Trace\n".into()));
        assert_eq!(keys(&app), vec!["X-Trace"]);
        assert_eq!(app.state.cursor, "X-Trace".len());
    }

    #[test]
    fn test_escape_cancels_drag() {
        let (mut app, sink) = app(&["a", "b"]);
        app.apply_layout(stacked(2));
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 1, 1);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 1, 3);
        key(&mut app, KeyCode::Esc);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 1, 3);

        assert_eq!(keys(&app), vec!["a", "b"]);
        assert_eq!(sink.save_count(), 0);
    }

    #[test]
    fn test_preview_flag_round_trips_through_store() {
        let (mut app, _sink) = app(&[]);
        assert!(!app.state.show_preview);
        key(&mut app, KeyCode::Char('P'));
        assert!(app.state.show_preview);
        assert!(show_preview(app.flags.as_ref()));
    }

    #[test]
    fn test_export_reports_written_path() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _sink) = app(&["Accept"]);
        let mut app = app.with_export_dir(dir.path());
        key(&mut app, KeyCode::Char('E'));

        let path = dir.path().join("headers.json");
        assert!(path.exists());
        assert_eq!(app.state.status, Some(format!("exported to {}", path.display())));
    }

    #[test]
    fn test_char_boundaries_respect_multibyte() {
        let text = "aé";
        assert_eq!(next_char_boundary(text, 1), 3);
        assert_eq!(prev_char_boundary(text, 3), 1);
        assert_eq!(prev_char_boundary(text, 0), 0);
    }
}
