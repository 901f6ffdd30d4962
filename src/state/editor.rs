use std::collections::HashMap;

use mockdeck::domain::RowDomain;
use mockdeck::filter::{fuzzy, project_indexed};
use mockdeck::rows::{FocusField, RowCollection, RowContent, Slot};

use super::mode::Mode;

/// Everything the renderer needs. Mutated only by `App`.
#[derive(Debug)]
pub struct EditorState {
    pub domain: RowDomain,
    pub tables: HashMap<RowDomain, RowCollection>,
    pub mode: Mode,
    /// Selected row; `rows().len()` selects the placeholder.
    pub selected: usize,
    pub column: FocusField,
    /// Byte cursor within the edited cell.
    pub cursor: usize,
    pub filter: String,
    pub show_preview: bool,
    /// Row being dragged and its current drop index.
    pub dragging: Option<(usize, usize)>,
    pub status: Option<String>,
    pub should_quit: bool,
    /// Set whenever visible state changes; idle ticks skip the redraw.
    pub dirty: bool,
}

impl EditorState {
    pub fn new(tables: HashMap<RowDomain, RowCollection>) -> Self {
        Self {
            domain: RowDomain::default(),
            tables,
            mode: Mode::Normal,
            selected: 0,
            column: FocusField::Key,
            cursor: 0,
            filter: String::new(),
            show_preview: false,
            dragging: None,
            status: None,
            should_quit: false,
            dirty: true,
        }
    }

    pub fn rows(&self) -> Option<&RowCollection> {
        self.tables.get(&self.domain)
    }

    pub fn rows_mut(&mut self) -> Option<&mut RowCollection> {
        self.tables.get_mut(&self.domain)
    }

    pub fn row_count(&self) -> usize {
        self.rows().map_or(0, RowCollection::len)
    }

    pub fn selected_slot(&self) -> Slot {
        if self.selected < self.row_count() {
            Slot::Row(self.selected)
        } else {
            Slot::Placeholder
        }
    }

    /// Content of the selected slot; the placeholder starts blank.
    pub fn selected_content(&self) -> RowContent {
        match self.selected_slot() {
            Slot::Row(i) => self
                .rows()
                .and_then(|rows| rows.get(i))
                .map(|row| row.content())
                .unwrap_or_default(),
            Slot::Placeholder => RowContent::default(),
        }
    }

    pub fn selected_text(&self) -> String {
        let content = self.selected_content();
        match self.column {
            FocusField::Key => content.key,
            FocusField::Value => content.value,
        }
    }

    /// Indices of the rows that pass the filter, in list order.
    pub fn visible_indices(&self) -> Vec<usize> {
        let Some(rows) = self.rows() else {
            return Vec::new();
        };
        project_indexed(rows.real_rows(), fuzzy(&self.filter))
            .into_iter()
            .map(|i| i.index)
            .collect()
    }

    /// Selectable positions: the visible rows, then the placeholder.
    fn stops(&self) -> Vec<usize> {
        let mut stops = self.visible_indices();
        stops.push(self.row_count());
        stops
    }

    /// Move the selection; the cursor goes to the end of the newly selected
    /// cell so it never points into another row's text.
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.row_count());
        self.cursor = self.selected_text().len();
    }

    pub fn select_column(&mut self, column: FocusField) {
        self.column = column;
        self.cursor = self.selected_text().len();
    }

    pub fn select_next(&mut self) {
        let stops = self.stops();
        if let Some(&next) = stops.iter().find(|&&i| i > self.selected) {
            self.select(next);
        }
    }

    pub fn select_prev(&mut self) {
        let stops = self.stops();
        if let Some(&prev) = stops.iter().rev().find(|&&i| i < self.selected) {
            self.select(prev);
        }
    }

    pub fn switch_domain(&mut self, domain: RowDomain) {
        self.domain = domain;
        self.column = FocusField::Key;
        self.filter.clear();
        self.dragging = None;
        self.mode = Mode::Normal;
        self.select(0);
    }
}
