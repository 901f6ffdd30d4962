use std::collections::HashSet;
use std::fmt;

use crate::error::Result;
use crate::persist::{NullSink, RowSink};

use super::identity::RowId;
use super::row::{FlatEntry, FocusField, FocusIntent, Row, RowContent, RowData, Slot};

/// Result of a mutation: the new ordered rows and where focus should go.
#[derive(Debug)]
pub struct Edited<'a> {
    pub rows: &'a [RowData],
    pub focus: Option<FocusIntent>,
}

/// Ordered rows of one editing surface (query, headers, cookies, auth or
/// context variables).
///
/// After every mutation `rows[i].order == i`, ids are unique, and the full
/// list (without ids) is handed to the sink.
pub struct RowCollection {
    rows: Vec<RowData>,
    /// Allowed categories; the first one is the default for new rows.
    categories: Vec<String>,
    pending_focus: Option<FocusIntent>,
    sink: Box<dyn RowSink>,
}

impl fmt::Debug for RowCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowCollection")
            .field("rows", &self.rows)
            .field("categories", &self.categories)
            .field("pending_focus", &self.pending_focus)
            .finish_non_exhaustive()
    }
}

impl Default for RowCollection {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl RowCollection {
    pub fn new(sink: Box<dyn RowSink>) -> Self {
        Self {
            rows: Vec::new(),
            categories: Vec::new(),
            pending_focus: None,
            sink,
        }
    }

    /// Adopt already-identified rows, renumbering them by position.
    pub fn with_rows(mut rows: Vec<RowData>, sink: Box<dyn RowSink>) -> Self {
        fix_order(&mut rows);
        Self { rows, ..Self::new(sink) }
    }

    /// Rebuild rows from their persisted shape. Stored order decides the
    /// sequence; every row gets a fresh id.
    pub fn from_entries(mut entries: Vec<FlatEntry>, sink: Box<dyn RowSink>) -> Self {
        entries.sort_by_key(|e| e.order);
        let rows = entries
            .iter()
            .enumerate()
            .map(|(i, e)| RowData::new(e.content(), i))
            .collect();
        Self::with_rows(rows, sink)
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn default_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RowData> {
        self.rows.get(index)
    }

    pub fn real_rows(&self) -> &[RowData] {
        &self.rows
    }

    /// Rows as presented: every real row, then the trailing placeholder.
    pub fn rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .cloned()
            .map(Row::Real)
            .chain(std::iter::once(Row::Placeholder))
            .collect()
    }

    /// The list handed to the persistence collaborator.
    pub fn persisted(&self) -> Vec<FlatEntry> {
        self.rows.iter().map(RowData::to_entry).collect()
    }

    /// Consume the pending focus intent, if any. A second call returns `None`.
    pub fn take_focus(&mut self) -> Option<FocusIntent> {
        self.pending_focus.take()
    }

    /// Working copy for the next mutation. Clears any pending focus so only the
    /// row touched by that mutation can claim focus.
    pub fn copy_for_mutation(&mut self) -> Vec<RowData> {
        self.pending_focus = None;
        self.rows.clone()
    }

    /// Replace the row at `target_index` in place, or append a new row when the
    /// index is absent or out of range.
    pub fn upsert(
        &mut self,
        content: RowContent,
        focus_target: FocusField,
        target_index: Option<usize>,
    ) -> Result<Edited<'_>> {
        let mut rows = self.copy_for_mutation();
        let focus = match target_index.filter(|&i| i < rows.len()) {
            Some(index) => {
                rows[index].replace_content(content);
                tracing::trace!(index, "row updated in place");
                None
            }
            None => {
                let content = self.categorize(content);
                let row = RowData::new(content, rows.len());
                let intent = FocusIntent { row: row.id, field: focus_target };
                tracing::debug!(id = %row.id, index = rows.len(), "row appended");
                rows.push(row);
                Some(intent)
            }
        };
        fix_order(&mut rows);
        self.rows = rows;
        self.pending_focus = focus;
        self.persist()?;
        Ok(Edited { rows: &self.rows, focus })
    }

    /// Edit either a real row or the trailing placeholder. The placeholder is
    /// not a member of the collection, so editing it always appends.
    pub fn edit(
        &mut self,
        slot: Slot,
        content: RowContent,
        focus_target: FocusField,
    ) -> Result<Edited<'_>> {
        match slot {
            Slot::Row(index) => self.upsert(content, focus_target, Some(index)),
            Slot::Placeholder => self.upsert(content, focus_target, None),
        }
    }

    /// Remove the row at `target_index`. Out-of-range indices are ignored and
    /// report `false`.
    pub fn remove(&mut self, target_index: usize) -> Result<bool> {
        if target_index >= self.rows.len() {
            return Ok(false);
        }
        let mut rows = self.copy_for_mutation();
        let removed = rows.remove(target_index);
        tracing::debug!(id = %removed.id, index = target_index, "row removed");
        fix_order(&mut rows);
        self.rows = rows;
        self.persist()?;
        Ok(true)
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<bool> {
        let Some(row) = self.rows.get(index) else {
            return Ok(false);
        };
        let mut content = row.content();
        content.enabled = enabled;
        self.upsert(content, FocusField::Key, Some(index))?;
        Ok(true)
    }

    pub fn toggle_enabled(&mut self, index: usize) -> Result<bool> {
        match self.rows.get(index).map(|r| r.enabled) {
            Some(enabled) => self.set_enabled(index, !enabled),
            None => Ok(false),
        }
    }

    pub fn set_private(&mut self, index: usize, private: bool) -> Result<bool> {
        let Some(row) = self.rows.get(index) else {
            return Ok(false);
        };
        let mut content = row.content();
        content.private = private;
        self.upsert(content, FocusField::Value, Some(index))?;
        Ok(true)
    }

    /// Move one row, keeping every id. `to` is the row's final index and is
    /// clamped to the end of the list.
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<bool> {
        if from >= self.rows.len() {
            return Ok(false);
        }
        let mut rows = self.copy_for_mutation();
        let row = rows.remove(from);
        let to = to.min(rows.len());
        rows.insert(to, row);
        fix_order(&mut rows);
        self.rows = rows;
        self.persist()?;
        Ok(true)
    }

    /// Apply a committed reorder given as the complete sequence of row ids.
    ///
    /// Anything other than a permutation of the current ids is stale and is
    /// ignored.
    pub fn apply_order(&mut self, ids: &[RowId]) -> Result<bool> {
        if ids.len() != self.rows.len() {
            return Ok(false);
        }
        let unique: HashSet<&RowId> = ids.iter().collect();
        if unique.len() != ids.len() {
            return Ok(false);
        }
        let mut rows = self.copy_for_mutation();
        let mut reordered = Vec::with_capacity(rows.len());
        for id in ids {
            let Some(pos) = rows.iter().position(|r| r.id == *id) else {
                return Ok(false);
            };
            reordered.push(rows.swap_remove(pos));
        }
        fix_order(&mut reordered);
        self.rows = reordered;
        tracing::debug!(rows = self.rows.len(), "row order applied");
        self.persist()?;
        Ok(true)
    }

    fn categorize(&self, mut content: RowContent) -> RowContent {
        if content.category.is_none() {
            content.category = self.default_category().map(str::to_string);
        }
        content
    }

    fn persist(&mut self) -> Result<()> {
        let entries = self.persisted();
        self.sink.save(&entries).inspect_err(|e| {
            tracing::warn!(error = %e, "saving rows failed");
        })
    }
}

/// Set `order` to the position of every row.
pub fn fix_order(rows: &mut [RowData]) {
    for (i, row) in rows.iter_mut().enumerate() {
        row.order = i;
    }
}
