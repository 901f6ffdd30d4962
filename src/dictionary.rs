//! Grouped context dictionary and its flat, orderable editing form.
//!
//! Storage groups variables by category, but `order` is one ranking across
//! the whole dictionary, so the flat list can interleave categories freely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persist::{DictionaryStore, RowSink};
use crate::rows::{FlatEntry, RowCollection, RowContent, RowData};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    pub order: usize,
    pub enabled: bool,
    pub value: String,
}

/// category → key → entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedDictionary(BTreeMap<String, BTreeMap<String, DictEntry>>);

impl GroupedDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, key: impl Into<String>, entry: DictEntry) {
        self.0
            .entry(category.into())
            .or_default()
            .insert(key.into(), entry);
    }

    pub fn get(&self, category: &str, key: &str) -> Option<&DictEntry> {
        self.0.get(category)?.get(key)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of (category, key) pairs.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &DictEntry)> {
        self.0.iter().flat_map(|(category, keys)| {
            keys.iter()
                .map(move |(key, entry)| (category.as_str(), key.as_str(), entry))
        })
    }
}

/// Flatten into rows sorted by stored order. Gaps in the stored order are
/// closed and every row gets a fresh id. Equal orders fall back to category
/// name, then key name.
pub fn detach(grouped: &GroupedDictionary) -> Vec<RowData> {
    let mut flat: Vec<(&str, &str, &DictEntry)> = grouped.iter().collect();
    flat.sort_by_key(|(_, _, entry)| entry.order);
    flat.into_iter()
        .enumerate()
        .map(|(i, (category, key, entry))| {
            let content = RowContent {
                key: key.to_string(),
                value: entry.value.clone(),
                enabled: entry.enabled,
                category: Some(category.to_string()),
                private: false,
            };
            RowData::new(content, i)
        })
        .collect()
}

/// Regroup a flat list. Position in the list becomes `order`; when a
/// (category, key) pair repeats, the later entry wins. Rows without a category
/// land under `""`.
pub fn merge(flat: &[FlatEntry]) -> GroupedDictionary {
    let mut grouped = GroupedDictionary::new();
    for (order, entry) in flat.iter().enumerate() {
        grouped.insert(
            entry.category.clone().unwrap_or_default(),
            entry.key.clone(),
            DictEntry {
                order,
                enabled: entry.enabled,
                value: entry.value.clone(),
            },
        );
    }
    grouped
}

/// Row sink that writes edits back to a grouped store.
pub struct DictionarySink<S> {
    store: S,
}

impl<S: DictionaryStore> DictionarySink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: DictionaryStore> RowSink for DictionarySink<S> {
    fn save(&mut self, rows: &[FlatEntry]) -> Result<()> {
        let grouped = merge(rows);
        tracing::debug!(entries = grouped.len(), "saving context dictionary");
        self.store.save(&grouped)
    }
}

/// Load the context store into an editable collection whose edits are merged
/// back into the store.
///
/// Categories found in the store are appended after the configured ones.
pub fn open_context<S>(mut store: S, categories: &[String]) -> Result<RowCollection>
where
    S: DictionaryStore + 'static,
{
    let grouped = store.load()?;
    let mut all: Vec<String> = categories.to_vec();
    for category in grouped.categories() {
        if !all.iter().any(|c| c == category) {
            all.push(category.to_string());
        }
    }
    let rows = detach(&grouped);
    Ok(RowCollection::with_rows(rows, Box::new(DictionarySink::new(store))).with_categories(all))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::persist::MemoryDictionaryStore;
    use crate::rows::{FocusField, Slot};

    fn entry(order: usize, value: &str) -> DictEntry {
        DictEntry { order, enabled: true, value: value.to_string() }
    }

    fn sample() -> GroupedDictionary {
        let mut g = GroupedDictionary::new();
        g.insert("global", "host", entry(0, "example.com"));
        g.insert("local", "token", entry(1, "abc"));
        g.insert("global", "port", entry(2, "8080"));
        g
    }

    fn flat(category: &str, key: &str, value: &str) -> FlatEntry {
        RowData::new(RowContent::new(key, value).in_category(category), 0).to_entry()
    }

    #[test]
    fn test_detach_orders_across_categories() {
        let rows = detach(&sample());
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["host", "token", "port"]);
        assert_eq!(rows[1].category.as_deref(), Some("local"));
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.order, i);
        }
    }

    #[test]
    fn test_detach_closes_gaps() {
        let mut g = GroupedDictionary::new();
        g.insert("a", "x", entry(4, "1"));
        g.insert("b", "y", entry(9, "2"));
        let rows = detach(&g);
        assert_eq!(rows.iter().map(|r| r.order).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(rows[1].key, "y");
    }

    #[test]
    fn test_detach_breaks_order_ties_by_category_then_key() {
        let mut g = GroupedDictionary::new();
        g.insert("local", "token", entry(0, "abc"));
        g.insert("global", "port", entry(0, "8080"));
        g.insert("global", "host", entry(0, "example.com"));
        let rows = detach(&g);
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.category.as_deref().unwrap_or(""), r.key.as_str()))
            .collect();
        assert_eq!(pairs, vec![("global", "host"), ("global", "port"), ("local", "token")]);
    }

    #[test]
    fn test_detach_assigns_fresh_ids() {
        let g = sample();
        let first = detach(&g);
        let second = detach(&g);
        assert_ne!(first[0].id, second[0].id);
    }

    #[test]
    fn test_round_trip_preserves_tuples_and_ranking() {
        let g = sample();
        let rows = detach(&g);
        let entries: Vec<FlatEntry> = rows.iter().map(RowData::to_entry).collect();
        assert_eq!(merge(&entries), g);
    }

    #[test]
    fn test_round_trip_with_gaps_is_order_equivalent() {
        let mut g = GroupedDictionary::new();
        g.insert("a", "x", entry(3, "1"));
        g.insert("a", "y", entry(7, "2"));
        let entries: Vec<FlatEntry> = detach(&g).iter().map(RowData::to_entry).collect();
        let merged = merge(&entries);
        assert_eq!(merged.get("a", "x").unwrap().order, 0);
        assert_eq!(merged.get("a", "y").unwrap().order, 1);
    }

    #[test]
    fn test_merge_duplicate_key_last_write_wins() {
        let merged = merge(&[flat("A", "x", "1"), flat("A", "x", "2")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("A", "x").unwrap().value, "2");
    }

    #[test]
    fn test_merge_uses_list_position_as_order() {
        let merged = merge(&[flat("b", "y", "1"), flat("a", "x", "2")]);
        assert_eq!(merged.get("b", "y").unwrap().order, 0);
        assert_eq!(merged.get("a", "x").unwrap().order, 1);
    }

    #[test]
    fn test_merge_uncategorized_rows() {
        let entry = RowData::new(RowContent::new("k", "v"), 0).to_entry();
        let merged = merge(&[entry]);
        assert!(merged.get("", "k").is_some());
    }

    #[test]
    fn test_toml_shape_is_grouped_tables() {
        let text = toml::to_string(&sample()).unwrap();
        assert!(text.contains("[global.host]"));
        let back: GroupedDictionary = toml::from_str(&text).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_open_context_writes_edits_back() {
        let store = MemoryDictionaryStore::new(sample());
        let mut rows = open_context(store.clone(), &["env".to_string()]).unwrap();
        assert_eq!(rows.categories(), &["env", "global", "local"]);

        rows.edit(Slot::Placeholder, RowContent::new("user", "me"), FocusField::Value)
            .unwrap();
        rows.move_row(3, 0).unwrap();

        let saved = store.snapshot();
        assert_eq!(saved.len(), 4);
        assert_eq!(saved.get("env", "user").unwrap().order, 0);
        assert_eq!(saved.get("global", "host").unwrap().order, 1);
        assert_eq!(saved.get("global", "port").unwrap().order, 3);
    }
}
