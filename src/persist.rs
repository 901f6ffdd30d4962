//! Narrow interfaces to the collaborators that own persistence.
//!
//! The core never waits on these: in-memory state is updated first and the
//! collaborator is called afterwards. Failures are returned to the caller
//! as-is and are never retried here.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::dictionary::GroupedDictionary;
use crate::domain::RowDomain;
use crate::error::{CoreError, Result};
use crate::rows::FlatEntry;

/// Receives the full ordered row list of one domain after every mutation.
pub trait RowSink {
    fn save(&mut self, rows: &[FlatEntry]) -> Result<()>;
}

impl<F> RowSink for F
where
    F: FnMut(&[FlatEntry]) -> Result<()>,
{
    fn save(&mut self, rows: &[FlatEntry]) -> Result<()> {
        self(rows)
    }
}

/// Discards every save.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RowSink for NullSink {
    fn save(&mut self, _rows: &[FlatEntry]) -> Result<()> {
        Ok(())
    }
}

/// Keeps every saved list in memory. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saves: Rc<RefCell<Vec<Vec<FlatEntry>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.borrow().len()
    }

    pub fn last(&self) -> Option<Vec<FlatEntry>> {
        self.saves.borrow().last().cloned()
    }
}

impl RowSink for MemorySink {
    fn save(&mut self, rows: &[FlatEntry]) -> Result<()> {
        self.saves.borrow_mut().push(rows.to_vec());
        Ok(())
    }
}

/// A save request queued for the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRows {
    pub domain: RowDomain,
    pub rows: Vec<FlatEntry>,
}

/// Fire-and-forget sink: hands the rows to whoever drains the channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    domain: RowDomain,
    tx: UnboundedSender<SaveRows>,
}

impl ChannelSink {
    pub fn new(domain: RowDomain, tx: UnboundedSender<SaveRows>) -> Self {
        Self { domain, tx }
    }
}

impl RowSink for ChannelSink {
    fn save(&mut self, rows: &[FlatEntry]) -> Result<()> {
        self.tx
            .send(SaveRows { domain: self.domain, rows: rows.to_vec() })
            .map_err(|_| CoreError::Closed)
    }
}

/// One element of a committed order, as sent to an order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub order: usize,
    pub identity: String,
}

/// Items that can be reported to an order store.
pub trait Identified {
    fn identity(&self) -> String;
}

/// Persists the order of a drag-reordered list (e.g. mock endpoints).
///
/// After every commit the full list is fetched again; the optimistic local
/// order is never trusted.
pub trait OrderStore<T> {
    fn commit(&mut self, items: &[OrderedItem]) -> Result<()>;
    fn fetch(&mut self) -> Result<Vec<T>>;
}

/// Backing store of the grouped context dictionary.
pub trait DictionaryStore {
    fn load(&mut self) -> Result<GroupedDictionary>;
    fn save(&mut self, dict: &GroupedDictionary) -> Result<()>;
}

/// In-memory dictionary store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionaryStore {
    inner: Rc<RefCell<GroupedDictionary>>,
}

impl MemoryDictionaryStore {
    pub fn new(dict: GroupedDictionary) -> Self {
        Self { inner: Rc::new(RefCell::new(dict)) }
    }

    pub fn snapshot(&self) -> GroupedDictionary {
        self.inner.borrow().clone()
    }
}

impl DictionaryStore for MemoryDictionaryStore {
    fn load(&mut self) -> Result<GroupedDictionary> {
        Ok(self.inner.borrow().clone())
    }

    fn save(&mut self, dict: &GroupedDictionary) -> Result<()> {
        *self.inner.borrow_mut() = dict.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::rows::{RowContent, RowData};

    fn entries() -> Vec<FlatEntry> {
        vec![RowData::new(RowContent::new("a", "1"), 0).to_entry()]
    }

    #[test]
    fn test_memory_sink_clones_share_history() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.save(&entries()).unwrap();
        assert_eq!(sink.save_count(), 1);
        assert_eq!(sink.last().unwrap()[0].key, "a");
    }

    #[test]
    fn test_channel_sink_queues_without_waiting() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(RowDomain::Header, tx);
        sink.save(&entries()).unwrap();
        let queued = rx.try_recv().unwrap();
        assert_eq!(queued.domain, RowDomain::Header);
        assert_eq!(queued.rows.len(), 1);
    }

    #[test]
    fn test_channel_sink_reports_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut sink = ChannelSink::new(RowDomain::Query, tx);
        assert!(matches!(sink.save(&entries()), Err(CoreError::Closed)));
    }

    #[test]
    fn test_closure_is_a_sink() {
        let mut seen = 0;
        let mut sink = |rows: &[FlatEntry]| {
            seen += rows.len();
            Ok::<(), CoreError>(())
        };
        sink.save(&entries()).unwrap();
        assert_eq!(seen, 1);
    }
}
