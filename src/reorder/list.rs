use ratatui::layout::Rect;

use crate::error::Result;
use crate::persist::{Identified, OrderStore, OrderedItem};

use super::engine::{DragEngine, DragHooks, DragOutcome, Indexed, PointerCapture};

/// Order-store payload for a committed list.
pub fn order_items<T: Identified>(items: &[Indexed<T>]) -> Vec<OrderedItem> {
    items
        .iter()
        .map(|i| OrderedItem { order: i.index, identity: i.item.identity() })
        .collect()
}

struct Collect<T>(Option<Vec<Indexed<T>>>);

impl<T> DragHooks<T> for Collect<T> {
    fn committed(&mut self, items: Vec<Indexed<T>>) {
        self.0 = Some(items);
    }
}

/// A drag-reorderable list whose order lives in an external store, such as
/// the endpoint list of a mock server.
pub struct ReorderList<T> {
    items: Vec<T>,
    engine: DragEngine<T>,
    store: Box<dyn OrderStore<T>>,
}

impl<T: Clone + Identified> ReorderList<T> {
    pub fn load(mut store: Box<dyn OrderStore<T>>, capture: Box<dyn PointerCapture>) -> Result<Self> {
        let items = store.fetch()?;
        Ok(Self {
            items,
            engine: DragEngine::new(capture),
            store,
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn engine(&self) -> &DragEngine<T> {
        &self.engine
    }

    pub fn set_layout(&mut self, container: Rect, items: &[(usize, Rect)]) {
        self.engine.set_layout(container, items);
    }

    pub fn press(&mut self, x: u16, y: u16) -> bool {
        self.engine.press(x, y)
    }

    pub fn pointer_moved(&mut self, y: u16) {
        let mut hooks = Collect(None);
        self.engine.pointer_moved(y, &self.items, &mut hooks);
    }

    /// Finish the gesture. A committed order is sent to the store and the list
    /// is then refetched; store errors are returned unchanged.
    pub fn release(&mut self) -> Result<DragOutcome> {
        let mut hooks = Collect(None);
        let outcome = self.engine.release(&mut hooks);
        if let Some(committed) = hooks.0 {
            let order = order_items(&committed);
            self.items = committed.into_iter().map(|i| i.item).collect();
            self.store.commit(&order)?;
            self.items = self.store.fetch()?;
        }
        Ok(outcome)
    }

    pub fn cancel(&mut self) -> DragOutcome {
        self.engine.cancel(&mut Collect(None))
    }
}
