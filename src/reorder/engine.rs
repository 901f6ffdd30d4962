use std::fmt;
use std::mem;

use ratatui::layout::Rect;

use super::geometry::{ItemBounds, clamp_pointer, drop_index, landing_index};

/// An item paired with its position in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed<T> {
    pub index: usize,
    pub item: T,
}

/// Wrap `items` with their current positions.
pub fn wrap<T: Clone>(items: &[T]) -> Vec<Indexed<T>> {
    items
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, item)| Indexed { index, item })
        .collect()
}

/// Callbacks invoked by the engine during a drag.
pub trait DragHooks<T> {
    fn drag_started(&mut self, _item: &T) {}

    /// The new order, with `index` renumbered to `0..len`.
    fn committed(&mut self, items: Vec<Indexed<T>>);

    /// Called whenever a drag stops, committed or not.
    fn drag_ended(&mut self) {}
}

/// Global pointer listeners. Attached exactly when a drag starts and
/// detached exactly once when it ends.
pub trait PointerCapture {
    fn attach(&mut self);
    fn detach(&mut self);
}

/// Capture for surfaces that always receive pointer events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn attach(&mut self) {}
    fn detach(&mut self) {}
}

/// Live state of one drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub source_index: usize,
    /// Pointer distance from the container top, clamped to its height.
    pub pointer_offset: u16,
    /// Pointer distance from the dragged item's top edge at press time.
    pub grab_offset: u16,
    /// Insertion index in the list before removal, `0..=len`.
    pub target_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// No drag was in progress (including a press released without moving).
    Idle,
    Committed { from: usize, to: usize },
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Pressed { index: usize, grab_offset: u16 },
    Dragging(DragSession),
}

/// Pointer-driven reordering of any list.
///
/// Press on an item arms the engine; the first move starts the drag. While
/// dragging every move recomputes the drop index against the last rendered
/// layout of the full list. Release commits the reorder through the hooks.
pub struct DragEngine<T> {
    phase: Phase,
    snapshot: Vec<Indexed<T>>,
    container: Option<Rect>,
    bounds: Vec<ItemBounds>,
    /// Inputs and buttons inside rows; presses there never start a drag.
    controls: Vec<Rect>,
    filter_active: bool,
    capture: Box<dyn PointerCapture>,
}

impl<T> fmt::Debug for DragEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEngine")
            .field("phase", &self.phase)
            .field("container", &self.container)
            .field("bounds", &self.bounds)
            .field("filter_active", &self.filter_active)
            .finish_non_exhaustive()
    }
}

impl<T> Default for DragEngine<T> {
    fn default() -> Self {
        Self::new(Box::new(NoCapture))
    }
}

impl<T> DragEngine<T> {
    pub fn new(capture: Box<dyn PointerCapture>) -> Self {
        Self {
            phase: Phase::Idle,
            snapshot: Vec::new(),
            container: None,
            bounds: Vec::new(),
            controls: Vec::new(),
            filter_active: false,
            capture,
        }
    }

    /// Record the rendered layout: the container and one rect per item, keyed
    /// by the item's index in the full list.
    pub fn set_layout(&mut self, container: Rect, items: &[(usize, Rect)]) {
        self.bounds = items
            .iter()
            .map(|&(index, rect)| ItemBounds::from_rect(index, rect, container))
            .collect();
        self.container = Some(container);
    }

    pub fn clear_layout(&mut self) {
        self.container = None;
        self.bounds.clear();
    }

    pub fn set_controls(&mut self, controls: Vec<Rect>) {
        self.controls = controls;
    }

    /// While a filter hides items the rendered layout no longer matches the
    /// list, so drags are refused.
    pub fn set_filter_active(&mut self, active: bool) {
        self.filter_active = active;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            Phase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Index of the item being dragged, for highlighting.
    pub fn dragged_index(&self) -> Option<usize> {
        self.session().map(|s| s.source_index)
    }

    /// Pointer pressed at `(x, y)`. Returns `true` when the press landed on an
    /// item and armed a drag.
    pub fn press(&mut self, x: u16, y: u16) -> bool {
        if self.filter_active || !matches!(self.phase, Phase::Idle) {
            return false;
        }
        if self.controls.iter().any(|r| rect_contains(r, x, y)) {
            return false;
        }
        let Some(container) = self.container else {
            return false;
        };
        if !rect_contains(&container, x, y) {
            return false;
        }
        let offset = clamp_pointer(container, y);
        let Some(hit) = self.bounds.iter().find(|b| offset >= b.top && offset < b.bottom())
        else {
            return false;
        };
        self.phase = Phase::Pressed {
            index: hit.index,
            grab_offset: offset - hit.top,
        };
        true
    }

    /// Pointer moved to row `y`. The first move after a press starts the drag
    /// and snapshots `items`.
    pub fn pointer_moved<H>(&mut self, y: u16, items: &[T], hooks: &mut H)
    where
        T: Clone,
        H: DragHooks<T>,
    {
        match self.phase {
            Phase::Idle => {}
            Phase::Pressed { index, grab_offset } => {
                let Some(item) = items.get(index) else {
                    self.phase = Phase::Idle;
                    return;
                };
                self.snapshot = wrap(items);
                hooks.drag_started(item);
                self.capture.attach();
                tracing::debug!(index, "drag started");
                let mut session = DragSession {
                    source_index: index,
                    pointer_offset: 0,
                    grab_offset,
                    target_index: index,
                };
                self.track(&mut session, y);
                self.phase = Phase::Dragging(session);
            }
            Phase::Dragging(mut session) => {
                self.track(&mut session, y);
                self.phase = Phase::Dragging(session);
            }
        }
    }

    /// Pointer released. Commits the reorder when a drag was in progress and
    /// its state is complete.
    pub fn release<H: DragHooks<T>>(&mut self, hooks: &mut H) -> DragOutcome {
        let session = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging(session) => session,
            Phase::Idle | Phase::Pressed { .. } => return DragOutcome::Idle,
        };
        self.capture.detach();
        let mut items = mem::take(&mut self.snapshot);
        let source = session.source_index;

        let outcome = if self.container.is_none() || source >= items.len() {
            tracing::debug!(source, "drag discarded: incomplete state");
            DragOutcome::Cancelled
        } else {
            let to = landing_index(source, session.target_index, items.len());
            let moved = items.remove(source);
            items.insert(to, moved);
            for (i, entry) in items.iter_mut().enumerate() {
                entry.index = i;
            }
            tracing::debug!(from = source, to, "drag committed");
            hooks.committed(items);
            DragOutcome::Committed { from: source, to }
        };
        hooks.drag_ended();
        outcome
    }

    /// Abandon the gesture without committing.
    pub fn cancel<H: DragHooks<T>>(&mut self, hooks: &mut H) -> DragOutcome {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging(_) => {
                self.capture.detach();
                self.snapshot.clear();
                hooks.drag_ended();
                DragOutcome::Cancelled
            }
            Phase::Idle | Phase::Pressed { .. } => DragOutcome::Idle,
        }
    }

    fn track(&self, session: &mut DragSession, y: u16) {
        let Some(container) = self.container else {
            session.target_index = session.source_index;
            return;
        };
        session.pointer_offset = clamp_pointer(container, y);
        let top = session.pointer_offset.saturating_sub(session.grab_offset);
        session.target_index = drop_index(&self.bounds, session.source_index, top);
    }
}

impl<T> Drop for DragEngine<T> {
    fn drop(&mut self) {
        if self.is_dragging() {
            self.capture.detach();
        }
    }
}

fn rect_contains(rect: &Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}
