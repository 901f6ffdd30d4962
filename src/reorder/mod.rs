//! Drag-and-drop reordering of ordered lists.

pub mod engine;
pub mod geometry;
pub mod list;
pub mod mouse;

pub use engine::{DragEngine, DragHooks, DragOutcome, DragSession, Indexed, NoCapture, PointerCapture, wrap};
pub use geometry::{ItemBounds, drop_index};
pub use list::{ReorderList, order_items};
pub use mouse::route_mouse;
