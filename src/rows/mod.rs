//! The ordered, identity-stable row model shared by every key/value editor.

pub mod collection;
pub mod identity;
pub mod row;

pub use collection::{Edited, RowCollection, fix_order};
pub use identity::RowId;
pub use row::{FlatEntry, FocusField, FocusIntent, Row, RowContent, RowData, Slot};
