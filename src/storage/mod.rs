pub mod context;
pub mod rows;

pub use context::TomlDictionaryStore;
pub use rows::{FileRowSink, export_json, load_rows, save_rows};
