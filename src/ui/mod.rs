pub mod layout;
pub mod preview;
pub mod rows_editor;
pub mod status_bar;
