pub mod editor;
pub mod mode;
