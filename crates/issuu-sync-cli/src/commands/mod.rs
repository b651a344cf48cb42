pub mod delete;
pub mod format;
pub mod list;
pub mod upload;
