pub mod dirs;
pub mod save;
