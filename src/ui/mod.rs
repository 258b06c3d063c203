pub mod cells;
pub mod state;
