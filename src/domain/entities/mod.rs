pub mod display;
pub mod owner;
pub mod query;
pub mod table;
