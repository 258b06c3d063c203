pub mod entities;
pub mod messages;
pub mod pagination;
