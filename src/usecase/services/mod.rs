pub mod catalog;
pub mod composer;
pub mod debounce;
pub mod export;
pub mod prober;
