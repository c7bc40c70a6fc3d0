pub mod config;
pub mod draft;
pub mod history;
pub mod simulate;
pub mod write;

mod store;
mod terminal;
