mod controller;
mod words;

pub use controller::{Session, WritingSession};
pub use words::word_count;
