pub mod anki;
pub mod core;
pub mod correction;
pub mod history;
pub mod llm;
pub mod persistence;
pub mod settings;

pub use crate::core::{
    BunrenError,
    PracticeWord,
};
