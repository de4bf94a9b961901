pub mod errors;
pub mod models;

pub use errors::BunrenError;
pub use models::PracticeWord;
