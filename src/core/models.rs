use serde::{
    Deserialize,
    Serialize,
};

/// One word pulled from the user's collection for practice.
///
/// Produced one-to-one from a card, but at most one per underlying note:
/// a note may render as several cards and practicing the same word twice
/// in one session is pointless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeWord {
    pub card_id: u64,
    pub word: String,
    pub meaning: String,
    pub reading: String,
}
