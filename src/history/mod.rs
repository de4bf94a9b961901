use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::BunrenError,
    llm::Provider,
    persistence,
};

const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    Single,
    Challenge,
}

/// One checked sentence: what the student wrote and what the LLM answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub word: String,
    pub sentence: String,
    pub response: String,
    #[serde(default)]
    pub hint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub lang: String,
    pub provider: Provider,
    pub model: String,
    pub mode: HistoryMode,
    #[serde(default)]
    pub card_id: Option<u64>,
}

/// Appends an entry to the practice log.
pub fn append(entry: HistoryEntry) -> Result<(), BunrenError> {
    let mut entries: Vec<HistoryEntry> = persistence::load_json(HISTORY_FILE)?;
    entries.push(entry);
    persistence::save_json(&entries, HISTORY_FILE)
}

/// The most recent entries, newest first.
pub fn recent(limit: usize) -> Result<Vec<HistoryEntry>, BunrenError> {
    let entries: Vec<HistoryEntry> = persistence::load_json(HISTORY_FILE)?;
    Ok(entries.into_iter().rev().take(limit).collect())
}

pub fn clear() -> Result<(), BunrenError> {
    persistence::delete_data_file(HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_roundtrips_through_json() {
        let entry = HistoryEntry {
            word: "猫".to_string(),
            sentence: "猫がいる".to_string(),
            response: "✓\nThere is a cat.".to_string(),
            hint: None,
            created_at: Utc::now(),
            lang: "en".to_string(),
            provider: Provider::Gemini,
            model: "gemini-2.5-flash".to_string(),
            mode: HistoryMode::Single,
            card_id: Some(1_700_000_000_000),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let json = r#"{
            "word": "猫",
            "sentence": "猫がいる",
            "response": "✓",
            "created_at": "2026-08-29T12:00:00Z",
            "lang": "en",
            "provider": "openai",
            "model": "gpt-4o-mini",
            "mode": "challenge"
        }"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.mode, HistoryMode::Challenge);
        assert!(entry.hint.is_none());
        assert!(entry.card_id.is_none());
    }
}
