use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    anki::FieldMapping,
    core::BunrenError,
    llm::LlmConfig,
    persistence,
};

const SETTINGS_FILE: &str = "settings.json";

/// Persisted app configuration. Loaded once by the caller and handed to the
/// engines as plain arguments; nothing below this layer touches storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Field-role mappings keyed by note-type name. Created on first
    /// assignment for a note type, never auto-deleted.
    #[serde(default)]
    pub field_mappings: HashMap<String, FieldMapping>,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    /// Translation language for corrections ("en" or "es").
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "en".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings { field_mappings: HashMap::new(), llm: None, lang: default_lang() }
    }
}

impl Settings {
    pub fn load() -> Self {
        persistence::load_json_or_default(SETTINGS_FILE)
    }

    pub fn save(&self) -> Result<(), BunrenError> {
        persistence::save_json(self, SETTINGS_FILE)
    }

    /// First-run skeleton: an unset mapping per discovered note type, ready
    /// to be filled in by hand.
    pub fn with_note_types<I: IntoIterator<Item = String>>(note_types: I) -> Self {
        let field_mappings =
            note_types.into_iter().map(|name| (name, FieldMapping::default())).collect();
        Settings { field_mappings, ..Default::default() }
    }

    pub fn path() -> std::path::PathBuf {
        persistence::get_data_file_path(SETTINGS_FILE)
    }

    pub fn exists() -> bool {
        persistence::data_file_exists(SETTINGS_FILE)
    }

    pub fn mapping_for(&self, note_type: &str) -> Option<&FieldMapping> {
        self.field_mappings.get(note_type)
    }
}
