use std::{
    collections::HashMap,
    time::Duration,
};

use tokio::time::sleep;

use crate::anki::api::{
    AnkiClient,
    Field,
};

pub mod api;
pub mod query;
pub mod sampler;


/// Which raw note fields play the word/meaning/reading roles for one note
/// type. An empty string means the role is unset.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FieldMapping {
    pub word_field: String,
    pub meaning_field: String,
    pub reading_field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
    pub word: String,
    pub meaning: String,
    pub reading: String,
}

fn field_value(fields: &HashMap<String, Field>, name: &str) -> String {
    fields.get(name).map(|f| f.value.clone()).unwrap_or_default()
}

/// Resolves a card's raw fields into the three semantic strings.
///
/// The word role falls back to the note type's first-declared field (smallest
/// `order`) when no mapping assigns it. Meaning and reading come only from
/// the mapping; there is no sensible positional guess for those.
pub fn resolve_fields(
    fields: &HashMap<String, Field>,
    mapping: Option<&FieldMapping>,
) -> ResolvedFields {
    let word = match mapping {
        Some(m) if !m.word_field.is_empty() => field_value(fields, &m.word_field),
        _ => fields
            .values()
            .min_by_key(|f| f.order)
            .map(|f| f.value.clone())
            .unwrap_or_default(),
    };

    let meaning = match mapping {
        Some(m) if !m.meaning_field.is_empty() => field_value(fields, &m.meaning_field),
        _ => String::new(),
    };

    let reading = match mapping {
        Some(m) if !m.reading_field.is_empty() => field_value(fields, &m.reading_field),
        _ => String::new(),
    };

    ResolvedFields { word, meaning, reading }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<String>,
}

/// Note types with their field and card template names, fetched
/// concurrently. Feeds the mapping setup flow so users can see what a role
/// or a `--card` filter can be assigned to.
pub async fn models_with_fields(client: &AnkiClient) -> Result<Vec<Model>, crate::BunrenError> {
    let names = client.model_names().await?;

    let futures: Vec<_> = names
        .into_iter()
        .map(|name| async move {
            let fields = client.model_field_names(&name).await?;
            let templates = client.model_template_names(&name).await?;
            Ok::<Model, crate::BunrenError>(Model { name, fields, templates })
        })
        .collect();

    futures::future::join_all(futures).await.into_iter().collect()
}

/// Polls AnkiConnect until it responds, e.g. while Anki is still starting.
pub async fn wait_awake(client: &AnkiClient, wait_secs: u64, max_attempts: u32) -> bool {
    for attempt in 1..=max_attempts {
        match client.version().await {
            Ok(version) => {
                println!("AnkiConnect is online. Version: {}", version);
                return true;
            }
            Err(err) => {
                println!(
                    "AnkiConnect attempt {} of {} failed. Retrying in {} seconds... Error: {}",
                    attempt, max_attempts, wait_secs, err
                );
                if attempt < max_attempts {
                    sleep(Duration::from_secs(wait_secs)).await;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str, u32)]) -> HashMap<String, Field> {
        pairs
            .iter()
            .map(|(name, value, order)| {
                (name.to_string(), Field { value: value.to_string(), order: *order })
            })
            .collect()
    }

    fn mapping(word: &str, meaning: &str, reading: &str) -> FieldMapping {
        FieldMapping {
            word_field: word.to_string(),
            meaning_field: meaning.to_string(),
            reading_field: reading.to_string(),
        }
    }

    #[test]
    fn no_mapping_falls_back_to_first_field_by_order() {
        let fields = fields(&[("Kanji", "猫", 0), ("Meaning", "cat", 1)]);
        let resolved = resolve_fields(&fields, None);

        assert_eq!(resolved.word, "猫");
        assert_eq!(resolved.meaning, "");
        assert_eq!(resolved.reading, "");
    }

    #[test]
    fn fallback_picks_smallest_order_not_map_order() {
        // HashMap iteration order must not leak into the result.
        let fields = fields(&[("Z", "z-value", 2), ("A", "a-value", 1), ("M", "m-value", 0)]);
        let resolved = resolve_fields(&fields, None);

        assert_eq!(resolved.word, "m-value");
    }

    #[test]
    fn mapping_resolves_all_assigned_roles() {
        let fields = fields(&[("Kanji", "猫", 0), ("Meaning", "cat", 1)]);
        let resolved = resolve_fields(&fields, Some(&mapping("Kanji", "Meaning", "")));

        assert_eq!(resolved, ResolvedFields {
            word: "猫".to_string(),
            meaning: "cat".to_string(),
            reading: "".to_string(),
        });
    }

    #[test]
    fn mapped_word_field_missing_from_card_resolves_empty() {
        let fields = fields(&[("Kanji", "猫", 0)]);
        let resolved = resolve_fields(&fields, Some(&mapping("Expression", "", "")));

        // No positional fallback once the role is explicitly assigned.
        assert_eq!(resolved.word, "");
    }

    #[test]
    fn unset_word_role_in_mapping_still_falls_back() {
        let fields = fields(&[("Kanji", "猫", 0), ("Reading", "ねこ", 1)]);
        let resolved = resolve_fields(&fields, Some(&mapping("", "", "Reading")));

        assert_eq!(resolved.word, "猫");
        assert_eq!(resolved.reading, "ねこ");
    }

    #[test]
    fn meaning_and_reading_never_fall_back_positionally() {
        let fields = fields(&[("Kanji", "猫", 0), ("Meaning", "cat", 1)]);
        let resolved = resolve_fields(&fields, Some(&mapping("Kanji", "Glossary", "Kana")));

        assert_eq!(resolved.word, "猫");
        assert_eq!(resolved.meaning, "");
        assert_eq!(resolved.reading, "");
    }

    #[test]
    fn empty_field_map_resolves_all_empty() {
        let resolved = resolve_fields(&HashMap::new(), None);
        assert_eq!(resolved.word, "");
    }
}
