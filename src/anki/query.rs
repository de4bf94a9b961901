/// Filter criteria for selecting review cards. Every field is independently
/// optional; the zero value of each means "don't filter on this".
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Filters {
    pub deck: String,
    pub note_type: String,
    pub card_types: Vec<String>,
    /// Minimum review interval in days, 0 = unbounded.
    pub min_interval: u32,
    /// Maximum review interval in days, 0 = unbounded.
    pub max_interval: u32,
    /// Only cards reviewed within the last N days, 0 = unbounded.
    pub rated_days: u32,
}

/// Builds an Anki search query from the filters.
///
/// Clauses are space-joined (implicit AND). With nothing set this returns
/// `deck:current` so the query is never empty.
pub fn build_query(filters: &Filters) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !filters.deck.is_empty() {
        parts.push(format!("deck:\"{}\"", filters.deck));
    }
    if !filters.note_type.is_empty() {
        parts.push(format!("note:\"{}\"", filters.note_type));
    }
    if !filters.card_types.is_empty() {
        let card_query = filters
            .card_types
            .iter()
            .map(|card_type| format!("card:\"{}\"", card_type))
            .collect::<Vec<_>>()
            .join(" or ");
        if filters.card_types.len() > 1 {
            parts.push(format!("({})", card_query));
        } else {
            parts.push(card_query);
        }
    }
    if filters.min_interval > 0 {
        parts.push(format!("prop:ivl>={}", filters.min_interval));
    }
    if filters.max_interval > 0 {
        parts.push(format!("prop:ivl<={}", filters.max_interval));
    }
    if filters.rated_days > 0 {
        parts.push(format!("rated:{}", filters.rated_days));
    }

    if parts.is_empty() {
        "deck:current".to_string()
    } else {
        parts.join(" ")
    }
}
