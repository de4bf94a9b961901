use std::collections::HashSet;

use rand::{
    seq::SliceRandom,
    Rng,
};

use crate::{
    anki::{
        api::{
            AnkiClient,
            CardInfo,
        },
        query::{
            build_query,
            Filters,
        },
        resolve_fields,
        FieldMapping,
    },
    core::{
        BunrenError,
        PracticeWord,
    },
};

/// The two card-store operations sampling needs. Keeps the sampler agnostic
/// to what transport actually reaches Anki, and lets tests stub the store.
pub trait CardSource {
    fn find_cards(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u64>, BunrenError>>;

    fn cards_info(
        &self,
        card_ids: &[u64],
    ) -> impl std::future::Future<Output = Result<Vec<CardInfo>, BunrenError>>;
}

impl CardSource for AnkiClient {
    async fn find_cards(&self, query: &str) -> Result<Vec<u64>, BunrenError> {
        AnkiClient::find_cards(self, query).await
    }

    async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<CardInfo>, BunrenError> {
        AnkiClient::cards_info(self, card_ids).await
    }
}

/// Samples up to `count` practice words matching the filters.
///
/// Fetches a 4x oversampled prefix of the shuffled candidate ids so that
/// note-level dedup and unmapped cards usually don't force a second round
/// trip. At most one word per note is kept; a note whose word resolves empty
/// is consumed and not retried through a sibling card. Fewer than `count`
/// usable words is a normal result, not an error.
pub async fn sample_practice_words<S: CardSource, R: Rng + ?Sized>(
    source: &S,
    filters: &Filters,
    mapping: Option<&FieldMapping>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<PracticeWord>, BunrenError> {
    let query = build_query(filters);
    let mut card_ids = source.find_cards(&query).await?;

    if card_ids.is_empty() {
        return Ok(Vec::new());
    }

    card_ids.shuffle(rng);
    let selection_count = card_ids.len().min(count.saturating_mul(4).max(count));
    let selected = &card_ids[..selection_count];

    let cards = source.cards_info(selected).await?;

    let mut seen_notes: HashSet<u64> = HashSet::new();
    let mut words: Vec<PracticeWord> = Vec::new();

    for card in cards {
        if !seen_notes.insert(card.note) {
            continue;
        }

        let resolved = resolve_fields(&card.fields, mapping);
        if !resolved.word.is_empty() {
            words.push(PracticeWord {
                card_id: card.card_id,
                word: resolved.word,
                meaning: resolved.meaning,
                reading: resolved.reading,
            });
        }

        if words.len() >= count {
            break;
        }
    }

    Ok(words)
}
