use std::io::{
    self,
    Write,
};

use bunren::{
    anki::{
        self,
        api::AnkiClient,
        query::Filters,
        sampler::sample_practice_words,
        Model,
    },
    correction::{
        self,
        SegmentKind,
    },
    history::{
        self,
        HistoryEntry,
        HistoryMode,
    },
    llm,
    settings::Settings,
    BunrenError,
    PracticeWord,
};
use chrono::Utc;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BunrenError> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("setup") => setup().await,
        Some("challenge") => challenge(&args[1..]).await,
        Some("history") => show_history(),
        Some("clear-history") => {
            history::clear()?;
            println!("History cleared.");
            Ok(())
        }
        _ => practice(&args).await,
    }
}

fn parse_filters(args: &[String]) -> (Filters, usize) {
    let mut filters = Filters::default();
    let mut count = 5;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--deck" => filters.deck = iter.next().cloned().unwrap_or_default(),
            "--note" => filters.note_type = iter.next().cloned().unwrap_or_default(),
            "--card" => {
                if let Some(name) = iter.next() {
                    filters.card_types.push(name.clone());
                }
            }
            "--min-interval" => {
                filters.min_interval =
                    iter.next().and_then(|v| v.parse().ok()).unwrap_or_default();
            }
            "--max-interval" => {
                filters.max_interval =
                    iter.next().and_then(|v| v.parse().ok()).unwrap_or_default();
            }
            "--rated" => {
                filters.rated_days = iter.next().and_then(|v| v.parse().ok()).unwrap_or_default();
            }
            "--count" => {
                count = iter.next().and_then(|v| v.parse().ok()).unwrap_or(5);
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }

    (filters, count)
}

async fn connect() -> Result<AnkiClient, BunrenError> {
    let client = AnkiClient::new();
    if !anki::wait_awake(&client, 2, 3).await {
        return Err(BunrenError::Custom(
            "Could not reach AnkiConnect. Is Anki running with the add-on installed?".to_string(),
        ));
    }
    Ok(client)
}

async fn sample_session(
    settings: &Settings,
    args: &[String],
) -> Result<Vec<PracticeWord>, BunrenError> {
    let (filters, count) = parse_filters(args);
    let client = connect().await?;
    let mapping = settings.mapping_for(&filters.note_type);
    sample_practice_words(&client, &filters, mapping, count, &mut rand::rng()).await
}

fn format_model(model: &Model) -> String {
    if model.templates.is_empty() {
        format!("{} (fields: {})", model.name, model.fields.join(", "))
    } else {
        format!(
            "{} (fields: {}; cards: {})",
            model.name,
            model.fields.join(", "),
            model.templates.join(", ")
        )
    }
}

/// The challenge flow checks one sentence against all sampled words at
/// once; the words travel as a single 、-joined string.
fn join_words(words: &[PracticeWord]) -> String {
    words.iter().map(|w| w.word.as_str()).collect::<Vec<_>>().join("、")
}

fn word_hint(word: &PracticeWord) -> String {
    [word.reading.as_str(), word.meaning.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" — ")
}

/// Lists decks and note types (with fields and card template names) and
/// writes a settings skeleton on first run, so field-role mappings and the
/// LLM key have a file to go into.
async fn setup() -> Result<(), BunrenError> {
    let client = connect().await?;

    println!("\n{}Decks{}", BOLD, RESET);
    for deck in client.deck_names().await? {
        println!("  {}", deck);
    }

    println!("\n{}Note types{}", BOLD, RESET);
    let models = anki::models_with_fields(&client).await?;
    for model in &models {
        println!("  {}", format_model(model));
    }

    if Settings::exists() {
        println!("\nSettings already exist at {}", Settings::path().display());
    } else {
        let skeleton = Settings::with_note_types(models.iter().map(|m| m.name.clone()));
        skeleton.save()?;
        println!("\nWrote a settings skeleton to {}", Settings::path().display());
        println!("Assign field roles per note type and add your LLM API key there.");
    }
    Ok(())
}

fn show_history() -> Result<(), BunrenError> {
    let entries = history::recent(20)?;
    if entries.is_empty() {
        println!("No practice history yet.");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}{} [{}] via {}{} {}",
            DIM,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.word,
            entry.provider.label(),
            RESET,
            entry.sentence
        );
        render_correction(&entry.response);
        println!();
    }
    Ok(())
}

async fn practice(args: &[String]) -> Result<(), BunrenError> {
    let settings = Settings::load();
    let words = sample_session(&settings, args).await?;

    if words.is_empty() {
        println!("No cards matched the filters. Try widening them.");
        return Ok(());
    }

    let Some(llm_config) = settings.llm.as_ref() else {
        return Err(BunrenError::NoApiKey);
    };

    let total = words.len();
    for (i, word) in words.iter().enumerate() {
        println!("\n{}[{}/{}] {}{}", BOLD, i + 1, total, word.word, RESET);
        if !word.reading.is_empty() {
            println!("{}reading: {}{}", DIM, word.reading, RESET);
        }
        if !word.meaning.is_empty() {
            println!("{}meaning: {}{}", DIM, word.meaning, RESET);
        }

        let sentence = read_line("Write a sentence (empty to skip): ")?;
        if sentence.is_empty() {
            continue;
        }
        let hint = read_line("Intended meaning, optional: ")?;
        let hint = if hint.is_empty() { None } else { Some(hint.as_str()) };

        let result =
            match llm::check_sentence(llm_config, &word.word, &sentence, &settings.lang, hint)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("Correction failed: {}", e);
                    continue;
                }
            };

        render_correction(&result.text);
        log_history(
            &word.word,
            Some(word.card_id),
            HistoryMode::Single,
            &sentence,
            hint,
            &result,
            &settings.lang,
        );

        let next = read_line("Enter for next word, 'e' to ask why: ")?;
        if next == "e" {
            explain(llm_config, &word.word, &sentence, hint, &result.text, &settings.lang).await;
        }
    }

    println!("\nDone.");
    Ok(())
}

/// One sentence that must use every sampled word.
async fn challenge(args: &[String]) -> Result<(), BunrenError> {
    let settings = Settings::load();
    let words = sample_session(&settings, args).await?;

    if words.is_empty() {
        println!("No cards matched the filters. Try widening them.");
        return Ok(());
    }

    let Some(llm_config) = settings.llm.as_ref() else {
        return Err(BunrenError::NoApiKey);
    };

    println!("\n{}Use all {} words in one sentence:{}", BOLD, words.len(), RESET);
    for word in &words {
        let hint = word_hint(word);
        if hint.is_empty() {
            println!("  {}", word.word);
        } else {
            println!("  {} {}{}{}", word.word, DIM, hint, RESET);
        }
    }

    let sentence = read_line("\nWrite your sentence: ")?;
    if sentence.is_empty() {
        println!("Nothing to check.");
        return Ok(());
    }
    let hint = read_line("Intended meaning, optional: ")?;
    let hint = if hint.is_empty() { None } else { Some(hint.as_str()) };

    let joined = join_words(&words);
    let result = llm::check_sentence(llm_config, &joined, &sentence, &settings.lang, hint).await?;

    render_correction(&result.text);
    log_history(&joined, None, HistoryMode::Challenge, &sentence, hint, &result, &settings.lang);

    let next = read_line("Enter to finish, 'e' to ask why: ")?;
    if next == "e" {
        explain(llm_config, &joined, &sentence, hint, &result.text, &settings.lang).await;
    }

    Ok(())
}

async fn explain(
    config: &llm::LlmConfig,
    word: &str,
    sentence: &str,
    hint: Option<&str>,
    correction: &str,
    lang: &str,
) {
    let prompt = llm::build_explain_prompt(word, sentence, hint, correction, lang);
    match llm::run_custom_prompt(config, &prompt).await {
        Ok(result) => println!("\n{}", result.text),
        Err(e) => eprintln!("Explanation failed: {}", e),
    }
}

fn log_history(
    word: &str,
    card_id: Option<u64>,
    mode: HistoryMode,
    sentence: &str,
    hint: Option<&str>,
    result: &llm::LlmResult,
    lang: &str,
) {
    let entry = HistoryEntry {
        word: word.to_string(),
        sentence: sentence.to_string(),
        response: result.text.clone(),
        hint: hint.map(str::to_string),
        created_at: Utc::now(),
        lang: lang.to_string(),
        provider: result.provider,
        model: result.model.clone(),
        mode,
        card_id,
    };
    if let Err(e) = history::append(entry) {
        eprintln!("Failed to record history: {}", e);
    }
}

fn render_correction(response: &str) {
    if correction::is_correct(response) {
        for line in response.lines() {
            println!("\x1b[32m{}{}", line, RESET);
        }
        return;
    }

    for segments in correction::parse_correction(response) {
        for segment in &segments {
            match segment.kind {
                SegmentKind::Plain => print!("{}", segment.text),
                SegmentKind::Changed => print!("\x1b[33m{}{}", segment.text, RESET),
                SegmentKind::Inserted => print!("\x1b[32m{}{}", segment.text, RESET),
                SegmentKind::Deleted => print!("\x1b[31m\x1b[9m{}{}", segment.text, RESET),
            }
        }
        println!();
    }
}

fn read_line(prompt: &str) -> Result<String, BunrenError> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(card_id: u64, word: &str, meaning: &str, reading: &str) -> PracticeWord {
        PracticeWord {
            card_id,
            word: word.to_string(),
            meaning: meaning.to_string(),
            reading: reading.to_string(),
        }
    }

    #[test]
    fn challenge_words_join_with_ideographic_comma() {
        let words = vec![word(1, "犬", "dog", ""), word(2, "猫", "cat", ""), word(3, "鳥", "", "")];
        assert_eq!(join_words(&words), "犬、猫、鳥");
    }

    #[test]
    fn single_challenge_word_has_no_separator() {
        assert_eq!(join_words(&[word(1, "犬", "", "")]), "犬");
    }

    #[test]
    fn word_hint_joins_only_present_parts() {
        assert_eq!(word_hint(&word(1, "犬", "dog", "いぬ")), "いぬ — dog");
        assert_eq!(word_hint(&word(1, "犬", "dog", "")), "dog");
        assert_eq!(word_hint(&word(1, "犬", "", "")), "");
    }

    #[test]
    fn model_listing_includes_card_template_names() {
        let model = Model {
            name: "Core 2k".to_string(),
            fields: vec!["Expression".to_string(), "Meaning".to_string()],
            templates: vec!["Recognition".to_string(), "Production".to_string()],
        };
        assert_eq!(
            format_model(&model),
            "Core 2k (fields: Expression, Meaning; cards: Recognition, Production)"
        );
    }

    #[test]
    fn model_listing_without_templates_omits_cards_section() {
        let model = Model {
            name: "Basic".to_string(),
            fields: vec!["Front".to_string()],
            templates: Vec::new(),
        };
        assert_eq!(format_model(&model), "Basic (fields: Front)");
    }
}
