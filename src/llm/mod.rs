use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::BunrenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Claude,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Gemini => "gemini-2.5-flash",
            Provider::Claude => "claude-haiku-4-5-20251001",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::Claude => "Claude",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: String,
    /// Empty string falls back to the provider's default model.
    #[serde(default)]
    pub model: String,
}

impl LlmConfig {
    pub fn model_or_default(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmResult {
    pub text: String,
    pub provider: Provider,
    pub model: String,
}

fn translation_language(lang: &str) -> &'static str {
    if lang == "es" {
        "Spanish"
    } else {
        "English"
    }
}

/// Builds the correction prompt. The marker vocabulary here is a wire
/// contract with `correction::parse_line`; changing one side breaks the
/// other.
pub fn build_prompt(word: &str, sentence: &str, lang: &str, hint: Option<&str>) -> String {
    let translation_lang = translation_language(lang);
    let intent = match hint.map(str::trim) {
        Some(hint) if !hint.is_empty() => {
            format!("\nThe student intended meaning (summary): {}\n", hint)
        }
        _ => "\n".to_string(),
    };
    format!(
        "You are a Japanese language tutor. The student was given the word 「{word}」 and wrote this sentence:\n\
        「{sentence}」\n\
        {intent}\n\
        If the sentence has errors, reply ONLY with:\n\
        Line 1: The corrected sentence using these markers:\n\
        \x20 - 【corrected text】 for text that was changed (wrong word/conjugation/particle)\n\
        \x20 - 〈added text〉 for text that was missing and needs to be inserted\n\
        \x20 - ｛removed text｝ for text that should be deleted\n\
        Line 2: {translation_lang} translation\n\n\
        If the sentence is correct, reply ONLY with:\n\
        ✓\n\
        {translation_lang} translation\n\n\
        Be very brief. No explanations."
    )
}

/// Follow-up prompt asking the tutor to justify each correction. Exposed so
/// the UI can also offer it for copy-out to another assistant.
pub fn build_explain_prompt(
    word: &str,
    sentence: &str,
    hint: Option<&str>,
    correction: &str,
    lang: &str,
) -> String {
    let hint = hint.map(str::trim).filter(|h| !h.is_empty());
    if lang == "es" {
        format!(
            "Sos un tutor de japonés. Explicá de forma breve por qué se hizo cada corrección.\n\n\
            Kanji/palabra dada: {}\n\
            Oración del estudiante: {}\n\
            Lo que quiso decir (resumen): {}\n\
            Corrección del LLM: {}\n\n\
            Explicá cada cambio línea por línea. Sé conciso.",
            word,
            sentence,
            hint.unwrap_or("No especificado"),
            correction
        )
    } else {
        format!(
            "You are a Japanese tutor. Briefly explain why each correction was made.\n\n\
            Word given: {}\n\
            Student sentence: {}\n\
            Intended meaning (summary): {}\n\
            LLM correction: {}\n\n\
            Explain each change line by line. Keep it concise.",
            word,
            sentence,
            hint.unwrap_or("Not specified"),
            correction
        )
    }
}

async fn call_openai(
    client: &Client,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String, BunrenError> {
    let body = serde_json::json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "max_tokens": 200,
    });
    let response = client
        .post("https://api.openai.com/v1/chat/completions")
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(BunrenError::Llm(format!("OpenAI error: {}", response.status().as_u16())));
    }
    let data: serde_json::Value = response.json().await?;
    data["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BunrenError::Llm("OpenAI response had no message content".to_string()))
}

async fn call_gemini(
    client: &Client,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String, BunrenError> {
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, api_key
    );
    let body = serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
    });
    let response = client.post(&url).json(&body).send().await?;
    if !response.status().is_success() {
        return Err(BunrenError::Llm(format!("Gemini error: {}", response.status().as_u16())));
    }
    let data: serde_json::Value = response.json().await?;
    data["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BunrenError::Llm("Gemini response had no text part".to_string()))
}

async fn call_claude(
    client: &Client,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String, BunrenError> {
    let body = serde_json::json!({
        "model": model,
        "max_tokens": 200,
        "messages": [{ "role": "user", "content": prompt }],
    });
    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(BunrenError::Llm(format!("Claude error: {}", response.status().as_u16())));
    }
    let data: serde_json::Value = response.json().await?;
    data["content"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BunrenError::Llm("Claude response had no text block".to_string()))
}

/// Sends an arbitrary prompt to the configured provider.
pub async fn run_custom_prompt(config: &LlmConfig, prompt: &str) -> Result<LlmResult, BunrenError> {
    if config.api_key.is_empty() {
        return Err(BunrenError::NoApiKey);
    }

    let client = Client::new();
    let model = config.model_or_default();

    let text = match config.provider {
        Provider::OpenAi => call_openai(&client, &config.api_key, model, prompt).await?,
        Provider::Gemini => call_gemini(&client, &config.api_key, model, prompt).await?,
        Provider::Claude => call_claude(&client, &config.api_key, model, prompt).await?,
    };

    Ok(LlmResult { text, provider: config.provider, model: model.to_string() })
}

/// Asks the configured provider to check the student's sentence for the
/// given word. The response follows the marker grammar of `correction`.
pub async fn check_sentence(
    config: &LlmConfig,
    word: &str,
    sentence: &str,
    lang: &str,
    hint: Option<&str>,
) -> Result<LlmResult, BunrenError> {
    let prompt = build_prompt(word, sentence, lang, hint);
    run_custom_prompt(config, &prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_word_sentence_and_markers() {
        let prompt = build_prompt("食べる", "パンが食べた", "en", None);
        assert!(prompt.contains("「食べる」"));
        assert!(prompt.contains("「パンが食べた」"));
        assert!(prompt.contains("【corrected text】"));
        assert!(prompt.contains("〈added text〉"));
        assert!(prompt.contains("｛removed text｝"));
        assert!(prompt.contains("English translation"));
    }

    #[test]
    fn prompt_includes_trimmed_hint_when_given() {
        let prompt = build_prompt("猫", "猫がいる", "en", Some("  there is a cat  "));
        assert!(prompt.contains("intended meaning (summary): there is a cat"));
    }

    #[test]
    fn blank_hint_is_omitted() {
        let prompt = build_prompt("猫", "猫がいる", "en", Some("   "));
        assert!(!prompt.contains("intended meaning"));
    }

    #[test]
    fn spanish_lang_switches_translation_line() {
        let prompt = build_prompt("猫", "猫がいる", "es", None);
        assert!(prompt.contains("Spanish translation"));
        assert!(!prompt.contains("English translation"));
    }

    #[test]
    fn explain_prompt_has_language_variants() {
        let en = build_explain_prompt("猫", "猫がいる", None, "✓", "en");
        assert!(en.contains("Intended meaning (summary): Not specified"));

        let es = build_explain_prompt("猫", "猫がいる", Some("hay un gato"), "✓", "es");
        assert!(es.contains("Lo que quiso decir (resumen): hay un gato"));
    }

    #[test]
    fn empty_model_falls_back_to_provider_default() {
        let config = LlmConfig {
            provider: Provider::Gemini,
            api_key: "k".to_string(),
            model: String::new(),
        };
        assert_eq!(config.model_or_default(), "gemini-2.5-flash");
    }

    #[test]
    fn provider_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), "\"openai\"");
        let back: Provider = serde_json::from_str("\"claude\"").unwrap();
        assert_eq!(back, Provider::Claude);
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected_before_any_call() {
        let config = LlmConfig {
            provider: Provider::OpenAi,
            api_key: String::new(),
            model: String::new(),
        };
        let result = check_sentence(&config, "猫", "猫がいる", "en", None).await;
        assert!(matches!(result, Err(BunrenError::NoApiKey)));
    }
}
