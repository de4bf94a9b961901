use std::collections::HashMap;

use reqwest::Client;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};

use crate::core::BunrenError;

const DEFAULT_ENDPOINT: &str = "http://localhost:8765";
const API_VERSION: u32 = 6;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Field {
    pub value: String,
    pub order: u32,
}

/// A card record as returned by AnkiConnect's `cardsInfo`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    pub card_id: u64,
    pub fields: HashMap<String, Field>,
    pub field_order: u32,
    pub model_name: String,
    pub deck_name: String,
    pub interval: i64,
    pub note: u64,
    #[serde(rename = "type")]
    pub card_type: i32,
    pub queue: i32,
    pub reps: u32,
    pub lapses: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A non-null error in the envelope is a failed call, even when the
    /// result slot is populated.
    pub fn into_result(self) -> Result<T, BunrenError> {
        if let Some(error) = self.error {
            return Err(BunrenError::AnkiConnect(error));
        }
        self.result.ok_or_else(|| {
            BunrenError::AnkiConnect("response contained neither result nor error".to_string())
        })
    }
}

/// Client for the AnkiConnect add-on's local HTTP API.
pub struct AnkiClient {
    client: Client,
    endpoint: String,
}

impl Default for AnkiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnkiClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        AnkiClient { client: Client::new(), endpoint: endpoint.into() }
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<T, BunrenError> {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
        body.insert("version".to_string(), serde_json::Value::Number(API_VERSION.into()));

        if let Some(params) = params {
            body.insert("params".to_string(), params);
        }

        let response: ApiResponse<T> =
            self.client.post(&self.endpoint).json(&body).send().await?.json().await?;

        response.into_result()
    }

    pub async fn version(&self) -> Result<u32, BunrenError> {
        self.invoke("version", None).await
    }

    pub async fn deck_names(&self) -> Result<Vec<String>, BunrenError> {
        self.invoke("deckNames", None).await
    }

    pub async fn model_names(&self) -> Result<Vec<String>, BunrenError> {
        self.invoke("modelNames", None).await
    }

    pub async fn model_field_names(&self, model_name: &str) -> Result<Vec<String>, BunrenError> {
        let params = serde_json::json!({ "modelName": model_name });
        self.invoke("modelFieldNames", Some(params)).await
    }

    /// Card template names for a note type, e.g. "Recognition", "Production".
    pub async fn model_template_names(&self, model_name: &str) -> Result<Vec<String>, BunrenError> {
        let params = serde_json::json!({ "modelName": model_name });
        let templates: HashMap<String, serde_json::Value> =
            self.invoke("modelTemplates", Some(params)).await?;
        Ok(templates.into_keys().collect())
    }

    pub async fn find_cards(&self, query: &str) -> Result<Vec<u64>, BunrenError> {
        let params = serde_json::json!({ "query": query });
        self.invoke("findCards", Some(params)).await
    }

    /// Fetches full records for a batch of card ids in one round trip.
    pub async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<CardInfo>, BunrenError> {
        let params = serde_json::json!({ "cards": card_ids });
        self.invoke("cardsInfo", Some(params)).await
    }
}
