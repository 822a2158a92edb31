//! Best-effort translation to English through a LibreTranslate-compatible endpoint.
//!
//! Translation never fails from the caller's point of view: every problem is turned
//! into [`Translation::Original`], which keeps the input text and the reason it was kept.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::TranslateError;

/// Outcome of one translation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    Translated(String),
    /// The service could not be used; the untouched input is passed through.
    Original { text: String, error: TranslateError },
    /// Translation is switched off for this service.
    Skipped(String),
}

impl Translation {
    /// Pairs a fallible attempt with the text it was made for.
    pub fn from_attempt(original: &str, attempt: Result<String, TranslateError>) -> Self {
        match attempt {
            Ok(text) => Translation::Translated(text),
            Err(error) => Translation::Original {
                text: original.to_string(),
                error,
            },
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Translation::Translated(text) => text,
            Translation::Original { text, .. } => text,
            Translation::Skipped(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Translation::Translated(text) => text,
            Translation::Original { text, .. } => text,
            Translation::Skipped(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Translation::Original { .. })
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Translation;
}

/// Returns every input unchanged.
pub struct Passthrough;

#[async_trait]
impl Translator for Passthrough {
    async fn translate(&self, text: &str) -> Translation {
        Translation::Skipped(text.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// HTTP client for `POST /translate` on a LibreTranslate instance.
#[derive(Debug, Clone)]
pub struct LibreTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    target: String,
}

impl LibreTranslator {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            target: "en".to_string(),
        }
    }

    /// Single attempt, no retry.
    pub async fn try_translate(&self, text: &str) -> Result<String, TranslateError> {
        let mut form = vec![
            ("q", text),
            ("source", "auto"),
            ("target", self.target.as_str()),
            ("format", "text"),
        ];
        if let Some(key) = self.api_key.as_deref() {
            form.push(("api_key", key));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranslateError::Status(response.status().as_u16()));
        }

        let body = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| TranslateError::Malformed(e.to_string()))?;

        body.translated_text.ok_or(TranslateError::MissingField)
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    async fn translate(&self, text: &str) -> Translation {
        let outcome = Translation::from_attempt(text, self.try_translate(text).await);
        if let Translation::Original { error, .. } = &outcome {
            warn!("⚠️ [Translate] falling back to original text: {}", error);
        }
        outcome
    }
}
