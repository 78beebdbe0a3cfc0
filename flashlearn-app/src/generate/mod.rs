//! Text-to-flashcard generation through the OpenAI chat completions API.
//!
//! Only a missing API key is reported to the caller as an error. Network
//! failures and unusable model output degrade to an empty list in
//! [`Generator::generate_or_empty`].

use chrono::{DateTime, Utc};
use flashlearn_core::{Card, CardDraft};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f64 = 0.5;
const MAX_TOKENS: u32 = 800;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("OpenAI API key is missing; set OPENAI_API_KEY or pass --api-key")]
    MissingCredential,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response had no message content")]
    EmptyResponse,
    #[error("could not parse generated cards: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
}

impl GeneratedCard {
    pub fn into_card(self, now: DateTime<Utc>) -> Card {
        CardDraft {
            front: Some(self.front),
            back: Some(self.back),
            tags: self.tags,
            ..CardDraft::default()
        }
        .into_card(now)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

pub struct Generator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub async fn generate(&self, text: &str) -> Result<Vec<GeneratedCard>, GenerateError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerateError::MissingCredential)?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(text),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        log::debug!("requesting cards from {}", self.config.api_url);
        let resp: Value = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = extract_content(&resp).ok_or(GenerateError::EmptyResponse)?;
        parse_generated(content)
    }

    pub async fn generate_or_empty(&self, text: &str) -> Result<Vec<GeneratedCard>, GenerateError> {
        match self.generate(text).await {
            Ok(cards) => Ok(cards),
            Err(GenerateError::MissingCredential) => Err(GenerateError::MissingCredential),
            Err(e) => {
                log::warn!("flashcard generation failed: {e}");
                Ok(Vec::new())
            }
        }
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Extract key points from the following text and create flashcards in JSON format.\n\
         Each flashcard should have \"front\" (question) and \"back\" (answer) fields.\n\
         Output ONLY a JSON array.\n\nText:\n{text}\n"
    )
}

pub fn extract_content(resp: &Value) -> Option<&str> {
    resp.pointer("/choices/0/message/content").and_then(Value::as_str)
}

/// Parses the model's reply. A surrounding markdown code fence is tolerated;
/// entries without a string `front` and `back` are dropped.
pub fn parse_generated(content: &str) -> Result<Vec<GeneratedCard>, GenerateError> {
    let body = strip_code_fence(content.trim());
    let value: Value = serde_json::from_str(body).map_err(|e| GenerateError::Parse(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(GenerateError::Parse("expected a JSON array".to_string()));
    };
    Ok(items
        .iter()
        .filter_map(|item| {
            let front = item.get("front")?.as_str()?.trim();
            let back = item.get("back")?.as_str()?.trim();
            if front.is_empty() || back.is_empty() {
                return None;
            }
            let tags: Vec<String> = item
                .get("tags")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();
            Some(GeneratedCard {
                front: front.to_string(),
                back: back.to_string(),
                tags,
            })
        })
        .collect())
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt("cells divide"),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "gpt-3.5-turbo");
        assert_eq!(v["temperature"], 0.5);
        assert_eq!(v["max_tokens"], 800);
        assert_eq!(v["messages"][0]["role"], "user");
        assert!(v["messages"][0]["content"].as_str().unwrap().contains("cells divide"));
    }

    #[test]
    fn parses_plain_and_fenced_arrays() {
        let plain = r#"[{"front":"Q1","back":"A1"},{"front":"Q2","back":"A2","tags":["x"]}]"#;
        let cards = parse_generated(plain).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].tags, vec!["x".to_string()]);

        let fenced = format!("```json\n{plain}\n```");
        assert_eq!(parse_generated(&fenced).unwrap(), cards);
    }

    #[test]
    fn drops_incomplete_entries() {
        let cards = parse_generated(r#"[{"front":"Q"},{"front":"Q","back":" "},{"front":"ok","back":"fine"}, 3]"#)
            .unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "ok");
    }

    #[test]
    fn rejects_prose_and_objects() {
        assert!(matches!(parse_generated("Sure! Here are some cards"), Err(GenerateError::Parse(_))));
        assert!(matches!(parse_generated(r#"{"front":"Q","back":"A"}"#), Err(GenerateError::Parse(_))));
    }

    #[test]
    fn extracts_first_choice_content() {
        let resp = json!({"choices":[{"message":{"role":"assistant","content":"[]"}}]});
        assert_eq!(extract_content(&resp), Some("[]"));
        assert_eq!(extract_content(&json!({"choices": []})), None);
    }

    #[test]
    fn generated_cards_get_import_defaults() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let card = GeneratedCard {
            front: "Q".into(),
            back: "A".into(),
            tags: vec![],
        }
        .into_card(now);
        assert_eq!(card.difficulty, 2.5);
        assert_eq!(card.next_review, now);
        assert!(card.is_new());
    }

    fn generator(api_key: Option<&str>) -> Generator {
        Generator::new(GeneratorConfig {
            api_key: api_key.map(str::to_string),
            // Nothing listens here; requests fail fast.
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    #[tokio::test]
    async fn blank_text_needs_no_credential() {
        assert!(generator(None).generate("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        assert!(matches!(generator(None).generate("text").await, Err(GenerateError::MissingCredential)));
        assert!(matches!(
            generator(Some(" ")).generate_or_empty("text").await,
            Err(GenerateError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn network_failure_degrades_to_empty() {
        let cards = generator(Some("sk-test")).generate_or_empty("some text").await.unwrap();
        assert!(cards.is_empty());
    }
}
