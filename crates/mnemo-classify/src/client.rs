use serde::{Deserialize, Serialize};

use crate::credentials::resolve_api_key;
use crate::error::ClassifyError;
use crate::prompt::{PromptVariant, NONE_SENTINEL};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const MODEL_ENV: &str = "MNEMO_CLASSIFIER_MODEL";
const MAX_OUTPUT_TOKENS: u32 = 512;

/// Result of classifying one exchange. Every failure mode (missing
/// credentials, network, bad status, unparseable body) collapses into
/// `Empty`, which callers treat as "nothing to record".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Empty,
    Entries(Vec<String>),
}

impl Classification {
    pub fn entries(&self) -> &[String] {
        match self {
            Classification::Empty => &[],
            Classification::Entries(entries) => entries,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<Content>,
}

/// Client for the external small-model classification service.
pub struct Classifier {
    model: String,
    api_key: String,
    http: reqwest::Client,
}

impl Classifier {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Build a classifier from the environment. `None` when no credential
    /// is present, which disables classification for this invocation.
    pub fn from_env() -> Option<Self> {
        let api_key = resolve_api_key()?;
        let model = std::env::var(MODEL_ENV)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Some(Self::new(model, api_key))
    }

    /// Classify an exchange. Never fails: any error resolves to `Empty`.
    pub async fn classify(&self, variant: PromptVariant, text: &str) -> Classification {
        match self.request(variant.render(text)).await {
            Ok(raw) => parse_classification(&raw),
            Err(e) => {
                tracing::debug!("Classifier call failed, treating as empty: {e}");
                Classification::Empty
            }
        }
    }

    async fn request(&self, prompt: String) -> Result<String, ClassifyError> {
        let body = self.build_request_body(prompt);

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text)
            .ok_or(ClassifyError::NoTextContent)
    }

    fn build_request_body(&self, prompt: String) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_OUTPUT_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![Content {
                    content_type: "text".to_string(),
                    text: prompt,
                }],
            }],
        }
    }
}

/// Parse the classifier's raw text into entries. The sentinel (exact
/// `NONE`, or any response whose trimmed text begins with it) and blank
/// output both mean "no meaningful activity".
pub fn parse_classification(raw: &str) -> Classification {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with(NONE_SENTINEL) {
        return Classification::Empty;
    }
    let entries: Vec<String> = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if entries.is_empty() {
        Classification::Empty
    } else {
        Classification::Entries(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_none_sentinel() {
        assert_eq!(parse_classification("NONE"), Classification::Empty);
        assert_eq!(
            parse_classification("  NONE - nothing happened\n"),
            Classification::Empty
        );
        assert_eq!(parse_classification(""), Classification::Empty);
        assert_eq!(parse_classification("   \n  "), Classification::Empty);
    }

    #[test]
    fn test_parse_entries() {
        let parsed =
            parse_classification("Implemented login endpoint\n\nAdded input validation\n");
        assert_eq!(
            parsed,
            Classification::Entries(vec![
                "Implemented login endpoint".into(),
                "Added input validation".into(),
            ])
        );
        assert_eq!(parsed.entries().len(), 2);
    }

    #[test]
    fn test_parse_tagged_bullets() {
        let parsed = parse_classification("- [decision] Use JWT\n- [open] Rate limiting\n");
        assert_eq!(
            parsed.entries(),
            ["- [decision] Use JWT", "- [open] Rate limiting"]
        );
    }

    #[test]
    fn test_request_body_matches_messages_api() {
        let client = Classifier::new("claude-3-5-haiku-latest".into(), "sk-test".into());
        let body = client.build_request_body("classify this".into());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "claude-3-5-haiku-latest");
        assert_eq!(json["max_tokens"], 512);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"][0]["type"], "text");
        assert_eq!(messages[0]["content"][0]["text"], "classify this");
    }
}
