//! Google Generative Language REST client.
use super::{AssistantGateway, parse::parse_reply, prompt::friend_prompt};
use crate::config::AvatarConfig;
use fluent_avatar_domain::{AssistantReply, AvatarError, EmotionLabel};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";
const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

struct Credentials {
    client: reqwest::Client,
    api_key: String,
}

/// Assistant backed by a hosted Gemini model.
pub struct GeminiGateway {
    credentials: Option<Credentials>,
    model: String,
    endpoint: String,
}

impl GeminiGateway {
    /// Build from configuration. A missing credential is not an error here;
    /// every `respond` call reports it instead.
    pub fn new(config: &AvatarConfig) -> Result<Self, AvatarError> {
        let credentials = match &config.api_key {
            Some(api_key) => {
                let client = reqwest::Client::builder()
                    .timeout(config.request_timeout)
                    .build()
                    .map_err(|e| {
                        AvatarError::Configuration(format!("Failed to create HTTP client: {e}"))
                    })?;
                Some(Credentials {
                    client,
                    api_key: api_key.clone(),
                })
            }
            None => None,
        };

        Ok(Self {
            credentials,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Send a raw prompt and return the model's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, AvatarError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(AvatarError::missing_credential)?;

        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };

        let resp = credentials
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &credentials.api_key)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .json(&body)
            .send()
            .await
            .map_err(|e| AvatarError::Gateway(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::error!(%status, "assistant request failed: {}", detail);
            return Err(AvatarError::Gateway(format!("HTTP {status}: {detail}")));
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| AvatarError::Gateway(format!("malformed response body: {e}")))?;
        parsed
            .text()
            .ok_or_else(|| AvatarError::Gateway("response contained no text".to_string()))
    }
}

impl AssistantGateway for GeminiGateway {
    async fn respond(
        &self,
        utterance: &str,
        emotion: EmotionLabel,
    ) -> Result<AssistantReply, AvatarError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(AvatarError::empty_utterance());
        }
        if !self.is_configured() {
            return Err(AvatarError::missing_credential());
        }

        let raw = self.generate(&friend_prompt(utterance, emotion)).await?;
        tracing::debug!(model = %self.model, "raw assistant reply: {}", raw);
        Ok(parse_reply(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_utterance_is_an_input_error() {
        let gateway = GeminiGateway::new(&AvatarConfig::default().with_api_key("k"))
            .expect("client builds");
        let err = gateway
            .respond("   ", EmotionLabel::Happy)
            .await
            .expect_err("should reject");
        assert!(matches!(err, AvatarError::Input(_)));
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let gateway = GeminiGateway::new(&AvatarConfig::default()).expect("no client needed");
        assert!(!gateway.is_configured());
        let err = gateway
            .respond("hello", EmotionLabel::Neutral)
            .await
            .expect_err("should reject");
        assert!(matches!(err, AvatarError::Configuration(_)));
    }

    #[test]
    fn url_targets_generate_content() {
        let gateway = GeminiGateway::new(&AvatarConfig::default()).expect("gateway");
        assert_eq!(
            gateway.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"response\":"},{"text":"\"hi\"}"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(parsed.text().as_deref(), Some(r#"{"response":"hi"}"#));
    }

    #[test]
    fn empty_candidates_have_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").expect("parse");
        assert_eq!(parsed.text(), None);
    }
}
