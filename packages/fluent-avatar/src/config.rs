//! Runtime configuration, loaded from the process environment.
use std::time::Duration;

/// Environment variables tried, in order, for the assistant credential.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Settings shared by every avatar component.
#[derive(Debug, Clone)]
pub struct AvatarConfig {
    /// Assistant credential. `None` leaves the gateway in a permanent
    /// configuration-error state.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub request_timeout: Duration,
    /// Expression sampling period.
    pub sample_interval: Duration,
    /// Minimum top-label confidence before an expression counts.
    pub confidence_threshold: f32,
    /// Quiet period after the last finalized fragment before dispatch.
    pub silence_timeout: Duration,
    /// How long the assistant's emotion and animation stay on screen.
    pub emotion_reset_delay: Duration,
    pub crossfade: Duration,
    /// Delay between a reply arriving and speech starting.
    pub speech_lead_in: Duration,
    pub recognition_language: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
            sample_interval: Duration::from_millis(100),
            confidence_threshold: 0.4,
            silence_timeout: Duration::from_secs(2),
            emotion_reset_delay: Duration::from_secs(9),
            crossfade: Duration::from_millis(500),
            speech_lead_in: Duration::from_millis(500),
            recognition_language: "en-US".to_string(),
        }
    }
}

impl AvatarConfig {
    /// Defaults overlaid with whatever the environment provides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AvatarConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.api_key = API_KEY_VARS
            .iter()
            .find_map(|&var| lookup(var))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if config.api_key.is_none() {
            tracing::warn!(
                "assistant API key not found; set {} to enable replies",
                API_KEY_VARS[0]
            );
        }

        if let Some(model) = lookup("AVATAR_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model;
        }
        if let Some(endpoint) = lookup("AVATAR_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        config
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_silence_timeout(mut self, timeout: Duration) -> Self {
        self.silence_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_timings() {
        let config = AvatarConfig::default();
        assert_eq!(config.sample_interval, Duration::from_millis(100));
        assert_eq!(config.silence_timeout, Duration::from_secs(2));
        assert_eq!(config.confidence_threshold, 0.4);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn falls_back_to_secondary_key_variable() {
        let config = AvatarConfig::from_lookup(lookup(&[("VITE_GEMINI_API_KEY", "abc")]));
        assert_eq!(config.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = AvatarConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn endpoint_override_drops_trailing_slash() {
        let config = AvatarConfig::from_lookup(lookup(&[
            ("AVATAR_ENDPOINT", "http://localhost:8080/v1/"),
            ("AVATAR_MODEL", "gemini-test"),
        ]));
        assert_eq!(config.endpoint, "http://localhost:8080/v1");
        assert_eq!(config.model, "gemini-test");
    }
}
