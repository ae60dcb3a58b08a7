//! Unified error for the avatar pipeline.
use thiserror::Error;

/// Why a speech-recognition session reported a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionFault {
    /// The engine heard nothing for a while. Informational only.
    NoSpeech,
    /// The session was aborted, usually because it was stopped.
    Aborted,
    /// Any other engine fault, e.g. `network` or `not-allowed`.
    Engine(String),
}

impl RecognitionFault {
    /// Whether this fault ends the recognition session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NoSpeech)
    }
}

impl std::fmt::Display for RecognitionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSpeech => f.write_str("no-speech"),
            Self::Aborted => f.write_str("aborted"),
            Self::Engine(code) => f.write_str(code),
        }
    }
}

/// Top-level error covering the gateway, recognition and media capture.
#[derive(Debug, Clone, Error)]
pub enum AvatarError {
    /// Empty utterance or question.
    #[error("input: {0}")]
    Input(String),
    /// Missing credential or invalid setting.
    #[error("configuration: {0}")]
    Configuration(String),
    /// Network or remote-model failure.
    #[error("gateway: {0}")]
    Gateway(String),
    /// Speech-recognition engine fault.
    #[error("recognition: {0}")]
    Recognition(RecognitionFault),
    /// Camera or microphone permission denied or device unavailable.
    #[error("media access: {0}")]
    MediaAccess(String),
    /// Speech-synthesis engine failure.
    #[error("synthesis: {0}")]
    Synthesis(String),
    /// Expression classifier failure.
    #[error("classification: {0}")]
    Classification(String),
}

impl AvatarError {
    pub fn empty_utterance() -> Self {
        Self::Input("Speech text cannot be empty".to_string())
    }

    pub fn missing_credential() -> Self {
        Self::Configuration(
            "assistant API key not found; set GEMINI_API_KEY in the environment".to_string(),
        )
    }

    /// Whether the error ends the component's current session.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Recognition(fault) => fault.is_fatal(),
            _ => true,
        }
    }
}
