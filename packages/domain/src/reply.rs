//! Structured assistant reply.
use crate::{animation::AnimationClip, emotion::EmotionLabel};
use serde::{Deserialize, Serialize};

/// How much of the assistant's reply could be read as the requested JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyQuality {
    /// The whole reply was a JSON object carrying every field.
    Structured,
    /// A JSON object was extracted from surrounding prose.
    Extracted,
    /// No usable JSON; the raw text is spoken as-is.
    RawText,
}

/// What the avatar should say, do and feel in response to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Text to display and speak.
    pub text: String,
    /// Requested animation clip name, as sent by the model.
    pub animation: String,
    /// Emotion the avatar should show while replying.
    pub emotion: EmotionLabel,
    /// Unparsed model output.
    pub raw: String,
    pub quality: ReplyQuality,
}

impl AssistantReply {
    /// Reply that speaks `raw` verbatim with the idle clip and a neutral face.
    pub fn raw_text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            text: raw.clone(),
            animation: AnimationClip::Idle.file_name().to_string(),
            emotion: EmotionLabel::Neutral,
            raw,
            quality: ReplyQuality::RawText,
        }
    }
}
