//! Best-effort reading of the model's JSON reply.
//!
//! Models do not always honour "respond only with JSON", so parsing steps
//! down through three levels instead of failing.

use fluent_avatar_domain::{AnimationClip, AssistantReply, EmotionLabel, ReplyQuality};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ReplyFields {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    animation: Option<String>,
    #[serde(default, rename = "AI_emotion")]
    ai_emotion: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Parse `raw` into a reply, never failing.
///
/// 1. The whole text is a JSON object with `response`, `animation` and
///    `AI_emotion` all present: returned as-is.
/// 2. The span from the first `{` to the last `}` parses as an object:
///    missing fields default (`response` to the raw text, `animation` to
///    `Idle.fbx`, `AI_emotion` to neutral).
/// 3. Otherwise the raw text is the reply.
pub fn parse_reply(raw: &str) -> AssistantReply {
    if let Ok(fields) = serde_json::from_str::<ReplyFields>(raw.trim()) {
        if let (Some(text), Some(animation), Some(emotion)) = (
            present(&fields.response),
            present(&fields.animation),
            present(&fields.ai_emotion),
        ) {
            return AssistantReply {
                text: text.to_string(),
                animation: animation.to_string(),
                emotion: EmotionLabel::parse_lenient(emotion),
                raw: raw.to_string(),
                quality: ReplyQuality::Structured,
            };
        }
    }

    tracing::warn!("assistant reply is not a complete JSON object, extracting");

    if let Some(fields) = embedded_object(raw)
        .and_then(|json| serde_json::from_str::<ReplyFields>(json).ok())
    {
        return AssistantReply {
            text: present(&fields.response).unwrap_or(raw).to_string(),
            animation: present(&fields.animation)
                .unwrap_or(AnimationClip::Idle.file_name())
                .to_string(),
            emotion: present(&fields.ai_emotion)
                .map(EmotionLabel::parse_lenient)
                .unwrap_or_default(),
            raw: raw.to_string(),
            quality: ReplyQuality::Extracted,
        };
    }

    tracing::warn!("no JSON found in assistant reply, using raw text");
    AssistantReply::raw_text(raw)
}

/// Greedy `{ ... }` span: first opening brace to last closing brace.
fn embedded_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
