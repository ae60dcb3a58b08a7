//! Conversation turns and the append-only history that holds them.
use crate::{
    animation::AnimationClip, avatar_error::AvatarError, emotion::EmotionLabel,
    reply::AssistantReply,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed (or failed) user/assistant exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_speech: String,
    pub emotion_at_speech: EmotionLabel,
    pub ai_response: String,
    pub ai_emotion: EmotionLabel,
    pub animation: String,
    pub timestamp: DateTime<Utc>,
    pub is_error: bool,
}

impl ConversationTurn {
    /// Turn for a successful round-trip.
    pub fn completed(
        user_speech: impl Into<String>,
        emotion_at_speech: EmotionLabel,
        reply: AssistantReply,
    ) -> Self {
        Self {
            user_speech: user_speech.into(),
            emotion_at_speech,
            ai_response: reply.text,
            ai_emotion: reply.emotion,
            animation: reply.animation,
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    /// Error-flagged turn shown to the user in place of a reply.
    pub fn failed(
        user_speech: impl Into<String>,
        emotion_at_speech: EmotionLabel,
        error: &AvatarError,
    ) -> Self {
        Self {
            user_speech: user_speech.into(),
            emotion_at_speech,
            ai_response: format!("Sorry, I had trouble responding. Error: {error}"),
            ai_emotion: EmotionLabel::Neutral,
            animation: AnimationClip::Idle.file_name().to_string(),
            timestamp: Utc::now(),
            is_error: true,
        }
    }
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return its position.
    pub fn push(&mut self, turn: ConversationTurn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn get(&self, index: usize) -> Option<&ConversationTurn> {
        self.turns.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ReplyQuality;

    fn reply() -> AssistantReply {
        AssistantReply {
            text: "That's great news!".into(),
            animation: "Cheering.fbx".into(),
            emotion: EmotionLabel::Happy,
            raw: String::new(),
            quality: ReplyQuality::Structured,
        }
    }

    #[test]
    fn completed_turn_copies_reply_fields() {
        let turn = ConversationTurn::completed("I got the job", EmotionLabel::Excited, reply());
        assert_eq!(turn.ai_response, "That's great news!");
        assert_eq!(turn.ai_emotion, EmotionLabel::Happy);
        assert_eq!(turn.animation, "Cheering.fbx");
        assert_eq!(turn.emotion_at_speech, EmotionLabel::Excited);
        assert!(!turn.is_error);
    }

    #[test]
    fn failed_turn_is_flagged_and_explains() {
        let err = AvatarError::Gateway("connection reset".into());
        let turn = ConversationTurn::failed("hello", EmotionLabel::Sad, &err);
        assert!(turn.is_error);
        assert!(turn.ai_response.contains("connection reset"));
        assert_eq!(turn.animation, "Idle.fbx");
    }

    #[test]
    fn history_keeps_insertion_order() {
        let mut history = ConversationHistory::new();
        assert_eq!(history.push(ConversationTurn::completed("a", EmotionLabel::Neutral, reply())), 0);
        assert_eq!(history.push(ConversationTurn::completed("b", EmotionLabel::Neutral, reply())), 1);
        let spoken: Vec<_> = history.iter().map(|t| t.user_speech.as_str()).collect();
        assert_eq!(spoken, ["a", "b"]);
        assert_eq!(history.last().map(|t| t.user_speech.as_str()), Some("b"));
    }
}
