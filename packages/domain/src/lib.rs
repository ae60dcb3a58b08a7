//! # Fluent Avatar Domain
//!
//! Shared domain objects and types for the fluent-avatar workspace.
//!
//! This crate holds the closed emotion vocabulary, the static lookup tables
//! keyed by it, conversation turns and the unified error type, so that the
//! orchestration crate and any front-end can agree on them without depending
//! on each other.

pub mod animation;
pub mod avatar_error;
pub mod conversation_turn;
pub mod emotion;
pub mod expression;
pub mod morph_table;
pub mod prosody;
pub mod reply;

// Re-export core types
pub use animation::{AnimationClip, clip_key};
pub use avatar_error::{AvatarError, RecognitionFault};
pub use conversation_turn::{ConversationHistory, ConversationTurn};
pub use emotion::{EmotionLabel, UnknownEmotion};
pub use expression::ExpressionScores;
pub use morph_table::{MorphWeight, MorphWeightTable};
pub use prosody::Prosody;
pub use reply::{AssistantReply, ReplyQuality};

/// Prelude module containing commonly used types.
pub mod prelude {
    pub use crate::{
        AnimationClip, AssistantReply, AvatarError, ConversationHistory, ConversationTurn,
        EmotionLabel, ExpressionScores, MorphWeightTable, Prosody, RecognitionFault,
        ReplyQuality,
    };
}
