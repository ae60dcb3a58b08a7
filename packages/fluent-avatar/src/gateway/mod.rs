//! Assistant gateway: utterance plus emotion in, structured reply out.

pub mod gemini;
pub mod parse;
pub mod prompt;

pub use gemini::GeminiGateway;
pub use parse::parse_reply;
pub use prompt::friend_prompt;

use fluent_avatar_domain::{AssistantReply, AvatarError, EmotionLabel};
use std::future::Future;

/// Anything that can answer the user as their friend.
///
/// Implementations check their inputs in a fixed order: an empty or
/// whitespace-only utterance is [`AvatarError::Input`] before a missing
/// credential is [`AvatarError::Configuration`]. Transport and non-success
/// responses are [`AvatarError::Gateway`]. A reply that arrives is never an
/// error, however malformed; see [`parse_reply`].
pub trait AssistantGateway: Send + Sync + 'static {
    fn respond(
        &self,
        utterance: &str,
        emotion: EmotionLabel,
    ) -> impl Future<Output = Result<AssistantReply, AvatarError>> + Send;
}
