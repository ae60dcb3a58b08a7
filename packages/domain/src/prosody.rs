//! Speaking rate, pitch and volume per emotion.
use crate::emotion::EmotionLabel;
use serde::{Deserialize, Serialize};

/// Voice-engine prosody parameters (1.0 rate/pitch = engine normal).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Prosody {
    pub const fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            rate,
            pitch,
            volume,
        }
    }

    /// Engine-normal delivery used for any emotion without its own entry.
    pub const DEFAULT: Prosody = Prosody::new(1.0, 1.0, 0.8);

    /// Prosody the assistant speaks with when it feels `emotion`.
    #[inline]
    pub fn for_emotion(emotion: EmotionLabel) -> Self {
        PROSODY[emotion.index()]
    }
}

impl Default for Prosody {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const CHEERFUL: Prosody = Prosody::new(1.1, 2.0, 0.9);

/// Indexed by [`EmotionLabel::index`].
const PROSODY: [Prosody; EmotionLabel::COUNT] = [
    Prosody::DEFAULT,              // neutral
    CHEERFUL,                      // happy
    Prosody::new(0.8, 0.8, 0.7),   // sad
    Prosody::new(1.0, 1.3, 0.8),   // surprised
    Prosody::new(1.2, 0.9, 0.9),   // angry
    Prosody::DEFAULT,              // disgusted
    CHEERFUL,                      // excited
    Prosody::new(0.9, 1.0, 0.8),   // thinking
    Prosody::DEFAULT,              // confused
    Prosody::DEFAULT,              // smirk
    Prosody::DEFAULT,              // kiss
    Prosody::DEFAULT,              // wink
    Prosody::DEFAULT,              // shock
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_and_excited_share_cheerful_delivery() {
        assert_eq!(Prosody::for_emotion(EmotionLabel::Happy), CHEERFUL);
        assert_eq!(Prosody::for_emotion(EmotionLabel::Excited), CHEERFUL);
    }

    #[test]
    fn sad_is_slow_and_quiet() {
        assert_eq!(
            Prosody::for_emotion(EmotionLabel::Sad),
            Prosody::new(0.8, 0.8, 0.7)
        );
    }

    #[test]
    fn unlisted_emotions_use_default() {
        for label in [EmotionLabel::Neutral, EmotionLabel::Confused, EmotionLabel::Wink] {
            assert_eq!(Prosody::for_emotion(label), Prosody::DEFAULT);
        }
    }
}
