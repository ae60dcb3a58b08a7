//! Closed emotion vocabulary shared by every avatar component.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbolic mood category driving both manual and detected avatar expression.
///
/// The first nine variants are the *primary* labels the assistant is allowed
/// to answer with. The remaining four are manual-only presets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    #[default]
    Neutral,
    Happy,
    Sad,
    Surprised,
    Angry,
    Disgusted,
    Excited,
    Thinking,
    Confused,
    Smirk,
    Kiss,
    Wink,
    Shock,
}

impl EmotionLabel {
    /// Number of labels in the vocabulary.
    pub const COUNT: usize = 13;

    /// Every label, in declaration order.
    pub const ALL: [EmotionLabel; Self::COUNT] = [
        Self::Neutral,
        Self::Happy,
        Self::Sad,
        Self::Surprised,
        Self::Angry,
        Self::Disgusted,
        Self::Excited,
        Self::Thinking,
        Self::Confused,
        Self::Smirk,
        Self::Kiss,
        Self::Wink,
        Self::Shock,
    ];

    /// Labels the assistant may reply with.
    pub const PRIMARY: [EmotionLabel; 9] = [
        Self::Neutral,
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Surprised,
        Self::Disgusted,
        Self::Excited,
        Self::Thinking,
        Self::Confused,
    ];

    /// Position of this label in [`EmotionLabel::ALL`]; used to key static tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower-case wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Surprised => "surprised",
            Self::Angry => "angry",
            Self::Disgusted => "disgusted",
            Self::Excited => "excited",
            Self::Thinking => "thinking",
            Self::Confused => "confused",
            Self::Smirk => "smirk",
            Self::Kiss => "kiss",
            Self::Wink => "wink",
            Self::Shock => "shock",
        }
    }

    /// Whether the assistant is allowed to answer with this label.
    pub fn is_primary(self) -> bool {
        Self::PRIMARY.contains(&self)
    }

    /// Parse a label, falling back to [`EmotionLabel::Neutral`] for anything
    /// outside the vocabulary.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known emotion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}
