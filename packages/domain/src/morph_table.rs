//! Emotion to blend-shape weight presets.
use crate::emotion::EmotionLabel;

/// A single blend-shape name and its weight in `[0, 1]`.
pub type MorphWeight = (&'static str, f32);

/// Presets indexed by [`EmotionLabel::index`]. Neutral is the empty pose.
const PRESETS: [&[MorphWeight]; EmotionLabel::COUNT] = [
    // neutral
    &[],
    // happy
    &[
        ("mouthSmileLeft", 0.8),
        ("mouthSmileRight", 0.8),
        ("cheekSquintLeft", 0.5),
        ("cheekSquintRight", 0.5),
        ("eyeSquintLeft", 0.3),
        ("eyeSquintRight", 0.3),
    ],
    // sad
    &[
        ("mouthFrownLeft", 0.7),
        ("mouthFrownRight", 0.7),
        ("browDownLeft", 0.6),
        ("browDownRight", 0.6),
        ("mouthLowerDownLeft", 0.4),
        ("mouthLowerDownRight", 0.4),
    ],
    // surprised
    &[
        ("eyeWideLeft", 0.9),
        ("eyeWideRight", 0.9),
        ("browInnerUp", 0.8),
        ("browOuterUpLeft", 0.6),
        ("browOuterUpRight", 0.6),
        ("jawOpen", 0.6),
    ],
    // angry
    &[
        ("browDownLeft", 0.9),
        ("browDownRight", 0.9),
        ("eyeSquintLeft", 0.8),
        ("eyeSquintRight", 0.8),
        ("mouthFrownLeft", 0.6),
        ("mouthFrownRight", 0.6),
        ("noseSneerLeft", 0.5),
        ("noseSneerRight", 0.5),
    ],
    // disgusted
    &[
        ("noseSneerLeft", 0.8),
        ("noseSneerRight", 0.8),
        ("mouthUpperUpLeft", 0.7),
        ("mouthUpperUpRight", 0.7),
        ("eyeSquintLeft", 0.5),
        ("eyeSquintRight", 0.5),
    ],
    // excited
    &[
        ("mouthSmileLeft", 1.0),
        ("mouthSmileRight", 1.0),
        ("eyeWideLeft", 0.7),
        ("eyeWideRight", 0.7),
        ("browInnerUp", 0.6),
        ("jawOpen", 0.4),
    ],
    // thinking
    &[
        ("browInnerUp", 0.4),
        ("browDownLeft", 0.3),
        ("eyeLookUpLeft", 0.5),
        ("eyeLookUpRight", 0.5),
        ("mouthPucker", 0.3),
    ],
    // confused
    &[
        ("browInnerUp", 0.6),
        ("browDownLeft", 0.4),
        ("browOuterUpRight", 0.5),
        ("mouthLeft", 0.3),
        ("eyeSquintLeft", 0.2),
    ],
    // smirk
    &[
        ("mouthSmileRight", 0.8),
        ("mouthDimpleRight", 0.5),
        ("cheekSquintRight", 0.4),
        ("eyeSquintRight", 0.3),
    ],
    // kiss
    &[
        ("mouthPucker", 0.9),
        ("mouthFunnel", 0.5),
        ("eyeSquintLeft", 0.3),
        ("eyeSquintRight", 0.3),
    ],
    // wink
    &[
        ("eyeBlinkRight", 1.0),
        ("mouthSmileLeft", 0.6),
        ("mouthSmileRight", 0.6),
        ("cheekSquintRight", 0.7),
    ],
    // shock
    &[
        ("eyeWideLeft", 1.0),
        ("eyeWideRight", 1.0),
        ("browInnerUp", 1.0),
        ("browOuterUpLeft", 0.8),
        ("browOuterUpRight", 0.8),
        ("jawOpen", 0.9),
        ("mouthFunnel", 0.4),
    ],
];

/// Immutable emotion preset table.
#[derive(Debug, Clone, Copy, Default)]
pub struct MorphWeightTable;

impl MorphWeightTable {
    /// Blend-shape weights for `emotion`.
    #[inline]
    pub fn weights(emotion: EmotionLabel) -> &'static [MorphWeight] {
        PRESETS[emotion.index()]
    }

    /// Weight of one named shape for `emotion`, zero when the preset does not
    /// touch it.
    pub fn weight(emotion: EmotionLabel, shape: &str) -> f32 {
        Self::weights(emotion)
            .iter()
            .find(|(name, _)| *name == shape)
            .map_or(0.0, |(_, w)| *w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_is_empty_pose() {
        assert!(MorphWeightTable::weights(EmotionLabel::Neutral).is_empty());
    }

    #[test]
    fn every_other_label_has_a_preset_in_range() {
        for label in EmotionLabel::ALL.into_iter().skip(1) {
            let preset = MorphWeightTable::weights(label);
            assert!(!preset.is_empty(), "{label} has no preset");
            for (shape, w) in preset {
                assert!((0.0..=1.0).contains(w), "{label}/{shape} out of range");
            }
        }
    }

    #[test]
    fn looks_up_single_shapes() {
        assert_eq!(MorphWeightTable::weight(EmotionLabel::Shock, "jawOpen"), 0.9);
        assert_eq!(MorphWeightTable::weight(EmotionLabel::Happy, "jawOpen"), 0.0);
    }
}
