//! Classifier labels to avatar emotions.
use fluent_avatar_domain::{EmotionLabel, ExpressionScores};

/// Classifier labels that do not exist in the avatar vocabulary under the
/// same name.
const RENAMES: [(&str, EmotionLabel); 1] = [("fearful", EmotionLabel::Surprised)];

/// Default minimum confidence for the top label.
pub const CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Derive one emotion from a classifier result.
///
/// The top-confidence label is used; below `threshold` the face reads as
/// neutral. Renamed labels are translated, known labels pass through and
/// anything else is neutral.
pub fn map_expression(scores: &ExpressionScores, threshold: f32) -> EmotionLabel {
    let Some((label, confidence)) = scores.top() else {
        return EmotionLabel::Neutral;
    };
    if confidence < threshold {
        return EmotionLabel::Neutral;
    }
    rename(label)
}

/// Translate a single classifier label.
pub fn rename(label: &str) -> EmotionLabel {
    RENAMES
        .iter()
        .find(|(raw, _)| raw.eq_ignore_ascii_case(label.trim()))
        .map(|(_, emotion)| *emotion)
        .unwrap_or_else(|| EmotionLabel::parse_lenient(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(label: &str, confidence: f32) -> ExpressionScores {
        ExpressionScores::new()
            .with(label, confidence)
            .with("neutral", confidence / 4.0)
    }

    #[test]
    fn low_confidence_is_neutral_for_any_label() {
        for label in ["happy", "angry", "fearful", "surprised", "disgusted"] {
            for confidence in [0.0, 0.1, 0.25, 0.39] {
                assert_eq!(
                    map_expression(&single(label, confidence), CONFIDENCE_THRESHOLD),
                    EmotionLabel::Neutral,
                    "{label}@{confidence}"
                );
            }
        }
    }

    #[test]
    fn fearful_renders_as_surprised() {
        assert_eq!(
            map_expression(&single("fearful", 0.9), CONFIDENCE_THRESHOLD),
            EmotionLabel::Surprised
        );
    }

    #[test]
    fn vocabulary_labels_pass_through() {
        for emotion in EmotionLabel::ALL {
            assert_eq!(
                map_expression(&single(emotion.as_str(), 0.8), CONFIDENCE_THRESHOLD),
                emotion
            );
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(
            map_expression(&single("sad", 0.4), CONFIDENCE_THRESHOLD),
            EmotionLabel::Sad
        );
    }

    #[test]
    fn unknown_classifier_label_is_neutral() {
        assert_eq!(
            map_expression(&single("contempt", 0.95), CONFIDENCE_THRESHOLD),
            EmotionLabel::Neutral
        );
    }
}
