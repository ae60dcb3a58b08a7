//! Raw facial-expression classifier output.
use serde::{Deserialize, Serialize};

/// Confidence-scored expression labels for one detected face.
///
/// Labels are whatever the classifier emits (`happy`, `fearful`, ...); they
/// are mapped onto [`crate::EmotionLabel`] by the observer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionScores {
    scores: Vec<(String, f32)>,
}

impl ExpressionScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one label with its confidence.
    pub fn with(mut self, label: impl Into<String>, confidence: f32) -> Self {
        self.scores.push((label.into(), confidence));
        self
    }

    /// Highest-confidence label. The first one wins on equal scores.
    pub fn top(&self) -> Option<(&str, f32)> {
        self.scores
            .iter()
            .fold(None, |best: Option<(&str, f32)>, (label, score)| match best {
                Some((_, s)) if s >= *score => best,
                _ => Some((label.as_str(), *score)),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.scores.iter().map(|(l, s)| (l.as_str(), *s))
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for ExpressionScores {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().map(|(l, s)| (l.into(), s)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_picks_highest_confidence() {
        let scores: ExpressionScores =
            [("neutral", 0.1), ("happy", 0.7), ("sad", 0.2)].into_iter().collect();
        assert_eq!(scores.top(), Some(("happy", 0.7)));
    }

    #[test]
    fn top_of_empty_is_none() {
        assert_eq!(ExpressionScores::new().top(), None);
    }

    #[test]
    fn first_label_wins_ties() {
        let scores = ExpressionScores::new().with("angry", 0.5).with("sad", 0.5);
        assert_eq!(scores.top(), Some(("angry", 0.5)));
    }
}
