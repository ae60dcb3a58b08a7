//! Per-emotion accumulated display time.
use fluent_avatar_domain::EmotionLabel;
use std::time::Duration;
use tokio::time::Instant;

/// Accumulates how long each emotion has been held.
///
/// Exactly one label is active at a time. Its open span is only added to
/// the totals when the label is superseded or the ledger is closed out, so
/// totals never decrease.
#[derive(Debug, Clone)]
pub struct EmotionLedger {
    /// Totals in first-seen order.
    totals: Vec<(EmotionLabel, Duration)>,
    active: EmotionLabel,
    span_start: Option<Instant>,
    longest: Option<EmotionLabel>,
}

impl Default for EmotionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionLedger {
    pub fn new() -> Self {
        Self {
            totals: Vec::new(),
            active: EmotionLabel::Neutral,
            span_start: None,
            longest: None,
        }
    }

    /// Open the first span (neutral) at `now`. No-op if already running.
    pub fn activate(&mut self, now: Instant) {
        if self.span_start.is_none() {
            self.span_start = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.span_start.is_some()
    }

    pub fn active(&self) -> EmotionLabel {
        self.active
    }

    /// Record a sample. Returns `true` when the active label changed.
    pub fn observe(&mut self, label: EmotionLabel, now: Instant) -> bool {
        if self.span_start.is_none() {
            self.active = label;
            self.span_start = Some(now);
            return true;
        }
        if label == self.active {
            return false;
        }
        self.close_span(now);
        self.active = label;
        self.span_start = Some(now);
        true
    }

    /// Close the open span without opening a new one.
    pub fn close_out(&mut self, now: Instant) {
        if self.span_start.is_some() {
            self.close_span(now);
            self.span_start = None;
        }
    }

    /// Forget everything; the next activation starts from neutral.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Running length of the active span.
    pub fn current_span(&self, now: Instant) -> Duration {
        self.span_start
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start))
    }

    /// Closed-out total for `label`.
    pub fn total(&self, label: EmotionLabel) -> Duration {
        self.totals
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(Duration::ZERO, |(_, d)| *d)
    }

    pub fn totals(&self) -> &[(EmotionLabel, Duration)] {
        &self.totals
    }

    /// Sum of every closed-out span.
    pub fn recorded(&self) -> Duration {
        self.totals.iter().map(|(_, d)| *d).sum()
    }

    /// Label with the largest total, recomputed whenever a span closes.
    /// On equal totals the label seen first wins.
    pub fn longest(&self) -> Option<EmotionLabel> {
        self.longest
    }

    fn close_span(&mut self, now: Instant) {
        let Some(start) = self.span_start else {
            return;
        };
        let held = now.saturating_duration_since(start);
        match self.totals.iter_mut().find(|(l, _)| *l == self.active) {
            Some((_, total)) => *total += held,
            None => self.totals.push((self.active, held)),
        }
        self.longest = self
            .totals
            .iter()
            .fold(None, |best: Option<(EmotionLabel, Duration)>, &(l, d)| match best {
                Some((_, max)) if max >= d => best,
                _ => Some((l, d)),
            })
            .map(|(l, _)| l);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn totals_sum_to_elapsed_time() {
        let t0 = Instant::now();
        let mut ledger = EmotionLedger::new();
        ledger.activate(t0);

        let script = [
            (100, EmotionLabel::Happy),
            (350, EmotionLabel::Sad),
            (400, EmotionLabel::Happy),
            (1200, EmotionLabel::Angry),
            (1500, EmotionLabel::Neutral),
        ];
        for (at, label) in script {
            assert!(ledger.observe(label, t0 + ms(at)));
        }
        ledger.close_out(t0 + ms(2000));

        assert_eq!(ledger.recorded(), ms(2000));
        assert_eq!(ledger.total(EmotionLabel::Happy), ms(250 + 800));
        assert_eq!(ledger.total(EmotionLabel::Neutral), ms(100 + 500));
        assert_eq!(ledger.longest(), Some(EmotionLabel::Happy));
    }

    #[test]
    fn repeated_samples_do_not_split_spans() {
        let t0 = Instant::now();
        let mut ledger = EmotionLedger::new();
        ledger.activate(t0);
        assert!(ledger.observe(EmotionLabel::Sad, t0 + ms(100)));
        assert!(!ledger.observe(EmotionLabel::Sad, t0 + ms(200)));
        assert!(!ledger.observe(EmotionLabel::Sad, t0 + ms(300)));
        assert_eq!(ledger.total(EmotionLabel::Sad), Duration::ZERO);
        assert_eq!(ledger.current_span(t0 + ms(300)), ms(200));
    }

    #[test]
    fn longest_is_argmax_with_first_seen_ties() {
        let t0 = Instant::now();
        let mut ledger = EmotionLedger::new();
        ledger.activate(t0);
        ledger.observe(EmotionLabel::Happy, t0 + ms(500));
        ledger.observe(EmotionLabel::Sad, t0 + ms(1000));
        ledger.close_out(t0 + ms(1500));
        // neutral, happy and sad all hold 500ms
        assert_eq!(ledger.longest(), Some(EmotionLabel::Neutral));
    }

    #[test]
    fn reset_clears_all_state() {
        let t0 = Instant::now();
        let mut ledger = EmotionLedger::new();
        ledger.activate(t0);
        ledger.observe(EmotionLabel::Angry, t0 + ms(10));
        ledger.reset();
        assert_eq!(ledger.active(), EmotionLabel::Neutral);
        assert!(ledger.totals().is_empty());
        assert_eq!(ledger.longest(), None);
        assert!(!ledger.is_running());
    }
}
