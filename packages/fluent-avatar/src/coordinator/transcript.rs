//! Silence-debounced accumulation of finalized speech fragments.
use std::time::Duration;
use tokio::time::Instant;

/// Collects finalized fragments until the speaker has been quiet for the
/// silence timeout.
///
/// Every fragment re-arms the deadline, so a run of fragments separated by
/// less than the timeout yields exactly one utterance.
#[derive(Debug, Clone)]
pub struct TranscriptBuffer {
    text: String,
    silence: Duration,
    deadline: Option<Instant>,
}

impl TranscriptBuffer {
    pub fn new(silence: Duration) -> Self {
        Self {
            text: String::new(),
            silence,
            deadline: None,
        }
    }

    /// Append a finalized fragment heard at `now`.
    pub fn push_final(&mut self, fragment: &str, now: Instant) {
        self.text.push_str(fragment);
        self.text.push(' ');
        self.deadline = Some(now + self.silence);
    }

    /// When the pending utterance becomes due, if anything is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Accumulated text so far, untrimmed.
    pub fn pending_text(&self) -> &str {
        &self.text
    }

    /// Take the utterance if the silence window has elapsed at `now`.
    /// Whitespace-only text is dropped and yields `None`.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Take whatever is pending regardless of the deadline.
    pub fn flush(&mut self) -> Option<String> {
        self.deadline = None;
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Drop anything pending.
    pub fn clear(&mut self) {
        self.text.clear();
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SILENCE: Duration = Duration::from_secs(2);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn close_fragments_collapse_into_one_utterance() {
        let t0 = Instant::now();
        let mut buffer = TranscriptBuffer::new(SILENCE);
        buffer.push_final("hello", t0);
        buffer.push_final("world", t0 + ms(1500));

        assert_eq!(buffer.take_due(t0 + ms(3000)), None);
        assert_eq!(buffer.take_due(t0 + ms(3500)).as_deref(), Some("hello world"));
        assert!(!buffer.is_pending());
    }

    #[test]
    fn gap_longer_than_silence_starts_a_fresh_window() {
        let t0 = Instant::now();
        let mut buffer = TranscriptBuffer::new(SILENCE);
        buffer.push_final("first", t0);
        assert_eq!(buffer.take_due(t0 + ms(2000)).as_deref(), Some("first"));

        buffer.push_final("second", t0 + ms(2100));
        assert_eq!(buffer.pending_text(), "second ");
        assert_eq!(buffer.take_due(t0 + ms(4100)).as_deref(), Some("second"));
    }

    #[test]
    fn whitespace_only_fragments_dispatch_nothing() {
        let t0 = Instant::now();
        let mut buffer = TranscriptBuffer::new(SILENCE);
        buffer.push_final("   ", t0);
        assert!(buffer.is_pending());
        assert_eq!(buffer.take_due(t0 + SILENCE), None);
        assert!(!buffer.is_pending());
    }

    #[test]
    fn clear_discards_pending_text() {
        let t0 = Instant::now();
        let mut buffer = TranscriptBuffer::new(SILENCE);
        buffer.push_final("never mind", t0);
        buffer.clear();
        assert_eq!(buffer.deadline(), None);
        assert_eq!(buffer.flush(), None);
    }
}
