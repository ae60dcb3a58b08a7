//! Terminal stand-ins for the media devices, used by `avatar-chat`.
//!
//! Typed lines play the part of finalized speech, replies are written to
//! the log instead of a speaker, and there is no camera.
use crate::app::AvatarApp;
use crate::coordinator::{Phase, RecognitionEvent, RecognitionSession, SpeechRecognizer};
use crate::gateway::AssistantGateway;
use crate::observer::{Camera, ExpressionClassifier, FrameSource};
use crate::presenter::{SpeechSynthesizer, SynthesisEvent, Utterance, Voice};
use fluent_avatar_domain::{AvatarError, ExpressionScores};
use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Speech recognizer fed by [`ConsoleRecognizer::feed`].
#[derive(Clone, Default)]
pub struct ConsoleRecognizer {
    route: Arc<Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>>,
}

impl ConsoleRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `line` to the open session as a finalized fragment. Returns
    /// `false` when no session is listening.
    pub fn feed(&self, line: &str) -> bool {
        let route = self.route.lock();
        match route.as_ref() {
            Some(tx) => tx.send(RecognitionEvent::Final(line.to_string())).is_ok(),
            None => false,
        }
    }

    /// Hand a typed line to `app`, opening a recording session first when
    /// none is listening.
    ///
    /// Returns `false` when the line was not heard because the previous
    /// utterance is still being sent or answered.
    pub async fn deliver<C, X, G, S>(
        &self,
        app: &AvatarApp<C, X, ConsoleRecognizer, G, S>,
        line: &str,
    ) -> Result<bool, AvatarError>
    where
        C: Camera,
        X: ExpressionClassifier<C::Stream>,
        G: AssistantGateway,
        S: SpeechSynthesizer,
    {
        for _ in 0..2 {
            match app.phase().await {
                Phase::Dispatching => return Ok(false),
                Phase::Idle => app.start_recording().await?,
                Phase::Listening => {}
            }
            if self.feed(line) {
                return Ok(true);
            }
            // The session closed after the phase was read
            tokio::task::yield_now().await;
        }
        tracing::debug!("typed line arrived while the last utterance was closing");
        Ok(false)
    }

    /// Close the open session as if the engine had ended it.
    pub fn end_session(&self) {
        if let Some(tx) = self.route.lock().take() {
            let _ = tx.send(RecognitionEvent::Ended);
        }
    }
}

pub struct ConsoleSession {
    events: UnboundedReceiverStream<RecognitionEvent>,
}

impl Stream for ConsoleSession {
    type Item = RecognitionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl RecognitionSession for ConsoleSession {
    fn stop(&mut self) {
        self.events.close();
    }
}

impl SpeechRecognizer for ConsoleRecognizer {
    type Session = ConsoleSession;

    async fn acquire_microphone(&self) -> Result<(), AvatarError> {
        Ok(())
    }

    fn release_microphone(&self) {
        self.route.lock().take();
    }

    fn open_session(&self, language: &str) -> Result<ConsoleSession, AvatarError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.route.lock() = Some(tx);
        tracing::debug!(language, "console recognition session opened");
        Ok(ConsoleSession {
            events: UnboundedReceiverStream::new(rx),
        })
    }
}

/// Writes each utterance to the log, taking roughly as long as saying it
/// would.
#[derive(Debug, Clone)]
pub struct ConsoleSynthesizer {
    per_word: Duration,
}

impl Default for ConsoleSynthesizer {
    fn default() -> Self {
        Self {
            per_word: Duration::from_millis(250),
        }
    }
}

impl ConsoleSynthesizer {
    pub fn new(per_word: Duration) -> Self {
        Self { per_word }
    }
}

impl SpeechSynthesizer for ConsoleSynthesizer {
    type Events = Pin<Box<dyn Stream<Item = SynthesisEvent> + Send>>;

    fn voices(&self) -> Vec<Voice> {
        vec![
            Voice::new("Console Narrator", "en-US"),
            Voice::new("Console Female", "en-US"),
        ]
    }

    fn speak(&self, utterance: Utterance) -> Result<Self::Events, AvatarError> {
        let words = utterance.text.split_whitespace().count().max(1) as u32;
        let rate = if utterance.prosody.rate > 0.0 {
            utterance.prosody.rate
        } else {
            1.0
        };
        let duration = self.per_word.mul_f32(words as f32 / rate);

        Ok(Box::pin(async_stream::stream! {
            tracing::info!(
                voice = ?utterance.voice.as_ref().map(|v| &v.name),
                pitch = utterance.prosody.pitch,
                volume = utterance.prosody.volume,
                "speaking: {}",
                utterance.text
            );
            yield SynthesisEvent::Started;
            tokio::time::sleep(duration).await;
            yield SynthesisEvent::Ended;
        }))
    }

    fn cancel(&self) {
        tracing::trace!("console speech cancelled");
    }
}

/// A camera that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

#[derive(Debug)]
pub struct NoFrames;

impl FrameSource for NoFrames {
    fn is_ready(&self) -> bool {
        false
    }

    fn release(&mut self) {}
}

impl Camera for NoCamera {
    type Stream = NoFrames;

    async fn open(&self) -> Result<NoFrames, AvatarError> {
        Err(AvatarError::MediaAccess(
            "no camera is attached to this console".to_string(),
        ))
    }
}

/// Classifier that never sees a face.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

impl ExpressionClassifier<NoFrames> for NoClassifier {
    async fn detect(&mut self, _source: &NoFrames) -> Result<Vec<ExpressionScores>, AvatarError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn fed_lines_arrive_as_final_fragments() {
        let recognizer = ConsoleRecognizer::new();
        assert!(!recognizer.feed("too early"));

        let mut session = recognizer.open_session("en-US").expect("session");
        assert!(recognizer.feed("hello"));
        recognizer.end_session();

        assert_eq!(
            session.next().await,
            Some(RecognitionEvent::Final("hello".to_string()))
        );
        assert_eq!(session.next().await, Some(RecognitionEvent::Ended));
        assert_eq!(session.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn synthesizer_reports_start_then_end() {
        let synth = ConsoleSynthesizer::new(Duration::from_millis(10));
        let events: Vec<_> = synth
            .speak(Utterance {
                text: "nice to see you".into(),
                voice: None,
                prosody: fluent_avatar_domain::Prosody::DEFAULT,
            })
            .expect("speak")
            .collect()
            .await;
        assert_eq!(events, [SynthesisEvent::Started, SynthesisEvent::Ended]);
    }
}
