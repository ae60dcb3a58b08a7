//! Response presenter: speaks assistant replies and reports when the avatar
//! is talking.
use crate::config::AvatarConfig;
use crate::event_bus::{AvatarEvent, EventBus};
use fluent_avatar_domain::{AvatarError, ConversationTurn, Prosody};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Name fragments that mark a preferred voice, in no particular order.
pub const PREFERRED_VOICE_HINTS: [&str; 4] = ["female", "woman", "zira", "samantha"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub language: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// One request to the speech engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` lets the engine use its default voice.
    pub voice: Option<Voice>,
    pub prosody: Prosody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Started,
    Ended,
    Failed(String),
}

/// Text-to-speech engine. Only one utterance plays at a time.
pub trait SpeechSynthesizer: Send + Sync + 'static {
    type Events: Stream<Item = SynthesisEvent> + Send + Unpin + 'static;

    fn voices(&self) -> Vec<Voice>;

    /// Queue `utterance` and return its lifecycle events.
    fn speak(&self, utterance: Utterance) -> Result<Self::Events, AvatarError>;

    /// Silence whatever is playing.
    fn cancel(&self);
}

/// First voice whose name contains one of [`PREFERRED_VOICE_HINTS`],
/// ignoring case.
pub fn select_voice(voices: &[Voice]) -> Option<&Voice> {
    voices.iter().find(|voice| {
        let name = voice.name.to_lowercase();
        PREFERRED_VOICE_HINTS.iter().any(|hint| name.contains(hint))
    })
}

struct Speaking {
    tx: watch::Sender<bool>,
    bus: EventBus,
}

impl Speaking {
    async fn set(&self, speaking: bool) {
        if self.tx.send_replace(speaking) != speaking {
            self.bus
                .publish(AvatarEvent::SpeakingChanged { speaking })
                .await;
        }
    }
}

/// Speaks each new non-error turn with emotion-matched prosody.
pub struct ResponsePresenter<S> {
    synth: Arc<S>,
    speaking: Arc<Speaking>,
    lead_in: Duration,
    enabled: AtomicBool,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl<S: SpeechSynthesizer> ResponsePresenter<S> {
    pub fn new(synth: S, bus: EventBus, config: &AvatarConfig) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            synth: Arc::new(synth),
            speaking: Arc::new(Speaking { tx, bus }),
            lead_in: config.speech_lead_in,
            enabled: AtomicBool::new(true),
            current: Mutex::new(None),
        }
    }

    pub fn is_speaking(&self) -> bool {
        *self.speaking.tx.borrow()
    }

    /// Watch the speaking flag.
    pub fn speaking(&self) -> watch::Receiver<bool> {
        self.speaking.tx.subscribe()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turning speech off silences the current utterance.
    pub async fn set_enabled(&self, enabled: bool) {
        let was = self.enabled.swap(enabled, Ordering::AcqRel);
        if was != enabled {
            tracing::info!(enabled, "speech output toggled");
        }
        if !enabled {
            self.stop().await;
        }
    }

    /// Speak `turn` after the lead-in delay, replacing anything in progress.
    ///
    /// Returns `false` when the turn is skipped: error turns, empty replies
    /// and any turn while speech is disabled.
    pub async fn present(&self, turn: &ConversationTurn) -> bool {
        if turn.is_error || turn.ai_response.trim().is_empty() || !self.is_enabled() {
            return false;
        }
        self.stop().await;

        let synth = self.synth.clone();
        let speaking = self.speaking.clone();
        let lead_in = self.lead_in;
        let text = turn.ai_response.clone();
        let prosody = Prosody::for_emotion(turn.ai_emotion);

        let task = tokio::spawn(async move {
            tokio::time::sleep(lead_in).await;
            synth.cancel();

            let voices = synth.voices();
            let voice = select_voice(&voices).cloned();
            tracing::debug!(voice = ?voice.as_ref().map(|v| &v.name), ?prosody, "speaking reply");

            let mut events = match synth.speak(Utterance {
                text,
                voice,
                prosody,
            }) {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!("speech synthesis failed: {}", e);
                    return;
                }
            };
            while let Some(event) = events.next().await {
                match event {
                    SynthesisEvent::Started => speaking.set(true).await,
                    SynthesisEvent::Ended => break,
                    SynthesisEvent::Failed(reason) => {
                        tracing::warn!("speech synthesis error: {}", reason);
                        break;
                    }
                }
            }
            speaking.set(false).await;
        });

        *self.current.lock() = Some(task);
        true
    }

    /// Cancel speech in progress and clear the speaking flag.
    pub async fn stop(&self) {
        let task = self.current.lock().take();
        if let Some(task) = task {
            task.abort();
        }
        self.synth.cancel();
        self.speaking.set(false).await;
    }
}

impl<S> Drop for ResponsePresenter<S> {
    fn drop(&mut self) {
        if let Some(task) = self.current.get_mut().take() {
            task.abort();
        }
    }
}
