//! Conversation coordinator: speech recognition, silence debounce and
//! dispatch to the assistant.

pub mod dispatch;
pub mod transcript;

pub use dispatch::Dispatcher;
pub use transcript::TranscriptBuffer;

use crate::config::AvatarConfig;
use crate::event_bus::{AvatarEvent, Component, EventBus};
use crate::gateway::AssistantGateway;
use fluent_avatar_domain::{AvatarError, ConversationTurn, EmotionLabel, RecognitionFault};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const READY_STATUS: &str = "Ready to talk to your AI friend";

/// One recognizer callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Provisional text, display only.
    Interim(String),
    /// A finalized segment.
    Final(String),
    Error(RecognitionFault),
    /// The engine closed the session on its own.
    Ended,
}

/// A continuous, interim-results recognition session.
pub trait RecognitionSession: Stream<Item = RecognitionEvent> + Send + Unpin + 'static {
    /// Stop recognizing. Idempotent.
    fn stop(&mut self);
}

/// Speech-to-text engine with a microphone.
pub trait SpeechRecognizer: Send + Sync + 'static {
    type Session: RecognitionSession;

    /// Request microphone access. Denial is [`AvatarError::MediaAccess`].
    fn acquire_microphone(&self) -> impl Future<Output = Result<(), AvatarError>> + Send;

    /// Stop every microphone track. Safe to call when nothing is held.
    fn release_microphone(&self);

    fn open_session(&self, language: &str) -> Result<Self::Session, AvatarError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Listening,
    Dispatching,
}

enum Outcome {
    Stopped,
    Ended,
    Utterance(String),
    Failed(String),
}

struct Listening {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

struct Shared<R, G> {
    recognizer: R,
    dispatcher: Dispatcher<G>,
    bus: EventBus,
    phase: Mutex<Phase>,
    status: Mutex<String>,
}

impl<R, G> Shared<R, G> {
    async fn report(&self, status: impl Into<String>) {
        let status = status.into();
        *self.status.lock() = status.clone();
        self.bus
            .publish(AvatarEvent::status(Component::Coordinator, status))
            .await;
    }

    fn set_phase(&self, phase: Phase) {
        let mut current = self.phase.lock();
        if *current != phase {
            tracing::debug!(from = ?*current, to = ?phase, "coordinator phase");
            *current = phase;
        }
    }
}

/// Drives one recording session at a time through
/// `Idle -> Listening -> Dispatching -> Idle`.
///
/// Recording never restarts on its own; every session begins with
/// [`ConversationCoordinator::start`].
pub struct ConversationCoordinator<R, G> {
    shared: Arc<Shared<R, G>>,
    emotion: watch::Receiver<EmotionLabel>,
    silence: Duration,
    language: String,
    listening: Option<Listening>,
}

impl<R, G> ConversationCoordinator<R, G>
where
    R: SpeechRecognizer,
    G: AssistantGateway,
{
    /// `emotion` supplies the user's current emotion at dispatch time.
    pub fn new(
        recognizer: R,
        gateway: G,
        bus: EventBus,
        emotion: watch::Receiver<EmotionLabel>,
        config: &AvatarConfig,
    ) -> Self {
        let dispatcher = Dispatcher::new(gateway, bus.clone(), config.emotion_reset_delay);
        Self {
            shared: Arc::new(Shared {
                recognizer,
                dispatcher,
                bus,
                phase: Mutex::new(Phase::Idle),
                status: Mutex::new(READY_STATUS.to_string()),
            }),
            emotion,
            silence: config.silence_timeout,
            language: config.recognition_language.clone(),
            listening: None,
        }
    }

    pub fn phase(&self) -> Phase {
        *self.shared.phase.lock()
    }

    pub fn status(&self) -> String {
        self.shared.status.lock().clone()
    }

    pub fn is_recording(&self) -> bool {
        self.phase() == Phase::Listening
    }

    pub fn dispatcher(&self) -> &Dispatcher<G> {
        &self.shared.dispatcher
    }

    /// Acquire the microphone and open a recognition session.
    ///
    /// A no-op unless the coordinator is idle.
    pub async fn start(&mut self) -> Result<(), AvatarError> {
        if self.phase() != Phase::Idle {
            tracing::debug!(phase = ?self.phase(), "start ignored");
            return Ok(());
        }
        // A previous session that ended on its own has already cleaned up.
        if let Some(stale) = self.listening.take() {
            let _ = stale.task.await;
        }

        let shared = &self.shared;
        if let Err(e) = shared.recognizer.acquire_microphone().await {
            tracing::error!("Error accessing microphone: {}", e);
            shared.report("Error accessing microphone").await;
            return Err(e);
        }
        let session = match shared.recognizer.open_session(&self.language) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("could not open recognition session: {}", e);
                shared.recognizer.release_microphone();
                shared
                    .report("Speech recognition not supported on this device")
                    .await;
                return Err(e);
            }
        };

        shared.set_phase(Phase::Listening);
        shared.report("Listening... speak to your AI friend").await;
        tracing::info!(language = %self.language, "recording started");

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(listen(
            session,
            self.shared.clone(),
            self.emotion.clone(),
            self.silence,
            stop_rx,
        ));
        self.listening = Some(Listening { stop_tx, task });
        Ok(())
    }

    /// Stop recording. Any pending utterance is discarded, and the session
    /// and microphone have been released by the time this returns.
    ///
    /// A request already dispatched is left to finish.
    pub async fn stop(&mut self) {
        if self.phase() != Phase::Listening {
            return;
        }
        let Some(listening) = self.listening.take() else {
            return;
        };
        let _ = listening.stop_tx.send(());
        if let Err(e) = listening.task.await {
            tracing::error!("recording task failed: {}", e);
            self.shared.recognizer.release_microphone();
            self.shared.set_phase(Phase::Idle);
        }
    }

    /// Dispatch `text` immediately with the current emotion, bypassing
    /// recognition. Dropped if a dispatch is already in flight.
    ///
    /// The returned future does not borrow the coordinator, so a caller
    /// holding it behind a lock can release the lock before awaiting.
    pub fn dispatch(
        &self,
        text: &str,
    ) -> impl Future<Output = Option<ConversationTurn>> + Send + 'static {
        let shared = self.shared.clone();
        let emotion = *self.emotion.borrow();
        let text = text.to_string();
        async move { shared.dispatcher.dispatch(&text, emotion).await }
    }
}

impl<R, G> Drop for ConversationCoordinator<R, G> {
    fn drop(&mut self) {
        // The task releases the session and microphone on its way out
        if let Some(listening) = self.listening.take() {
            let _ = listening.stop_tx.send(());
        }
    }
}

async fn listen<R, G>(
    mut session: R::Session,
    shared: Arc<Shared<R, G>>,
    emotion: watch::Receiver<EmotionLabel>,
    silence: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) where
    R: SpeechRecognizer,
    G: AssistantGateway,
{
    let mut buffer = TranscriptBuffer::new(silence);
    let mut session_open = true;

    let outcome = loop {
        let deadline = buffer.deadline();
        tokio::select! {
            biased;
            _ = &mut stop_rx => break Outcome::Stopped,
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                match buffer.take_due(Instant::now()) {
                    Some(text) => break Outcome::Utterance(text),
                    None if !session_open => break Outcome::Ended,
                    None => {}
                }
            }
            event = session.next(), if session_open => match event {
                Some(RecognitionEvent::Interim(text)) => {
                    shared.report(format!("\"{text}\"")).await;
                    shared.bus.publish(AvatarEvent::TranscriptPartial { text }).await;
                }
                Some(RecognitionEvent::Final(fragment)) => {
                    tracing::debug!("final fragment: {}", fragment);
                    buffer.push_final(&fragment, Instant::now());
                }
                Some(RecognitionEvent::Error(RecognitionFault::NoSpeech)) => {
                    shared.report("Waiting for you to speak...").await;
                }
                Some(RecognitionEvent::Error(RecognitionFault::Aborted)) => {
                    shared.report("Recording stopped").await;
                    session_open = false;
                    if !buffer.is_pending() {
                        break Outcome::Ended;
                    }
                }
                Some(RecognitionEvent::Error(RecognitionFault::Engine(code))) => {
                    break Outcome::Failed(code);
                }
                Some(RecognitionEvent::Ended) | None => {
                    session_open = false;
                    if !buffer.is_pending() {
                        break Outcome::Ended;
                    }
                }
            }
        }
    };

    session.stop();
    shared.recognizer.release_microphone();

    match outcome {
        Outcome::Stopped => {
            buffer.clear();
            shared.set_phase(Phase::Idle);
            tracing::info!("recording stopped");
            shared.report(READY_STATUS).await;
        }
        Outcome::Ended => {
            shared.set_phase(Phase::Idle);
            tracing::info!("recognition session ended");
            shared.report(READY_STATUS).await;
        }
        Outcome::Failed(code) => {
            buffer.clear();
            shared.set_phase(Phase::Idle);
            let fault = AvatarError::Recognition(RecognitionFault::Engine(code.clone()));
            tracing::error!("Speech recognition error: {}", fault);
            shared.report(format!("Error: {code}")).await;
        }
        Outcome::Utterance(text) => {
            shared.set_phase(Phase::Dispatching);
            let emotion = *emotion.borrow();
            shared.dispatcher.dispatch(&text, emotion).await;
            shared.set_phase(Phase::Idle);
        }
    }
}
