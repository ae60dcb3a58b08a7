//! Scripted stand-ins for the external devices and services.
#![allow(dead_code)]

use fluent_avatar::coordinator::{RecognitionEvent, RecognitionSession, SpeechRecognizer};
use fluent_avatar::event_bus::{AvatarEvent, EventBus, EventType};
use fluent_avatar::gateway::AssistantGateway;
use fluent_avatar::observer::{Camera, ExpressionClassifier, FrameSource};
use fluent_avatar::presenter::{SpeechSynthesizer, SynthesisEvent, Utterance, Voice};
use fluent_avatar_domain::{
    AssistantReply, AvatarError, EmotionLabel, ExpressionScores, ReplyQuality,
};
use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Let spawned tasks run without moving the paused clock much.
pub async fn settle() {
    tokio::time::sleep(ms(1)).await;
}

/// Every event published on `bus`, in order.
pub async fn record_events(bus: &EventBus) -> Arc<Mutex<Vec<AvatarEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe_all(
        &[
            EventType::EmotionSelected,
            EventType::TrackingStarted,
            EventType::TrackingStopped,
            EventType::EmotionDetected,
            EventType::TranscriptPartial,
            EventType::UtteranceDispatched,
            EventType::TurnCompleted,
            EventType::SpeakingChanged,
            EventType::EmotionReset,
            EventType::StatusChanged,
        ],
        move |event| {
            let sink = sink.clone();
            Box::pin(async move {
                sink.lock().push(event);
                Ok(())
            })
        },
    )
    .await;
    seen
}

// --- camera -----------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FakeCamera {
    pub deny: bool,
    pub not_ready: bool,
    pub opened: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    pub fn warming_up() -> Self {
        Self {
            not_ready: true,
            ..Self::default()
        }
    }
}

pub struct FakeStream {
    ready: bool,
    released: Arc<AtomicUsize>,
}

impl FrameSource for FakeStream {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Camera for FakeCamera {
    type Stream = FakeStream;

    async fn open(&self) -> Result<FakeStream, AvatarError> {
        if self.deny {
            return Err(AvatarError::MediaAccess("Permission denied".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeStream {
            ready: !self.not_ready,
            released: self.released.clone(),
        })
    }
}

/// Reports whatever face the test is currently "showing".
#[derive(Clone, Default)]
pub struct FakeClassifier {
    faces: Arc<Mutex<Vec<ExpressionScores>>>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeClassifier {
    pub fn show(&self, label: &str, confidence: f32) {
        *self.faces.lock() = vec![ExpressionScores::new().with(label, confidence)];
    }

    pub fn hide(&self) {
        self.faces.lock().clear();
    }
}

impl ExpressionClassifier<FakeStream> for FakeClassifier {
    async fn detect(&mut self, _source: &FakeStream) -> Result<Vec<ExpressionScores>, AvatarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.faces.lock().clone())
    }
}

// --- speech recognition -----------------------------------------------------

#[derive(Clone, Default)]
pub struct FakeRecognizer {
    pub deny: bool,
    route: Arc<Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>>,
    pub mic_held: Arc<AtomicBool>,
    pub sessions_opened: Arc<AtomicUsize>,
    pub sessions_stopped: Arc<AtomicUsize>,
    pub language: Arc<Mutex<Option<String>>>,
}

impl FakeRecognizer {
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    pub fn emit(&self, event: RecognitionEvent) {
        if let Some(tx) = self.route.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn say(&self, fragment: &str) {
        self.emit(RecognitionEvent::Final(fragment.to_string()));
    }

    pub fn is_mic_held(&self) -> bool {
        self.mic_held.load(Ordering::SeqCst)
    }
}

pub struct FakeSession {
    events: UnboundedReceiverStream<RecognitionEvent>,
    stopped: Arc<AtomicUsize>,
}

impl Stream for FakeSession {
    type Item = RecognitionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl RecognitionSession for FakeSession {
    fn stop(&mut self) {
        self.events.close();
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

impl SpeechRecognizer for FakeRecognizer {
    type Session = FakeSession;

    async fn acquire_microphone(&self) -> Result<(), AvatarError> {
        if self.deny {
            return Err(AvatarError::MediaAccess("NotAllowedError".into()));
        }
        self.mic_held.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release_microphone(&self) {
        self.mic_held.store(false, Ordering::SeqCst);
    }

    fn open_session(&self, language: &str) -> Result<FakeSession, AvatarError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.route.lock() = Some(tx);
        *self.language.lock() = Some(language.to_string());
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            events: UnboundedReceiverStream::new(rx),
            stopped: self.sessions_stopped.clone(),
        })
    }
}

// --- assistant --------------------------------------------------------------

pub fn reply(text: &str, animation: &str, emotion: EmotionLabel) -> AssistantReply {
    AssistantReply {
        text: text.to_string(),
        animation: animation.to_string(),
        emotion,
        raw: String::new(),
        quality: ReplyQuality::Structured,
    }
}

#[derive(Clone)]
pub struct FakeGateway {
    outcome: Result<AssistantReply, AvatarError>,
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<(String, EmotionLabel)>>>,
}

impl FakeGateway {
    pub fn replying(reply: AssistantReply) -> Self {
        Self {
            outcome: Ok(reply),
            delay: ms(100),
            calls: Arc::default(),
            requests: Arc::default(),
        }
    }

    pub fn failing(error: AvatarError) -> Self {
        Self {
            outcome: Err(error),
            ..Self::replying(reply("", "Idle.fbx", EmotionLabel::Neutral))
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssistantGateway for FakeGateway {
    async fn respond(
        &self,
        utterance: &str,
        emotion: EmotionLabel,
    ) -> Result<AssistantReply, AvatarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((utterance.to_string(), emotion));
        tokio::time::sleep(self.delay).await;
        self.outcome.clone()
    }
}

// --- speech synthesis -------------------------------------------------------

#[derive(Clone)]
pub struct FakeSynthesizer {
    pub voices: Vec<Voice>,
    pub duration: Duration,
    pub spoken: Arc<Mutex<Vec<Utterance>>>,
    pub cancels: Arc<AtomicUsize>,
}

impl Default for FakeSynthesizer {
    fn default() -> Self {
        Self {
            voices: vec![
                Voice::new("Alex", "en-US"),
                Voice::new("Samantha", "en-US"),
            ],
            duration: ms(1000),
            spoken: Arc::default(),
            cancels: Arc::default(),
        }
    }
}

impl SpeechSynthesizer for FakeSynthesizer {
    type Events = Pin<Box<dyn Stream<Item = SynthesisEvent> + Send>>;

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance) -> Result<Self::Events, AvatarError> {
        self.spoken.lock().push(utterance);
        let duration = self.duration;
        Ok(Box::pin(async_stream::stream! {
            yield SynthesisEvent::Started;
            tokio::time::sleep(duration).await;
            yield SynthesisEvent::Ended;
        }))
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}
