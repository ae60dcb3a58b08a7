//! Wires the components together over one event bus.
use crate::config::AvatarConfig;
use crate::coordinator::{ConversationCoordinator, Phase, SpeechRecognizer};
use crate::event_bus::{AvatarEvent, EventBus, EventType};
use crate::gateway::AssistantGateway;
use crate::observer::{Camera, ExpressionClassifier, ExpressionObserver, ObserverSnapshot};
use crate::presenter::{ResponsePresenter, SpeechSynthesizer};
use crate::renderer::AvatarFrame;
use crate::scene::SceneComposer;
use fluent_avatar_domain::{AvatarError, ConversationTurn, EmotionLabel};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

const SCENE_EVENTS: [EventType; 10] = [
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
];

/// A running avatar: scene state, face tracking, conversation and speech.
pub struct AvatarApp<C: Camera, X, R, G, S> {
    bus: EventBus,
    scene: Arc<Mutex<SceneComposer>>,
    observer: tokio::sync::Mutex<ExpressionObserver<C, X>>,
    coordinator: RwLock<ConversationCoordinator<R, G>>,
    presenter: Arc<ResponsePresenter<S>>,
}

impl<C, X, R, G, S> AvatarApp<C, X, R, G, S>
where
    C: Camera,
    X: ExpressionClassifier<C::Stream>,
    R: SpeechRecognizer,
    G: AssistantGateway,
    S: SpeechSynthesizer,
{
    pub async fn new(
        config: &AvatarConfig,
        camera: C,
        classifier: X,
        recognizer: R,
        gateway: G,
        synthesizer: S,
    ) -> Self {
        let bus = EventBus::new();
        let scene = Arc::new(Mutex::new(SceneComposer::with_defaults(config.crossfade)));
        let user_emotion = scene.lock().user_emotion();

        // Scene first so history is recorded before speech starts
        let scene_state = scene.clone();
        bus.subscribe_all(&SCENE_EVENTS, move |event| {
            let scene = scene_state.clone();
            Box::pin(async move {
                scene.lock().apply(&event, Instant::now());
                Ok(())
            })
        })
        .await;

        let presenter = Arc::new(ResponsePresenter::new(synthesizer, bus.clone(), config));
        let speaker = presenter.clone();
        bus.subscribe(EventType::TurnCompleted, move |event| {
            let presenter = speaker.clone();
            Box::pin(async move {
                if let AvatarEvent::TurnCompleted(turn) = event {
                    presenter.present(&turn).await;
                }
                Ok(())
            })
        })
        .await;

        let observer = ExpressionObserver::new(camera, classifier, bus.clone(), config);
        let coordinator =
            ConversationCoordinator::new(recognizer, gateway, bus.clone(), user_emotion, config);

        tracing::info!(model = %config.model, "avatar app ready");
        Self {
            bus,
            scene,
            observer: tokio::sync::Mutex::new(observer),
            coordinator: RwLock::new(coordinator),
            presenter,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn scene(&self) -> Arc<Mutex<SceneComposer>> {
        self.scene.clone()
    }

    pub fn presenter(&self) -> &ResponsePresenter<S> {
        &self.presenter
    }

    /// Manually pick the user's emotion. Face tracking, if running, is
    /// switched off first.
    pub async fn select_emotion(&self, emotion: EmotionLabel) {
        self.observer.lock().await.stop().await;
        self.bus
            .publish(AvatarEvent::EmotionSelected { emotion })
            .await;
    }

    pub async fn start_tracking(&self) -> Result<(), AvatarError> {
        self.observer.lock().await.start().await
    }

    pub async fn stop_tracking(&self) {
        self.observer.lock().await.stop().await;
    }

    /// Start tracking if stopped, stop it if running. Returns whether
    /// tracking is now active.
    pub async fn toggle_tracking(&self) -> Result<bool, AvatarError> {
        let mut observer = self.observer.lock().await;
        if observer.is_active() {
            observer.stop().await;
            Ok(false)
        } else {
            observer.start().await?;
            Ok(true)
        }
    }

    pub async fn tracking_snapshot(&self) -> ObserverSnapshot {
        self.observer.lock().await.snapshot()
    }

    pub async fn start_recording(&self) -> Result<(), AvatarError> {
        self.coordinator.write().await.start().await
    }

    pub async fn stop_recording(&self) {
        self.coordinator.write().await.stop().await;
    }

    pub async fn is_recording(&self) -> bool {
        self.coordinator.read().await.is_recording()
    }

    pub async fn phase(&self) -> Phase {
        self.coordinator.read().await.phase()
    }

    /// Send typed text straight to the assistant.
    pub async fn say(&self, text: &str) -> Option<ConversationTurn> {
        // Release the lock first so stop_recording is never queued behind
        // the assistant round trip
        let pending = self.coordinator.read().await.dispatch(text);
        pending.await
    }

    pub async fn set_speech_enabled(&self, enabled: bool) {
        self.presenter.set_enabled(enabled).await;
    }

    /// The avatar's pose at `now`.
    pub fn frame(&self, now: Instant) -> AvatarFrame {
        self.scene.lock().frame(now)
    }

    /// Release every device and silence speech.
    pub async fn shutdown(&self) {
        self.stop_recording().await;
        self.stop_tracking().await;
        self.presenter.stop().await;
        tracing::info!("avatar app shut down");
    }
}
