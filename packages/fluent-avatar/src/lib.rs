//! # Fluent Avatar
//!
//! Orchestration for an emotion-aware talking avatar.
//!
//! The crate connects five components over a typed [`EventBus`]:
//!
//! - [`ExpressionObserver`] samples a camera and keeps track of how long the
//!   user has shown each emotion.
//! - [`ConversationCoordinator`] turns recognized speech into utterances,
//!   waiting for a pause before it asks the assistant.
//! - [`AssistantGateway`] answers each utterance in character, with an
//!   animation and an emotion of its own.
//! - [`ResponsePresenter`] speaks the answer with prosody matched to that
//!   emotion.
//! - [`SceneComposer`] and [`AvatarRenderer`] decide what the avatar's face
//!   and body do each frame.
//!
//! Cameras, classifiers, recognizers and speech engines are traits; the
//! crate ships an HTTP gateway ([`GeminiGateway`]) and console stand-ins used
//! by the `avatar-chat` binary.
//!
//! ```ignore
//! let config = AvatarConfig::from_env();
//! let app = AvatarApp::new(
//!     &config,
//!     camera,
//!     classifier,
//!     recognizer,
//!     GeminiGateway::new(&config)?,
//!     synthesizer,
//! )
//! .await;
//!
//! app.select_emotion(EmotionLabel::Happy).await;
//! app.start_recording().await?;
//! ```

pub mod app;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod event_bus;
pub mod gateway;
pub mod observer;
pub mod presenter;
pub mod renderer;
pub mod scene;

pub use app::AvatarApp;
pub use config::AvatarConfig;
pub use coordinator::{
    ConversationCoordinator, Phase, RecognitionEvent, RecognitionSession, SpeechRecognizer,
};
pub use event_bus::{AvatarEvent, Component, EventBus, EventType};
pub use gateway::{AssistantGateway, GeminiGateway};
pub use observer::{
    Camera, EmotionLedger, ExpressionClassifier, ExpressionObserver, FrameSource,
    ObserverSnapshot,
};
pub use presenter::{ResponsePresenter, SpeechSynthesizer, SynthesisEvent, Utterance, Voice};
pub use renderer::{AvatarFrame, AvatarRenderer, MorphRig};
pub use scene::{SceneComposer, SceneLayout};

pub use fluent_avatar_domain as domain;

pub mod prelude {
    pub use crate::{
        AssistantGateway, AvatarApp, AvatarConfig, AvatarEvent, Camera, EventBus, EventType,
        ExpressionClassifier, FrameSource, GeminiGateway, RecognitionEvent, RecognitionSession,
        SpeechRecognizer, SpeechSynthesizer, SynthesisEvent,
    };
    pub use fluent_avatar_domain::prelude::*;
}
