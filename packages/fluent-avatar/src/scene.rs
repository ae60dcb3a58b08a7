//! Scene composition: the static 3D view description and the top-level app
//! state that decides what the avatar shows.
use crate::event_bus::{AvatarEvent, Component};
use crate::renderer::{AvatarFrame, AvatarRenderer};
use fluent_avatar_domain::{AnimationClip, ConversationHistory, EmotionLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    pub position: [f32; 3],
    pub fov: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitControls {
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    pub min_distance: f32,
    pub max_distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Light {
    Ambient {
        intensity: f32,
    },
    Directional {
        position: [f32; 3],
        intensity: f32,
        cast_shadow: bool,
    },
    Point {
        position: [f32; 3],
        intensity: f32,
    },
}

/// Textured plane behind the avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backdrop {
    pub texture: String,
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarPlacement {
    pub model: String,
    pub idle_animation: String,
    pub position: [f32; 3],
    pub scale: f32,
}

/// Everything a renderer needs to set up the view, independent of any
/// graphics API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub camera: CameraRig,
    pub controls: OrbitControls,
    pub lights: Vec<Light>,
    pub environment: String,
    pub background: Backdrop,
    pub avatar: AvatarPlacement,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            camera: CameraRig {
                position: [0.0, 0.0, 5.0],
                fov: 75.0,
            },
            controls: OrbitControls {
                enable_pan: true,
                enable_zoom: true,
                enable_rotate: true,
                min_distance: 2.0,
                max_distance: 20.0,
            },
            lights: vec![
                Light::Ambient { intensity: 0.5 },
                Light::Directional {
                    position: [10.0, 10.0, 5.0],
                    intensity: 1.0,
                    cast_shadow: true,
                },
                Light::Point {
                    position: [-10.0, -10.0, -10.0],
                    intensity: 0.3,
                },
            ],
            environment: "studio".to_string(),
            background: Backdrop {
                texture: "texture/Hirsipaviljonki_pieni.jpg".to_string(),
                position: [0.0, 5.0, -10.0],
                scale: [80.0, 48.0, 4.0],
            },
            avatar: AvatarPlacement {
                model: "model/avatar.glb".to_string(),
                idle_animation: format!("animation/{}", AnimationClip::Idle.file_name()),
                position: [0.0, -8.0, 0.0],
                scale: 6.0,
            },
        }
    }
}

/// Top-level app state.
///
/// The user's emotion comes from face tracking while it runs and from the
/// manual selection otherwise. After a reply the assistant's own emotion is
/// shown until the next [`AvatarEvent::EmotionReset`].
pub struct SceneComposer {
    layout: SceneLayout,
    renderer: AvatarRenderer,
    selected: EmotionLabel,
    detected: EmotionLabel,
    longest: Option<EmotionLabel>,
    tracking: bool,
    reply_emotion: Option<EmotionLabel>,
    transcript: String,
    history: ConversationHistory,
    statuses: BTreeMap<Component, String>,
    user_emotion: watch::Sender<EmotionLabel>,
}

impl SceneComposer {
    pub fn new(layout: SceneLayout, renderer: AvatarRenderer) -> Self {
        let (user_emotion, _) = watch::channel(EmotionLabel::Neutral);
        Self {
            layout,
            renderer,
            selected: EmotionLabel::Neutral,
            detected: EmotionLabel::Neutral,
            longest: None,
            tracking: false,
            reply_emotion: None,
            transcript: String::new(),
            history: ConversationHistory::new(),
            statuses: BTreeMap::new(),
            user_emotion,
        }
    }

    pub fn with_defaults(crossfade: Duration) -> Self {
        Self::new(SceneLayout::default(), AvatarRenderer::with_defaults(crossfade))
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn renderer(&self) -> &AvatarRenderer {
        &self.renderer
    }

    /// Follow the user's current emotion, as sent with each utterance.
    pub fn user_emotion(&self) -> watch::Receiver<EmotionLabel> {
        self.user_emotion.subscribe()
    }

    pub fn current_user_emotion(&self) -> EmotionLabel {
        if self.tracking {
            self.detected
        } else {
            self.selected
        }
    }

    /// Emotion on the avatar's face.
    pub fn displayed_emotion(&self) -> EmotionLabel {
        self.reply_emotion
            .unwrap_or_else(|| self.current_user_emotion())
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn longest_emotion(&self) -> Option<EmotionLabel> {
        self.longest
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn status(&self, component: Component) -> Option<&str> {
        self.statuses.get(&component).map(String::as_str)
    }

    /// Fold one bus event into the state at `now`.
    pub fn apply(&mut self, event: &AvatarEvent, now: Instant) {
        match event {
            AvatarEvent::EmotionSelected { emotion } => self.selected = *emotion,
            AvatarEvent::TrackingStarted => self.tracking = true,
            AvatarEvent::TrackingStopped => {
                self.tracking = false;
                self.detected = EmotionLabel::Neutral;
                self.longest = None;
            }
            AvatarEvent::EmotionDetected { emotion, longest } => {
                self.detected = *emotion;
                self.selected = *emotion;
                self.longest = *longest;
            }
            AvatarEvent::TranscriptPartial { text } => self.transcript.clone_from(text),
            AvatarEvent::UtteranceDispatched { .. } => self.transcript.clear(),
            AvatarEvent::TurnCompleted(turn) => {
                if !turn.is_error {
                    self.reply_emotion = Some(turn.ai_emotion);
                    let playing = self.renderer.set_animation(&turn.animation, now);
                    tracing::debug!(requested = %turn.animation, %playing, "reply animation");
                }
                self.history.push(turn.clone());
            }
            AvatarEvent::SpeakingChanged { speaking } => {
                self.renderer.set_speaking(*speaking, now)
            }
            AvatarEvent::EmotionReset => {
                tracing::debug!("resetting avatar to neutral");
                self.reply_emotion = None;
                self.selected = EmotionLabel::Neutral;
                self.renderer
                    .set_animation(AnimationClip::Idle.file_name(), now);
            }
            AvatarEvent::StatusChanged { component, status } => {
                self.statuses.insert(*component, status.clone());
            }
        }

        self.renderer.set_emotion(self.displayed_emotion());
        let current = self.current_user_emotion();
        self.user_emotion.send_if_modified(|emotion| {
            let changed = *emotion != current;
            *emotion = current;
            changed
        });
    }

    /// Compute the avatar's pose at `now`.
    pub fn frame(&mut self, now: Instant) -> AvatarFrame {
        self.renderer.frame(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluent_avatar_domain::{AssistantReply, AvatarError, ConversationTurn, ReplyQuality};

    fn composer() -> SceneComposer {
        SceneComposer::with_defaults(Duration::from_millis(500))
    }

    fn turn(emotion: EmotionLabel, animation: &str) -> ConversationTurn {
        ConversationTurn::completed(
            "hi",
            EmotionLabel::Neutral,
            AssistantReply {
                text: "hello!".into(),
                animation: animation.into(),
                emotion,
                raw: String::new(),
                quality: ReplyQuality::Structured,
            },
        )
    }

    #[test]
    fn default_layout_serializes_view_settings() {
        let json = serde_json::to_value(SceneLayout::default()).expect("serialize");
        assert_eq!(json["camera"]["fov"], 75.0);
        assert_eq!(json["lights"][0]["kind"], "ambient");
        assert_eq!(json["lights"][1]["cast_shadow"], true);
        assert_eq!(json["environment"], "studio");
        assert_eq!(json["avatar"]["scale"], 6.0);
        assert_eq!(json["controls"]["max_distance"], 20.0);
    }

    #[test]
    fn detected_emotion_drives_user_emotion_while_tracking() {
        let mut scene = composer();
        let rx = scene.user_emotion();
        let now = Instant::now();
        scene.apply(&AvatarEvent::EmotionSelected { emotion: EmotionLabel::Sad }, now);
        assert_eq!(*rx.borrow(), EmotionLabel::Sad);

        scene.apply(&AvatarEvent::TrackingStarted, now);
        assert_eq!(scene.current_user_emotion(), EmotionLabel::Neutral);
        scene.apply(
            &AvatarEvent::EmotionDetected {
                emotion: EmotionLabel::Happy,
                longest: Some(EmotionLabel::Neutral),
            },
            now,
        );
        assert_eq!(*rx.borrow(), EmotionLabel::Happy);
        assert_eq!(scene.renderer().emotion(), EmotionLabel::Happy);
        assert_eq!(scene.longest_emotion(), Some(EmotionLabel::Neutral));
    }

    #[test]
    fn reply_emotion_shows_until_reset() {
        let mut scene = composer();
        let now = Instant::now();
        scene.apply(&AvatarEvent::TurnCompleted(turn(EmotionLabel::Excited, "dance.fbx")), now);
        assert_eq!(scene.displayed_emotion(), EmotionLabel::Excited);
        assert_eq!(scene.renderer().current_animation(), "dance.fbx");
        assert_eq!(scene.history().len(), 1);

        scene.apply(&AvatarEvent::EmotionReset, now);
        assert_eq!(scene.displayed_emotion(), EmotionLabel::Neutral);
        assert_eq!(scene.renderer().current_animation(), "Idle.fbx");
    }

    #[test]
    fn error_turns_are_recorded_but_not_shown() {
        let mut scene = composer();
        let err = AvatarError::Gateway("offline".into());
        let failed = ConversationTurn::failed("hi", EmotionLabel::Sad, &err);
        scene.apply(&AvatarEvent::TurnCompleted(failed), Instant::now());
        assert_eq!(scene.history().len(), 1);
        assert_eq!(scene.displayed_emotion(), EmotionLabel::Neutral);
        assert_eq!(scene.renderer().current_animation(), "Idle.fbx");
    }

    #[test]
    fn unknown_reply_animation_plays_idle() {
        let mut scene = composer();
        let now = Instant::now();
        scene.apply(&AvatarEvent::TurnCompleted(turn(EmotionLabel::Happy, "moonwalk.fbx")), now);
        assert_eq!(scene.renderer().current_animation(), "Idle.fbx");
        let frame = scene.frame(now);
        assert!(frame.clips.iter().any(|c| c.clip == "Idle.fbx" && c.weight > 0.0));
    }

    #[test]
    fn statuses_are_kept_per_component() {
        let mut scene = composer();
        let now = Instant::now();
        scene.apply(&AvatarEvent::status(Component::Observer, "Active"), now);
        scene.apply(&AvatarEvent::status(Component::Coordinator, "Recording stopped"), now);
        assert_eq!(scene.status(Component::Observer), Some("Active"));
        assert_eq!(scene.status(Component::Coordinator), Some("Recording stopped"));
        assert_eq!(scene.status(Component::Presenter), None);
    }
}
