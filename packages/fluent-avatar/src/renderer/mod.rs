//! Avatar renderer: per-frame blend-shape weights and skeletal clip blend.
//!
//! The 3D engine owns the mesh; this module only decides, once per frame,
//! what every morph-target influence should be and how strongly each
//! animation clip contributes.

pub mod lip_sync;
pub mod mixer;

pub use mixer::{AnimationMixer, ClipWeight};

use fluent_avatar_domain::{AnimationClip, EmotionLabel, MorphWeightTable};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Morph-target dictionary of the avatar's head mesh.
#[derive(Debug, Clone, Default)]
pub struct MorphRig {
    index: HashMap<String, usize>,
    names: Vec<String>,
}

impl MorphRig {
    /// Build from target names in influence-array order.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { index, names }
    }

    /// Rig carrying every shape used by the emotion presets and the speaking
    /// overlay, for engines that expose the full ARKit set.
    pub fn arkit() -> Self {
        let mut names: Vec<&'static str> = Vec::new();
        for emotion in EmotionLabel::ALL {
            for &(shape, _) in MorphWeightTable::weights(emotion) {
                if !names.contains(&shape) {
                    names.push(shape);
                }
            }
        }
        for shape in lip_sync::mouth_shapes() {
            if !names.contains(&shape) {
                names.push(shape);
            }
        }
        Self::new(names)
    }

    pub fn slot(&self, shape: &str) -> Option<usize> {
        self.index.get(shape).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Everything the 3D engine needs to pose the avatar for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarFrame {
    /// One influence per rig slot, each in `[0, 1]`.
    pub influences: Vec<f32>,
    pub clips: Vec<ClipWeight>,
    pub emotion: EmotionLabel,
    pub speaking: bool,
}

impl AvatarFrame {
    /// Influence of a named shape, if the rig has it.
    pub fn influence(&self, rig: &MorphRig, shape: &str) -> Option<f32> {
        rig.slot(shape).and_then(|i| self.influences.get(i).copied())
    }
}

/// Maps the current emotion, speaking flag and requested clip onto a frame.
#[derive(Debug, Clone)]
pub struct AvatarRenderer {
    rig: MorphRig,
    mixer: AnimationMixer,
    emotion: EmotionLabel,
    speaking_since: Option<Instant>,
    influences: Vec<f32>,
}

impl AvatarRenderer {
    pub fn new(rig: MorphRig, mixer: AnimationMixer) -> Self {
        let influences = vec![0.0; rig.len()];
        Self {
            rig,
            mixer,
            emotion: EmotionLabel::Neutral,
            speaking_since: None,
            influences,
        }
    }

    /// ARKit rig with every standard clip loaded.
    pub fn with_defaults(crossfade: Duration) -> Self {
        let clips = AnimationClip::ALL.map(AnimationClip::file_name);
        Self::new(
            MorphRig::arkit(),
            AnimationMixer::new(clips, AnimationClip::Idle.file_name(), crossfade),
        )
    }

    pub fn rig(&self) -> &MorphRig {
        &self.rig
    }

    pub fn emotion(&self) -> EmotionLabel {
        self.emotion
    }

    pub fn set_emotion(&mut self, emotion: EmotionLabel) {
        self.emotion = emotion;
    }

    /// Request an animation clip; unknown clips play idle instead.
    pub fn set_animation(&mut self, clip: &str, now: Instant) -> &str {
        self.mixer.play(clip, now)
    }

    pub fn current_animation(&self) -> &str {
        self.mixer.current()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking_since.is_some()
    }

    /// Start or stop the mouth overlay. The oscillation restarts from zero
    /// each time speech starts.
    pub fn set_speaking(&mut self, speaking: bool, now: Instant) {
        match (speaking, self.speaking_since) {
            (true, None) => self.speaking_since = Some(now),
            (false, Some(_)) => self.speaking_since = None,
            _ => {}
        }
    }

    /// Compute the frame at `now`.
    pub fn frame(&mut self, now: Instant) -> AvatarFrame {
        self.influences.fill(0.0);

        for &(shape, weight) in MorphWeightTable::weights(self.emotion) {
            if let Some(slot) = self.rig.slot(shape) {
                self.influences[slot] = weight.clamp(0.0, 1.0);
            }
        }

        if let Some(since) = self.speaking_since {
            let elapsed = now.saturating_duration_since(since);
            for (shape, weight) in lip_sync::mouth_weights(elapsed) {
                if let Some(slot) = self.rig.slot(shape) {
                    self.influences[slot] = weight;
                }
            }
        }

        AvatarFrame {
            influences: self.influences.clone(),
            clips: self.mixer.weights(now),
            emotion: self.emotion,
            speaking: self.speaking_since.is_some(),
        }
    }
}
