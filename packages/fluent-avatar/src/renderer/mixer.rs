//! Cross-fading between loaded animation clips.
use fluent_avatar_domain::clip_key;
use std::time::Duration;
use tokio::time::Instant;

/// Influence of one clip in the current pose.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipWeight {
    pub clip: String,
    pub weight: f32,
}

/// Holds the current clip and the clips fading out, and blends between them
/// linearly.
///
/// A switch during a crossfade starts every clip from the weight it had at
/// that moment, so the pose never jumps.
#[derive(Debug, Clone)]
pub struct AnimationMixer {
    loaded: Vec<String>,
    idle: String,
    current: String,
    /// Weight the current clip started its fade-in from.
    fade_from: f32,
    /// Outgoing clips with their weights when the fade began, newest first.
    fading: Vec<ClipWeight>,
    fade_started: Option<Instant>,
    crossfade: Duration,
}

impl AnimationMixer {
    /// `loaded` are the clip names available on the rig; `idle` must be one
    /// of them and is playing from the start.
    pub fn new(
        loaded: impl IntoIterator<Item = impl Into<String>>,
        idle: impl Into<String>,
        crossfade: Duration,
    ) -> Self {
        let idle = idle.into();
        let mut loaded: Vec<String> = loaded.into_iter().map(Into::into).collect();
        if !loaded.iter().any(|clip| clip_key(clip) == clip_key(&idle)) {
            loaded.push(idle.clone());
        }
        Self {
            loaded,
            current: idle.clone(),
            idle,
            fade_from: 0.0,
            fading: Vec::new(),
            fade_started: None,
            crossfade,
        }
    }

    /// Clip that is fading in (or fully playing).
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Most recent clip that is fading out, until the crossfade completes.
    pub fn previous(&self) -> Option<&str> {
        self.fading.first().map(|fade| fade.clip.as_str())
    }

    /// Loaded clip matching `name`, ignoring case and a `.fbx` extension.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let key = clip_key(name);
        self.loaded
            .iter()
            .find(|clip| clip_key(clip) == key)
            .map(String::as_str)
    }

    /// Switch to `name`, falling back to idle for clips that are not loaded.
    /// Returns the clip actually playing.
    pub fn play(&mut self, name: &str, now: Instant) -> &str {
        let target = match self.resolve(name) {
            Some(clip) => clip.to_string(),
            None => {
                tracing::warn!(clip = name, idle = %self.idle, "animation clip not loaded, using idle");
                self.idle.clone()
            }
        };

        if target != self.current {
            tracing::debug!(from = %self.current, to = %target, "crossfading animation");
            let mut fade_from = 0.0;
            let mut fading = Vec::new();
            for clip in self.weights(now) {
                if clip.clip == target {
                    fade_from = clip.weight;
                } else if clip.weight > 0.0 {
                    fading.push(clip);
                }
            }
            self.current = target;
            self.fade_from = fade_from;
            self.fading = fading;
            self.fade_started = Some(now);
        }
        &self.current
    }

    /// Blend weights at `now`, current clip first. The incoming clip ramps
    /// linearly to 1 while each outgoing one ramps down to 0 from its
    /// starting weight; once the fade is over only the current clip remains.
    pub fn weights(&mut self, now: Instant) -> Vec<ClipWeight> {
        let progress = match self.fade_started {
            Some(started) if !self.crossfade.is_zero() => {
                (now.saturating_duration_since(started).as_secs_f32()
                    / self.crossfade.as_secs_f32())
                .clamp(0.0, 1.0)
            }
            _ => 1.0,
        };

        if progress >= 1.0 {
            self.fading.clear();
            self.fade_from = 0.0;
            self.fade_started = None;
        }

        let mut weights = vec![ClipWeight {
            clip: self.current.clone(),
            weight: self.fade_from + (1.0 - self.fade_from) * progress,
        }];
        weights.extend(self.fading.iter().map(|fade| ClipWeight {
            clip: fade.clip.clone(),
            weight: fade.weight * (1.0 - progress),
        }));
        weights
    }
}
