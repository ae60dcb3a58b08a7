//! Named skeletal animation clips.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the avatar's body animation clips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationClip {
    #[default]
    Idle,
    Cheering,
    Comforting,
    Dance,
    Greet,
    ThumbUp,
}

impl AnimationClip {
    /// Every clip, idle first.
    pub const ALL: [AnimationClip; 6] = [
        Self::Idle,
        Self::Cheering,
        Self::Comforting,
        Self::Dance,
        Self::Greet,
        Self::ThumbUp,
    ];

    /// Asset file name the clip is loaded from. The assistant answers with
    /// these names.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle.fbx",
            Self::Cheering => "Cheering.fbx",
            Self::Comforting => "comforting.fbx",
            Self::Dance => "dance.fbx",
            Self::Greet => "greet.fbx",
            Self::ThumbUp => "thumbup.fbx",
        }
    }

    /// Resolve a clip from a file name or bare clip name, ignoring case and
    /// a trailing `.fbx`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = clip_key(name);
        Self::ALL
            .into_iter()
            .find(|clip| clip_key(clip.file_name()) == key)
    }
}

impl fmt::Display for AnimationClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Normalized lookup key for a clip name: trimmed, lower-case, without the
/// `.fbx` extension.
pub fn clip_key(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.strip_suffix(".fbx") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}
