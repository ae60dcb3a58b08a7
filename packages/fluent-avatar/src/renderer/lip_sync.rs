//! Procedural mouth motion while the avatar is speaking.
use std::time::Duration;

/// One sine component: `amplitude * sin(frequency * t + phase)`.
#[derive(Debug, Clone, Copy)]
struct Wave {
    amplitude: f32,
    frequency: f32,
    phase: f32,
}

/// Mouth shape driven by a baseline plus a few summed sine waves.
#[derive(Debug, Clone, Copy)]
struct MouthChannel {
    shape: &'static str,
    base: f32,
    waves: [Wave; 2],
}

const fn wave(amplitude: f32, frequency: f32, phase: f32) -> Wave {
    Wave {
        amplitude,
        frequency,
        phase,
    }
}

const CHANNELS: [MouthChannel; 4] = [
    MouthChannel {
        shape: "jawOpen",
        base: 0.3,
        waves: [wave(0.2, 10.0, 0.0), wave(0.1, 17.0, 0.6)],
    },
    MouthChannel {
        shape: "mouthFunnel",
        base: 0.1,
        waves: [wave(0.1, 7.0, 1.0), wave(0.05, 13.0, 0.0)],
    },
    MouthChannel {
        shape: "mouthLowerDownLeft",
        base: 0.2,
        waves: [wave(0.15, 13.0, 0.3), wave(0.05, 23.0, 0.0)],
    },
    MouthChannel {
        shape: "mouthLowerDownRight",
        base: 0.2,
        waves: [wave(0.15, 13.0, 0.5), wave(0.05, 23.0, 0.2)],
    },
];

/// Shapes the speaking overlay owns. Emotion weights for these are
/// overwritten while speaking; every other shape is left alone.
pub fn mouth_shapes() -> impl Iterator<Item = &'static str> {
    CHANNELS.iter().map(|c| c.shape)
}

/// Mouth weights after `elapsed` seconds of speech, each clamped to `[0, 1]`.
pub fn mouth_weights(elapsed: Duration) -> [(&'static str, f32); 4] {
    let t = elapsed.as_secs_f32();
    CHANNELS.map(|channel| {
        let value = channel.waves.iter().fold(channel.base, |acc, w| {
            acc + w.amplitude * (w.frequency * t + w.phase).sin()
        });
        (channel.shape, value.clamp(0.0, 1.0))
    })
}
