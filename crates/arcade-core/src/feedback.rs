use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sound cues games and shells can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioCue {
    Click,
    SpinTick,
    Win,
    Coin,
    Hit,
    Combo,
    RetroJump,
    SpinUp,
    Lose,
}

impl AudioCue {
    pub const ALL: [AudioCue; 9] = [
        AudioCue::Click,
        AudioCue::SpinTick,
        AudioCue::Win,
        AudioCue::Coin,
        AudioCue::Hit,
        AudioCue::Combo,
        AudioCue::RetroJump,
        AudioCue::SpinUp,
        AudioCue::Lose,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AudioCue::Click => "click",
            AudioCue::SpinTick => "spin-tick",
            AudioCue::Win => "win",
            AudioCue::Coin => "coin",
            AudioCue::Hit => "hit",
            AudioCue::Combo => "combo",
            AudioCue::RetroJump => "retro-jump",
            AudioCue::SpinUp => "spin-up",
            AudioCue::Lose => "lose",
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("audio output is unavailable")]
    AudioUnavailable,
    #[error("haptics are not supported on this host")]
    HapticsUnsupported,
}

/// Audio collaborator. `pitch` is a multiplier, 1.0 for the natural tone.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue, pitch: f32) -> Result<(), FeedbackError>;
}

/// Haptic collaborator.
pub trait HapticSink {
    fn pulse(&mut self, intensity: u32) -> Result<(), FeedbackError>;
}

/// Sink that accepts everything and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: AudioCue, _pitch: f32) -> Result<(), FeedbackError> {
        Ok(())
    }
}

impl HapticSink for Silent {
    fn pulse(&mut self, _intensity: u32) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Fire-and-forget front for the audio and haptic collaborators.
///
/// Errors from either sink are logged and dropped; they never reach games
/// or the session controller.
pub struct Feedback {
    audio: Box<dyn AudioSink>,
    haptics: Box<dyn HapticSink>,
}

impl Feedback {
    pub fn new(audio: Box<dyn AudioSink>, haptics: Box<dyn HapticSink>) -> Self {
        Self { audio, haptics }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(Silent), Box::new(Silent))
    }

    pub fn cue(&mut self, cue: AudioCue) {
        self.cue_pitched(cue, 1.0);
    }

    pub fn cue_pitched(&mut self, cue: AudioCue, pitch: f32) {
        if let Err(e) = self.audio.play(cue, pitch) {
            tracing::debug!(%cue, error = %e, "audio cue dropped");
        }
    }

    pub fn pulse(&mut self, intensity: u32) {
        if intensity == 0 {
            return;
        }
        if let Err(e) = self.haptics.pulse(intensity) {
            tracing::debug!(intensity, error = %e, "haptic pulse dropped");
        }
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feedback").finish_non_exhaustive()
    }
}
