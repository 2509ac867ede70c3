//! Host-side audio and haptic collaborators. There is no sound device on a
//! terminal, so tones are synthesised as parameters and written to the log.

use std::fmt;
use std::time::Duration;

use arcade_core::feedback::{AudioCue, AudioSink, Feedback, FeedbackError, HapticSink};

use crate::config::{AudioConfig, HapticsConfig};

/// Tones quieter than this are skipped.
const AUDIBLE_THRESHOLD: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveType {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WaveType::Sine => "sine",
            WaveType::Square => "square",
            WaveType::Triangle => "triangle",
            WaveType::Sawtooth => "sawtooth",
        })
    }
}

/// Oscillator sweep for one cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub start_hz: f32,
    pub end_hz: f32,
    pub seconds: f32,
    /// Peak gain before the volume settings apply.
    pub gain: f32,
    pub wave: WaveType,
}

/// Synth parameters per cue. `win` is a six-note square arpeggio spanning
/// A4 to E6, summarised as a single sweep.
pub fn tone(cue: AudioCue) -> Tone {
    let (start_hz, end_hz, seconds, gain, wave) = match cue {
        AudioCue::Click => (400.0, 100.0, 0.1, 0.1, WaveType::Square),
        AudioCue::SpinTick => (800.0, 100.0, 0.05, 0.05, WaveType::Triangle),
        AudioCue::Coin => (1200.0, 2000.0, 0.5, 0.1, WaveType::Sine),
        AudioCue::Win => (440.0, 1318.0, 0.7, 0.1, WaveType::Square),
        AudioCue::Hit => (150.0, 40.0, 0.1, 0.2, WaveType::Square),
        AudioCue::Combo => (880.0, 1760.0, 0.3, 0.1, WaveType::Sine),
        AudioCue::RetroJump => (150.0, 600.0, 0.3, 0.1, WaveType::Sawtooth),
        AudioCue::SpinUp => (200.0, 800.0, 1.0, 0.05, WaveType::Triangle),
        AudioCue::Lose => (150.0, 50.0, 0.3, 0.1, WaveType::Sawtooth),
    };
    Tone {
        start_hz,
        end_hz,
        seconds,
        gain,
        wave,
    }
}

/// A tone after pitch and volume were applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayedTone {
    pub cue: AudioCue,
    pub start_hz: f32,
    pub end_hz: f32,
    pub seconds: f32,
    pub volume: f32,
    pub wave: WaveType,
}

/// Audio sink that logs each synthesised tone at debug level.
#[derive(Debug, Clone)]
pub struct LogAudioSink {
    settings: AudioConfig,
}

impl LogAudioSink {
    pub fn new(settings: AudioConfig) -> Self {
        Self { settings }
    }

    /// What `play` would emit, or `None` when muted or inaudible.
    pub fn render(&self, cue: AudioCue, pitch: f32) -> Option<PlayedTone> {
        if !self.settings.enabled {
            return None;
        }
        let level = self.settings.master_volume * self.settings.game_volume;
        if level <= AUDIBLE_THRESHOLD {
            return None;
        }
        let t = tone(cue);
        let volume = t.gain * level;
        let pitch = if pitch.is_finite() && pitch > 0.0 { pitch } else { 1.0 };
        Some(PlayedTone {
            cue,
            start_hz: t.start_hz * pitch,
            end_hz: t.end_hz * pitch,
            seconds: t.seconds,
            volume,
            wave: t.wave,
        })
    }
}

impl AudioSink for LogAudioSink {
    fn play(&mut self, cue: AudioCue, pitch: f32) -> Result<(), FeedbackError> {
        if let Some(t) = self.render(cue, pitch) {
            tracing::debug!(
                cue = %t.cue,
                start_hz = t.start_hz,
                end_hz = t.end_hz,
                seconds = t.seconds,
                volume = t.volume,
                wave = %t.wave,
                "tone"
            );
        }
        Ok(())
    }
}

/// Haptic sink that logs pulse lengths. Disabled haptics report as
/// unsupported, which `Feedback` swallows.
#[derive(Debug, Clone)]
pub struct LogHapticSink {
    settings: HapticsConfig,
}

impl LogHapticSink {
    pub fn new(settings: HapticsConfig) -> Self {
        Self { settings }
    }

    pub fn pulse_length(&self, intensity: u32) -> Duration {
        Duration::from_millis(u64::from(intensity) * u64::from(self.settings.ms_per_intensity))
    }
}

impl HapticSink for LogHapticSink {
    fn pulse(&mut self, intensity: u32) -> Result<(), FeedbackError> {
        if !self.settings.enabled {
            return Err(FeedbackError::HapticsUnsupported);
        }
        let length = self.pulse_length(intensity);
        tracing::debug!(intensity, ms = length.as_millis() as u64, "vibrate");
        Ok(())
    }
}

pub fn feedback(audio: &AudioConfig, haptics: &HapticsConfig) -> Feedback {
    Feedback::new(
        Box::new(LogAudioSink::new(audio.clone())),
        Box::new(LogHapticSink::new(haptics.clone())),
    )
}
