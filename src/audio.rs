//! Synthesized sound effects and background music
//!
//! No asset files: every cue is a short sequence of sine tones, and the
//! music is a melody rendered to samples once and looped. Sound is
//! optional; if no output device can be opened the game runs silently.

use crate::game::GameEvent;
use rodio::buffer::SamplesBuffer;
use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::time::Duration;

/// Beep frequency for a cleared row
const CLEAR_HZ: f32 = 1000.0;
const BEEP: Duration = Duration::from_millis(100);
const GAP: Duration = Duration::from_millis(40);

const MUSIC_SAMPLE_RATE: u32 = 22_050;
const MUSIC_AMPLITUDE: f32 = 0.3;
/// Silence at the end of each note so repeated pitches stay distinct
const NOTE_RELEASE: Duration = Duration::from_millis(15);
const EIGHTH_MS: u64 = 150;

const E5: f32 = 659.25;
const B4: f32 = 493.88;
const C5: f32 = 523.25;
const D5: f32 = 587.33;
const A4: f32 = 440.0;
const F5: f32 = 698.46;
const G5: f32 = 783.99;
const A5: f32 = 880.0;
const REST: f32 = 0.0;

/// Korobeiniki, first theme. Lengths in eighth notes, eight per bar.
const MELODY: [(f32, u64); 40] = [
    (E5, 2), (B4, 1), (C5, 1), (D5, 2), (C5, 1), (B4, 1),
    (A4, 2), (A4, 1), (C5, 1), (E5, 2), (D5, 1), (C5, 1),
    (B4, 3), (C5, 1), (D5, 2), (E5, 2),
    (C5, 2), (A4, 2), (A4, 2), (REST, 2),
    (REST, 1), (D5, 2), (F5, 1), (A5, 2), (G5, 1), (F5, 1),
    (E5, 3), (C5, 1), (E5, 2), (D5, 1), (C5, 1),
    (B4, 2), (B4, 1), (C5, 1), (D5, 2), (E5, 2),
    (C5, 2), (A4, 2), (A4, 2), (REST, 2),
];

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// One beep per cleared row
    LineClear(usize),
    LevelUp,
    GameOver,
}

/// A tone, or silence when `hz` is zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub hz: f32,
    pub duration: Duration,
}

impl Tone {
    const fn new(hz: f32, duration: Duration) -> Self {
        Self { hz, duration }
    }

    const fn rest(duration: Duration) -> Self {
        Self::new(0.0, duration)
    }
}

/// Whether the background music should be heard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    Playing,
    Paused,
}

impl MusicState {
    /// Music follows the game: silent while paused or over
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Paused | GameEvent::GameOver { .. } => Some(MusicState::Paused),
            GameEvent::Resumed | GameEvent::Restarted => Some(MusicState::Playing),
            _ => None,
        }
    }
}

/// One pass of the background melody
pub fn melody() -> Vec<Tone> {
    MELODY
        .iter()
        .map(|&(hz, eighths)| Tone::new(hz, Duration::from_millis(EIGHTH_MS * eighths)))
        .collect()
}

/// Render tones to mono samples; rests and note releases are silent
pub fn synthesize(tones: &[Tone], sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f32;
    let release = (NOTE_RELEASE.as_secs_f32() * rate) as usize;
    let mut samples = Vec::new();
    for tone in tones {
        let len = (tone.duration.as_secs_f32() * rate).round() as usize;
        let sounding = if tone.hz > 0.0 { len.saturating_sub(release) } else { 0 };
        let step = std::f32::consts::TAU * tone.hz / rate;
        samples.extend((0..len).map(|i| {
            if i < sounding {
                MUSIC_AMPLITUDE * (step * i as f32).sin()
            } else {
                0.0
            }
        }));
    }
    samples
}

impl Cue {
    /// Cue to play for an engine event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::LinesCleared { rows, .. } if *rows > 0 => Some(Cue::LineClear(*rows)),
            GameEvent::LevelUp(_) => Some(Cue::LevelUp),
            GameEvent::GameOver { .. } => Some(Cue::GameOver),
            _ => None,
        }
    }

    pub fn tones(&self) -> Vec<Tone> {
        match self {
            Cue::LineClear(rows) => {
                let mut tones = Vec::with_capacity(rows * 2);
                for i in 0..*rows {
                    if i > 0 {
                        tones.push(Tone::rest(GAP));
                    }
                    tones.push(Tone::new(CLEAR_HZ, BEEP));
                }
                tones
            }
            Cue::LevelUp => vec![
                Tone::new(660.0, BEEP),
                Tone::new(880.0, BEEP),
                Tone::new(1320.0, BEEP),
            ],
            Cue::GameOver => vec![
                Tone::new(330.0, Duration::from_millis(200)),
                Tone::new(220.0, Duration::from_millis(400)),
            ],
        }
    }
}

/// Audio output for sound effects and music
pub struct Sound {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    volume: f32,
    /// Looping background melody, on its own sink so it can be paused
    music: Option<Sink>,
}

impl Sound {
    /// Open the default output device. `volume` is 0-100.
    pub fn new(volume: u32) -> Option<Self> {
        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("No audio output, running silent: {}", e);
                return None;
            }
        };
        Some(Self {
            _stream: stream,
            stream_handle,
            volume: (volume.min(100) as f32) / 100.0,
            music: None,
        })
    }

    /// Start the background melody looping. `volume` is 0-100.
    pub fn with_music(mut self, volume: u32) -> Self {
        match Sink::try_new(&self.stream_handle) {
            Ok(sink) => {
                let samples = synthesize(&melody(), MUSIC_SAMPLE_RATE);
                sink.set_volume((volume.min(100) as f32) / 100.0);
                sink.append(SamplesBuffer::new(1, MUSIC_SAMPLE_RATE, samples).repeat_infinite());
                tracing::debug!("Background music started");
                self.music = Some(sink);
            }
            Err(e) => tracing::warn!("Could not start music: {}", e),
        }
        self
    }

    pub fn set_music(&self, state: MusicState) {
        let Some(sink) = &self.music else {
            return;
        };
        match state {
            MusicState::Playing => sink.play(),
            MusicState::Paused => sink.pause(),
        }
    }

    /// Play a cue without blocking
    pub fn play(&self, cue: Cue) {
        if self.volume <= 0.0 {
            return;
        }
        let Ok(sink) = Sink::try_new(&self.stream_handle) else {
            return;
        };
        sink.set_volume(self.volume);
        for tone in cue.tones() {
            sink.append(SineWave::new(tone.hz).take_duration(tone.duration));
        }
        sink.detach(); // Let it play and clean up automatically
    }

    pub fn on_event(&self, event: &GameEvent) {
        if let Some(cue) = Cue::for_event(event) {
            self.play(cue);
        }
        if let Some(state) = MusicState::for_event(event) {
            self.set_music(state);
        }
    }
}
