//! Synthetic touch input and recorded traces.
//!
//! Depth profiles are tuned for the default tap thresholds: hover at 2 cm,
//! a press that dips 2 mm through the plane, and a lift back to hover.

use crate::decoder::Decoder;
use crate::error::{TfResult, TypeForgeError};
use crate::geometry::{KeyLayout, KeyboardPlane, Point2};
use crate::touch::{Finger, TouchSample};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const HOVER: f32 = 0.02;
const PRESS: f32 = -0.002;
const AWAY: f32 = 0.05;
const TAP_PROFILE: [f32; 6] = [HOVER, 0.012, 0.004, PRESS, 0.008, HOVER];
/// Drag step along a gesture path, in key widths.
const DRAG_STEP: f32 = 0.25;

pub type Tick = [TouchSample; 2];

/// Generates per-tick samples that tap or swipe a word on a layout.
#[derive(Debug, Clone)]
pub struct TraceSynth {
    layout: Arc<KeyLayout>,
    plane: KeyboardPlane,
    zone_height: f32,
    jitter: f32,
    rng: fastrand::Rng,
}

impl TraceSynth {
    pub fn new(layout: Arc<KeyLayout>, plane: KeyboardPlane, zone_height: f32) -> Self {
        Self {
            layout,
            plane,
            zone_height,
            jitter: 0.0,
            rng: fastrand::Rng::with_seed(0),
        }
    }

    /// Gaussian positional noise with standard deviation `jitter` key widths.
    pub fn with_jitter(mut self, jitter: f32, seed: u64) -> Self {
        self.jitter = jitter.max(0.0);
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    pub fn sample(&self, p: Point2, depth: f32) -> TouchSample {
        TouchSample {
            position: self.plane.lift(p, depth),
            depth,
            in_type_zone: depth < self.zone_height,
            touching_plane: depth <= 0.0,
        }
    }

    fn idle(&self) -> TouchSample {
        self.sample(Point2::default(), AWAY)
    }

    fn tick(&self, finger: Finger, sample: TouchSample) -> Tick {
        let mut tick = [self.idle(); 2];
        tick[finger.index()] = sample;
        tick
    }

    fn noise(&mut self) -> Point2 {
        if self.jitter == 0.0 {
            return Point2::default();
        }
        // Box-Muller
        let u1 = self.rng.f32().max(f32::MIN_POSITIVE);
        let u2 = self.rng.f32();
        let r = (-2.0 * u1.ln()).sqrt() * self.jitter * self.layout.key_width();
        let theta = 2.0 * std::f32::consts::PI * u2;
        Point2::new(r * theta.cos(), r * theta.sin())
    }

    fn path(&self, word: &str) -> TfResult<Vec<Point2>> {
        self.layout
            .key_path(word)
            .map_err(|ch| TypeForgeError::MissingKey {
                word: word.to_string(),
                ch,
            })
    }

    /// Taps each key of `word` in turn with `finger`, then leaves the zone.
    pub fn tap_word(&mut self, word: &str, finger: Finger) -> TfResult<Vec<Tick>> {
        let path = self.path(word)?;
        let mut ticks = Vec::with_capacity(path.len() * TAP_PROFILE.len() + 2);
        let start = path.first().copied().unwrap_or_default();
        ticks.push(self.tick(finger, self.sample(start, AWAY)));

        for key in path {
            let p = key + self.noise();
            for depth in TAP_PROFILE {
                ticks.push(self.tick(finger, self.sample(p, depth)));
            }
        }
        ticks.push(self.tick(finger, self.sample(start, AWAY)));
        Ok(ticks)
    }

    /// Lands on the first key, drags through the key path and lifts out of the zone.
    pub fn gesture_word(&mut self, word: &str, finger: Finger) -> TfResult<Vec<Tick>> {
        let path = self.path(word)?;
        let Some(&first) = path.first() else {
            return Ok(Vec::new());
        };
        let mut ticks = Vec::new();
        for depth in [AWAY, HOVER, 0.01, PRESS] {
            ticks.push(self.tick(finger, self.sample(first, depth)));
        }

        let step = DRAG_STEP * self.layout.key_width();
        let mut last = first;
        for w in path.windows(2) {
            let (a, b) = (w[0], w[1]);
            let n = ((a.dist(b) / step).ceil() as usize).max(1);
            for i in 1..=n {
                let p = a.lerp(b, i as f32 / n as f32) + self.noise();
                ticks.push(self.tick(finger, self.sample(p, PRESS)));
                last = p;
            }
        }
        ticks.push(self.tick(finger, self.sample(last, 0.01)));
        ticks.push(self.tick(finger, self.sample(last, AWAY)));
        Ok(ticks)
    }
}

/// One step of a recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEvent {
    Tick { left: TouchSample, right: TouchSample },
    Confirm,
    Select(usize),
    Erase,
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub plane: Option<KeyboardPlane>,
    pub events: Vec<TraceEvent>,
}

impl Recording {
    pub fn from_ticks(ticks: &[Tick]) -> Self {
        Self {
            plane: None,
            events: ticks
                .iter()
                .map(|t| TraceEvent::Tick {
                    left: t[0],
                    right: t[1],
                })
                .collect(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> TfResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Plays every event into `decoder`. Returns how many selections were out of range.
    pub fn play(&self, decoder: &mut Decoder) -> usize {
        let mut rejected = 0;
        for event in &self.events {
            match event {
                TraceEvent::Tick { left, right } => decoder.tick(&[*left, *right]),
                TraceEvent::Confirm => decoder.confirm_current_word(),
                TraceEvent::Select(i) => {
                    if !decoder.confirm_candidate(*i) {
                        rejected += 1;
                    }
                }
                TraceEvent::Erase => decoder.erase_one(),
                TraceEvent::Clear => decoder.clear_all(),
            }
        }
        rejected
    }
}

/// Decodes one synthetic word from a clean state: (best word, candidates).
pub fn decode_ticks(decoder: &mut Decoder, ticks: &[Tick]) -> (String, Vec<String>) {
    decoder.clear_word();
    for tick in ticks {
        decoder.tick(tick);
    }
    (decoder.current_word().to_string(), decoder.candidates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TapParams;
    use crate::extractor::{TapExtractor, TapState};

    #[test]
    fn test_tap_profile_yields_one_tap_per_key() {
        let layout = Arc::new(KeyLayout::qwerty(0.02));
        let mut synth = TraceSynth::new(layout, KeyboardPlane::default(), 0.03);
        let ticks = synth.tap_word("dog", Finger::Right).unwrap();
        let mut ex = TapExtractor::new(TapParams::default());
        let lifts = ticks
            .iter()
            .filter(|t| ex.input(&t[1]) == TapState::LiftUp)
            .count();
        assert_eq!(lifts, 3);
        assert!(ticks.iter().all(|t| !t[0].in_type_zone));
    }

    #[test]
    fn test_recording_json_shape() {
        let rec: Recording = serde_json::from_str(r#"{"events": ["confirm", {"select": 2}, "erase"]}"#).unwrap();
        assert_eq!(rec.events, vec![TraceEvent::Confirm, TraceEvent::Select(2), TraceEvent::Erase]);
        assert!(rec.plane.is_none());
    }
}
