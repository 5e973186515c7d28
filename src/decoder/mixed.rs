use super::{resolve_tap, Feedback, GestureEngine};
use crate::config::Config;
use crate::error::TfResult;
use crate::extractor::{TapExtractor, TapState};
use crate::geometry::{KeyLayout, KeyboardPlane, Point2};
use crate::lexicon::Lexicon;
use crate::predictor::TapPredictor;
use crate::touch::{Finger, TouchSample};
use std::sync::Arc;
use strum_macros::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MixedState {
    Uncertain,
    CommittedTap,
    CommittedGesture,
}

/// Runs tap and gesture detection side by side until the current word shows
/// which of the two the user is doing.
#[derive(Debug, Clone)]
pub struct MixedEngine {
    tap_extractors: [TapExtractor; 2],
    tap: TapPredictor,
    gesture: GestureEngine,
    state: MixedState,
    in_zone: [bool; 2],
    first_touch: Option<(Finger, Point2)>,
    commit_distance: f32,
    two_finger_tap: bool,
}

impl MixedEngine {
    pub fn new(layout: Arc<KeyLayout>, lexicon: Arc<Lexicon>, config: &Config) -> TfResult<Self> {
        Ok(Self {
            tap_extractors: [
                TapExtractor::new(config.tap.clone()),
                TapExtractor::new(config.tap.clone()),
            ],
            tap: TapPredictor::new(layout.clone(), lexicon.clone(), config)?,
            gesture: GestureEngine::new(layout, lexicon, config)?,
            state: MixedState::Uncertain,
            in_zone: [false; 2],
            first_touch: None,
            commit_distance: config.decoder.gesture_commit_distance,
            two_finger_tap: config.decoder.two_finger_tap,
        })
    }

    pub fn state(&self) -> MixedState {
        self.state
    }

    pub fn feed(
        &mut self,
        finger: Finger,
        sample: &TouchSample,
        plane: &KeyboardPlane,
        feedback: &mut Vec<Feedback>,
    ) -> Option<String> {
        match self.state {
            MixedState::Uncertain => self.feed_uncertain(finger, sample, plane, feedback),
            MixedState::CommittedTap => resolve_tap(
                &mut self.tap_extractors[finger.index()],
                &mut self.tap,
                sample,
                plane,
                feedback,
            ),
            MixedState::CommittedGesture => self.gesture.feed(finger, sample, plane, feedback),
        }
    }

    fn feed_uncertain(
        &mut self,
        finger: Finger,
        sample: &TouchSample,
        plane: &KeyboardPlane,
        feedback: &mut Vec<Feedback>,
    ) -> Option<String> {
        let extractor = &mut self.tap_extractors[finger.index()];
        let tap_state = extractor.input(sample);
        // Reflects this finger's latest sample only.
        self.in_zone[finger.index()] = tap_state == TapState::InTypeZone;
        let mut word = None;

        match tap_state {
            TapState::LiftUp => {
                if let Some(target) = extractor.target() {
                    let point = plane.touch_point(target.position);
                    word = Some(self.tap.predict(point));
                    feedback.push(Feedback::TapResolved(point));
                }
                self.commit(MixedState::CommittedTap, "tap completed");
            }
            TapState::InTypeZone if self.two_finger_tap && self.in_zone[0] && self.in_zone[1] => {
                self.commit(MixedState::CommittedTap, "both fingers in the type zone");
            }
            TapState::TouchingKeyboard if self.first_touch.is_none() => {
                self.first_touch = Some((finger, plane.touch_point(sample.position)));
                feedback.push(Feedback::PlaneContact(finger));
            }
            _ => {}
        }

        if self.state != MixedState::Uncertain {
            return word;
        }

        if let Some((first, origin)) = self.first_touch {
            if first == finger {
                let point = plane.touch_point(sample.position);
                self.gesture.predictor.push_point(point);
                if point.dist(origin) > self.commit_distance {
                    self.gesture.resume(finger);
                    self.commit(MixedState::CommittedGesture, "first touch moved along the plane");
                    feedback.push(Feedback::GestureTrace(self.gesture.predictor.trace().to_vec()));
                }
            }
        }
        word
    }

    fn commit(&mut self, state: MixedState, reason: &str) {
        debug!("Mixed input committed to {}: {}", state, reason);
        if state == MixedState::CommittedTap {
            self.gesture.clear();
        }
        self.state = state;
    }

    pub fn candidates(&self) -> Vec<String> {
        match self.state {
            MixedState::CommittedGesture => self.gesture.predictor.candidates(),
            MixedState::Uncertain | MixedState::CommittedTap => self.tap.candidates(),
        }
    }

    pub fn clear(&mut self) {
        for ex in &mut self.tap_extractors {
            ex.clear();
        }
        self.tap.clear();
        self.gesture.clear();
        self.state = MixedState::Uncertain;
        self.in_zone = [false; 2];
        self.first_touch = None;
    }
}
