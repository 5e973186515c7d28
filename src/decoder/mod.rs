//! Composition of extractors and predictors behind one text-entry front end.

pub mod mixed;
pub mod output;

pub use self::mixed::{MixedEngine, MixedState};
pub use self::output::{CursorBlink, TextBuffer};

use crate::config::Config;
use crate::error::TfResult;
use crate::extractor::{GestureExtractor, GestureState, TapExtractor, TapState};
use crate::geometry::{KeyLayout, KeyboardPlane, Point2};
use crate::lexicon::Lexicon;
use crate::predictor::{GesturePredictor, TapPredictor};
use crate::touch::{Finger, TouchSample};
use serde::{Deserialize, Serialize};
use std::mem;
use std::sync::Arc;
use std::time::Instant;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, info};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    Mixed,
    Tap,
    Gesture,
}

/// Events for the host to draw or play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Feedback {
    TapResolved(Point2),
    GestureTrace(Vec<Point2>),
    PlaneContact(Finger),
}

/// Feeds one sample to a tap extractor and decodes the target on lift-up.
fn resolve_tap(
    extractor: &mut TapExtractor,
    predictor: &mut TapPredictor,
    sample: &TouchSample,
    plane: &KeyboardPlane,
    feedback: &mut Vec<Feedback>,
) -> Option<String> {
    if extractor.input(sample) != TapState::LiftUp {
        return None;
    }
    let target = extractor.target()?;
    let point = plane.touch_point(target.position);
    let word = predictor.predict(point);
    feedback.push(Feedback::TapResolved(point));
    Some(word)
}

#[derive(Debug, Clone)]
pub struct TapEngine {
    extractors: [TapExtractor; 2],
    predictor: TapPredictor,
}

impl TapEngine {
    pub fn new(layout: Arc<KeyLayout>, lexicon: Arc<Lexicon>, config: &Config) -> TfResult<Self> {
        Ok(Self {
            extractors: [
                TapExtractor::new(config.tap.clone()),
                TapExtractor::new(config.tap.clone()),
            ],
            predictor: TapPredictor::new(layout, lexicon, config)?,
        })
    }

    pub fn feed(
        &mut self,
        finger: Finger,
        sample: &TouchSample,
        plane: &KeyboardPlane,
        feedback: &mut Vec<Feedback>,
    ) -> Option<String> {
        resolve_tap(
            &mut self.extractors[finger.index()],
            &mut self.predictor,
            sample,
            plane,
            feedback,
        )
    }

    pub fn clear(&mut self) {
        for ex in &mut self.extractors {
            ex.clear();
        }
        self.predictor.clear();
    }
}

/// One gesture extractor shared by both fingers; whichever finger starts a
/// gesture owns it until the word is cleared.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    extractor: GestureExtractor,
    pub(crate) predictor: GesturePredictor,
    driver: Finger,
}

impl GestureEngine {
    pub fn new(layout: Arc<KeyLayout>, lexicon: Arc<Lexicon>, config: &Config) -> TfResult<Self> {
        Ok(Self {
            extractor: GestureExtractor::new(),
            predictor: GesturePredictor::new(layout, lexicon, config)?,
            driver: Finger::Right,
        })
    }

    pub fn feed(
        &mut self,
        finger: Finger,
        sample: &TouchSample,
        plane: &KeyboardPlane,
        feedback: &mut Vec<Feedback>,
    ) -> Option<String> {
        if finger != self.driver && self.extractor.state() != GestureState::None {
            return None;
        }
        let state = self.extractor.input(sample.in_type_zone, sample.touching_plane);
        self.driver = finger;
        let word = self.predictor.predict(plane.touch_point(sample.position), state);

        match state {
            GestureState::None => {}
            GestureState::Enter => {
                feedback.push(Feedback::PlaneContact(finger));
                feedback.push(Feedback::GestureTrace(self.predictor.trace().to_vec()));
            }
            GestureState::Stay | GestureState::Exit | GestureState::WaitForConfirm => {
                feedback.push(Feedback::GestureTrace(self.predictor.trace().to_vec()));
            }
        }
        Some(word)
    }

    /// Hands an in-progress trace over to `finger`.
    pub(crate) fn resume(&mut self, finger: Finger) {
        self.extractor.resume();
        self.driver = finger;
    }

    pub fn clear(&mut self) {
        self.extractor.clear();
        self.predictor.clear();
    }
}

/// The closed set of input modalities.
#[derive(Debug, Clone)]
pub enum Engine {
    Tap(TapEngine),
    Gesture(GestureEngine),
    Mixed(MixedEngine),
}

impl Engine {
    pub fn build(
        method: InputMethod,
        layout: Arc<KeyLayout>,
        lexicon: Arc<Lexicon>,
        config: &Config,
    ) -> TfResult<Self> {
        let start = Instant::now();
        let engine = match method {
            InputMethod::Tap => Engine::Tap(TapEngine::new(layout, lexicon, config)?),
            InputMethod::Gesture => Engine::Gesture(GestureEngine::new(layout, lexicon, config)?),
            InputMethod::Mixed => Engine::Mixed(MixedEngine::new(layout, lexicon, config)?),
        };
        debug!("{} engine built in {:?}", method, start.elapsed());
        Ok(engine)
    }

    fn feed(
        &mut self,
        finger: Finger,
        sample: &TouchSample,
        plane: &KeyboardPlane,
        feedback: &mut Vec<Feedback>,
    ) -> Option<String> {
        match self {
            Engine::Tap(e) => e.feed(finger, sample, plane, feedback),
            Engine::Gesture(e) => e.feed(finger, sample, plane, feedback),
            Engine::Mixed(e) => e.feed(finger, sample, plane, feedback),
        }
    }

    fn candidates(&self) -> Vec<String> {
        match self {
            Engine::Tap(e) => e.predictor.candidates(),
            Engine::Gesture(e) => e.predictor.candidates(),
            Engine::Mixed(e) => e.candidates(),
        }
    }

    fn clear(&mut self) {
        match self {
            Engine::Tap(e) => e.clear(),
            Engine::Gesture(e) => e.clear(),
            Engine::Mixed(e) => e.clear(),
        }
    }
}

/// Text-entry front end: routes per-finger samples to the active engine and
/// keeps the confirmed text.
///
/// The lexicon and layout are immutable snapshots; `reload_lexicon` builds a
/// complete replacement engine before swapping it in, so a failed reload
/// leaves the decoder exactly as it was.
#[derive(Debug, Clone)]
pub struct Decoder {
    method: InputMethod,
    config: Config,
    layout: Arc<KeyLayout>,
    lexicon: Arc<Lexicon>,
    plane: KeyboardPlane,
    engine: Engine,
    text: TextBuffer,
    cursor: CursorBlink,
    feedback: Vec<Feedback>,
    suspended: bool,
}

impl Decoder {
    pub fn new(
        method: InputMethod,
        layout: Arc<KeyLayout>,
        lexicon: Arc<Lexicon>,
        config: Config,
    ) -> TfResult<Self> {
        config.validate()?;
        lexicon.validate_against(&layout)?;
        let engine = Engine::build(method, layout.clone(), lexicon.clone(), &config)?;
        info!(
            "Decoder ready: {} input, {} words, {} keys",
            method,
            lexicon.len(),
            layout.len()
        );
        Ok(Self {
            method,
            cursor: CursorBlink::new(config.decoder.cursor_blink_ticks),
            config,
            layout,
            lexicon,
            plane: KeyboardPlane::default(),
            engine,
            text: TextBuffer::default(),
            feedback: Vec::new(),
            suspended: false,
        })
    }

    pub fn with_plane(mut self, plane: KeyboardPlane) -> Self {
        self.plane = plane;
        self
    }

    /// One host frame: advances the cursor and feeds both fingers, left first.
    pub fn tick(&mut self, samples: &[TouchSample; 2]) {
        self.cursor.tick();
        self.feed_sample(Finger::Left, &samples[0]);
        self.feed_sample(Finger::Right, &samples[1]);
    }

    pub fn feed_sample(&mut self, finger: Finger, sample: &TouchSample) {
        if self.suspended {
            return;
        }
        if let Some(word) = self
            .engine
            .feed(finger, sample, &self.plane, &mut self.feedback)
        {
            self.text.set_word(word);
        }
    }

    pub fn confirm_current_word(&mut self) {
        let word = self.text.word().to_string();
        self.text.commit(&word);
        self.engine.clear();
    }

    /// Commits candidate `index`. Out-of-range indices leave everything untouched.
    pub fn confirm_candidate(&mut self, index: usize) -> bool {
        let Some(word) = self.engine.candidates().into_iter().nth(index) else {
            return false;
        };
        self.text.commit(&word);
        self.engine.clear();
        true
    }

    pub fn erase_one(&mut self) {
        if !self.text.word().is_empty() {
            self.clear_word();
        } else {
            self.text.pop_token();
        }
    }

    pub fn clear_word(&mut self) {
        self.text.clear_word();
        self.engine.clear();
    }

    pub fn clear_all(&mut self) {
        self.text.clear();
        self.clear_word();
        self.feedback.clear();
    }

    pub fn reload_lexicon(&mut self, lexicon: Arc<Lexicon>) -> TfResult<()> {
        lexicon.validate_against(&self.layout)?;
        let engine = Engine::build(self.method, self.layout.clone(), lexicon.clone(), &self.config)?;
        info!("Lexicon reloaded: {} words", lexicon.len());
        self.engine = engine;
        self.lexicon = lexicon;
        self.clear_all();
        Ok(())
    }

    /// Switches input method. Confirmed text is kept, the in-progress word is dropped.
    pub fn switch_method(&mut self, method: InputMethod) -> TfResult<()> {
        if method == self.method {
            return Ok(());
        }
        let engine = Engine::build(method, self.layout.clone(), self.lexicon.clone(), &self.config)?;
        info!("Input method: {} -> {}", self.method, method);
        self.engine = engine;
        self.method = method;
        self.text.clear_word();
        Ok(())
    }

    /// Ignores samples while the host shows a modal panel such as the candidate list.
    pub fn suspend_input(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn render_output(&self) -> String {
        self.text.render()
    }

    pub fn render_output_with_cursor(&self) -> String {
        let mut out = self.text.render();
        if self.cursor.visible() {
            out.push('|');
        }
        out
    }

    pub fn candidates(&self) -> Vec<String> {
        self.engine.candidates()
    }

    pub fn current_word(&self) -> &str {
        self.text.word()
    }

    pub fn tokens(&self) -> &[String] {
        self.text.tokens()
    }

    pub fn method(&self) -> InputMethod {
        self.method
    }

    pub fn mixed_state(&self) -> Option<MixedState> {
        match &self.engine {
            Engine::Mixed(e) => Some(e.state()),
            _ => None,
        }
    }

    pub fn drain_feedback(&mut self) -> Vec<Feedback> {
        mem::take(&mut self.feedback)
    }

    pub fn layout(&self) -> &Arc<KeyLayout> {
        &self.layout
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    pub fn plane(&self) -> &KeyboardPlane {
        &self.plane
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
