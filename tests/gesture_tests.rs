use rstest::rstest;
use std::sync::Arc;
use typeforge::config::Config;
use typeforge::extractor::GestureState;
use typeforge::geometry::{KeyLayout, KeyboardPlane, Point2};
use typeforge::lexicon::Lexicon;
use typeforge::predictor::GesturePredictor;
use typeforge::simulate::TraceSynth;
use typeforge::touch::Finger;

const SURVIVORS: usize = 10;

fn english() -> Arc<Lexicon> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/lexicon_en.txt");
    Arc::new(Lexicon::load_from_file(path, None).unwrap())
}

fn predictor(layout: &Arc<KeyLayout>, lexicon: &Arc<Lexicon>, survivors: usize) -> GesturePredictor {
    let mut config = Config::default();
    config.gesture.coarse_survivors = survivors;
    GesturePredictor::new(layout.clone(), lexicon.clone(), &config).unwrap()
}

/// In-plane points of a jittered swipe, as the gesture engine would collect them.
fn jittered_trace(layout: &Arc<KeyLayout>, word: &str, seed: u64) -> Vec<Point2> {
    let plane = KeyboardPlane::default();
    let zone = Config::default().tap.type_zone_height;
    let mut synth = TraceSynth::new(layout.clone(), plane, zone).with_jitter(0.1, seed);
    synth
        .gesture_word(word, Finger::Right)
        .unwrap()
        .iter()
        .map(|tick| tick[Finger::Right.index()])
        .filter(|s| s.touching_plane)
        .map(|s| plane.touch_point(s.position))
        .collect()
}

fn decode(p: &mut GesturePredictor, trace: &[Point2]) -> String {
    p.predict(trace[0], GestureState::Enter);
    for &pt in &trace[1..] {
        p.predict(pt, GestureState::Stay);
    }
    p.predict(trace[trace.len() - 1], GestureState::Exit)
}

#[rstest]
#[case("hello", 1)]
#[case("world", 2)]
#[case("people", 3)]
#[case("because", 4)]
#[case("through", 5)]
#[case("between", 6)]
fn test_coarse_filter_keeps_the_exhaustive_winner(#[case] word: &str, #[case] seed: u64) {
    let layout = Arc::new(KeyLayout::qwerty(0.02));
    let lexicon = english();
    let mut filtered = predictor(&layout, &lexicon, SURVIVORS);
    let mut exhaustive = predictor(&layout, &lexicon, lexicon.len());
    assert!(filtered.template_count() > SURVIVORS);

    let trace = jittered_trace(&layout, word, seed);
    let best = decode(&mut filtered, &trace);
    assert_eq!(filtered.survivor_words().len(), SURVIVORS);

    let reference = decode(&mut exhaustive, &trace);
    assert_eq!(exhaustive.survivor_words().len(), exhaustive.template_count());
    assert_eq!(best, reference);
    assert_eq!(best, word);
}
