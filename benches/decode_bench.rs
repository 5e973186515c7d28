use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use typeforge::config::Config;
use typeforge::extractor::GestureState;
use typeforge::geometry::{KeyLayout, Point2};
use typeforge::lexicon::Lexicon;
use typeforge::predictor::{BruteForceTapPredictor, GesturePredictor, TapPredictor};

/// Deterministic pseudo-vocabulary with Zipf-like weights.
fn setup_lexicon(size: usize) -> Arc<Lexicon> {
    let letters: Vec<char> = "etaoinshrdlucmfwypvbgkqjxz".chars().collect();
    let mut rng = fastrand::Rng::with_seed(7);
    let mut lexicon = Lexicon::new();
    while lexicon.len() < size {
        let len = rng.usize(2..9);
        // Skewed towards frequent letters.
        let word: String = (0..len)
            .map(|_| letters[(rng.f32() * rng.f32() * letters.len() as f32) as usize])
            .collect();
        let weight = 1e6 / (lexicon.len() + 1) as f64;
        lexicon.add(&word, weight, None).expect("Failed to build lexicon");
    }
    Arc::new(lexicon)
}

fn taps(layout: &KeyLayout, word: &str) -> Vec<Point2> {
    let jitter = Point2::new(0.003, -0.002);
    word.chars()
        .map(|c| layout.anchor(c).expect("Missing key") + jitter)
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let layout = Arc::new(KeyLayout::qwerty(0.02));
    let lexicon = setup_lexicon(20_000);
    let config = Config::default();
    let word = "strength";
    let touches = taps(&layout, word);

    let mut trie = TapPredictor::new(layout.clone(), lexicon.clone(), &config).expect("Failed to build trie");
    c.bench_function("tap trie (20k words, 8 taps)", |b| {
        b.iter(|| {
            trie.clear();
            for &p in &touches {
                black_box(trie.predict(black_box(p)));
            }
        })
    });

    let mut brute = BruteForceTapPredictor::new(layout.clone(), lexicon.clone(), &config)
        .expect("Failed to build brute force predictor");
    c.bench_function("tap brute force (20k words, 8 taps)", |b| {
        b.iter(|| {
            brute.clear();
            for &p in &touches {
                black_box(brute.predict(black_box(p)));
            }
        })
    });

    let mut gesture = GesturePredictor::new(layout.clone(), lexicon, &config).expect("Failed to build templates");
    let path = layout.key_path(word).expect("Missing key");
    let mut trace = Vec::new();
    for w in path.windows(2) {
        for i in 0..8 {
            trace.push(w[0].lerp(w[1], i as f32 / 8.0));
        }
    }
    trace.extend(path.last().copied());

    c.bench_function("gesture decode (20k words)", |b| {
        b.iter(|| {
            gesture.predict(trace[0], GestureState::Enter);
            for &p in &trace[1..] {
                gesture.predict(p, GestureState::Stay);
            }
            black_box(gesture.predict(trace[0], GestureState::Exit))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
