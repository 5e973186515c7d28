use proptest::prelude::*;
use std::sync::Arc;
use typeforge::candidates::CandidateList;
use typeforge::config::{Config, DecoderParams};
use typeforge::geometry::{KeyLayout, Point2};
use typeforge::lexicon::Lexicon;
use typeforge::predictor::resample::{path_length, resample};
use typeforge::predictor::{BruteForceTapPredictor, TapPredictor};

// --- STRATEGIES ---

// Small alphabet so words share prefixes and the trie actually branches.
prop_compose! {
    fn arb_word()(chars in prop::collection::vec(prop::sample::select(vec!['t', 'h', 'e', 'r', 'a', 'n', 'g']), 1..7)) -> String {
        chars.into_iter().collect()
    }
}

prop_compose! {
    fn arb_lexicon()(words in prop::collection::vec((arb_word(), 1.0..1000.0f64), 1..25)) -> Vec<(String, f64)> {
        words
    }
}

prop_compose! {
    fn arb_touches()(
        keys in prop::collection::vec(prop::sample::select(vec!['t', 'h', 'e', 'r', 'a', 'n', 'g', 'y', 'f']), 1..8),
        noise in prop::collection::vec((-0.4..0.4f32, -0.4..0.4f32), 8)
    ) -> Vec<(char, f32, f32)> {
        keys.into_iter().zip(noise).map(|(k, (dx, dy))| (k, dx, dy)).collect()
    }
}

fn scores(list: &CandidateList) -> Vec<f64> {
    list.iter().map(|c| c.score).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_candidate_list_sorted_and_bounded(
        cap in 1usize..6,
        items in prop::collection::vec((0u8..12, -50.0..50.0f64), 0..40)
    ) {
        let mut list = CandidateList::new(cap);
        for (w, s) in &items {
            list.insert(&format!("w{}", w), *s);
        }
        prop_assert!(list.len() <= cap);
        let s = scores(&list);
        for pair in s.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
        let mut words = list.words();
        words.sort();
        words.dedup();
        prop_assert_eq!(words.len(), list.len());

        // The best surviving score is the best score ever offered.
        if let Some(best) = list.best() {
            let max = items.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(best.score, max);
        }
    }

    #[test]
    fn prop_trie_matches_brute_force(
        words in arb_lexicon(),
        touches in arb_touches(),
        cap in 1usize..6
    ) {
        let layout = Arc::new(KeyLayout::qwerty(0.02));
        let lex = Arc::new(Lexicon::from_entries(words.iter().map(|(w, f)| (w.as_str(), *f))).unwrap());
        let config = Config {
            decoder: DecoderParams { candidates: cap, ..Default::default() },
            ..Default::default()
        };
        let mut trie = TapPredictor::new(layout.clone(), lex.clone(), &config).unwrap();
        let mut brute = BruteForceTapPredictor::new(layout.clone(), lex, &config).unwrap();

        let pitch = layout.key_width();
        for (ch, dx, dy) in touches {
            let p = layout.anchor(ch).unwrap() + Point2::new(dx * pitch, dy * pitch);
            trie.predict(p);
            brute.predict(p);

            let a = scores(trie.ranked());
            let b = scores(brute.ranked());
            prop_assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(&b) {
                prop_assert!((x - y).abs() < 1e-6, "trie {:?} vs brute {:?}", a, b);
            }
            prop_assert_eq!(trie.literal(), brute.literal());
        }
    }

    #[test]
    fn prop_resample_shape(
        pts in prop::collection::vec((-5.0..5.0f32, -5.0..5.0f32), 1..30),
        m in 2usize..60
    ) {
        let path: Vec<Point2> = pts.into_iter().map(|(x, y)| Point2::new(x, y)).collect();
        let out = resample(&path, m);
        prop_assert_eq!(out.len(), m);
        prop_assert_eq!(out[0], path[0]);
        prop_assert_eq!(out[m - 1], path[path.len() - 1]);
        // Resampling never makes a path longer.
        prop_assert!(path_length(&out) <= path_length(&path) + 1e-3);
    }

    #[test]
    fn prop_resample_is_idempotent_on_strokes(
        mut ts in prop::collection::vec(0.0..10.0f32, 2..20),
        dir in (-1.0..1.0f32, -1.0..1.0f32),
        m in 2usize..40
    ) {
        // A monotone straight stroke: chords equal arc length, so a second pass is a no-op.
        ts.sort_by(|a, b| a.total_cmp(b));
        let (dx, dy) = dir;
        let path: Vec<Point2> = ts.iter().map(|t| Point2::new(t * dx, t * dy)).collect();
        let once = resample(&path, m);
        let twice = resample(&once, m);
        prop_assume!(path_length(&once) > 1e-3);
        for (a, b) in once.iter().zip(&twice) {
            prop_assert!(a.dist(*b) < 1e-2, "{:?} vs {:?}", a, b);
        }
    }
}
