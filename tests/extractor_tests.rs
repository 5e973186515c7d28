use rstest::rstest;
use typeforge::config::TapParams;
use typeforge::extractor::{GestureExtractor, GestureState, TapExtractor, TapState};
use typeforge::geometry::{KeyboardPlane, Point2, Projection, Vec3};
use typeforge::touch::TouchSample;

const ZONE: f32 = 0.03;

fn at(x: f32, depth: f32) -> TouchSample {
    TouchSample {
        position: Vec3::new(x, 0.0, -depth),
        depth,
        in_type_zone: depth < ZONE,
        touching_plane: depth <= 0.0,
    }
}

fn run(ex: &mut TapExtractor, depths: &[f32]) -> Vec<TapState> {
    depths
        .iter()
        .enumerate()
        .map(|(i, &d)| ex.input(&at(i as f32, d)))
        .collect()
}

#[test]
fn test_v_shaped_press_resolves_to_bottom() {
    let mut ex = TapExtractor::new(TapParams::default());
    let states = run(&mut ex, &[0.02, 0.015, 0.008, 0.002, -0.004, 0.003, 0.012, 0.02]);

    assert_eq!(states[1], TapState::TapDown);
    assert_eq!(states[4], TapState::TouchingKeyboard);
    assert_eq!(states[5], TapState::LiftUp);
    let target = ex.target().unwrap();
    assert_eq!(target.position.x, 4.0);
    assert!(!ex.is_window_open());
}

#[test]
fn test_depth_floor_clamps_deep_presses() {
    let mut ex = TapExtractor::new(TapParams::default());
    // A tracking glitch far below the floor must not pin the running minimum.
    let states = run(&mut ex, &[0.02, 0.012, -0.08, -0.007, 0.001, 0.02]);
    assert!(states.contains(&TapState::LiftUp));
    let target = ex.target().unwrap();
    assert_eq!(target.position.x, 3.0);
}

#[rstest]
#[case::slow_descent(&[0.02, 0.019, 0.018, 0.017, 0.016, 0.015, 0.016, 0.017])]
#[case::outside_zone(&[0.08, 0.07, 0.05, 0.04, 0.06])]
#[case::hover_jitter(&[0.02, 0.021, 0.019, 0.02, 0.022, 0.02])]
fn test_no_tap(#[case] depths: &[f32]) {
    let mut ex = TapExtractor::new(TapParams::default());
    let states = run(&mut ex, depths);
    assert!(!states.contains(&TapState::TapDown));
    assert!(!states.contains(&TapState::LiftUp));
}

#[test]
fn test_two_taps_in_a_row() {
    let mut ex = TapExtractor::new(TapParams::default());
    let one = [0.02, 0.012, 0.004, -0.002, 0.008, 0.02];
    let depths: Vec<f32> = one.iter().chain(one.iter()).copied().collect();
    let states = run(&mut ex, &depths);
    assert_eq!(states.iter().filter(|s| **s == TapState::LiftUp).count(), 2);
    assert_eq!(states.iter().filter(|s| **s == TapState::TapDown).count(), 2);
}

#[test]
fn test_gesture_exit_requires_leaving_zone() {
    let mut ex = GestureExtractor::new();
    let trace = [
        (true, false, GestureState::None),
        (true, true, GestureState::Enter),
        (true, true, GestureState::Stay),
        (true, false, GestureState::Stay),
        (true, true, GestureState::Stay),
        (false, false, GestureState::Exit),
        (false, false, GestureState::WaitForConfirm),
    ];
    for (zone, touch, expected) in trace {
        assert_eq!(ex.input(zone, touch), expected);
    }
}

#[test]
fn test_see_through_projection_follows_eye_ray() {
    let eye = Vec3::new(0.0, 0.0, -0.5);
    let plane = KeyboardPlane {
        projection: Projection::SeeThrough { eye },
        ..Default::default()
    };
    // Fingertip halfway between the eye and the plane, off-axis.
    let finger = Vec3::new(0.05, 0.02, -0.25);
    let p = plane.touch_point(finger);
    assert!((p.x - 0.1).abs() < 1e-5 && (p.y - 0.04).abs() < 1e-5);

    let ortho = KeyboardPlane::default();
    assert_eq!(ortho.touch_point(finger), Point2::new(0.05, 0.02));
    assert!((ortho.depth_of(finger) - 0.25).abs() < 1e-6);
}
