use crate::config::TapParams;
use crate::touch::TouchSample;
use std::collections::VecDeque;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TapState {
    Out,
    InTypeZone,
    TouchingKeyboard,
    TapDown,
    LiftUp,
}

/// Detects taps from the depth signal of one finger.
///
/// A tap window opens on a sharp drop in depth and closes on a sharp rise.
/// While it is open, the deepest plausible sample becomes the tap target.
#[derive(Debug, Clone)]
pub struct TapExtractor {
    params: TapParams,
    depths: VecDeque<f32>,
    window_open: bool,
    min_depth: f32,
    target: Option<TouchSample>,
    state: TapState,
}

impl TapExtractor {
    pub fn new(params: TapParams) -> Self {
        let mut extractor = Self {
            depths: VecDeque::with_capacity(params.buffer_capacity.max(2)),
            params,
            window_open: false,
            min_depth: f32::MAX,
            target: None,
            state: TapState::Out,
        };
        extractor.clear();
        extractor
    }

    pub fn input(&mut self, sample: &TouchSample) -> TapState {
        let ceiling = self.params.type_zone_height;
        let threshold = self.params.dd_threshold;
        let floor = self.params.depth_floor;
        let mut state = TapState::InTypeZone;
        let mut depth = sample.depth;

        // out
        if !sample.in_type_zone {
            depth = ceiling;
            self.flush();
            state = TapState::Out;
        }

        if sample.touching_plane {
            state = TapState::TouchingKeyboard;
        }

        // update target
        if self.window_open {
            self.min_depth = self.min_depth.min(depth).max(floor);
            if depth < self.min_depth + self.params.min_depth_noise {
                self.target = Some(TouchSample { depth, ..*sample });
            }
        }

        let prev_depth = self.last_depth();
        let dd = depth - prev_depth;
        self.push(depth);

        // tap down
        if dd < -threshold && prev_depth < ceiling && !self.window_open {
            self.window_open = true;
            self.min_depth = depth.max(floor);
            self.target = Some(TouchSample { depth, ..*sample });
            state = TapState::TapDown;
        }

        // lift up
        if dd > threshold && self.window_open {
            self.flush();
            state = TapState::LiftUp;
        }

        self.state = state;
        state
    }

    /// Resolved press point of the last tap (valid after `LiftUp`).
    pub fn target(&self) -> Option<&TouchSample> {
        self.target.as_ref()
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    pub fn buffered(&self) -> usize {
        self.depths.len()
    }

    pub fn clear(&mut self) {
        self.depths.clear();
        self.depths.push_back(self.params.type_zone_height);
        self.window_open = false;
        self.min_depth = f32::MAX;
        self.target = None;
        self.state = TapState::Out;
    }

    fn last_depth(&self) -> f32 {
        self.depths
            .back()
            .copied()
            .unwrap_or(self.params.type_zone_height)
    }

    fn push(&mut self, depth: f32) {
        if self.depths.len() >= self.params.buffer_capacity.max(2) {
            self.depths.pop_front();
        }
        self.depths.push_back(depth);
    }

    /// Drops the buffered window, keeping the newest depth as the derivative baseline.
    fn flush(&mut self) {
        let drop = self.depths.len().saturating_sub(1);
        self.depths.drain(..drop);
        self.window_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    fn sample(x: f32, depth: f32) -> TouchSample {
        TouchSample {
            position: Vec3::new(x, 0.0, -depth),
            depth,
            in_type_zone: depth < 0.03,
            touching_plane: depth <= 0.0,
        }
    }

    #[test]
    fn test_single_tap_target_is_deepest() {
        let mut ex = TapExtractor::new(TapParams::default());
        let trace = [
            (0.0, 0.05),
            (0.1, 0.02),
            (0.2, 0.02),
            (0.3, 0.012),
            (0.4, 0.004),
            (0.5, 0.001),
            (0.6, 0.0015),
            (0.7, 0.010),
            (0.8, 0.020),
        ];
        let states: Vec<TapState> = trace.iter().map(|&(x, d)| ex.input(&sample(x, d))).collect();

        assert_eq!(states.iter().filter(|s| **s == TapState::TapDown).count(), 1);
        assert_eq!(states.iter().filter(|s| **s == TapState::LiftUp).count(), 1);
        assert_eq!(states[3], TapState::TapDown);
        assert_eq!(states[7], TapState::LiftUp);
        // 0.0015 lies within the noise margin of 0.001, so the later sample wins.
        assert_eq!(ex.target().unwrap().position.x, 0.6);
    }

    #[test]
    fn test_entering_zone_is_not_a_tap() {
        let mut ex = TapExtractor::new(TapParams::default());
        assert_eq!(ex.input(&sample(0.0, 0.08)), TapState::Out);
        // Clamped ceiling -> 0.02 is a big drop, but the previous sample was outside.
        assert_eq!(ex.input(&sample(0.0, 0.02)), TapState::InTypeZone);
        assert!(!ex.is_window_open());
    }

    #[test]
    fn test_leaving_zone_aborts_window() {
        let mut ex = TapExtractor::new(TapParams::default());
        ex.input(&sample(0.0, 0.02));
        assert_eq!(ex.input(&sample(0.0, 0.01)), TapState::TapDown);
        assert_eq!(ex.input(&sample(0.0, 0.06)), TapState::Out);
        assert!(!ex.is_window_open());
        assert_eq!(ex.input(&sample(0.0, 0.02)), TapState::InTypeZone);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let params = TapParams {
            buffer_capacity: 8,
            ..Default::default()
        };
        let mut ex = TapExtractor::new(params);
        for i in 0..100 {
            ex.input(&sample(i as f32, 0.02));
        }
        assert!(ex.buffered() <= 8);
    }
}
