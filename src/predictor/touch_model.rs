use crate::config::{TouchModelKind, TouchModelParams};
use crate::geometry::{KeyLayout, Point2};
use std::f64::consts::PI;

/// Axis-independent Gaussian spread of touches around a key centre.
#[derive(Debug, Clone)]
pub struct TouchModel {
    inv_sx: f64,
    inv_sy: f64,
    ln_norm: f64,
}

impl TouchModel {
    pub fn new(params: &TouchModelParams, layout: &KeyLayout) -> Self {
        let (scale_x, scale_y) = match params.touch_model {
            TouchModelKind::KeyRelative => (layout.key_width() as f64, layout.key_height() as f64),
            TouchModelKind::Absolute => (1.0, 1.0),
        };
        Self {
            inv_sx: 1.0 / (params.sigma_x * scale_x),
            inv_sy: 1.0 / (params.sigma_y * scale_y),
            // normalisation taken in the model's own (possibly key-relative) units
            ln_norm: -(2.0 * PI * params.sigma_x * params.sigma_y).ln(),
        }
    }

    #[inline(always)]
    pub fn log_likelihood(&self, touch: Point2, key: Point2) -> f64 {
        let zx = (touch.x - key.x) as f64 * self.inv_sx;
        let zy = (touch.y - key.y) as f64 * self.inv_sy;
        self.ln_norm - 0.5 * (zx * zx + zy * zy)
    }

    /// Highest value `log_likelihood` can return (touch dead on the key centre).
    pub fn peak(&self) -> f64 {
        self.ln_norm
    }

    /// Log-likelihood of `touch` for every key, indexed like the layout.
    pub fn row(&self, touch: Point2, layout: &KeyLayout) -> Vec<f64> {
        layout
            .keys()
            .iter()
            .map(|k| self.log_likelihood(touch, k.point()))
            .collect()
    }
}

/// Error-tolerant alignment of touches against a key sequence.
///
/// `lp[i][k]` is the log-likelihood of touch `i` for key `k`. Rows hold one
/// cell per number of consumed touches.
#[derive(Debug, Clone)]
pub struct ElasticModel {
    pub ln_insert: f64,
    pub ln_omit: f64,
    pub ln_swap: f64,
    pub bandwidth: usize,
}

impl ElasticModel {
    pub fn new(params: &TouchModelParams) -> Self {
        Self {
            ln_insert: params.insertion_error_rate.ln(),
            ln_omit: params.omission_error_rate.ln(),
            ln_swap: params.swap_error_rate.ln(),
            bandwidth: params.bandwidth,
        }
    }

    /// Cell of the empty prefix: every touch so far was spurious.
    #[inline(always)]
    pub fn root_cell(&self, n: usize, own: &[f64]) -> f64 {
        if n == 0 {
            0.0
        } else {
            own[n - 1] + self.ln_insert
        }
    }

    /// Cell `n` of a prefix ending in `key`, given the rows of the prefix
    /// itself, its parent and (for transpositions) its grandparent.
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub fn cell(
        &self,
        n: usize,
        key: usize,
        parent_key: Option<usize>,
        lp: &[Vec<f64>],
        own: &[f64],
        parent: &[f64],
        grand: Option<&[f64]>,
    ) -> f64 {
        // omission
        let mut best = parent[n] + self.ln_omit;
        if n >= 1 {
            // match
            best = best.max(parent[n - 1] + lp[n - 1][key]);
            // insertion
            best = best.max(own[n - 1] + self.ln_insert);
        }
        if n >= 2 {
            if let (Some(grand), Some(pk)) = (grand, parent_key) {
                // transposition
                best = best.max(grand[n - 2] + lp[n - 2][key] + lp[n - 1][pk] + self.ln_swap);
            }
        }
        best
    }

    /// Upper bound on what `samples` more touches can add to any cell.
    pub fn per_sample_ceiling(&self, touch: &TouchModel) -> f64 {
        touch.peak().max(self.ln_insert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closer_key_is_likelier() {
        let layout = KeyLayout::qwerty(0.02);
        let model = TouchModel::new(&TouchModelParams::default(), &layout);
        let f = layout.anchor('f').unwrap();
        let g = layout.anchor('g').unwrap();
        let touch = f + Point2::new(0.003, 0.0);
        assert!(model.log_likelihood(touch, f) > model.log_likelihood(touch, g));
        assert!(model.log_likelihood(f, f) <= model.peak() + 1e-12);
    }

    #[test]
    fn test_scale_invariance_of_key_relative_model() {
        let params = TouchModelParams::default();
        let small = KeyLayout::qwerty(0.02);
        let big = KeyLayout::qwerty(1.0);
        let a = TouchModel::new(&params, &small);
        let b = TouchModel::new(&params, &big);
        let ls = a.log_likelihood(Point2::new(0.01, 0.0), Point2::new(0.0, 0.0));
        let lb = b.log_likelihood(Point2::new(0.5, 0.0), Point2::new(0.0, 0.0));
        assert!((ls - lb).abs() < 1e-5);
    }

    #[test]
    fn test_peak_uses_sigma_units_in_both_modes() {
        let layout = KeyLayout::qwerty(0.02);
        let mut params = TouchModelParams::default();
        let expected = -(2.0 * PI * params.sigma_x * params.sigma_y).ln();
        assert!((TouchModel::new(&params, &layout).peak() - expected).abs() < 1e-12);

        params.touch_model = TouchModelKind::Absolute;
        params.sigma_x = 0.01;
        params.sigma_y = 0.008;
        let absolute = TouchModel::new(&params, &layout);
        let expected = -(2.0 * PI * 0.01_f64 * 0.008).ln();
        assert!((absolute.peak() - expected).abs() < 1e-12);
        // One sigma off along x costs exactly half a nat.
        let key = Point2::new(0.0, 0.0);
        let off = absolute.log_likelihood(Point2::new(0.01, 0.0), key);
        assert!((absolute.peak() - off - 0.5).abs() < 1e-4);
    }
}
