use crate::geometry::Point2;

/// Index-aligned squared distance between two equally sampled traces.
pub fn rigid_distance(a: &[Point2], b: &[Point2]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| p.dist_sq(*q) as f64)
        .sum()
}

/// Dynamic time warping restricted to `|i - j| <= band`, Euclidean point cost.
///
/// Returns `None` as soon as every cell of a row exceeds `cutoff`, since the
/// final distance can then only be larger.
pub fn banded_dtw(a: &[Point2], b: &[Point2], band: usize, cutoff: f64) -> Option<f64> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return if n == m { Some(0.0) } else { None };
    }
    // The band has to reach the bottom-right corner.
    let band = band.max(n.abs_diff(m));

    let mut prev = vec![f64::INFINITY; m + 1];
    let mut cur = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for i in 1..=n {
        cur.fill(f64::INFINITY);
        let lo = i.saturating_sub(band).max(1);
        let hi = (i + band).min(m);
        let mut row_min = f64::INFINITY;
        for j in lo..=hi {
            let cost = a[i - 1].dist(b[j - 1]) as f64;
            // match / insertion / omission
            let best = prev[j - 1].min(prev[j]).min(cur[j - 1]);
            cur[j] = cost + best;
            row_min = row_min.min(cur[j]);
        }
        if row_min > cutoff {
            return None;
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    let d = prev[m];
    (d.is_finite() && d <= cutoff).then_some(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, dy: f32) -> Vec<Point2> {
        (0..n).map(|i| Point2::new(i as f32, dy)).collect()
    }

    #[test]
    fn test_identical_traces_are_free() {
        let a = line(10, 0.0);
        assert_eq!(banded_dtw(&a, &a, 2, f64::INFINITY), Some(0.0));
        assert_eq!(rigid_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_offset_and_cutoff() {
        let a = line(10, 0.0);
        let b = line(10, 1.0);
        let d = banded_dtw(&a, &b, 2, f64::INFINITY).unwrap();
        assert!((d - 10.0).abs() < 1e-9);
        assert!((rigid_distance(&a, &b) - 10.0).abs() < 1e-9);
        assert_eq!(banded_dtw(&a, &b, 2, 5.0), None);
    }

    #[test]
    fn test_warping_absorbs_shift() {
        let a = line(10, 0.0);
        let shifted: Vec<Point2> = (0..10).map(|i| Point2::new(i.max(1) as f32 - 1.0, 0.0)).collect();
        let d = banded_dtw(&a, &shifted, 2, f64::INFINITY).unwrap();
        assert!(d < rigid_distance(&a, &shifted));
    }
}
