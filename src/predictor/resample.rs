use crate::geometry::Point2;

/// Total polyline length.
pub fn path_length(points: &[Point2]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].dist(w[1]) as f64)
        .sum()
}

/// Resamples a polyline to `m` points spaced uniformly by arc length.
///
/// The first and last points are preserved. A trace with (near) zero length
/// collapses to `m` copies of its first point; an empty trace stays empty.
pub fn resample(points: &[Point2], m: usize) -> Vec<Point2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if m == 0 {
        return Vec::new();
    }

    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0f64;
    cumulative.push(0.0);
    for w in points.windows(2) {
        total += w[0].dist(w[1]) as f64;
        cumulative.push(total);
    }

    if m == 1 || total <= f32::EPSILON as f64 {
        return vec![first; m];
    }

    let step = total / (m - 1) as f64;
    let mut out = Vec::with_capacity(m);
    let mut seg = 0;
    for i in 0..m {
        let target = step * i as f64;
        while seg + 1 < points.len() - 1 && cumulative[seg + 1] < target {
            seg += 1;
        }
        let (a, b) = (cumulative[seg], cumulative[seg + 1]);
        let span = b - a;
        let t = if span > 0.0 {
            ((target - a) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(points[seg].lerp(points[seg + 1], t as f32));
    }
    // Pin the endpoint against accumulated rounding.
    if let Some(last) = out.last_mut() {
        *last = points[points.len() - 1];
    }
    out
}
