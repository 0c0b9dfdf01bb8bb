//! 2D Catmull-Rom splines for path-following motion.
//!
//! The tank world drives its hull along one of these: uniform interpolation
//! draws the visible path, while the arc-length parameterized accessor gives
//! constant travel speed regardless of control-point spacing. Outputs are
//! written into caller-owned scratch vectors so per-frame sampling allocates
//! nothing.

use cgmath::{MetricSpace, Vector2};

const ARC_LENGTH_DIVISIONS: usize = 200;

fn catmull_rom(t: f32, p0: f32, p1: f32, p2: f32, p3: f32) -> f32 {
    let v0 = (p2 - p0) * 0.5;
    let v1 = (p3 - p1) * 0.5;
    let t2 = t * t;
    let t3 = t * t2;
    (2.0 * p1 - 2.0 * p2 + v0 + v1) * t3
        + (-3.0 * p1 + 3.0 * p2 - 2.0 * v0 - v1) * t2
        + v0 * t
        + p1
}

/// Catmull-Rom spline through a fixed list of 2D control points.
pub struct SplineCurve {
    points: Vec<Vector2<f32>>,
    /// Cumulative arc lengths at `ARC_LENGTH_DIVISIONS + 1` uniform samples.
    lengths: Vec<f32>,
}

impl SplineCurve {
    /// Build a spline and precompute its arc-length table.
    ///
    /// Needs at least two control points.
    pub fn new(points: Vec<Vector2<f32>>) -> Self {
        assert!(points.len() >= 2, "a spline needs at least two points");
        let mut curve = Self {
            points,
            lengths: Vec::new(),
        };
        curve.lengths = curve.measure_lengths();
        curve
    }

    fn measure_lengths(&self) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(ARC_LENGTH_DIVISIONS + 1);
        let mut last = self.points[0];
        let mut sum = 0.0;
        lengths.push(0.0);
        let mut current = Vector2::new(0.0, 0.0);
        for i in 1..=ARC_LENGTH_DIVISIONS {
            self.point(i as f32 / ARC_LENGTH_DIVISIONS as f32, &mut current);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }

    /// Total arc length of the curve.
    pub fn length(&self) -> f32 {
        *self.lengths.last().unwrap_or(&0.0)
    }

    /// Position at curve parameter `t` in `0.0..=1.0` (uniform, not
    /// arc-length corrected).
    pub fn point(&self, t: f32, out: &mut Vector2<f32>) {
        let count = self.points.len();
        let p = (count - 1) as f32 * t;
        let int_point = (p.floor() as usize).min(count - 1);
        let weight = p - int_point as f32;

        let p0 = self.points[int_point.saturating_sub(1)];
        let p1 = self.points[int_point];
        let p2 = self.points[(int_point + 1).min(count - 1)];
        let p3 = self.points[(int_point + 2).min(count - 1)];

        out.x = catmull_rom(weight, p0.x, p1.x, p2.x, p3.x);
        out.y = catmull_rom(weight, p0.y, p1.y, p2.y, p3.y);
    }

    /// Position at normalized arc length `u` in `0.0..=1.0`: `u = 0.5` is
    /// halfway along the curve by distance.
    pub fn point_at(&self, u: f32, out: &mut Vector2<f32>) {
        self.point(self.u_to_t(u.clamp(0.0, 1.0)), out);
    }

    fn u_to_t(&self, u: f32) -> f32 {
        let il = self.lengths.len();
        let target = u * self.length();

        // first arc-length sample that reaches the target distance
        let i = self.lengths.partition_point(|&len| len < target);
        if i == 0 {
            return 0.0;
        }
        if i >= il {
            return 1.0;
        }

        let length_before = self.lengths[i - 1];
        let segment = self.lengths[i] - length_before;
        let fraction = if segment > 0.0 {
            (target - length_before) / segment
        } else {
            0.0
        };
        ((i - 1) as f32 + fraction) / (il - 1) as f32
    }

    /// `divisions + 1` uniformly parameterized points along the curve, for
    /// drawing the path as a polyline.
    pub fn points(&self, divisions: usize) -> Vec<Vector2<f32>> {
        let mut out = Vec::with_capacity(divisions + 1);
        let mut scratch = Vector2::new(0.0, 0.0);
        for i in 0..=divisions {
            self.point(i as f32 / divisions as f32, &mut scratch);
            out.push(scratch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn zigzag() -> SplineCurve {
        SplineCurve::new(vec![
            Vector2::new(-10.0, 0.0),
            Vector2::new(-5.0, 5.0),
            Vector2::new(0.0, 0.0),
            Vector2::new(5.0, -5.0),
            Vector2::new(10.0, 0.0),
        ])
    }

    #[test]
    fn endpoints_hit_control_points() {
        let curve = zigzag();
        let mut p = Vector2::new(0.0, 0.0);
        curve.point(0.0, &mut p);
        assert_relative_eq!(p, Vector2::new(-10.0, 0.0));
        curve.point(1.0, &mut p);
        assert_relative_eq!(p, Vector2::new(10.0, 0.0));
    }

    #[test]
    fn interior_control_points_are_interpolated() {
        let curve = zigzag();
        let mut p = Vector2::new(0.0, 0.0);
        // t = 0.5 lands exactly on the middle of five control points
        curve.point(0.5, &mut p);
        assert_relative_eq!(p, Vector2::new(0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn arc_length_midpoint_of_a_straight_run() {
        // unevenly spaced collinear points: uniform t would be lopsided,
        // arc-length u must not be
        let curve = SplineCurve::new(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(10.0, 0.0),
        ]);
        let mut p = Vector2::new(0.0, 0.0);
        curve.point_at(0.5, &mut p);
        assert_relative_eq!(p.x, 5.0, epsilon = 0.1);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn point_at_extremes() {
        let curve = zigzag();
        let mut p = Vector2::new(0.0, 0.0);
        curve.point_at(0.0, &mut p);
        assert_relative_eq!(p, Vector2::new(-10.0, 0.0));
        curve.point_at(1.0, &mut p);
        assert_relative_eq!(p, Vector2::new(10.0, 0.0));
    }

    #[test]
    fn display_points_count() {
        let curve = zigzag();
        assert_eq!(curve.points(50).len(), 51);
    }

    #[test]
    fn lengths_are_monotone() {
        let curve = zigzag();
        for pair in curve.lengths.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(curve.length() > 0.0);
    }
}
