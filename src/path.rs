//! Connector curves and their SVG path commands.
//!
//! Two families are supported: a cubic bezier whose control points extend
//! along the anchor normals, and an orthogonal "elbow" polyline used by the
//! org-chart layout. Both can be measured against a point for hit testing.

use crate::geometry::Point;
use crate::viewport::Viewport;

/// Endpoints closer than this collapse to a straight line.
const STRAIGHT_LINE_THRESHOLD: f32 = 10.0;

/// Cubic bezier curve for rendering and distance calculations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // Control point 1
    pub p2: Point, // Control point 2
    pub p3: Point, // End point
}

impl CubicBezier {
    /// Create a bezier between two anchors.
    ///
    /// `start_normal` and `end_normal` are unit vectors pointing out of the
    /// node boundary at each anchor. The control offset is half the distance
    /// along the normal's axis, but never less than `min_offset`.
    pub fn from_anchors(
        start: Point,
        start_normal: Point,
        end: Point,
        end_normal: Point,
        min_offset: f32,
    ) -> Self {
        let along = if start_normal.x.abs() >= start_normal.y.abs() {
            (end.x - start.x).abs()
        } else {
            (end.y - start.y).abs()
        };
        let offset = (along * 0.5).max(min_offset);

        CubicBezier {
            p0: start,
            p1: start + start_normal * offset,
            p2: end + end_normal * offset,
            p3: end,
        }
    }

    /// Horizontal flow curve: leaves `start` to the right, enters `end` from the left.
    pub fn horizontal(start: Point, end: Point, min_offset: f32) -> Self {
        Self::from_anchors(
            start,
            Point::new(1.0, 0.0),
            end,
            Point::new(-1.0, 0.0),
            min_offset,
        )
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        self.p0 * mt3 + self.p1 * (3.0 * mt2 * t) + self.p2 * (3.0 * mt * t2) + self.p3 * t3
    }

    /// Sub-curve from t=0 to t (de Casteljau split).
    pub fn head(&self, t: f32) -> CubicBezier {
        let t = t.clamp(0.0, 1.0);
        let q0 = self.p0.lerp(self.p1, t);
        let q1 = self.p1.lerp(self.p2, t);
        let q2 = self.p2.lerp(self.p3, t);
        let r0 = q0.lerp(q1, t);
        let r1 = q1.lerp(q2, t);
        let s = r0.lerp(r1, t);
        CubicBezier {
            p0: self.p0,
            p1: q0,
            p2: r0,
            p3: s,
        }
    }

    pub fn to_svg(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// Orthogonal connector: down from the parent, across, down into the child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElbowPath {
    pub points: [Point; 4],
}

impl ElbowPath {
    /// Bottom-center of the parent to top-center of the child, turning halfway.
    pub fn vertical(start: Point, end: Point) -> Self {
        let mid_y = (start.y + end.y) * 0.5;
        ElbowPath {
            points: [
                start,
                Point::new(start.x, mid_y),
                Point::new(end.x, mid_y),
                end,
            ],
        }
    }

    pub fn to_svg(&self) -> String {
        let [a, b, c, d] = self.points;
        format!(
            "M {} {} L {} {} L {} {} L {} {}",
            a.x, a.y, b.x, b.y, c.x, c.y, d.x, d.y
        )
    }
}

/// A routed connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line(Point, Point),
    Bezier(CubicBezier),
    Elbow(ElbowPath),
}

impl Curve {
    /// Bezier between anchors, degrading to a line when the anchors nearly touch.
    pub fn bezier(
        start: Point,
        start_normal: Point,
        end: Point,
        end_normal: Point,
        min_offset: f32,
    ) -> Curve {
        if start.distance_sq(end) < STRAIGHT_LINE_THRESHOLD * STRAIGHT_LINE_THRESHOLD {
            return Curve::Line(start, end);
        }
        Curve::Bezier(CubicBezier::from_anchors(
            start,
            start_normal,
            end,
            end_normal,
            min_offset,
        ))
    }

    pub fn elbow(start: Point, end: Point) -> Curve {
        if start.distance_sq(end) < STRAIGHT_LINE_THRESHOLD * STRAIGHT_LINE_THRESHOLD {
            return Curve::Line(start, end);
        }
        Curve::Elbow(ElbowPath::vertical(start, end))
    }

    pub fn start(&self) -> Point {
        match self {
            Curve::Line(a, _) => *a,
            Curve::Bezier(b) => b.p0,
            Curve::Elbow(e) => e.points[0],
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Curve::Line(_, b) => *b,
            Curve::Bezier(b) => b.p3,
            Curve::Elbow(e) => e.points[3],
        }
    }

    /// SVG path commands in the curve's own coordinate space.
    pub fn to_svg(&self) -> String {
        match self {
            Curve::Line(a, b) => format!("M {} {} L {} {}", a.x, a.y, b.x, b.y),
            Curve::Bezier(b) => b.to_svg(),
            Curve::Elbow(e) => e.to_svg(),
        }
    }

    /// Map every control point through the viewport. The transform is affine,
    /// so the mapped control points describe the mapped curve exactly.
    pub fn to_screen(&self, viewport: &Viewport) -> Curve {
        let map = |p: Point| viewport.to_screen(p);
        match self {
            Curve::Line(a, b) => Curve::Line(map(*a), map(*b)),
            Curve::Bezier(b) => Curve::Bezier(CubicBezier {
                p0: map(b.p0),
                p1: map(b.p1),
                p2: map(b.p2),
                p3: map(b.p3),
            }),
            Curve::Elbow(e) => Curve::Elbow(ElbowPath {
                points: e.points.map(map),
            }),
        }
    }

    /// Minimum distance from `point` to the curve.
    pub fn distance_to(&self, point: Point, samples: usize) -> f32 {
        match self {
            Curve::Line(a, b) => distance_to_line_segment_sq(point, *a, *b).sqrt(),
            Curve::Bezier(b) => distance_to_bezier(point, b, samples),
            Curve::Elbow(e) => e
                .points
                .windows(2)
                .map(|w| distance_to_line_segment_sq(point, w[0], w[1]))
                .fold(f32::MAX, f32::min)
                .sqrt(),
        }
    }
}

/// Calculate squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let ap = point - a;

    let ab_len_sq = ab.x * ab.x + ab.y * ab.y;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.x * ap.x + ap.y * ap.y;
    }

    // Project point onto line, clamped to segment
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len_sq).clamp(0.0, 1.0);

    point.distance_sq(a + ab * t)
}

/// Calculate the minimum distance from a point to a cubic bezier curve
///
/// Samples the curve at regular intervals and measures against each chord.
/// `num_samples` of zero falls back to 20.
pub fn distance_to_bezier(point: Point, bezier: &CubicBezier, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev_point = bezier.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr_point = bezier.eval(t);

        let dist_sq = distance_to_line_segment_sq(point, prev_point, curr_point);
        if dist_sq < min_dist_sq {
            min_dist_sq = dist_sq;
        }

        prev_point = curr_point;
    }

    min_dist_sq.sqrt()
}
