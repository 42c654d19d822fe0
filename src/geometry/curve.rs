// Distance helpers and the control-point parameterizer: absolute spline
// control points from the layout become per-point (signed distance,
// normalized weight) pairs relative to the straight source->target chord.

use super::tolerance::{round2, CTRL_PT_DIST_EPSILON};
use crate::model::{CurveDescriptor, Point};

pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

// Signed perpendicular distance from `point` to the infinite line through
// `a` and `b`. The sign flips across the line: for a horizontal line a
// point below it is negative, above it positive.
//
// Panics if `a == b`: a zero-length line has no direction, and callers are
// required to route self loops around this computation entirely.
pub fn point_to_line_distance(point: Point, a: Point, b: Point) -> f64 {
    let line_dist = distance(a, b);
    if line_dist == 0.0 {
        panic!("point_to_line_distance: degenerate line (both endpoints equal)");
    }
    let ydelta = b.y - a.y;
    let xdelta = b.x - a.x;
    let consts = b.x * a.y - b.y * a.x;
    -((ydelta * point.x - xdelta * point.y + consts) / line_dist)
}

// Converts transformed control points plus the two endpoint positions into
// a curve descriptor. If every control point lies within epsilon of the
// chord the parameterized form is discarded: a nearly-collinear curve
// renders identically as a straight line at far lower cost.
pub fn parameterize_curve(points: &[Point], source: Point, target: Point) -> CurveDescriptor {
    let chord = distance(source, target);
    let mut dists = Vec::with_capacity(points.len());
    let mut weights = Vec::with_capacity(points.len());
    let mut nonzero = false;
    let last = points.len().saturating_sub(1);
    for (i, &p) in points.iter().enumerate() {
        let d = -point_to_line_distance(p, source, target);
        let dsp = distance(p, source);
        let dtp = distance(p, target);
        // The hypotenuse dominates its legs in exact arithmetic, but float
        // round-off can push the radicand slightly negative for points
        // sitting on the chord; the abs() absorbs that.
        let ws = (dsp * dsp - d * d).abs().sqrt();
        let wt = (dtp * dtp - d * d).abs().sqrt();
        // ws = distance along the chord to the source, wt to the target.
        // A point "behind" the source gets a negative weight; anything
        // else falls in [0, 1] or past 1 beyond the target.
        let mut w = if wt > chord && wt > ws {
            -ws / chord
        } else {
            ws / chord
        };
        if d.abs() > CTRL_PT_DIST_EPSILON {
            nonzero = true;
        }
        // Weights of exactly 0 on the first point or 1 on the last collide
        // with the implicit endpoint positions and would be ignored by the
        // render engine; nudge them inward.
        if i == 0 && w == 0.0 {
            w = 0.01;
        } else if i == last && w == 1.0 {
            w = 0.99;
        }
        dists.push(round2(d));
        weights.push(round2(w));
    }
    if nonzero {
        CurveDescriptor::Parameterized { dists, weights }
    } else {
        CurveDescriptor::Straight
    }
}
