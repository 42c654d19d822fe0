// Centralized tolerances and helpers for the coordinate/curve pipeline

// Control points closer than this to the source->target chord (in layout
// units) are treated as lying on it; a whole curve of such points renders
// as a straight line.
pub const CTRL_PT_DIST_EPSILON: f64 = 1.00;

// Layout tools emit node dimensions in inches; the render engine wants px.
pub const INCHES_TO_PIXELS: f64 = 54.0;

// Edge thickness bounds (px) for multiplicity-scaled edges.
pub const MIN_EDGE_THICKNESS: f64 = 3.0;
pub const MAX_EDGE_THICKNESS: f64 = 10.0;
pub const EDGE_THICKNESS_RANGE: f64 = MAX_EDGE_THICKNESS - MIN_EDGE_THICKNESS;

// Chunk frequency for incremental draws, as a fraction of the component's
// estimated work units (nodes + 0.5 * edges).
pub const CHUNK_FREQ_FRACTION: f64 = 0.05;

#[inline]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_truncates_to_cents() {
        assert_eq!(round2(1.005001), 1.01);
        assert_eq!(round2(-2.004), -2.0);
        assert_eq!(round2(0.0), 0.0);
    }
}
