// Conversion from layout coordinates (bottom-left origin, y up) to render
// coordinates (top-left origin, y down), with an optional view rotation.

use super::tolerance::round2;
use crate::model::{BoundingBox, Point};

// Rotates a point clockwise about the origin by `degrees`. Multiples of a
// full turn return the input untouched; this runs once per point per
// element, so the no-op path matters.
pub fn rotate_point(p: Point, degrees: i32) -> Point {
    if degrees % 360 == 0 {
        return p;
    }
    let theta = (degrees as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    Point {
        x: round2(p.x * cos - p.y * sin),
        y: round2(p.y * cos + p.x * sin),
    }
}

// Maps a layout point into render space: flip the y axis across the
// component's bounding box, then rotate by the view's rotation delta
// (previous rotation minus current rotation, in degrees).
pub fn transform_point(x: f64, y: f64, bbox: BoundingBox, rotation_delta: i32) -> Point {
    let flipped = Point {
        x,
        y: bbox.height - y,
    };
    rotate_point(flipped, rotation_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BB: BoundingBox = BoundingBox {
        width: 100.0,
        height: 40.0,
    };

    #[test]
    fn zero_rotation_is_pure_axis_flip() {
        let p = transform_point(3.0, 7.5, BB, 0);
        assert_eq!(p, Point { x: 3.0, y: 32.5 });
    }

    #[test]
    fn full_turns_skip_the_trig_path() {
        let p = transform_point(3.0, 7.5, BB, 360);
        assert_eq!(p, Point { x: 3.0, y: 32.5 });
        let p = transform_point(3.0, 7.5, BB, -720);
        assert_eq!(p, Point { x: 3.0, y: 32.5 });
    }

    #[test]
    fn quarter_turn_clockwise() {
        // (10, 0) rotated 90 degrees clockwise lands on (0, 10).
        let p = rotate_point(Point::new(10.0, 0.0), 90);
        assert_eq!(p, Point { x: 0.0, y: 10.0 });
        // ...and -90 lands on (0, -10).
        let p = rotate_point(Point::new(10.0, 0.0), -90);
        assert_eq!(p, Point { x: 0.0, y: -10.0 });
    }

    #[test]
    fn outputs_round_to_two_decimals() {
        let p = rotate_point(Point::new(1.0, 1.0), 45);
        // cos45 - sin45 == 0, cos45 + sin45 == sqrt(2)
        assert_eq!(p, Point { x: 0.0, y: 1.41 });
    }
}
