use proptest::prelude::*;
use tangle::model::Point;
use tangle::{distance, point_to_line_distance};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[test]
fn distance_between_two_points() {
    assert_eq!(distance(pt(1.0, 2.0), pt(3.0, 4.0)), 8.0_f64.sqrt());
}

#[test]
fn distance_of_a_point_to_itself_is_zero() {
    assert_eq!(distance(pt(-1.0, -5.0), pt(-1.0, -5.0)), 0.0);
}

#[test]
fn handles_distances_on_the_order_of_a_million() {
    let d = distance(pt(0.0, 0.0), pt(-12345.0, 10_000_000.0));
    assert!((d - 10_000_007.619948346).abs() < 0.001);
}

#[test]
fn perpendicular_distance_from_a_point_to_a_line() {
    // Example lines with known perpendicular distances; the two points
    // defining each line are its y- and x-intercepts.
    let d = point_to_line_distance(pt(5.0, 6.0), pt(0.0, -4.0 / 3.0), pt(2.0, 0.0));
    assert!((d - 3.328).abs() < 0.001);

    let d2 = point_to_line_distance(pt(-3.0, 7.0), pt(0.0, 2.0), pt(-5.0 / 3.0, 0.0));
    assert!((d2 - -5.506).abs() < 0.001);
}

#[test]
fn perpendicular_distance_with_origin_as_the_point() {
    let d = point_to_line_distance(pt(0.0, 0.0), pt(0.0, -4.0 / 3.0), pt(2.0, 0.0));
    assert!((d - 1.1094).abs() < 0.001);
}

#[test]
fn perpendicular_distance_to_a_horizontal_line() {
    // The line is at y = 1; the sign flips across it.
    let below = point_to_line_distance(pt(2.0, 0.0), pt(1.0, 1.0), pt(8.0, 1.0));
    assert_eq!(below, -1.0);
    let above = point_to_line_distance(pt(2.0, 2.0), pt(1.0, 1.0), pt(8.0, 1.0));
    assert_eq!(above, 1.0);
}

#[test]
fn perpendicular_distance_to_a_vertical_line() {
    // The line is at x = -1.
    let right = point_to_line_distance(pt(1.5, 0.0), pt(-1.0, -1.0), pt(-1.0, 6.0));
    assert_eq!(right, -2.5);
    let left = point_to_line_distance(pt(-1.5, 0.0), pt(-1.0, -1.0), pt(-1.0, 6.0));
    assert_eq!(left, 0.5);
}

#[test]
#[should_panic(expected = "degenerate line")]
fn perpendicular_distance_rejects_a_zero_length_line() {
    point_to_line_distance(pt(1.0, 2.0), pt(3.0, 4.0), pt(3.0, 4.0));
}

proptest! {
    #[test]
    fn distance_is_symmetric(
        ax in -1e6_f64..1e6, ay in -1e6_f64..1e6,
        bx in -1e6_f64..1e6, by in -1e6_f64..1e6,
    ) {
        let a = pt(ax, ay);
        let b = pt(bx, by);
        prop_assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn distance_to_self_is_zero(x in -1e6_f64..1e6, y in -1e6_f64..1e6) {
        prop_assert_eq!(distance(pt(x, y), pt(x, y)), 0.0);
    }

    #[test]
    fn perpendicular_distance_sign_flips_under_reflection(
        px in -100.0_f64..100.0, py in 1.0_f64..100.0,
    ) {
        // Mirror a point across the x axis; its distance to the x axis
        // line keeps magnitude and flips sign.
        let a = pt(-10.0, 0.0);
        let b = pt(10.0, 0.0);
        let d_above = point_to_line_distance(pt(px, py), a, b);
        let d_below = point_to_line_distance(pt(px, -py), a, b);
        prop_assert!((d_above + d_below).abs() < 1e-9);
    }
}
