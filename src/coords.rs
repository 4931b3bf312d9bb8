//! Model-space <-> view-space conversion.
//!
//! Model space is page points; view space is pixels at the current zoom.
//! The mapping is a uniform scale with no origin offset. Rotation, opacity
//! and stroke widths are not geometric lengths and never pass through here.

use crate::model::Point;

/// Converts a model-space length or coordinate to view space.
#[inline]
pub fn to_view(model: f64, scale: f64) -> f64 {
    model * scale
}

/// Converts a view-space length or coordinate back to model space.
#[inline]
pub fn to_model(view: f64, scale: f64) -> f64 {
    view / scale
}

/// Whether `scale` can be used for conversions (finite and strictly positive).
pub fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}

pub fn point_to_view(point: Point, scale: f64) -> Point {
    Point {
        x: to_view(point.x, scale),
        y: to_view(point.y, scale),
    }
}

pub fn point_to_model(point: Point, scale: f64) -> Point {
    Point {
        x: to_model(point.x, scale),
        y: to_model(point.y, scale),
    }
}

/// Axis-aligned rectangle, in whichever space the caller is working in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Returns true if rectangle has a positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Hit test, inclusive on all edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn to_view(self, scale: f64) -> Self {
        Self {
            x: to_view(self.x, scale),
            y: to_view(self.y, scale),
            width: to_view(self.width, scale),
            height: to_view(self.height, scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_values_map_exactly() {
        assert_eq!(to_view(80.0, 1.5), 120.0);
        assert_eq!(to_view(120.0, 1.5), 180.0);
        assert_eq!(to_view(80.0, 2.0), 160.0);
        assert_eq!(to_view(120.0, 2.0), 240.0);
    }

    #[test]
    fn round_trip_is_exact_for_power_of_two_scales() {
        for scale in [0.25, 0.5, 1.0, 2.0, 4.0] {
            for value in [0.0, 1.0, 80.0, 120.5, 611.75, -3.0] {
                assert_eq!(to_model(to_view(value, scale), scale), value);
            }
        }
    }

    #[test]
    fn round_trip_is_close_for_fractional_scales() {
        for scale in [0.1, 1.2, 1.5, 3.3] {
            for value in [1.0, 80.0, 612.0, 792.0] {
                let back = to_model(to_view(value, scale), scale);
                assert!((back - value).abs() < 1e-9, "{value} at {scale} -> {back}");
            }
        }
    }

    #[test]
    fn rejects_degenerate_scales() {
        assert!(is_valid_scale(1.2));
        assert!(!is_valid_scale(0.0));
        assert!(!is_valid_scale(-1.0));
        assert!(!is_valid_scale(f64::NAN));
        assert!(!is_valid_scale(f64::INFINITY));
    }

    #[test]
    fn rect_projection_and_hit_test() {
        let model = Rect::new(80.0, 120.0, 100.0, 20.0);
        let view = model.to_view(1.5);
        assert_eq!(view, Rect::new(120.0, 180.0, 150.0, 30.0));

        assert!(view.contains(120.0, 180.0));
        assert!(view.contains(270.0, 210.0));
        assert!(!view.contains(271.0, 210.0));
    }

    #[test]
    fn rect_from_corners_normalizes() {
        let rect = Rect::from_corners(Point { x: 10.0, y: 40.0 }, Point { x: 2.0, y: 5.0 });
        assert_eq!(rect, Rect::new(2.0, 5.0, 8.0, 35.0));
        assert!(rect.is_valid());
        assert!(!Rect::new(0.0, 0.0, 0.0, 5.0).is_valid());
    }
}
