use std::f64::consts::TAU;

/// Bounding box in CSS pixels, as reported by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A point expressed as percentages of the reference container's box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn in_unit_square(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

/// Centre of `element` as a percentage offset inside `container`.
///
/// A zero-sized container has no percentage space; the caller skips the
/// update in that case, the same as when the element itself is missing.
pub fn map_to_container_percent(element: Rect, container: Rect) -> Option<PercentPoint> {
    if container.is_degenerate() {
        return None;
    }
    let (cx, cy) = element.center();
    Some(PercentPoint {
        x: (cx - container.left) / container.width * 100.0,
        y: (cy - container.top) / container.height * 100.0,
    })
}

pub fn point_at_angle(center: PercentPoint, angle_rad: f64, length_pct: f64) -> PercentPoint {
    PercentPoint {
        x: center.x + angle_rad.cos() * length_pct,
        y: center.y + angle_rad.sin() * length_pct,
    }
}

/// Angle of spoke `index` out of `count` evenly spaced spokes.
pub fn spoke_angle(index: usize, count: usize) -> f64 {
    TAU * index as f64 / count.max(1) as f64
}
