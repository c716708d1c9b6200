// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds clamping for a moving element inside its container.
//!
//! Two rules apply, in this order:
//!
//! 1. Unless overflow is allowed, keep the element inside the container:
//!    `x ≤ container.width - moving.width` and `y ≤ container.height - moving.height`.
//! 2. Never go negative. This floor applies under every overflow policy and
//!    runs last, so an element larger than its container is pinned to `(0, 0)`.
//!
//! Inputs are assumed to be finite.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Size};
//! use tether::clamp::clamp;
//!
//! let container = Size::new(200.0, 100.0);
//! let moving = Size::new(50.0, 50.0);
//!
//! assert_eq!(clamp(Point::new(300.0, 10.0), moving, container, false), Point::new(150.0, 10.0));
//! assert_eq!(clamp(Point::new(300.0, 10.0), moving, container, true), Point::new(300.0, 10.0));
//! assert_eq!(clamp(Point::new(-5.0, -5.0), moving, container, true), Point::ZERO);
//! ```

use kurbo::{Point, Size, Vec2};

/// A clamped position together with the correction that produced it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Clamped {
    /// The position after clamping.
    pub position: Point,
    /// `position - proposed`; zero when nothing was corrected.
    pub correction: Vec2,
}

impl Clamped {
    /// Clamp `proposed` and record the applied correction.
    pub fn compute(proposed: Point, moving: Size, container: Size, allow_overflow: bool) -> Self {
        let position = clamp(proposed, moving, container, allow_overflow);
        Self {
            position,
            correction: position - proposed,
        }
    }

    /// Returns `true` if either axis was corrected.
    pub fn is_corrected(&self) -> bool {
        self.correction != Vec2::ZERO
    }
}

/// Clamp a proposed top-left position for an element of size `moving` inside
/// a container of size `container`.
pub fn clamp(proposed: Point, moving: Size, container: Size, allow_overflow: bool) -> Point {
    let mut x = proposed.x;
    let mut y = proposed.y;
    if !allow_overflow {
        x = x.min(container.width - moving.width);
        y = y.min(container.height - moving.height);
    }
    Point::new(x.max(0.0), y.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Size = Size::new(200.0, 100.0);
    const MOVING: Size = Size::new(50.0, 50.0);

    #[test]
    fn inside_position_is_untouched() {
        let p = Point::new(20.0, 30.0);
        let c = Clamped::compute(p, MOVING, CONTAINER, false);
        assert_eq!(c.position, p);
        assert!(!c.is_corrected());
    }

    #[test]
    fn overflow_is_pulled_back_to_the_far_edge() {
        let c = Clamped::compute(Point::new(300.0, 80.0), MOVING, CONTAINER, false);
        assert_eq!(c.position, Point::new(150.0, 50.0));
        assert_eq!(c.correction, Vec2::new(-150.0, -30.0));
    }

    #[test]
    fn overflow_allowed_only_floors_at_zero() {
        assert_eq!(
            clamp(Point::new(900.0, -3.0), MOVING, CONTAINER, true),
            Point::new(900.0, 0.0)
        );
    }

    #[test]
    fn underflow_is_floored_without_overflow_either() {
        assert_eq!(
            clamp(Point::new(-10.0, -0.5), MOVING, CONTAINER, false),
            Point::ZERO
        );
    }

    #[test]
    fn oversized_element_is_pinned_to_origin() {
        let huge = Size::new(500.0, 400.0);
        assert_eq!(
            clamp(Point::new(40.0, 40.0), huge, CONTAINER, false),
            Point::ZERO
        );
        assert_eq!(clamp(Point::ZERO, huge, CONTAINER, false), Point::ZERO);
    }

    #[test]
    fn exact_fit_has_a_single_valid_position() {
        assert_eq!(
            clamp(Point::new(12.0, 7.0), CONTAINER, CONTAINER, false),
            Point::ZERO
        );
    }
}
