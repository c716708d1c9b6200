// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session context: everything one drag needs between start and end.
//!
//! A session snapshots the target's origin, the pointer's starting screen
//! position and the container's scroll offset. Every later pointer position is
//! turned into a container-space position with
//!
//! ```text
//! proposed = origin + (pointer - start_pointer) + (scroll - scroll_origin)
//! ```
//!
//! and then clamped. Reported positions are snapped down to a 1/256 grid, on
//! which sums and differences are exact in `f64`, so adding a reported delta to
//! the previously reported position gives the new one exactly.
//!
//! The engine in [`crate::registry`] owns the single active session and drives
//! the `start → move* → end` transitions.

use kurbo::{Point, Vec2};

use crate::clamp::Clamped;
use crate::host::{Host, PositionStrategy};
use crate::input::{Listeners, Phase, RawEvent};
use crate::overlay::OverlayRegion;

/// Arguments passed to a drag callback.
#[derive(Debug)]
pub struct DragArgs<'a, E, U> {
    /// Position of the target in its container's content space.
    pub position: Point,
    /// Movement applied since the previous callback of this session.
    pub delta: Vec2,
    /// Phase being delivered.
    pub phase: Phase,
    /// The element being repositioned.
    pub target: E,
    /// The registered element that received the initiating press.
    pub source: E,
    /// The event that caused this callback, or `None` for a programmatic cancel.
    pub raw: Option<&'a RawEvent>,
    /// Session-scoped user data, created fresh for each session.
    pub userdata: &'a mut U,
}

/// What [`DragEngine::handle_event`](crate::DragEngine::handle_event) did with an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Handled {
    /// The event was not part of any session.
    Ignored,
    /// A session started.
    Started,
    /// The active session moved.
    Moved,
    /// The active session ended and was torn down.
    Ended,
}

impl Handled {
    /// Returns `true` unless the event was ignored.
    pub fn is_consumed(self) -> bool {
        self != Self::Ignored
    }
}

/// State of the active session.
#[derive(Debug)]
pub(crate) struct SessionContext<E, U> {
    pub(crate) source: E,
    pub(crate) target: E,
    pub(crate) container: E,
    pub(crate) strategy: PositionStrategy,
    pub(crate) origin: Point,
    pub(crate) start_pointer: Point,
    pub(crate) scroll_origin: Vec2,
    pub(crate) last: Point,
    pub(crate) allow_overflow: bool,
    pub(crate) auto_position: bool,
    pub(crate) gestures_suppressed: bool,
    pub(crate) overlay: Option<OverlayRegion<E>>,
    pub(crate) listeners: Listeners<E>,
    pub(crate) userdata: U,
}

impl<E: Copy + PartialEq, U> SessionContext<E, U> {
    /// Position and delta for a pointer at `screen`.
    ///
    /// Geometry is re-queried on every call.
    pub(crate) fn advance<H: Host<Element = E>>(
        &mut self,
        host: &H,
        screen: Point,
    ) -> (Point, Vec2) {
        let scrolled = host.scroll_offset(self.container) - self.scroll_origin;
        let proposed = self.origin + (screen - self.start_pointer) + scrolled;
        let moving = host.viewport_rect(self.target).size();
        let bounds = host.viewport_rect(self.container).size();
        let clamped = Clamped::compute(proposed, moving, bounds, self.allow_overflow);
        if clamped.is_corrected() {
            tracing::trace!(?proposed, correction = ?clamped.correction, "drag position clamped");
        }
        // Flooring stays inside `[0, max]` when the clamped position does.
        let position = snap(clamped.position);
        let delta = position - self.last;
        self.last = position;
        (position, delta)
    }

    /// Write the position to the target when auto-positioning is on.
    pub(crate) fn apply<H: Host<Element = E>>(&self, host: &mut H, position: Point) {
        if self.auto_position {
            host.set_position(self.target, position, self.strategy);
        }
    }

    /// Build callback arguments borrowing this session's user data.
    pub(crate) fn args<'a>(
        &'a mut self,
        phase: Phase,
        position: Point,
        delta: Vec2,
        raw: Option<&'a RawEvent>,
    ) -> DragArgs<'a, E, U> {
        DragArgs {
            position,
            delta,
            phase,
            target: self.target,
            source: self.source,
            raw,
            userdata: &mut self.userdata,
        }
    }

    /// Release everything the session acquired. Calling it again does nothing.
    ///
    /// Listeners go first so nothing can reach a half-removed overlay.
    pub(crate) fn release<H: Host<Element = E>>(&mut self, host: &mut H) {
        self.listeners.detach_all(host);
        if let Some(overlay) = self.overlay.take() {
            overlay.destroy(host);
        }
        if self.gestures_suppressed {
            host.set_gestures_suppressed(false);
            self.gestures_suppressed = false;
        }
    }
}

/// An ending session that is released when dropped.
///
/// The `End` callback runs while this is alive, so the session's listeners,
/// overlay and gesture suppression are released even if the callback panics.
pub(crate) struct Teardown<'h, H: Host, U> {
    pub(crate) host: &'h mut H,
    pub(crate) session: SessionContext<H::Element, U>,
}

impl<H: Host, U> Drop for Teardown<'_, H, U> {
    fn drop(&mut self) {
        self.session.release(&mut *self.host);
    }
}

/// Subdivisions per unit of the position grid.
const GRID: f64 = 256.0;

/// Snap `point` down to the position grid.
pub(crate) fn snap(point: Point) -> Point {
    let scaled = Point::new(point.x * GRID, point.y * GRID).floor();
    Point::new(scaled.x / GRID, scaled.y / GRID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ignored_events_are_unconsumed() {
        assert!(!Handled::Ignored.is_consumed());
        assert!(Handled::Started.is_consumed());
        assert!(Handled::Moved.is_consumed());
        assert!(Handled::Ended.is_consumed());
    }

    #[test]
    fn snapping_rounds_down_to_the_grid() {
        assert_eq!(snap(Point::new(150.0, 0.0)), Point::new(150.0, 0.0));
        assert_eq!(snap(Point::new(0.5, 2.25)), Point::new(0.5, 2.25));
        assert_eq!(snap(Point::new(21.9, 0.001)), Point::new(21.8984375, 0.0));
        assert_eq!(
            snap(Point::new(-0.001, -3.0)),
            Point::new(-0.00390625, -3.0)
        );
    }

    #[test]
    fn snapped_deltas_replay_exactly() {
        let points = [(21.9, 21.9), (108.3, 30.3), (0.1, 99.7), (149.99, 0.3)];
        let mut last = snap(Point::ZERO);
        for (x, y) in points {
            let next = snap(Point::new(x, y));
            let delta = next - last;
            assert_eq!(last + delta, next, "replaying the delta to ({x}, {y})");
            last = next;
        }
    }
}
