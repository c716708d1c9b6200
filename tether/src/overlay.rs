// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transient capture surface used by pointer sessions.
//!
//! While a mouse or stylus session is active, the pointer may leave the dragged
//! element (or even the container) at any time. An [`OverlayRegion`] covering the
//! container's whole scrollable extent receives move and release events for the
//! session instead. It exists for exactly one session: it is created on start and
//! consumed by [`OverlayRegion::destroy`] on end.

use kurbo::{Point, Rect};

use crate::config::OverlayPlacement;
use crate::host::Host;

/// A live overlay element inside a container.
#[derive(Debug)]
pub struct OverlayRegion<E> {
    element: E,
    container: E,
    rect: Rect,
}

impl<E: Copy> OverlayRegion<E> {
    /// Insert an overlay covering the full scrollable extent of `container`.
    pub fn create<H: Host<Element = E>>(
        host: &mut H,
        container: E,
        placement: OverlayPlacement,
    ) -> Self {
        let rect = Rect::from_origin_size(Point::ORIGIN, host.scroll_size(container));
        let element = host.insert_overlay(container, rect, placement);
        Self {
            element,
            container,
            rect,
        }
    }

    /// The overlay element.
    pub fn element(&self) -> E {
        self.element
    }

    /// The container the overlay was inserted into.
    pub fn container(&self) -> E {
        self.container
    }

    /// Area covered, in the container's content space.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Remove the overlay from the host.
    pub fn destroy<H: Host<Element = E>>(self, host: &mut H) {
        host.remove_element(self.element);
    }
}
