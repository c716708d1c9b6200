// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding boxes relative to the viewport or to a container's content.
//!
//! These are plain functions over a [`Host`]. Nothing is cached: layout can
//! change between two events (scrolling, reflow), so callers query again each
//! time.

use kurbo::{Rect, Vec2};

use crate::host::Host;

/// Border box of `element` in viewport space.
pub fn bounding_box<H: Host + ?Sized>(host: &H, element: H::Element) -> Rect {
    host.viewport_rect(element)
}

/// Border box of `element` in `container`'s content space.
///
/// Content space is anchored at the container's scroll origin, so a child keeps
/// the same relative box while the container scrolls.
pub fn relative_box<H: Host + ?Sized>(
    host: &H,
    element: H::Element,
    container: H::Element,
) -> Rect {
    let rect = host.viewport_rect(element);
    rect + content_offset(host, container)
}

/// Translation from viewport space into `container`'s content space.
pub fn content_offset<H: Host + ?Sized>(host: &H, container: H::Element) -> Vec2 {
    host.scroll_offset(container) - host.viewport_rect(container).origin().to_vec2()
}
