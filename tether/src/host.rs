// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The embedding boundary: the live element tree the engine drives.
//!
//! Tether never owns the visual tree. An application (or a toolkit adapter)
//! implements [`Host`] over its own elements and forwards raw input back into
//! [`DragEngine::handle_event`](crate::DragEngine::handle_event). The engine only
//! asks for geometry, installs and removes listeners, and inserts the transient
//! overlay used while a session is active.
//!
//! `tether_scene` provides a small in-memory implementation that is handy for
//! tests and experimentation.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Point, Rect, Size, Vec2};

use crate::config::OverlayPlacement;
use crate::input::Channels;

/// Opaque handle for a listener installed through [`Host::add_listener`].
///
/// Hosts mint these; the engine only stores them and hands them back to
/// [`Host::remove_listener`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a host-defined listener token.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw token.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Where a listener is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget<E> {
    /// A single element.
    Element(E),
    /// The document: receives events that continue a gesture anywhere on the page.
    Document,
    /// The top-level window: focus loss and last-resort release events.
    Window,
}

/// The category of a visual element.
///
/// Resolved once when an element is registered; the resulting
/// [`PositionStrategy`] travels with the registration and is never re-checked
/// per event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A layout box positioned by offsets within its container.
    Block,
    /// A vector graphic positioned by a translation transform.
    Graphic,
    /// A text run. Not draggable on its own.
    Text,
    /// Anything the host cannot classify.
    Unknown,
}

impl ElementKind {
    /// How an element of this kind is repositioned, or `None` if it cannot be dragged.
    pub const fn strategy(self) -> Option<PositionStrategy> {
        match self {
            Self::Block => Some(PositionStrategy::Offset),
            Self::Graphic => Some(PositionStrategy::Transform),
            Self::Text | Self::Unknown => None,
        }
    }

    /// Returns `true` for kinds that can be registered.
    pub const fn is_draggable(self) -> bool {
        self.strategy().is_some()
    }
}

/// How a new position is written back to an element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PositionStrategy {
    /// Update the element's offset (left/top) inside its container.
    Offset,
    /// Leave layout alone and translate the element visually.
    Transform,
}

/// Input capabilities of the runtime environment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The environment delivers touch events.
    pub touch_events: bool,
    /// Maximum number of simultaneous touch points reported by the device.
    pub max_touch_points: u32,
}

impl Capabilities {
    /// A plain mouse/stylus environment.
    pub const POINTER: Self = Self {
        touch_events: false,
        max_touch_points: 0,
    };

    /// A touch screen reporting `points` simultaneous contacts.
    pub const fn touch(points: u32) -> Self {
        Self {
            touch_events: true,
            max_touch_points: points,
        }
    }
}

/// The element tree and event plumbing supplied by the embedding application.
///
/// All rectangles are in viewport space unless noted otherwise. Implementations
/// must answer geometry queries from the current layout: the engine re-queries on
/// every event and never caches results between them.
pub trait Host {
    /// Element identity.
    type Element: Copy + Eq + Hash + Debug;

    /// Input capabilities, detected once when an engine is constructed.
    fn capabilities(&self) -> Capabilities;

    /// Classify `element`.
    fn element_kind(&self, element: Self::Element) -> ElementKind;

    /// The positioning container of `element`, if it is attached to one.
    fn container(&self, element: Self::Element) -> Option<Self::Element>;

    /// Border box of `element` in viewport space.
    fn viewport_rect(&self, element: Self::Element) -> Rect;

    /// Current scroll offset of `element`'s content.
    fn scroll_offset(&self, element: Self::Element) -> Vec2;

    /// Full scrollable extent of `element`'s content.
    fn scroll_size(&self, element: Self::Element) -> Size;

    /// Insert a transient overlay covering `rect` (in `container`'s content space).
    fn insert_overlay(
        &mut self,
        container: Self::Element,
        rect: Rect,
        placement: OverlayPlacement,
    ) -> Self::Element;

    /// Remove an element previously returned by [`Host::insert_overlay`].
    fn remove_element(&mut self, element: Self::Element);

    /// Start delivering `channel` events that reach `target`.
    ///
    /// `channel` always holds exactly one flag.
    fn add_listener(&mut self, target: EventTarget<Self::Element>, channel: Channels) -> ListenerId;

    /// Stop delivering events for a listener.
    fn remove_listener(&mut self, id: ListenerId);

    /// Show or clear the drag-enabled marker on `element`.
    fn set_drag_marker(&mut self, element: Self::Element, enabled: bool);

    /// Suppress (or restore) default touch gestures such as page scrolling.
    fn set_gestures_suppressed(&mut self, suppressed: bool);

    /// Move `element` to `position` in its container's content space.
    fn set_position(&mut self, element: Self::Element, position: Point, strategy: PositionStrategy);
}
