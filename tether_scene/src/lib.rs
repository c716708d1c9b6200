// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=tether_scene --heading-base-level=0

//! Tether Scene: a reference element tree for the [`tether`] host seam.
//!
//! [`Scene`] is a small retained tree of rectangles with scroll offsets,
//! stacking order and listener bookkeeping. It implements [`tether::Host`], so a
//! [`tether::DragEngine`] can run against it without a real UI toolkit.
//!
//! It is intentionally *not* a layout engine or a renderer:
//! - Rectangles are placed by the caller, in their parent's content space.
//! - Events are not hit-tested; tests choose the [`EventTarget`] a raw event
//!   reaches, usually through [`Scene::dispatch`], which only delivers to
//!   targets that have a matching listener.
//! - It records what the engine did (listeners, overlays, markers, gesture
//!   suppression, positions) so tests can assert on it.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Rect};
//! use tether::host::ElementKind;
//! use tether::input::{PointerDevice, RawEvent};
//! use tether::{DragEngine, DragOptions, EventTarget, Handled};
//! use tether_scene::Scene;
//!
//! let mut scene = Scene::new(Rect::new(0.0, 0.0, 200.0, 100.0));
//! let card = scene.insert(scene.root(), ElementKind::Block, Rect::new(0.0, 0.0, 50.0, 50.0));
//!
//! let mut engine: DragEngine<_> = DragEngine::new(&scene);
//! engine
//!     .enable(&mut scene, card, DragOptions::new().on_drag(|_| Ok(())))
//!     .unwrap();
//!
//! let down = RawEvent::pointer_down(PointerDevice::Mouse, Point::new(10.0, 10.0));
//! assert_eq!(scene.dispatch(&mut engine, EventTarget::Element(card), &down), Handled::Started);
//!
//! let overlay = scene.overlays()[0];
//! let up = RawEvent::pointer_up(PointerDevice::Mouse, Point::new(40.0, 20.0));
//! assert_eq!(scene.dispatch(&mut engine, EventTarget::Element(overlay), &up), Handled::Ended);
//!
//! assert_eq!(scene.offset(card), Point::new(30.0, 10.0));
//! assert!(scene.overlays().is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size, Vec2};
use tether::host::{Capabilities, ElementKind, EventTarget, Host, ListenerId, PositionStrategy};
use tether::input::{Channels, RawEvent};
use tether::{DragEngine, Handled, OverlayPlacement};

/// Identifier for a node in a [`Scene`].
///
/// Slots are never reused, so a removed node's id stays dead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Markers carried by a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The node is registered for dragging.
        const DRAG_ENABLED = 0b0000_0001;
        /// The node is a drag session overlay.
        const OVERLAY      = 0b0000_0010;
    }
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    kind: ElementKind,
    /// Layout box in the parent's content space.
    rect: Rect,
    /// Visual translation applied on top of the layout box.
    translation: Vec2,
    scroll: Vec2,
    scroll_size: Option<Size>,
    flags: NodeFlags,
    children: Vec<NodeId>,
}

/// A listener installed through [`Host::add_listener`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ListenerRecord {
    /// Where the listener is attached.
    pub target: EventTarget<NodeId>,
    /// The single channel it receives.
    pub channel: Channels,
}

/// An in-memory element tree implementing [`Host`].
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    capabilities: Capabilities,
    listeners: HashMap<ListenerId, ListenerRecord>,
    next_listener: u64,
    gestures_suppressed: bool,
    positions_written: usize,
}

impl Scene {
    /// Create a scene whose root covers `viewport` in a mouse/stylus environment.
    pub fn new(viewport: Rect) -> Self {
        Self::with_capabilities(viewport, Capabilities::POINTER)
    }

    /// Create a scene reporting the given input capabilities.
    pub fn with_capabilities(viewport: Rect, capabilities: Capabilities) -> Self {
        let root = Node {
            parent: None,
            kind: ElementKind::Block,
            rect: viewport,
            translation: Vec2::ZERO,
            scroll: Vec2::ZERO,
            scroll_size: None,
            flags: NodeFlags::empty(),
            children: Vec::new(),
        };
        Self {
            nodes: alloc::vec![Some(root)],
            capabilities,
            listeners: HashMap::new(),
            next_listener: 0,
            gestures_suppressed: false,
            positions_written: 0,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child of `parent` with layout box `rect` in the parent's content space.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not alive.
    pub fn insert(&mut self, parent: NodeId, kind: ElementKind, rect: Rect) -> NodeId {
        let id = self.push(parent, kind, rect, NodeFlags::empty());
        self.node_mut(parent).children.push(id);
        id
    }

    fn push(&mut self, parent: NodeId, kind: ElementKind, rect: Rect, flags: NodeFlags) -> NodeId {
        #[expect(clippy::cast_possible_truncation, reason = "scenes stay far below u32::MAX nodes")]
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node {
            parent: Some(parent),
            kind,
            rect,
            translation: Vec2::ZERO,
            scroll: Vec2::ZERO,
            scroll_size: None,
            flags,
            children: Vec::new(),
        }));
        id
    }

    /// Returns `true` if `id` refers to a node that has not been removed.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(id.idx()).is_some_and(Option::is_some)
    }

    /// Children of `id` in stacking order, back to front.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Layout offset of `id` in its parent's content space.
    pub fn offset(&self, id: NodeId) -> Point {
        self.node(id).rect.origin()
    }

    /// Visual translation of `id`.
    pub fn translation(&self, id: NodeId) -> Vec2 {
        self.node(id).translation
    }

    /// Replace the layout box of `id`.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        self.node_mut(id).rect = rect;
    }

    /// Scroll the content of `id`.
    pub fn set_scroll(&mut self, id: NodeId, scroll: Vec2) {
        self.node_mut(id).scroll = scroll;
    }

    /// Set the full scrollable extent of `id`. Defaults to its box size.
    pub fn set_scroll_size(&mut self, id: NodeId, size: Size) {
        self.node_mut(id).scroll_size = Some(size);
    }

    /// Markers currently set on `id`.
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.node(id).flags
    }

    /// Returns `true` if `id` carries the drag-enabled marker.
    pub fn is_drag_enabled(&self, id: NodeId) -> bool {
        self.flags(id).contains(NodeFlags::DRAG_ENABLED)
    }

    /// Live overlay nodes, in creation order.
    pub fn overlays(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| {
                let node = node.as_ref()?;
                node.flags
                    .contains(NodeFlags::OVERLAY)
                    .then(|| NodeId(u32::try_from(idx).unwrap_or(u32::MAX)))
            })
            .collect()
    }

    /// Total number of installed listeners.
    pub fn listener_len(&self) -> usize {
        self.listeners.len()
    }

    /// Installed listeners attached to `target`.
    pub fn listeners_on(&self, target: EventTarget<NodeId>) -> usize {
        self.listeners.values().filter(|l| l.target == target).count()
    }

    /// Returns `true` if a listener for `channel` is attached to `target`.
    pub fn has_listener(&self, target: EventTarget<NodeId>, channel: Channels) -> bool {
        self.listeners
            .values()
            .any(|l| l.target == target && l.channel == channel)
    }

    /// Returns `true` while default touch gestures are suppressed.
    pub fn gestures_suppressed(&self) -> bool {
        self.gestures_suppressed
    }

    /// Number of [`Host::set_position`] calls received.
    pub fn positions_written(&self) -> usize {
        self.positions_written
    }

    /// Deliver `raw` to `engine` if a listener for it is attached to `target`.
    pub fn dispatch<U: Default>(
        &mut self,
        engine: &mut DragEngine<NodeId, U>,
        target: EventTarget<NodeId>,
        raw: &RawEvent,
    ) -> Handled {
        if !self.has_listener(target, raw.channel()) {
            return Handled::Ignored;
        }
        engine.handle_event(self, target, raw)
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.idx())
            .and_then(Option::as_ref)
            .expect("scene node is alive")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes
            .get_mut(id.idx())
            .and_then(Option::as_mut)
            .expect("scene node is alive")
    }
}

impl Host for Scene {
    type Element = NodeId;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn element_kind(&self, element: NodeId) -> ElementKind {
        self.nodes
            .get(element.idx())
            .and_then(Option::as_ref)
            .map_or(ElementKind::Unknown, |node| node.kind)
    }

    fn container(&self, element: NodeId) -> Option<NodeId> {
        self.nodes.get(element.idx())?.as_ref()?.parent
    }

    fn viewport_rect(&self, element: NodeId) -> Rect {
        let node = self.node(element);
        let local = node.rect + node.translation;
        match node.parent {
            Some(parent) => {
                let parent_rect = self.viewport_rect(parent);
                let shift = parent_rect.origin().to_vec2() - self.node(parent).scroll;
                local + shift
            }
            None => local,
        }
    }

    fn scroll_offset(&self, element: NodeId) -> Vec2 {
        self.node(element).scroll
    }

    fn scroll_size(&self, element: NodeId) -> Size {
        let node = self.node(element);
        node.scroll_size.unwrap_or_else(|| node.rect.size())
    }

    fn insert_overlay(
        &mut self,
        container: NodeId,
        rect: Rect,
        placement: OverlayPlacement,
    ) -> NodeId {
        let id = self.push(container, ElementKind::Block, rect, NodeFlags::OVERLAY);
        let children = &mut self.node_mut(container).children;
        match placement {
            OverlayPlacement::Back => children.insert(0, id),
            OverlayPlacement::Front => children.push(id),
        }
        id
    }

    fn remove_element(&mut self, element: NodeId) {
        let Some(node) = self.nodes.get_mut(element.idx()).and_then(Option::take) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p.idx())?.as_mut()) {
            parent.children.retain(|&c| c != element);
        }
        for child in node.children {
            self.remove_element(child);
        }
    }

    fn add_listener(&mut self, target: EventTarget<NodeId>, channel: Channels) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId::new(self.next_listener);
        self.listeners.insert(id, ListenerRecord { target, channel });
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn set_drag_marker(&mut self, element: NodeId, enabled: bool) {
        self.node_mut(element).flags.set(NodeFlags::DRAG_ENABLED, enabled);
    }

    fn set_gestures_suppressed(&mut self, suppressed: bool) {
        self.gestures_suppressed = suppressed;
    }

    fn set_position(&mut self, element: NodeId, position: Point, strategy: PositionStrategy) {
        self.positions_written += 1;
        let node = self.node_mut(element);
        match strategy {
            PositionStrategy::Offset => {
                node.rect = Rect::from_origin_size(position, node.rect.size());
            }
            PositionStrategy::Transform => {
                node.translation = position - node.rect.origin();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new(Rect::new(10.0, 20.0, 410.0, 320.0));
        let root = scene.root();
        let panel = scene.insert(root, ElementKind::Block, Rect::new(5.0, 5.0, 105.0, 105.0));
        let chip = scene.insert(panel, ElementKind::Graphic, Rect::new(1.0, 2.0, 11.0, 12.0));
        (scene, panel, chip)
    }

    #[test]
    fn viewport_rect_accumulates_offsets_and_scroll() {
        let (mut scene, panel, chip) = scene();
        assert_eq!(scene.viewport_rect(chip), Rect::new(16.0, 27.0, 26.0, 37.0));

        scene.set_scroll(panel, Vec2::new(0.0, 4.0));
        assert_eq!(scene.viewport_rect(chip), Rect::new(16.0, 23.0, 26.0, 33.0));
        let relative = tether::geometry::relative_box(&scene, chip, panel);
        assert_eq!(relative.origin(), Point::new(1.0, 2.0));
    }

    #[test]
    fn overlay_placement_controls_stacking_order() {
        let (mut scene, panel, chip) = scene();
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let back = scene.insert_overlay(panel, area, OverlayPlacement::Back);
        let front = scene.insert_overlay(panel, area, OverlayPlacement::Front);
        assert_eq!(scene.children(panel), &[back, chip, front]);
        assert_eq!(scene.overlays(), alloc::vec![back, front]);

        scene.remove_element(back);
        assert!(!scene.is_alive(back));
        assert_eq!(scene.children(panel), &[chip, front]);
    }

    #[test]
    fn listeners_are_counted_per_target() {
        let (mut scene, panel, _) = scene();
        let a = scene.add_listener(EventTarget::Element(panel), Channels::POINTER_DOWN);
        scene.add_listener(EventTarget::Window, Channels::BLUR);
        assert_eq!(scene.listener_len(), 2);
        assert_eq!(scene.listeners_on(EventTarget::Element(panel)), 1);

        scene.remove_listener(a);
        scene.remove_listener(a);
        assert_eq!(scene.listener_len(), 1);
    }

    #[test]
    fn positions_follow_the_strategy() {
        let (mut scene, panel, chip) = scene();
        scene.set_position(panel, Point::new(30.0, 40.0), PositionStrategy::Offset);
        assert_eq!(scene.offset(panel), Point::new(30.0, 40.0));

        scene.set_position(chip, Point::new(6.0, 2.0), PositionStrategy::Transform);
        assert_eq!(scene.offset(chip), Point::new(1.0, 2.0));
        assert_eq!(scene.translation(chip), Vec2::new(5.0, 0.0));
        assert_eq!(scene.positions_written(), 2);
    }

    #[test]
    fn removed_nodes_are_unknown() {
        let (mut scene, panel, chip) = scene();
        scene.remove_element(panel);
        assert!(!scene.is_alive(chip));
        assert_eq!(scene.element_kind(chip), ElementKind::Unknown);
        assert_eq!(scene.container(chip), None);
    }
}
