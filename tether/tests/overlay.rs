// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay regions against the reference scene.

use kurbo::{Rect, Size};
use tether::OverlayPlacement;
use tether::host::ElementKind;
use tether::overlay::OverlayRegion;
use tether_scene::Scene;

#[test]
fn overlay_spans_the_scrollable_extent_until_destroyed() {
    let mut scene = Scene::new(Rect::new(0.0, 0.0, 400.0, 300.0));
    let list = scene.insert(
        scene.root(),
        ElementKind::Block,
        Rect::new(0.0, 0.0, 200.0, 100.0),
    );
    let row = scene.insert(list, ElementKind::Block, Rect::new(0.0, 0.0, 200.0, 20.0));
    scene.set_scroll_size(list, Size::new(200.0, 500.0));

    let region = OverlayRegion::create(&mut scene, list, OverlayPlacement::Back);
    assert_eq!(region.container(), list);
    assert_eq!(region.rect(), Rect::new(0.0, 0.0, 200.0, 500.0));
    assert_eq!(scene.children(list), &[region.element(), row]);

    let element = region.element();
    region.destroy(&mut scene);
    assert!(!scene.is_alive(element));
    assert_eq!(scene.children(list), &[row]);
}
