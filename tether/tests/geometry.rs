// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding boxes against the reference scene.

use kurbo::{Rect, Vec2};
use tether::geometry::{bounding_box, content_offset, relative_box};
use tether::host::ElementKind;
use tether_scene::Scene;

#[test]
fn relative_boxes_ignore_container_scroll() {
    let mut scene = Scene::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    let list = scene.insert(
        scene.root(),
        ElementKind::Block,
        Rect::new(40.0, 30.0, 240.0, 230.0),
    );
    let row = scene.insert(
        list,
        ElementKind::Block,
        Rect::new(0.0, 120.0, 200.0, 150.0),
    );

    assert_eq!(
        bounding_box(&scene, row),
        Rect::new(40.0, 150.0, 240.0, 180.0)
    );
    assert_eq!(
        relative_box(&scene, row, list),
        Rect::new(0.0, 120.0, 200.0, 150.0)
    );

    scene.set_scroll(list, Vec2::new(0.0, 100.0));
    assert_eq!(
        bounding_box(&scene, row),
        Rect::new(40.0, 50.0, 240.0, 80.0)
    );
    assert_eq!(
        relative_box(&scene, row, list),
        Rect::new(0.0, 120.0, 200.0, 150.0)
    );
    assert_eq!(content_offset(&scene, list), Vec2::new(-40.0, 70.0));
}

#[test]
fn boxes_are_recomputed_on_every_query() {
    let mut scene = Scene::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    let card = scene.insert(
        scene.root(),
        ElementKind::Graphic,
        Rect::new(10.0, 10.0, 20.0, 20.0),
    );
    let before = relative_box(&scene, card, scene.root());

    scene.set_rect(card, Rect::new(15.0, 10.0, 25.0, 20.0));
    assert_eq!(
        relative_box(&scene, card, scene.root()),
        before + Vec2::new(5.0, 0.0)
    );
}
