// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=tether --heading-base-level=0

//! Tether: make an element follow the pointer inside its container.
//!
//! Tether is the reusable core of drag-to-reposition widgets (panels, slider
//! thumbs, draggable cards). It turns raw mouse, stylus or touch input into a
//! stream of clamped positions delivered to a callback, and guarantees that
//! everything acquired for a drag is released again, however the drag ends.
//!
//! It is not a drag-and-drop framework: there are no drop targets, no data
//! transfer and no list reordering. Styling, layout and persistence belong to
//! the embedding application.
//!
//! ## Pieces
//!
//! - [`geometry`]: bounding boxes relative to the viewport or a container.
//! - [`clamp`]: keep a moving box inside its container under an overflow policy.
//! - [`input`]: normalize pointer and touch events into `{screen, phase}`.
//! - [`overlay`]: the transient capture surface used by pointer sessions.
//! - [`session`]: callback arguments and the per-drag context.
//! - [`registry`]: [`DragEngine`], with `enable`/`disable` and event handling.
//! - [`host`]: the [`Host`] trait implemented by the embedding application.
//!
//! ## Session lifecycle
//!
//! A session is `Idle → Active → Idle`:
//!
//! 1. A start event (press or touch) reaches a registered element. The optional
//!    confirmation hook picks the element that actually moves.
//! 2. The engine snapshots the target's origin, the pointer position and the
//!    container's scroll offset, installs its session listeners (plus an overlay
//!    for pointer input) and invokes the callback with `Phase::Start`.
//! 3. Each move invokes the callback with `Phase::Move` and a clamped position.
//! 4. Release, cancel or window focus loss invoke `Phase::End`, then remove every
//!    session listener and the overlay.
//!
//! Only one session is active at a time. Callback errors are logged with
//! `tracing` and never interrupt the session or its teardown.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect, Vec2};
//! use tether::host::ElementKind;
//! use tether::input::{PointerDevice, RawEvent};
//! use tether::{DragEngine, DragOptions, EventTarget, Phase};
//! use tether_scene::Scene;
//!
//! // A 200×100 container holding a 50×50 card at the origin.
//! let mut scene = Scene::new(Rect::new(0.0, 0.0, 200.0, 100.0));
//! let card = scene.insert(scene.root(), ElementKind::Block, Rect::new(0.0, 0.0, 50.0, 50.0));
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = Rc::clone(&seen);
//! let mut engine: DragEngine<_> = DragEngine::new(&scene);
//! engine
//!     .enable(
//!         &mut scene,
//!         card,
//!         DragOptions::new().on_drag(move |args| {
//!             log.borrow_mut().push((args.phase, args.position, args.delta));
//!             Ok(())
//!         }),
//!     )
//!     .unwrap();
//!
//! let mouse = PointerDevice::Mouse;
//! let down = RawEvent::pointer_down(mouse, Point::new(10.0, 10.0));
//! scene.dispatch(&mut engine, EventTarget::Element(card), &down);
//! let overlay = scene.overlays()[0];
//! let up = RawEvent::pointer_up(mouse, Point::new(310.0, 20.0));
//! scene.dispatch(&mut engine, EventTarget::Element(overlay), &up);
//!
//! // Clamped on x, free on y.
//! assert_eq!(
//!     seen.borrow().last(),
//!     Some(&(Phase::End, Point::new(150.0, 10.0), Vec2::new(150.0, 10.0)))
//! );
//! assert!(scene.overlays().is_empty());
//! ```
//!
//! ## Features
//!
//! - `std` (default): build dependencies with their `std` support.
//! - `libm`: use `libm` for Kurbo's float math in `no_std` builds.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod clamp;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod input;
pub mod overlay;
pub mod registry;
pub mod session;

pub use config::{DragConfig, OverlayPlacement};
pub use error::{BoxError, CallbackResult, DragError};
pub use host::{EventTarget, Host};
pub use input::Phase;
pub use registry::{DragEngine, DragOptions};
pub use session::{DragArgs, Handled};
