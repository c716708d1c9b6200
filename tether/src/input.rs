// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input normalization: one movement stream from mouse, stylus and touch.
//!
//! Raw events arrive in modality-specific shapes ([`RawEvent`]). The
//! [`InputNormalizer`] reduces them to a [`PointerEvent`] carrying only a
//! screen-space position and a [`Phase`]. Nothing downstream of the normalizer
//! looks at the raw shape again, except to hand it to the caller's callback.
//!
//! Screen coordinates are used throughout because they do not move when the
//! document scrolls. Container scrolling during a drag is compensated
//! explicitly by the session.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use tether::input::{InputModality, InputNormalizer, Phase, PointerDevice, RawEvent};
//!
//! let mut input = InputNormalizer::new(InputModality::Pointer, true);
//!
//! let down = RawEvent::pointer_down(PointerDevice::Pen, Point::new(10.0, 10.0));
//! assert_eq!(input.normalize(&down).unwrap().phase, Phase::Start);
//!
//! // Focus loss ends the gesture where the pointer was last seen.
//! let end = input.normalize(&RawEvent::Blur).unwrap();
//! assert_eq!(end.phase, Phase::End);
//! assert_eq!(end.screen, Point::new(10.0, 10.0));
//! ```

use kurbo::Point;
use smallvec::SmallVec;

use crate::host::{Capabilities, EventTarget, Host, ListenerId};

bitflags::bitflags! {
    /// Event channels a listener can subscribe to.
    ///
    /// Each [`RawEvent`] belongs to exactly one channel.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Channels: u16 {
        /// Pointer press.
        const POINTER_DOWN   = 1 << 0;
        /// Pointer motion.
        const POINTER_MOVE   = 1 << 1;
        /// Pointer release.
        const POINTER_UP     = 1 << 2;
        /// Pointer stream interrupted by the platform.
        const POINTER_CANCEL = 1 << 3;
        /// A finger touched down.
        const TOUCH_START    = 1 << 4;
        /// A finger moved.
        const TOUCH_MOVE     = 1 << 5;
        /// A finger lifted.
        const TOUCH_END      = 1 << 6;
        /// A touch was interrupted by the platform.
        const TOUCH_CANCEL   = 1 << 7;
        /// The window lost focus.
        const BLUR           = 1 << 8;
    }
}

/// Which part of a session an event belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The session begins.
    Start,
    /// The pointer moved during the session.
    Move,
    /// The session ends (release, cancel or focus loss).
    End,
}

/// The physical device behind a pointer event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerDevice {
    /// A mouse or trackpad.
    Mouse,
    /// A stylus.
    Pen,
    /// A finger reported through the pointer stream.
    Touch,
}

/// Pointer event kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Press.
    Down,
    /// Motion.
    Move,
    /// Release.
    Up,
    /// Platform interruption.
    Cancel,
}

/// Touch event kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchKind {
    /// Contact began.
    Start,
    /// Contact moved.
    Move,
    /// Contact lifted.
    End,
    /// Platform interruption.
    Cancel,
}

/// Identifier of one touch contact, stable for the contact's lifetime.
pub type TouchId = u64;

/// One contact that changed in a touch event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchPoint {
    /// Contact identifier.
    pub id: TouchId,
    /// Position in screen space.
    pub screen: Point,
}

/// A raw input event as delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent {
    /// Mouse or stylus input.
    Pointer {
        /// Event kind.
        kind: PointerKind,
        /// Originating device.
        device: PointerDevice,
        /// Position in screen space.
        screen: Point,
        /// `true` when the primary button is involved.
        primary: bool,
    },
    /// Touch input.
    Touch {
        /// Event kind.
        kind: TouchKind,
        /// Contacts that changed with this event.
        changed: SmallVec<[TouchPoint; 2]>,
    },
    /// The window lost focus.
    Blur,
}

impl RawEvent {
    /// A primary-button press.
    pub fn pointer_down(device: PointerDevice, screen: Point) -> Self {
        Self::pointer(PointerKind::Down, device, screen)
    }

    /// A pointer motion.
    pub fn pointer_move(device: PointerDevice, screen: Point) -> Self {
        Self::pointer(PointerKind::Move, device, screen)
    }

    /// A primary-button release.
    pub fn pointer_up(device: PointerDevice, screen: Point) -> Self {
        Self::pointer(PointerKind::Up, device, screen)
    }

    fn pointer(kind: PointerKind, device: PointerDevice, screen: Point) -> Self {
        Self::Pointer {
            kind,
            device,
            screen,
            primary: true,
        }
    }

    /// A touch event where a single contact changed.
    pub fn touch(kind: TouchKind, id: TouchId, screen: Point) -> Self {
        let mut changed = SmallVec::new();
        changed.push(TouchPoint { id, screen });
        Self::Touch { kind, changed }
    }

    /// The channel this event is delivered on.
    pub fn channel(&self) -> Channels {
        match self {
            Self::Pointer { kind, .. } => match kind {
                PointerKind::Down => Channels::POINTER_DOWN,
                PointerKind::Move => Channels::POINTER_MOVE,
                PointerKind::Up => Channels::POINTER_UP,
                PointerKind::Cancel => Channels::POINTER_CANCEL,
            },
            Self::Touch { kind, .. } => match kind {
                TouchKind::Start => Channels::TOUCH_START,
                TouchKind::Move => Channels::TOUCH_MOVE,
                TouchKind::End => Channels::TOUCH_END,
                TouchKind::Cancel => Channels::TOUCH_CANCEL,
            },
            Self::Blur => Channels::BLUR,
        }
    }
}

/// The normalized event: a screen position and a phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Position in screen space.
    pub screen: Point,
    /// Session phase.
    pub phase: Phase,
}

/// Which family of input events drives sessions.
///
/// Chosen once from [`Capabilities`] and fixed for the engine's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputModality {
    /// Touch events: the gesture itself carries moves and the release.
    Touch,
    /// Mouse/stylus events: an overlay captures moves and the release.
    Pointer,
}

impl InputModality {
    /// Pick the modality for an environment.
    pub const fn detect(capabilities: Capabilities) -> Self {
        if capabilities.touch_events || capabilities.max_touch_points > 0 {
            Self::Touch
        } else {
            Self::Pointer
        }
    }

    /// The channel registered elements listen on to begin a session.
    pub const fn start_channel(self) -> Channels {
        match self {
            Self::Touch => Channels::TOUCH_START,
            Self::Pointer => Channels::POINTER_DOWN,
        }
    }

    /// Channels carrying moves and the release while a session is active.
    pub const fn session_channels(self) -> Channels {
        match self {
            Self::Touch => Channels::TOUCH_MOVE
                .union(Channels::TOUCH_END)
                .union(Channels::TOUCH_CANCEL),
            Self::Pointer => Channels::POINTER_MOVE
                .union(Channels::POINTER_UP)
                .union(Channels::POINTER_CANCEL),
        }
    }

    /// Window-level channels that end a session no matter where the pointer is.
    pub const fn fallback_channels(self) -> Channels {
        match self {
            Self::Touch => Channels::BLUR,
            Self::Pointer => Channels::POINTER_UP.union(Channels::BLUR),
        }
    }
}

/// Translates [`RawEvent`]s of one modality into [`PointerEvent`]s.
///
/// The normalizer remembers the last position it reported so that focus loss
/// can end a session in place, and in touch mode it follows only the contact
/// that started the gesture.
#[derive(Clone, Debug)]
pub struct InputNormalizer {
    modality: InputModality,
    primary_button_only: bool,
    tracked_touch: Option<TouchId>,
    last_screen: Option<Point>,
}

impl InputNormalizer {
    /// Create a normalizer for `modality`.
    ///
    /// With `primary_button_only`, pointer presses of other buttons never start a session.
    pub fn new(modality: InputModality, primary_button_only: bool) -> Self {
        Self {
            modality,
            primary_button_only,
            tracked_touch: None,
            last_screen: None,
        }
    }

    /// The modality this normalizer accepts.
    pub fn modality(&self) -> InputModality {
        self.modality
    }

    /// Returns `true` between a start and the matching end.
    pub fn is_tracking(&self) -> bool {
        self.last_screen.is_some()
    }

    /// Forget the current gesture.
    pub fn reset(&mut self) {
        self.tracked_touch = None;
        self.last_screen = None;
    }

    /// Normalize one raw event, or return `None` if it does not belong to the stream.
    pub fn normalize(&mut self, raw: &RawEvent) -> Option<PointerEvent> {
        let event = match (self.modality, raw) {
            (_, RawEvent::Blur) => PointerEvent {
                screen: self.last_screen?,
                phase: Phase::End,
            },
            (
                InputModality::Pointer,
                RawEvent::Pointer {
                    kind,
                    screen,
                    primary,
                    ..
                },
            ) => {
                let phase = match kind {
                    PointerKind::Down => {
                        if self.primary_button_only && !*primary {
                            return None;
                        }
                        Phase::Start
                    }
                    PointerKind::Move => Phase::Move,
                    PointerKind::Up | PointerKind::Cancel => Phase::End,
                };
                PointerEvent {
                    screen: *screen,
                    phase,
                }
            }
            (InputModality::Touch, RawEvent::Touch { kind, changed }) => {
                if *kind == TouchKind::Start {
                    if self.tracked_touch.is_some() {
                        return None;
                    }
                    let first = changed.first()?;
                    self.tracked_touch = Some(first.id);
                    PointerEvent {
                        screen: first.screen,
                        phase: Phase::Start,
                    }
                } else {
                    let tracked = self.tracked_touch?;
                    let point = changed.iter().find(|t| t.id == tracked)?;
                    let phase = match kind {
                        TouchKind::Move => Phase::Move,
                        _ => Phase::End,
                    };
                    PointerEvent {
                        screen: point.screen,
                        phase,
                    }
                }
            }
            _ => return None,
        };

        if event.phase == Phase::End {
            self.reset();
        } else {
            self.last_screen = Some(event.screen);
        }
        Some(event)
    }
}

#[derive(Copy, Clone, Debug)]
struct Subscription<E> {
    id: ListenerId,
    target: EventTarget<E>,
    channel: Channels,
}

/// Listeners installed by the engine, remembered so they can all be removed.
#[derive(Debug)]
pub(crate) struct Listeners<E> {
    entries: SmallVec<[Subscription<E>; 6]>,
}

impl<E: Copy + PartialEq> Listeners<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Install one listener per flag in `channels`.
    pub(crate) fn attach<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        target: EventTarget<E>,
        channels: Channels,
    ) {
        for channel in channels.iter() {
            let id = host.add_listener(target, channel);
            self.entries.push(Subscription {
                id,
                target,
                channel,
            });
        }
    }

    /// Returns `true` if an event on `channel` reaching `target` was subscribed to.
    pub(crate) fn accepts(&self, target: EventTarget<E>, channel: Channels) -> bool {
        self.entries
            .iter()
            .any(|s| s.target == target && s.channel == channel)
    }

    /// Remove every listener, leaving the set empty.
    pub(crate) fn detach_all<H: Host<Element = E>>(&mut self, host: &mut H) {
        for subscription in self.entries.drain(..) {
            host.remove_listener(subscription.id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use smallvec::smallvec;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn detection_prefers_touch_when_any_touch_capability_is_present() {
        assert_eq!(
            InputModality::detect(Capabilities::POINTER),
            InputModality::Pointer
        );
        assert_eq!(
            InputModality::detect(Capabilities::touch(0)),
            InputModality::Touch
        );
        let points_only = Capabilities {
            touch_events: false,
            max_touch_points: 5,
        };
        assert_eq!(InputModality::detect(points_only), InputModality::Touch);
    }

    #[test]
    fn every_raw_event_has_one_channel() {
        let events = [
            RawEvent::pointer_down(PointerDevice::Mouse, pt(0.0, 0.0)),
            RawEvent::pointer_move(PointerDevice::Mouse, pt(0.0, 0.0)),
            RawEvent::pointer_up(PointerDevice::Mouse, pt(0.0, 0.0)),
            RawEvent::touch(TouchKind::Start, 1, pt(0.0, 0.0)),
            RawEvent::touch(TouchKind::Cancel, 1, pt(0.0, 0.0)),
            RawEvent::Blur,
        ];
        for event in &events {
            assert_eq!(event.channel().bits().count_ones(), 1);
        }
    }

    #[test]
    fn pointer_stream_maps_down_move_up() {
        let mut input = InputNormalizer::new(InputModality::Pointer, true);
        let phases: Vec<_> = [
            RawEvent::pointer_down(PointerDevice::Mouse, pt(1.0, 2.0)),
            RawEvent::pointer_move(PointerDevice::Mouse, pt(3.0, 4.0)),
            RawEvent::pointer_up(PointerDevice::Mouse, pt(5.0, 6.0)),
        ]
        .iter()
        .map(|raw| input.normalize(raw).unwrap().phase)
        .collect();

        assert_eq!(phases, vec![Phase::Start, Phase::Move, Phase::End]);
        assert!(!input.is_tracking());
    }

    #[test]
    fn secondary_button_does_not_start() {
        let mut input = InputNormalizer::new(InputModality::Pointer, true);
        let raw = RawEvent::Pointer {
            kind: PointerKind::Down,
            device: PointerDevice::Mouse,
            screen: pt(0.0, 0.0),
            primary: false,
        };
        assert_eq!(input.normalize(&raw), None);

        let mut lenient = InputNormalizer::new(InputModality::Pointer, false);
        assert_eq!(lenient.normalize(&raw).unwrap().phase, Phase::Start);
    }

    #[test]
    fn pointer_cancel_ends_the_stream() {
        let mut input = InputNormalizer::new(InputModality::Pointer, true);
        input.normalize(&RawEvent::pointer_down(PointerDevice::Pen, pt(0.0, 0.0)));
        let raw = RawEvent::Pointer {
            kind: PointerKind::Cancel,
            device: PointerDevice::Pen,
            screen: pt(4.0, 4.0),
            primary: true,
        };
        assert_eq!(input.normalize(&raw).unwrap().phase, Phase::End);
    }

    #[test]
    fn blur_without_a_gesture_is_ignored() {
        let mut input = InputNormalizer::new(InputModality::Touch, true);
        assert_eq!(input.normalize(&RawEvent::Blur), None);
    }

    #[test]
    fn blur_ends_at_last_reported_position() {
        let mut input = InputNormalizer::new(InputModality::Pointer, true);
        input.normalize(&RawEvent::pointer_down(PointerDevice::Mouse, pt(1.0, 1.0)));
        input.normalize(&RawEvent::pointer_move(PointerDevice::Mouse, pt(9.0, 7.0)));

        let end = input.normalize(&RawEvent::Blur).unwrap();
        assert_eq!(end.phase, Phase::End);
        assert_eq!(end.screen, pt(9.0, 7.0));
        assert!(!input.is_tracking());
    }

    #[test]
    fn modality_mismatch_is_ignored() {
        let mut touch = InputNormalizer::new(InputModality::Touch, true);
        assert_eq!(
            touch.normalize(&RawEvent::pointer_down(PointerDevice::Mouse, pt(0.0, 0.0))),
            None
        );
        let mut pointer = InputNormalizer::new(InputModality::Pointer, true);
        assert_eq!(
            pointer.normalize(&RawEvent::touch(TouchKind::Start, 1, pt(0.0, 0.0))),
            None
        );
    }

    #[test]
    fn touch_follows_only_the_starting_contact() {
        let mut input = InputNormalizer::new(InputModality::Touch, true);
        let start = input
            .normalize(&RawEvent::touch(TouchKind::Start, 7, pt(10.0, 10.0)))
            .unwrap();
        assert_eq!(start.phase, Phase::Start);

        // A second finger neither restarts nor moves the gesture.
        assert_eq!(
            input.normalize(&RawEvent::touch(TouchKind::Start, 8, pt(50.0, 50.0))),
            None
        );
        assert_eq!(
            input.normalize(&RawEvent::touch(TouchKind::Move, 8, pt(60.0, 60.0))),
            None
        );
        assert_eq!(
            input.normalize(&RawEvent::touch(TouchKind::End, 8, pt(60.0, 60.0))),
            None
        );

        // The tracked contact is found among several changed touches.
        let both = RawEvent::Touch {
            kind: TouchKind::Move,
            changed: smallvec![
                TouchPoint {
                    id: 8,
                    screen: pt(70.0, 70.0),
                },
                TouchPoint {
                    id: 7,
                    screen: pt(12.0, 15.0),
                },
            ],
        };
        let moved = input.normalize(&both).unwrap();
        assert_eq!(moved.phase, Phase::Move);
        assert_eq!(moved.screen, pt(12.0, 15.0));

        let end = input
            .normalize(&RawEvent::touch(TouchKind::Cancel, 7, pt(12.0, 15.0)))
            .unwrap();
        assert_eq!(end.phase, Phase::End);
        assert!(!input.is_tracking());
    }

    #[test]
    fn listener_channel_sets_do_not_overlap_the_start_channel() {
        for modality in [InputModality::Touch, InputModality::Pointer] {
            let start = modality.start_channel();
            assert!(!modality.session_channels().intersects(start));
            assert!(!modality.fallback_channels().intersects(start));
            assert!(modality.fallback_channels().contains(Channels::BLUR));
        }
    }
}
