// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration of draggable elements and the session engine that serves them.
//!
//! [`DragEngine`] keeps a side table from element to [`DragOptions`] and a single
//! slot for the active session. Hosts forward raw events with
//! [`DragEngine::handle_event`]; the engine decides whether the event starts,
//! moves or ends a session and invokes the registered callback.
//!
//! ## Lifecycle guarantees
//!
//! - At most one session is active per engine. A start arriving while the slot
//!   is occupied is ignored.
//! - Every `Start` callback is followed by exactly one `End` callback, whether
//!   the session ends by release, cancel, focus loss, [`DragEngine::cancel`] or
//!   by disabling the element that owns it.
//! - On end, listeners and the overlay are removed even if the callback fails.
//!   Callback errors are logged and never surface from the event path.

use alloc::boxed::Box;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Vec2};

use crate::config::DragConfig;
use crate::error::{CallbackResult, DragError};
use crate::geometry;
use crate::host::{EventTarget, Host, ListenerId, PositionStrategy};
use crate::input::{InputModality, InputNormalizer, Listeners, Phase, RawEvent};
use crate::overlay::OverlayRegion;
use crate::session::{self, DragArgs, Handled, SessionContext, Teardown};

/// Drag callback invoked on every phase.
pub type OnDrag<E, U> = Box<dyn FnMut(DragArgs<'_, E, U>) -> CallbackResult>;

/// Hook choosing the element that actually moves when a drag starts on `E`.
pub type ConfirmTarget<E, U> = Box<dyn FnMut(&mut U, E) -> E>;

/// Per-element drag settings.
///
/// ```
/// use tether::DragOptions;
///
/// let options: DragOptions<u32> = DragOptions::new()
///     .allow_overflow(true)
///     .on_drag(|args| {
///         let _ = (args.position, args.delta);
///         Ok(())
///     });
/// assert!(options.has_handler());
/// ```
pub struct DragOptions<E, U = ()> {
    allow_overflow: bool,
    auto_position: bool,
    on_drag: Option<OnDrag<E, U>>,
    confirm_target: Option<ConfirmTarget<E, U>>,
}

impl<E, U> Default for DragOptions<E, U> {
    fn default() -> Self {
        Self {
            allow_overflow: false,
            auto_position: true,
            on_drag: None,
            confirm_target: None,
        }
    }
}

impl<E, U> fmt::Debug for DragOptions<E, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragOptions")
            .field("allow_overflow", &self.allow_overflow)
            .field("auto_position", &self.auto_position)
            .field("on_drag", &self.on_drag.is_some())
            .field("confirm_target", &self.confirm_target.is_some())
            .finish()
    }
}

impl<E, U> DragOptions<E, U> {
    /// Options with overflow disallowed, auto-positioning on and no handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the element move past the container's far edges. Negative positions
    /// are still clamped to zero.
    pub fn allow_overflow(mut self, allow: bool) -> Self {
        self.allow_overflow = allow;
        self
    }

    /// Whether the engine writes each clamped position to the target through
    /// [`Host::set_position`] before invoking the callback.
    pub fn auto_position(mut self, enabled: bool) -> Self {
        self.auto_position = enabled;
        self
    }

    /// Set the drag callback.
    pub fn on_drag(
        mut self,
        f: impl FnMut(DragArgs<'_, E, U>) -> CallbackResult + 'static,
    ) -> Self {
        self.on_drag = Some(Box::new(f));
        self
    }

    /// Set the target confirmation hook.
    ///
    /// Runs once per session with fresh user data and the element that received
    /// the press, and returns the element to move. Use it to drag a panel by its
    /// title bar.
    pub fn confirm_target(mut self, f: impl FnMut(&mut U, E) -> E + 'static) -> Self {
        self.confirm_target = Some(Box::new(f));
        self
    }

    /// Returns `true` if a drag callback is set.
    pub fn has_handler(&self) -> bool {
        self.on_drag.is_some()
    }
}

struct Registration<E, U> {
    listener: ListenerId,
    strategy: PositionStrategy,
    allow_overflow: bool,
    auto_position: bool,
    on_drag: OnDrag<E, U>,
    confirm_target: Option<ConfirmTarget<E, U>>,
}

impl<E, U> fmt::Debug for Registration<E, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("listener", &self.listener)
            .field("strategy", &self.strategy)
            .field("allow_overflow", &self.allow_overflow)
            .field("auto_position", &self.auto_position)
            .finish_non_exhaustive()
    }
}

impl<E, U> Registration<E, U> {
    fn invoke(&mut self, args: DragArgs<'_, E, U>) {
        let phase = args.phase;
        if let Err(error) = (self.on_drag)(args) {
            let failure = DragError::CallbackFailure { phase, error };
            tracing::warn!(%failure, "drag callback failed");
        }
    }
}

/// Drives drag sessions for every registered element of one host.
///
/// `E` is the host's element type and `U` the session user data handed to the
/// confirmation hook and callbacks.
pub struct DragEngine<E, U = ()> {
    modality: InputModality,
    config: DragConfig,
    normalizer: InputNormalizer,
    registrations: HashMap<E, Registration<E, U>>,
    active: Option<SessionContext<E, U>>,
}

impl<E: fmt::Debug, U: fmt::Debug> fmt::Debug for DragEngine<E, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEngine")
            .field("modality", &self.modality)
            .field("config", &self.config)
            .field("registrations", &self.registrations)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl<E, U> DragEngine<E, U>
where
    E: Copy + Eq + Hash + fmt::Debug,
    U: Default,
{
    /// Create an engine with the default configuration.
    ///
    /// The host's capabilities are detected here, once; the resulting
    /// [`InputModality`] is fixed for the engine's lifetime.
    pub fn new<H: Host<Element = E>>(host: &H) -> Self {
        Self::with_config(host, DragConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config<H: Host<Element = E>>(host: &H, config: DragConfig) -> Self {
        let modality = InputModality::detect(host.capabilities());
        tracing::debug!(?modality, "drag engine created");
        Self {
            modality,
            config,
            normalizer: InputNormalizer::new(modality, config.primary_button_only),
            registrations: HashMap::new(),
            active: None,
        }
    }

    /// The input modality chosen at construction.
    pub fn modality(&self) -> InputModality {
        self.modality
    }

    /// The engine configuration.
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Returns `true` if `element` is registered.
    pub fn is_enabled(&self, element: E) -> bool {
        self.registrations.contains_key(&element)
    }

    /// Number of registered elements.
    pub fn registered_len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` while a session is active.
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// The element being moved by the active session.
    pub fn active_target(&self) -> Option<E> {
        self.active.as_ref().map(|s| s.target)
    }

    /// Number of listeners held by the active session (zero when idle).
    pub fn session_listener_len(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.listeners.len())
    }

    /// Make `element` draggable.
    ///
    /// Fails with [`DragError::InvalidCallback`] when `options` has no handler and
    /// with [`DragError::UnsupportedElementKind`] when the host cannot drag this
    /// kind of element. Enabling an already registered element replaces its
    /// options; if that element owns the active session, the session ends first.
    pub fn enable<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        element: E,
        options: DragOptions<E, U>,
    ) -> Result<(), DragError> {
        let on_drag = options.on_drag.ok_or(DragError::InvalidCallback)?;
        let kind = host.element_kind(element);
        let strategy = kind
            .strategy()
            .ok_or(DragError::UnsupportedElementKind { kind })?;

        if self.registrations.contains_key(&element) {
            self.unregister(host, element);
        }

        let listener =
            host.add_listener(EventTarget::Element(element), self.modality.start_channel());
        host.set_drag_marker(element, true);
        self.registrations.insert(
            element,
            Registration {
                listener,
                strategy,
                allow_overflow: options.allow_overflow,
                auto_position: options.auto_position,
                on_drag,
                confirm_target: options.confirm_target,
            },
        );
        tracing::debug!(?element, ?kind, "drag enabled");
        Ok(())
    }

    /// Make `element` no longer draggable.
    ///
    /// Disabling an element that is not registered is a no-op. If the element
    /// owns the active session, that session ends (with its `End` callback)
    /// before the registration is dropped.
    pub fn disable<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        element: E,
    ) -> Result<(), DragError> {
        let kind = host.element_kind(element);
        if !kind.is_draggable() {
            return Err(DragError::UnsupportedElementKind { kind });
        }
        if self.registrations.contains_key(&element) {
            self.unregister(host, element);
            tracing::debug!(?element, "drag disabled");
        }
        Ok(())
    }

    /// End the active session in place, as if the window had lost focus.
    ///
    /// The callback receives `Phase::End` with `raw: None`. Returns `false` when
    /// no session was active.
    pub fn cancel<H: Host<Element = E>>(&mut self, host: &mut H) -> bool {
        self.finish(host, None, None) == Handled::Ended
    }

    /// Cancel any session and disable every registered element.
    pub fn clear<H: Host<Element = E>>(&mut self, host: &mut H) {
        self.cancel(host);
        for (element, registration) in self.registrations.drain() {
            host.remove_listener(registration.listener);
            host.set_drag_marker(element, false);
        }
    }

    /// Process one raw event that reached `target`.
    ///
    /// Events that do not arrive on one of the engine's own listeners are ignored.
    pub fn handle_event<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        target: EventTarget<E>,
        raw: &RawEvent,
    ) -> Handled {
        let channel = raw.channel();

        let Some(session) = &self.active else {
            let EventTarget::Element(element) = target else {
                return Handled::Ignored;
            };
            if channel != self.modality.start_channel()
                || !self.registrations.contains_key(&element)
            {
                return Handled::Ignored;
            }
            return match self.normalizer.normalize(raw) {
                Some(event) if event.phase == Phase::Start => {
                    self.begin(host, element, event.screen, raw)
                }
                _ => Handled::Ignored,
            };
        };

        if !session.listeners.accepts(target, channel) {
            if channel == self.modality.start_channel() {
                tracing::debug!(?target, "start ignored: a drag session is already active");
            }
            return Handled::Ignored;
        }

        match self.normalizer.normalize(raw) {
            Some(event) if event.phase == Phase::Move => self.step(host, event.screen, raw),
            Some(event) if event.phase == Phase::End => {
                self.finish(host, Some(event.screen), Some(raw))
            }
            _ => Handled::Ignored,
        }
    }

    fn unregister<H: Host<Element = E>>(&mut self, host: &mut H, element: E) {
        if self.active.as_ref().is_some_and(|s| s.source == element) {
            self.finish(host, None, None);
        }
        if let Some(registration) = self.registrations.remove(&element) {
            host.remove_listener(registration.listener);
            host.set_drag_marker(element, false);
        }
    }

    fn begin<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        source: E,
        screen: Point,
        raw: &RawEvent,
    ) -> Handled {
        let Some(registration) = self.registrations.get_mut(&source) else {
            self.normalizer.reset();
            return Handled::Ignored;
        };

        let mut userdata = U::default();
        let target = match registration.confirm_target.as_mut() {
            Some(confirm) => confirm(&mut userdata, source),
            None => source,
        };
        let strategy = if target == source {
            registration.strategy
        } else {
            let kind = host.element_kind(target);
            match kind.strategy() {
                Some(strategy) => strategy,
                None => {
                    tracing::warn!(
                        ?source,
                        ?target,
                        ?kind,
                        "drag not started: confirmed target cannot be dragged"
                    );
                    self.normalizer.reset();
                    return Handled::Ignored;
                }
            }
        };
        let Some(container) = host.container(target) else {
            tracing::warn!(?source, ?target, "drag not started: target has no container");
            self.normalizer.reset();
            return Handled::Ignored;
        };

        let origin = session::snap(geometry::relative_box(host, target, container).origin());
        let scroll_origin = host.scroll_offset(container);

        let mut listeners = Listeners::new();
        let mut overlay = None;
        let mut gestures_suppressed = false;
        match self.modality {
            InputModality::Pointer => {
                let region = OverlayRegion::create(host, container, self.config.overlay_placement);
                let capture = EventTarget::Element(region.element());
                listeners.attach(host, capture, self.modality.session_channels());
                overlay = Some(region);
            }
            InputModality::Touch => {
                listeners.attach(
                    host,
                    EventTarget::Document,
                    self.modality.session_channels(),
                );
                if self.config.suppress_touch_gestures {
                    host.set_gestures_suppressed(true);
                    gestures_suppressed = true;
                }
            }
        }
        listeners.attach(host, EventTarget::Window, self.modality.fallback_channels());

        let session = SessionContext {
            source,
            target,
            container,
            strategy,
            origin,
            start_pointer: screen,
            scroll_origin,
            last: origin,
            allow_overflow: registration.allow_overflow,
            auto_position: registration.auto_position,
            gestures_suppressed,
            overlay,
            listeners,
            userdata,
        };
        tracing::debug!(?source, ?target, ?origin, "drag session started");

        // Stored first, so a panicking callback leaves a session that can still end.
        let session = self.active.insert(session);
        registration.invoke(session.args(Phase::Start, origin, Vec2::ZERO, Some(raw)));
        Handled::Started
    }

    fn step<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        screen: Point,
        raw: &RawEvent,
    ) -> Handled {
        let Some(session) = self.active.as_mut() else {
            return Handled::Ignored;
        };
        let (position, delta) = session.advance(host, screen);
        session.apply(host, position);
        tracing::trace!(?position, ?delta, "drag moved");
        if let Some(registration) = self.registrations.get_mut(&session.source) {
            registration.invoke(session.args(Phase::Move, position, delta, Some(raw)));
        }
        Handled::Moved
    }

    fn finish<H: Host<Element = E>>(
        &mut self,
        host: &mut H,
        screen: Option<Point>,
        raw: Option<&RawEvent>,
    ) -> Handled {
        let Some(session) = self.active.take() else {
            return Handled::Ignored;
        };
        self.normalizer.reset();
        let mut ending = Teardown { host, session };

        let (position, delta) = match screen {
            Some(screen) => ending.session.advance(&*ending.host, screen),
            None => (ending.session.last, Vec2::ZERO),
        };
        ending.session.apply(&mut *ending.host, position);
        if let Some(registration) = self.registrations.get_mut(&ending.session.source) {
            registration.invoke(ending.session.args(Phase::End, position, delta, raw));
        }

        let target = ending.session.target;
        drop(ending);
        tracing::debug!(?target, ?position, "drag session ended");
        Handled::Ended
    }
}
