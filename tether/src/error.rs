// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::boxed::Box;

use thiserror::Error;

use crate::host::ElementKind;
use crate::input::Phase;

/// Error produced by a drag callback.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Return type of drag callbacks.
pub type CallbackResult = Result<(), BoxError>;

/// Errors reported by the drag engine.
#[derive(Debug, Error)]
pub enum DragError {
    /// The registration has no `on_drag` handler.
    #[error("drag registration requires an `on_drag` handler")]
    InvalidCallback,
    /// The element cannot be dragged.
    #[error("elements of kind {kind:?} cannot be dragged")]
    UnsupportedElementKind {
        /// The kind reported by the host.
        kind: ElementKind,
    },
    /// A drag callback returned an error.
    ///
    /// These are logged and never returned from the event path; the session
    /// carries on (or tears down, on `End`) as if the callback had succeeded.
    #[error("drag callback failed during {phase:?}: {error}")]
    CallbackFailure {
        /// The phase being delivered.
        phase: Phase,
        /// The callback's error.
        error: BoxError,
    },
}
