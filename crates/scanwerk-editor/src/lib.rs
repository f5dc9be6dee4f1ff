// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-editor — Interactive geometric correction for Scanwerk.
//
// Two pointer-driven editors operate in logical pixel space of the source
// image: a free quadrilateral (four draggable corners, for perspective
// correction) and an axis-aligned crop rectangle (move plus eight resize
// handles). Pointer positions arrive in display-surface coordinates and are
// mapped through `CoordinateMapper` on every event.

pub mod handle;
pub mod mapper;
pub mod overlay;
pub mod pointer;
pub mod quad;
pub mod rect;

pub use handle::{HandleTarget, ResizeHandle};
pub use mapper::{CoordinateMapper, DisplayRect};
pub use overlay::{Handle, HandleShape, Overlay};
pub use pointer::{MouseAction, PointerEvent, PointerKind, PointerTracker, Touch, TouchPhase};
pub use quad::{QuadState, QuadrilateralEditor};
pub use rect::{RectState, RectangleEditor};

/// Callback invoked with the recomputed overlay after every editor mutation.
pub type RenderHook = Box<dyn FnMut(&Overlay)>;
