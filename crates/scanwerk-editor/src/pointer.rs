// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified pointer events and the adapters that produce them from raw mouse
// and touch input. Editors only ever see `PointerEvent`.

use tracing::debug;

use crate::handle::HandleTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// The active pointer was lost (touch cancelled, window blurred).
    Cancel,
}

/// A single normalised pointer event in display-surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
    /// The handle the event landed on, when the host knows it. Editors fall
    /// back to hit-testing their own overlay on pointer-down when absent.
    pub target: Option<HandleTarget>,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64, target: Option<HandleTarget>) -> Self {
        Self {
            kind: PointerKind::Down,
            x,
            y,
            target,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Move,
            x,
            y,
            target: None,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Up,
            x,
            y,
            target: None,
        }
    }

    pub fn cancel() -> Self {
        Self {
            kind: PointerKind::Cancel,
            x: 0.0,
            y: 0.0,
            target: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Press,
    Move,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One touch point of a raw touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// Normalises mouse and touch input into a single-pointer stream.
///
/// The first active touch wins; other touches are ignored until it ends.
/// Mouse input is ignored while a touch is being tracked, since platforms
/// commonly synthesise mouse events from touches.
#[derive(Debug, Default)]
pub struct PointerTracker {
    active_touch: Option<u64>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the touch currently being followed, if any.
    pub fn active_touch(&self) -> Option<u64> {
        self.active_touch
    }

    pub fn mouse(
        &mut self,
        action: MouseAction,
        x: f64,
        y: f64,
        target: Option<HandleTarget>,
    ) -> Option<PointerEvent> {
        if self.active_touch.is_some() {
            return None;
        }
        Some(match action {
            MouseAction::Press => PointerEvent::down(x, y, target),
            MouseAction::Move => PointerEvent::moved(x, y),
            MouseAction::Release => PointerEvent::up(x, y),
        })
    }

    /// Feed a raw touch event. `changed` lists the touches this event is
    /// about; `target` is what the first of them landed on.
    pub fn touch(
        &mut self,
        phase: TouchPhase,
        changed: &[Touch],
        target: Option<HandleTarget>,
    ) -> Option<PointerEvent> {
        match phase {
            TouchPhase::Start => {
                if self.active_touch.is_some() {
                    debug!(touches = changed.len(), "ignoring additional touch");
                    return None;
                }
                let first = changed.first()?;
                self.active_touch = Some(first.id);
                Some(PointerEvent::down(first.x, first.y, target))
            }
            TouchPhase::Move => {
                let active = self.tracked(changed)?;
                Some(PointerEvent::moved(active.x, active.y))
            }
            TouchPhase::End => {
                let active = self.tracked(changed)?;
                self.active_touch = None;
                Some(PointerEvent::up(active.x, active.y))
            }
            TouchPhase::Cancel => {
                self.tracked(changed)?;
                self.active_touch = None;
                Some(PointerEvent::cancel())
            }
        }
    }

    fn tracked(&self, changed: &[Touch]) -> Option<Touch> {
        let id = self.active_touch?;
        changed.iter().copied().find(|touch| touch.id == id)
    }
}
