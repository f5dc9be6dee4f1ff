// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handle identities carried on pointer events.

use scanwerk_core::Corner;

/// One of the eight resize handles of the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
        ResizeHandle::Top,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
        ResizeHandle::Right,
    ];

    /// Short tag (`tl`, `tr`, `bl`, `br`, `top`, `bottom`, `left`, `right`).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TopLeft => "tl",
            Self::TopRight => "tr",
            Self::BottomLeft => "bl",
            Self::BottomRight => "br",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Look a handle up by its tag. Accepts an optional `resize-` prefix.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.strip_prefix("resize-").unwrap_or(tag);
        Self::ALL.into_iter().find(|handle| handle.tag() == tag)
    }

    /// Pointer cursor name hosts should show over this handle.
    pub fn cursor(&self) -> &'static str {
        match self {
            Self::TopLeft | Self::BottomRight => "nwse-resize",
            Self::TopRight | Self::BottomLeft => "nesw-resize",
            Self::Top | Self::Bottom => "ns-resize",
            Self::Left | Self::Right => "ew-resize",
        }
    }

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleTarget {
    /// A quadrilateral corner handle.
    Corner(Corner),
    /// A crop-rectangle resize handle.
    Resize(ResizeHandle),
    /// The crop-rectangle body.
    Body,
}

impl HandleTarget {
    pub fn cursor(&self) -> &'static str {
        match self {
            Self::Resize(handle) => handle.cursor(),
            Self::Corner(_) | Self::Body => "move",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every tag resolves back to its handle, with or without prefix.
    #[test]
    fn tags_round_trip() {
        for handle in ResizeHandle::ALL {
            assert_eq!(ResizeHandle::from_tag(handle.tag()), Some(handle));
            assert_eq!(
                ResizeHandle::from_tag(&format!("resize-{}", handle.tag())),
                Some(handle)
            );
        }
        assert_eq!(ResizeHandle::from_tag("middle"), None);
    }

    /// Diagonal corners share a cursor.
    #[test]
    fn cursors() {
        assert_eq!(ResizeHandle::TopLeft.cursor(), ResizeHandle::BottomRight.cursor());
        assert_eq!(ResizeHandle::Left.cursor(), "ew-resize");
        assert_eq!(HandleTarget::Body.cursor(), "move");
    }
}
