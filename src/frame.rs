//! Embedded sub-document host.
//!
//! The frame fills either the overlay viewport or the whole window, depending on
//! the deployment mode. Resizes can be coalesced so a burst of window events only
//! applies the latest geometry.

use serde::{Deserialize, Serialize};

use crate::dom::{set_attributes, AttrValue, Element};

/// Capability the tour needs from whatever hosts the embedded document
pub trait FrameHost {
    fn resize(&mut self, width: u32, height: u32);
}

/// Where the frame takes its size from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// Inset tour: the viewport element's content box
    #[default]
    Viewport,
    /// Full-bleed tour: the window's inner size, offset by the viewport origin
    Window,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Snapshot of the host geometry delivered with resize events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    /// Window inner size (width, height)
    pub window: (u32, u32),
    /// Viewport element box within the window
    pub viewport: Rect,
}

impl GeometryMode {
    pub fn size(&self, geometry: &Geometry) -> (u32, u32) {
        match self {
            GeometryMode::Viewport => (geometry.viewport.width, geometry.viewport.height),
            GeometryMode::Window => geometry.window,
        }
    }
}

/// The `<iframe>` element showing the externally loaded document
#[derive(Debug, Clone)]
pub struct EmbeddedFrame {
    element: Element,
    mode: GeometryMode,
    size: (u32, u32),
}

impl EmbeddedFrame {
    pub fn create(src: &str, mode: GeometryMode, geometry: &Geometry) -> Self {
        let (width, height) = mode.size(geometry);
        let mut element = Element::new("iframe");
        set_attributes(
            &mut element,
            [
                ("seamless", AttrValue::from(true)),
                ("src", AttrValue::from(src)),
                ("width", AttrValue::px(width)),
                ("height", AttrValue::px(height)),
            ],
        );
        if mode == GeometryMode::Window {
            set_attributes(&mut element, [("style", offset_style(&geometry.viewport))]);
        }

        Self {
            element,
            mode,
            size: (width, height),
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn src(&self) -> &str {
        self.element.attr("src").unwrap_or_default()
    }

    pub fn mode(&self) -> GeometryMode {
        self.mode
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Size the frame would take for `geometry` in its mode.
    pub fn target_size(&self, geometry: &Geometry) -> (u32, u32) {
        self.mode.size(geometry)
    }

    /// Keep the window-mode offset in step with the viewport origin.
    pub fn reposition(&mut self, geometry: &Geometry) {
        if self.mode == GeometryMode::Window {
            set_attributes(&mut self.element, [("style", offset_style(&geometry.viewport))]);
        }
    }
}

impl FrameHost for EmbeddedFrame {
    fn resize(&mut self, width: u32, height: u32) {
        set_attributes(
            &mut self.element,
            [("width", AttrValue::px(width)), ("height", AttrValue::px(height))],
        );
        self.size = (width, height);
    }
}

fn offset_style(viewport: &Rect) -> String {
    format!("left:-{}px;top:-{}px", viewport.x, viewport.y)
}

/// Keeps only the most recent requested size until it is flushed.
#[derive(Debug, Clone, Default)]
pub struct ResizeCoalescer {
    pending: Option<(u32, u32)>,
    applied: Option<(u32, u32)>,
}

impl ResizeCoalescer {
    pub fn new(applied: Option<(u32, u32)>) -> Self {
        Self {
            pending: None,
            applied,
        }
    }

    pub fn request(&mut self, size: (u32, u32)) {
        self.pending = Some(size);
    }

    /// Apply the latest pending size to `host`.
    ///
    /// Returns whether `host` was resized; a size equal to the last applied one is
    /// dropped.
    pub fn flush(&mut self, host: &mut dyn FrameHost) -> bool {
        let Some(size) = self.pending.take() else {
            return false;
        };
        if self.applied == Some(size) {
            return false;
        }
        host.resize(size.0, size.1);
        self.applied = Some(size);
        true
    }
}
