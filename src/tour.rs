//! One mounted overlay: navigator, embedded frame, hotkeys and the listeners that
//! tie them to the window.
//!
//! The host owns the `Tour`; there is no process-wide instance. Listeners are
//! registered only after everything they touch exists, and [`Tour::detach`]
//! removes all of them.

use crate::dom::Element;
use crate::error::{Result, TourError};
use crate::frame::{EmbeddedFrame, FrameHost, Geometry, GeometryMode, ResizeCoalescer};
use crate::hotkeys::{HotkeyDispatcher, KeyPress, Operation};
use crate::indicator::{Atomic, ProgressIndicator};
use crate::manifest::LOAD_ATTRIBUTE;
use crate::navigator::{NavigatorOptions, StepNavigator};
use crate::search::SearchOutcome;
use crate::window::{EventKind, ListenerId, Window};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TourOptions {
    pub navigator: NavigatorOptions,
    pub geometry: GeometryMode,
    /// Keep only the latest resize until [`Tour::flush`]
    pub coalesce_resize: bool,
}

/// Global events delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    KeyDown(KeyPress),
    Resize(Geometry),
}

#[derive(Debug, Clone, Copy)]
struct Bindings {
    key_down: ListenerId,
    resize: ListenerId,
}

pub struct Tour<I: ProgressIndicator = Atomic> {
    navigator: StepNavigator<I>,
    frame: EmbeddedFrame,
    hotkeys: HotkeyDispatcher,
    coalescer: Option<ResizeCoalescer>,
    bindings: Option<Bindings>,
}

impl Tour<Atomic> {
    pub fn mount(
        root: Element,
        options: &TourOptions,
        hotkeys: HotkeyDispatcher,
        window: &mut Window,
    ) -> Result<Self> {
        Self::mount_with(root, options, hotkeys, window, Atomic::new)
    }
}

impl<I: ProgressIndicator> Tour<I> {
    /// Mount with a custom indicator factory.
    pub fn mount_with<F>(
        mut root: Element,
        options: &TourOptions,
        hotkeys: HotkeyDispatcher,
        window: &mut Window,
        build_indicator: F,
    ) -> Result<Self>
    where
        F: FnOnce(&Element) -> Result<I>,
    {
        let src = root
            .attr(LOAD_ATTRIBUTE)
            .filter(|src| !src.trim().is_empty())
            .ok_or_else(|| TourError::MissingAttribute {
                element: root.tag().to_string(),
                attribute: LOAD_ATTRIBUTE,
            })?
            .to_string();

        let frame = EmbeddedFrame::create(&src, options.geometry, window.geometry());
        // The frame is the overlay's first child, ahead of the nav and the panels.
        root.insert_child(0, frame.element().clone());
        let navigator = StepNavigator::with_indicator(root, &options.navigator, build_indicator)?;
        let coalescer = options
            .coalesce_resize
            .then(|| ResizeCoalescer::new(Some(frame.size())));

        let bindings = Bindings {
            key_down: window.add_event_listener(EventKind::KeyDown),
            resize: window.add_event_listener(EventKind::Resize),
        };

        tracing::info!(
            src = %src,
            mode = ?options.geometry,
            size = ?frame.size(),
            "tour mounted"
        );
        Ok(Self {
            navigator,
            frame,
            hotkeys,
            coalescer,
            bindings: Some(bindings),
        })
    }

    pub fn navigator(&self) -> &StepNavigator<I> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut StepNavigator<I> {
        &mut self.navigator
    }

    pub fn frame(&self) -> &EmbeddedFrame {
        &self.frame
    }

    pub fn hotkeys(&self) -> &HotkeyDispatcher {
        &self.hotkeys
    }

    pub fn is_attached(&self) -> bool {
        self.bindings.is_some()
    }

    /// Route a window event. Returns whether a listener of this tour handled it.
    pub fn handle_event(&mut self, window: &Window, event: &mut WindowEvent) -> bool {
        match event {
            WindowEvent::KeyDown(press) => {
                if !self.listening(window, EventKind::KeyDown) {
                    return false;
                }
                self.key_down(press);
                true
            }
            WindowEvent::Resize(geometry) => {
                if !self.listening(window, EventKind::Resize) {
                    return false;
                }
                self.resize(geometry);
                true
            }
        }
    }

    fn listening(&self, window: &Window, kind: EventKind) -> bool {
        let Some(bindings) = self.bindings else {
            return false;
        };
        let id = match kind {
            EventKind::KeyDown => bindings.key_down,
            EventKind::Resize => bindings.resize,
        };
        window.is_listening(id, kind)
    }

    fn key_down(&mut self, press: &mut KeyPress) -> Option<Operation> {
        self.hotkeys.dispatch(&mut self.navigator, press)
    }

    fn resize(&mut self, geometry: &Geometry) {
        self.frame.reposition(geometry);
        let size = self.frame.target_size(geometry);
        match self.coalescer.as_mut() {
            Some(coalescer) => coalescer.request(size),
            None => self.frame.resize(size.0, size.1),
        }
        self.sync_frame();
    }

    /// Copy the frame's current attributes into the overlay root.
    fn sync_frame(&mut self) {
        let frame = self.frame.element().clone();
        let root = self.navigator.root_mut();
        let slot = root
            .child_index_by_tag(frame.tag())
            .and_then(|index| root.at_path_mut(&[index]));
        if let Some(slot) = slot {
            *slot = frame;
        }
    }

    /// Apply a coalesced resize, if one is pending.
    pub fn flush(&mut self) -> bool {
        match self.coalescer.as_mut() {
            Some(coalescer) => {
                let resized = coalescer.flush(&mut self.frame);
                if resized {
                    self.sync_frame();
                    tracing::debug!(size = ?self.frame.size(), "frame resized");
                }
                resized
            }
            None => false,
        }
    }

    /// Direct selection of a progress marker.
    pub fn select_marker(&mut self, index: usize) -> bool {
        self.navigator.select_marker(index)
    }

    /// Submit the search form.
    pub fn submit_search(&mut self) -> Result<SearchOutcome> {
        let outcome = self.navigator.submit_search();
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "search failed");
        }
        outcome
    }

    /// Remove every listener this tour registered.
    pub fn detach(&mut self, window: &mut Window) {
        if let Some(bindings) = self.bindings.take() {
            window.remove_event_listener(bindings.key_down);
            window.remove_event_listener(bindings.resize);
        }
        self.navigator.unbind();
        tracing::info!("tour detached");
    }
}
