//! Global event target for a hosted overlay.
//!
//! The host delivers key-down and resize events to whoever registered for them.
//! Registrations are explicit and removable, so a tour can be detached without
//! leaving handlers behind.

use crate::frame::Geometry;

/// Global event kinds a tour listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Default)]
pub struct Window {
    geometry: Geometry,
    listeners: Vec<(ListenerId, EventKind)>,
    next_id: u64,
}

impl Window {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub fn add_event_listener(&mut self, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind));
        id
    }

    /// Returns whether a listener was removed.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Whether `id` is still registered for `kind`.
    pub fn is_listening(&self, id: ListenerId, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|(listener, registered)| *listener == id && *registered == kind)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|(_, k)| *k == kind).count()
    }
}
