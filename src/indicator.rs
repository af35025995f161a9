//! Progress indicator capability and the `Atomic` radio-rail implementation.
//!
//! The navigator only talks to the indicator through [`ProgressIndicator`]. The
//! indicator owns its markers; the navigator owns the mapping from marker index
//! to step and reacts to selections, but only ever changes the selection through
//! [`ProgressIndicator::update`].

use crate::dom::Element;
use crate::error::{Result, TourError};

/// One selectable marker, in 1:1 order-correspondence with a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub index: usize,
    pub value: String,
    pub label: String,
}

/// What happens when a bound marker is selected by direct interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectHandler {
    /// Jump the navigator to this step index
    GoTo(usize),
}

pub trait ProgressIndicator {
    /// Markers in display order.
    fn entries(&self) -> &[Marker];

    /// Redraw with the marker carrying `value` selected. Unknown values are ignored.
    fn update(&mut self, value: &str);

    /// Bind the change notification of marker `index`.
    fn on_select(&mut self, index: usize, handler: SelectHandler);

    /// Remove every change binding.
    fn unbind_all(&mut self);

    /// Currently selected marker, if any.
    fn selected(&self) -> Option<usize>;

    /// Direct user selection of marker `index`.
    ///
    /// Selects the marker like a radio click and returns the bound handler, if the
    /// marker exists and has one.
    fn interact(&mut self, index: usize) -> Option<SelectHandler>;

    /// Fraction of the track filled, in `0.0..=1.0`.
    fn track(&self) -> f64 {
        let len = self.entries().len();
        match self.selected() {
            Some(selected) if len > 1 => selected as f64 / (len - 1) as f64,
            Some(_) => 1.0,
            None => 0.0,
        }
    }
}

/// Radio-button progress rail built from `section.atomic` markup.
///
/// The markup must already be attached to the overlay: markers are read from the
/// `ol > li > label` entries of the attached section.
#[derive(Debug, Clone, Default)]
pub struct Atomic {
    markers: Vec<Marker>,
    bindings: Vec<Option<SelectHandler>>,
    selected: Option<usize>,
    /// Mirrors the readonly `<input>` at the head of the markup
    display_value: String,
}

impl Atomic {
    pub fn new(markup: &Element) -> Result<Self> {
        if !markup.has_class("atomic") {
            return Err(TourError::MissingAttribute {
                element: markup.tag().to_string(),
                attribute: "class",
            });
        }
        let list = markup
            .child_elements()
            .find(|e| e.tag() == "ol")
            .ok_or_else(|| TourError::Manifest("progress markup has no <ol>".to_string()))?;

        let markers: Vec<Marker> = list
            .child_elements()
            .filter(|e| e.tag() == "li")
            .enumerate()
            .map(|(index, item)| Marker {
                index,
                value: index.to_string(),
                label: item.text_content(),
            })
            .collect();

        let display_value = markup
            .child_elements()
            .find(|e| e.tag() == "input")
            .and_then(|input| input.attr("value"))
            .unwrap_or("0")
            .to_string();

        Ok(Self {
            bindings: vec![None; markers.len()],
            markers,
            selected: None,
            display_value,
        })
    }

    /// Value shown in the readonly counter input.
    pub fn display_value(&self) -> &str {
        &self.display_value
    }
}

impl ProgressIndicator for Atomic {
    fn entries(&self) -> &[Marker] {
        &self.markers
    }

    fn update(&mut self, value: &str) {
        let Some(marker) = self.markers.iter().find(|m| m.value == value) else {
            tracing::debug!(value, "ignoring update for unknown marker value");
            return;
        };
        self.selected = Some(marker.index);
        self.display_value = marker.value.clone();
    }

    fn on_select(&mut self, index: usize, handler: SelectHandler) {
        if let Some(slot) = self.bindings.get_mut(index) {
            *slot = Some(handler);
        }
    }

    fn unbind_all(&mut self) {
        self.bindings.iter_mut().for_each(|slot| *slot = None);
    }

    fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn interact(&mut self, index: usize) -> Option<SelectHandler> {
        let value = self.markers.get(index)?.value.clone();
        self.update(&value);
        self.bindings.get(index).copied().flatten()
    }
}
