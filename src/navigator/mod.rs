//! Step navigator: current-step state machine for a tour overlay.
//!
//! The navigator owns the overlay root element. At construction it reads the
//! step panels and their titles, attaches the progress rail markup to the `nav`
//! element, builds the indicator over the attached markup and only then binds the
//! marker change notifications back to [`StepNavigator::go_to`].
//!
//! Every index mutation is followed by [`StepNavigator::render`], which projects
//! the index onto the indicator and the panels. Chrome state (`visible`,
//! `nav_open`) is held as explicit booleans and written to the root's class list;
//! it is never read back from presentation.

#[cfg(test)]
mod tests;

use crate::dom::{set_attributes, AttrValue, Element, NodePath};
use crate::error::{Result, TourError};
use crate::hotkeys::{KeyPress, Operation};
use crate::indicator::{Atomic, ProgressIndicator, SelectHandler};
use crate::search::{SearchEngine, SearchOutcome, DEFAULT_SIZE_LIMIT};

/// Tag of a step panel
pub const PANEL_TAG: &str = "article";
/// Class applied to the panel of the current step
pub const ACTIVE_CLASS: &str = "active";
/// Root class while the chrome is hidden
pub const HIDDEN_CLASS: &str = "hide";
/// Root class while the navigation panel is open
pub const NAV_CLASS: &str = "nav";

/// One content panel of the tour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    index: usize,
    title: String,
    path: NodePath,
}

impl Step {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Path of the panel element from the overlay root
    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorState {
    current_index: usize,
    /// `None` when the tour has no steps
    max_index: Option<usize>,
    visible: bool,
    nav_open: bool,
}

impl NavigatorState {
    fn new(step_count: usize, visible: bool) -> Self {
        Self {
            current_index: 0,
            max_index: step_count.checked_sub(1),
            visible,
            nav_open: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn max_index(&self) -> Option<usize> {
        self.max_index
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn nav_open(&self) -> bool {
        self.nav_open
    }

    /// Clamp any requested index into `0..=max_index`.
    fn clamp(&self, n: i64) -> Option<usize> {
        let max = self.max_index?;
        Some(n.clamp(0, max as i64) as usize)
    }
}

/// Text input of the search form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBox {
    value: String,
    focused: bool,
}

impl SearchBox {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn push(&mut self, ch: char) {
        self.value.push(ch);
    }

    pub fn pop(&mut self) -> Option<char> {
        self.value.pop()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }
}

/// Construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorOptions {
    pub start_hidden: bool,
    pub search_size_limit: usize,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            start_hidden: false,
            search_size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

pub struct StepNavigator<I: ProgressIndicator = Atomic> {
    root: Element,
    steps: Vec<Step>,
    state: NavigatorState,
    indicator: I,
    search: SearchEngine,
    search_box: SearchBox,
}

impl StepNavigator<Atomic> {
    pub fn new(root: Element, options: &NavigatorOptions) -> Result<Self> {
        Self::with_indicator(root, options, Atomic::new)
    }
}

impl<I: ProgressIndicator> StepNavigator<I> {
    /// Build the navigator, constructing the indicator with `build` over the
    /// attached rail markup.
    pub fn with_indicator<F>(mut root: Element, options: &NavigatorOptions, build: F) -> Result<Self>
    where
        F: FnOnce(&Element) -> Result<I>,
    {
        let nav_index = ensure_nav(&mut root);
        let steps = collect_steps(&root)?;

        for step in &steps {
            if let Some(panel) = root.at_path_mut(&step.path) {
                let mut label = Element::new("label");
                set_attributes(&mut label, [("for", format!("i{}", step.index))]);
                panel.push_child(label);
            }
        }

        // The markup must be part of the overlay before the indicator is built.
        let nav = root
            .at_path_mut(&[nav_index])
            .ok_or_else(|| TourError::Manifest("overlay lost its <nav> element".to_string()))?;
        nav.push_child(rail_markup(&steps));
        let markup_path = [nav_index, nav.children().len() - 1];

        let markup = root
            .at_path(&markup_path)
            .ok_or_else(|| TourError::Manifest("progress markup was not attached".to_string()))?;
        let mut indicator = build(markup)?;

        for step in &steps {
            indicator.on_select(step.index, SelectHandler::GoTo(step.index));
        }

        let mut navigator = Self {
            root,
            state: NavigatorState::new(steps.len(), !options.start_hidden),
            steps,
            indicator,
            search: SearchEngine::new(options.search_size_limit),
            search_box: SearchBox::default(),
        };
        navigator.render();
        navigator.apply_chrome();

        tracing::info!(
            steps = navigator.steps.len(),
            visible = navigator.state.visible,
            "navigator ready"
        );
        Ok(navigator)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable root for host chrome such as the embedded frame. Step panels and
    /// the `nav` must stay where they are.
    pub(crate) fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.state.current_index)
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    pub fn search_box(&self) -> &SearchBox {
        &self.search_box
    }

    pub fn search_box_mut(&mut self) -> &mut SearchBox {
        &mut self.search_box
    }

    /// Panel element of step `index`.
    pub fn panel(&self, index: usize) -> Option<&Element> {
        self.steps
            .get(index)
            .and_then(|step| self.root.at_path(&step.path))
    }

    pub fn previous(&mut self) {
        if self.state.max_index.is_some() {
            self.state.current_index = self.state.current_index.saturating_sub(1);
            tracing::debug!(index = self.state.current_index, "previous step");
        }
        self.render();
    }

    pub fn next(&mut self) {
        if let Some(max) = self.state.max_index {
            self.state.current_index = (self.state.current_index + 1).min(max);
            tracing::debug!(index = self.state.current_index, "next step");
        }
        self.render();
    }

    /// Jump to step `n`, clamped into range.
    pub fn go_to(&mut self, n: i64) {
        if let Some(index) = self.state.clamp(n) {
            self.state.current_index = index;
            tracing::debug!(requested = n, index, "go to step");
        }
        self.render();
    }

    /// Project the current index onto the indicator and the panels.
    ///
    /// Also resets transient chrome: the search box loses focus and the
    /// navigation panel closes. Visibility is left alone. With no steps nothing
    /// is rendered.
    pub fn render(&mut self) {
        if self.state.max_index.is_none() {
            return;
        }
        let current = self.state.current_index;

        if let Some(value) = self.indicator.entries().get(current).map(|m| m.value.clone()) {
            self.indicator.update(&value);
        }
        for step in &self.steps {
            if let Some(panel) = self.root.at_path_mut(&step.path) {
                panel.toggle_class(ACTIVE_CLASS, step.index == current);
            }
        }

        self.search_box.blur();
        self.state.nav_open = false;
        self.apply_chrome();
    }

    pub fn show(&mut self) {
        self.state.visible = true;
        self.apply_chrome();
    }

    pub fn hide(&mut self) {
        self.state.visible = false;
        self.state.nav_open = false;
        self.search_box.blur();
        self.apply_chrome();
    }

    /// Flip chrome visibility. Ignored while the search box has focus.
    pub fn toggle(&mut self) {
        if self.search_box.is_focused() {
            return;
        }
        if self.state.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Open or close the navigation panel. Ignored while the search box has focus.
    pub fn toggle_nav(&mut self) {
        if self.search_box.is_focused() {
            return;
        }
        self.state.nav_open = !self.state.nav_open;
        self.state.visible = true;
        self.apply_chrome();
    }

    /// Open the navigation panel and focus the search box.
    ///
    /// Ignored when the box already has focus, so the key reaches the box as text.
    pub fn focus_search(&mut self, event: &mut KeyPress) {
        if self.search_box.is_focused() {
            return;
        }
        event.prevent_default();
        self.state.visible = true;
        self.state.nav_open = true;
        self.search_box.focus();
        self.apply_chrome();
    }

    /// Run a bound operation for a key-down event.
    pub fn perform(&mut self, operation: Operation, event: &mut KeyPress) {
        match operation {
            Operation::Previous => self.previous(),
            Operation::Next => self.next(),
            Operation::FocusSearch => self.focus_search(event),
            Operation::Toggle => self.toggle(),
            Operation::Hide => self.hide(),
            Operation::Show => self.show(),
            Operation::ToggleNav => self.toggle_nav(),
        }
    }

    /// Direct selection of marker `index` on the indicator.
    ///
    /// Returns whether a bound change handler ran.
    pub fn select_marker(&mut self, index: usize) -> bool {
        match self.indicator.interact(index) {
            Some(SelectHandler::GoTo(step)) => {
                self.go_to(step as i64);
                true
            }
            None => false,
        }
    }

    /// Highlight `query` across all steps.
    pub fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        let root = &self.root;
        let panels = self
            .steps
            .iter()
            .filter_map(|step| root.at_path(&step.path).map(|panel| (step.index, panel)));
        self.search.search(panels, query)
    }

    /// Submit the search form with the current search box value.
    pub fn submit_search(&mut self) -> Result<SearchOutcome> {
        let query = self.search_box.value().to_string();
        self.search(&query)
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Markup of step `index` with search highlights applied.
    pub fn highlighted_markup(&self, index: usize) -> Option<String> {
        self.panel(index)
            .map(|panel| self.search.highlighted_markup(index, panel))
    }

    /// Drop every marker change binding.
    pub fn unbind(&mut self) {
        self.indicator.unbind_all();
    }

    fn apply_chrome(&mut self) {
        self.root.toggle_class(HIDDEN_CLASS, !self.state.visible);
        self.root.toggle_class(NAV_CLASS, self.state.nav_open);
    }
}

/// Index of the root's `<nav>`, creating it with a search form when absent.
fn ensure_nav(root: &mut Element) -> usize {
    let index = match root.child_index_by_tag("nav") {
        Some(index) => index,
        None => {
            // An embedded frame placed by the host stays the first child.
            let index = usize::from(
                root.children()
                    .first()
                    .and_then(|node| node.as_element())
                    .is_some_and(|e| e.tag() == "iframe"),
            );
            root.insert_child(index, Element::new("nav"));
            index
        }
    };
    if let Some(nav) = root.at_path_mut(&[index]) {
        if nav.find_first(&|e| e.tag() == "form").is_none() {
            nav.insert_child(
                0,
                Element::new("form").with_child(Element::new("input").with_attr("type", "search")),
            );
        }
    }
    index
}

fn collect_steps(root: &Element) -> Result<Vec<Step>> {
    root.paths_where(&|e| e.tag() == PANEL_TAG, &|e| e.tag() == "nav")
        .into_iter()
        .enumerate()
        .map(|(index, path)| {
            let title = root
                .at_path(&path)
                .and_then(Element::first_heading)
                .map(|heading| heading.text_content().trim().to_string())
                .filter(|title| !title.is_empty())
                .ok_or(TourError::MissingTitle { step: index })?;
            Ok(Step { index, title, path })
        })
        .collect()
}

/// `section.atomic` markup with one entry per step, in step order.
fn rail_markup(steps: &[Step]) -> Element {
    let mut list = Element::new("ol");
    // Entries are prepended, so walk the steps backwards.
    for step in steps.iter().rev() {
        list.insert_child(
            0,
            Element::new("li").with_child(Element::new("label").with_text(step.title.clone())),
        );
    }

    let mut input = Element::new("input");
    set_attributes(
        &mut input,
        [
            ("type", AttrValue::from("text")),
            ("value", AttrValue::from("0")),
            ("readonly", AttrValue::from(true)),
        ],
    );

    let mut section = Element::new("section");
    set_attributes(&mut section, [("class", "atomic")]);
    section
        .with_child(input)
        .with_child(list)
        .with_child(Element::new("canvas"))
}
