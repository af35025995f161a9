use crossterm::event::KeyCode;

use super::*;
use crate::hotkeys::HotkeyDispatcher;
use crate::indicator::Marker;

fn article(title: &str, body: &str) -> Element {
    Element::new("article")
        .with_child(Element::new("h1").with_text(title))
        .with_child(Element::new("p").with_text(body))
}

fn overlay(titles: &[&str]) -> Element {
    let mut content = Element::new("section");
    for title in titles {
        content.push_child(article(title, &format!("About {title}.")));
    }
    Element::new("section")
        .with_attr("class", "stepwise")
        .with_attr("data-load", "https://example.com")
        .with_child(content)
}

fn navigator(titles: &[&str]) -> StepNavigator {
    StepNavigator::new(overlay(titles), &NavigatorOptions::default()).unwrap()
}

/// Indicator that records every update it receives
#[derive(Default)]
struct RecordingIndicator {
    markers: Vec<Marker>,
    selected: Option<usize>,
    updates: Vec<String>,
    bound: Vec<usize>,
}

impl ProgressIndicator for RecordingIndicator {
    fn entries(&self) -> &[Marker] {
        &self.markers
    }

    fn update(&mut self, value: &str) {
        self.updates.push(value.to_string());
        self.selected = self.markers.iter().position(|m| m.value == value);
    }

    fn on_select(&mut self, index: usize, _handler: SelectHandler) {
        self.bound.push(index);
    }

    fn unbind_all(&mut self) {
        self.bound.clear();
    }

    fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn interact(&mut self, index: usize) -> Option<SelectHandler> {
        self.bound
            .contains(&index)
            .then_some(SelectHandler::GoTo(index))
    }
}

fn recording(titles: &[&str]) -> StepNavigator<RecordingIndicator> {
    StepNavigator::with_indicator(overlay(titles), &NavigatorOptions::default(), |markup| {
        let atomic = Atomic::new(markup)?;
        Ok(RecordingIndicator {
            markers: atomic.entries().to_vec(),
            ..RecordingIndicator::default()
        })
    })
    .unwrap()
}

#[test]
fn test_intro_setup_done_scenario() {
    let mut nav = navigator(&["Intro", "Setup", "Done"]);
    assert_eq!(nav.state().current_index(), 0);

    nav.next();
    nav.next();
    assert_eq!(nav.state().current_index(), 2);
    nav.next();
    assert_eq!(nav.state().current_index(), 2);

    nav.previous();
    nav.previous();
    nav.previous();
    assert_eq!(nav.state().current_index(), 0);
    nav.previous();
    assert_eq!(nav.state().current_index(), 0);
}

#[test]
fn test_titles_come_from_first_heading() {
    let nav = navigator(&["Intro", "Setup", "Done"]);
    let titles: Vec<_> = nav.steps().iter().map(Step::title).collect();
    assert_eq!(titles, vec!["Intro", "Setup", "Done"]);
    assert_eq!(nav.state().max_index(), Some(2));
}

#[test]
fn test_markers_match_step_order() {
    let nav = navigator(&["Intro", "Setup", "Done"]);
    let labels: Vec<_> = nav
        .indicator()
        .entries()
        .iter()
        .map(|m| m.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Intro", "Setup", "Done"]);
}

#[test]
fn test_rail_markup_attached_to_nav() {
    let nav = navigator(&["Intro"]);
    let nav_element = nav.root().at_path(&[0]).unwrap();
    assert_eq!(nav_element.tag(), "nav");
    assert!(nav_element.find_first(&|e| e.tag() == "form").is_some());
    assert!(nav_element.find_first(&|e| e.has_class("atomic")).is_some());
}

#[test]
fn test_rail_markup_attributes() {
    let nav = navigator(&["Intro", "Setup"]);
    let section = nav.root().find_first(&|e| e.tag() == "section" && e.has_class("atomic")).unwrap();
    let input = section.find_first(&|e| e.tag() == "input").unwrap();
    assert_eq!(input.attr("type"), Some("text"));
    assert_eq!(input.attr("value"), Some("0"));
    assert_eq!(input.attr("readonly"), Some(""));
    assert!(section.find_first(&|e| e.tag() == "canvas").is_some());

    let labels: Vec<_> = (0..nav.len())
        .filter_map(|i| nav.panel(i))
        .filter_map(|panel| panel.find_first(&|e| e.tag() == "label"))
        .map(|label| label.attr("for").unwrap_or_default().to_string())
        .collect();
    assert_eq!(labels, vec!["i0", "i1"]);
}

#[test]
fn test_panels_get_marker_labels() {
    let nav = navigator(&["Intro", "Setup"]);
    let panel = nav.panel(1).unwrap();
    assert!(panel
        .find_first(&|e| e.tag() == "label" && e.attr("for") == Some("i1"))
        .is_some());
}

#[test]
fn test_first_step_rendered_at_construction() {
    let nav = recording(&["Intro", "Setup"]);
    assert_eq!(nav.indicator().updates, vec!["0".to_string()]);
    assert_eq!(nav.indicator().selected(), Some(0));
    assert!(nav.panel(0).unwrap().has_class(ACTIVE_CLASS));
    assert!(!nav.panel(1).unwrap().has_class(ACTIVE_CLASS));
}

#[test]
fn test_markers_bound_after_construction() {
    let nav = recording(&["Intro", "Setup", "Done"]);
    assert_eq!(nav.indicator().bound, vec![0, 1, 2]);
}

#[test]
fn test_every_mutation_renders() {
    let mut nav = recording(&["Intro", "Setup"]);
    nav.previous();
    nav.next();
    nav.next();
    nav.go_to(-4);
    assert_eq!(nav.indicator().updates, vec!["0", "0", "1", "1", "0"]);
}

#[test]
fn test_go_to_clamps() {
    let mut nav = navigator(&["Intro", "Setup", "Done"]);
    nav.go_to(1);
    assert_eq!(nav.state().current_index(), 1);
    nav.go_to(99);
    assert_eq!(nav.state().current_index(), 2);
    nav.go_to(i64::MIN);
    assert_eq!(nav.state().current_index(), 0);
    assert_eq!(nav.indicator().selected(), Some(0));
}

#[test]
fn test_active_class_follows_index() {
    let mut nav = navigator(&["Intro", "Setup", "Done"]);
    nav.go_to(2);
    assert!(nav.panel(2).unwrap().has_class(ACTIVE_CLASS));
    assert!(!nav.panel(0).unwrap().has_class(ACTIVE_CLASS));
}

#[test]
fn test_select_marker_goes_to_step() {
    let mut nav = navigator(&["Intro", "Setup", "Done"]);
    assert!(nav.select_marker(2));
    assert_eq!(nav.state().current_index(), 2);
    assert_eq!(nav.indicator().selected(), Some(2));
}

#[test]
fn test_unbound_marker_does_not_navigate() {
    let mut nav = navigator(&["Intro", "Setup"]);
    nav.unbind();
    assert!(!nav.select_marker(1));
    assert_eq!(nav.state().current_index(), 0);
}

#[test]
fn test_empty_tour_is_inert() {
    let mut nav = recording(&[]);
    assert!(nav.is_empty());
    assert_eq!(nav.state().max_index(), None);
    nav.next();
    nav.previous();
    nav.go_to(3);
    assert_eq!(nav.state().current_index(), 0);
    assert!(nav.indicator().updates.is_empty());
    assert_eq!(nav.indicator().selected(), None);
    assert!(nav.current_step().is_none());
}

#[test]
fn test_missing_heading_fails_construction() {
    let root = Element::new("section")
        .with_child(article("Intro", "fine"))
        .with_child(Element::new("article").with_child(Element::new("p").with_text("no title")));
    let err = StepNavigator::new(root, &NavigatorOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, TourError::MissingTitle { step: 1 }));
}

#[test]
fn test_blank_heading_fails_construction() {
    let root = Element::new("section").with_child(article("   ", "body"));
    assert!(StepNavigator::new(root, &NavigatorOptions::default()).is_err());
}

#[test]
fn test_start_hidden_option() {
    let options = NavigatorOptions {
        start_hidden: true,
        ..NavigatorOptions::default()
    };
    let nav = StepNavigator::new(overlay(&["Intro"]), &options).unwrap();
    assert!(!nav.state().visible());
    assert!(nav.root().has_class(HIDDEN_CLASS));
    assert!(nav.root().has_class("stepwise"));
}

#[test]
fn test_toggle_uses_explicit_state() {
    let mut nav = navigator(&["Intro"]);
    assert!(nav.state().visible());
    nav.toggle();
    assert!(!nav.state().visible());
    assert!(nav.root().has_class(HIDDEN_CLASS));
    nav.toggle();
    assert!(nav.state().visible());
    assert!(!nav.root().has_class(HIDDEN_CLASS));
}

#[test]
fn test_navigation_keeps_visibility() {
    let mut nav = navigator(&["Intro", "Setup"]);
    nav.hide();
    nav.next();
    assert!(!nav.state().visible());
    assert_eq!(nav.state().current_index(), 1);
}

#[test]
fn test_render_closes_nav_and_blurs_search() {
    let mut nav = navigator(&["Intro", "Setup"]);
    let mut event = KeyPress::new(KeyCode::Char('s'));
    nav.focus_search(&mut event);
    assert!(nav.state().nav_open());
    assert!(nav.search_box().is_focused());

    nav.next();
    assert!(!nav.state().nav_open());
    assert!(!nav.search_box().is_focused());
    assert!(!nav.root().has_class(NAV_CLASS));
}

#[test]
fn test_focus_search_prevents_default_once() {
    let mut nav = navigator(&["Intro"]);
    let mut first = KeyPress::new(KeyCode::Char('s'));
    nav.focus_search(&mut first);
    assert!(first.default_prevented());

    let mut typed = KeyPress::new(KeyCode::Char('s'));
    nav.focus_search(&mut typed);
    assert!(!typed.default_prevented());
    assert!(nav.search_box().is_focused());
}

#[test]
fn test_escape_hides_while_search_focused() {
    let mut nav = navigator(&["Intro", "Setup"]);
    let dispatcher = HotkeyDispatcher::default();
    nav.search_box_mut().focus();

    let mut escape = KeyPress::new(KeyCode::Esc);
    assert_eq!(dispatcher.dispatch(&mut nav, &mut escape), Some(Operation::Hide));
    assert!(!nav.state().visible());
}

#[test]
fn test_toggle_nav_suppressed_while_search_focused() {
    let mut nav = navigator(&["Intro", "Setup"]);
    let dispatcher = HotkeyDispatcher::default();
    nav.search_box_mut().focus();
    let before = *nav.state();

    let mut h = KeyPress::new(KeyCode::Char('h'));
    dispatcher.dispatch(&mut nav, &mut h);
    assert_eq!(*nav.state(), before);
    assert!(!h.default_prevented());

    let mut t = KeyPress::new(KeyCode::Char('t'));
    dispatcher.dispatch(&mut nav, &mut t);
    assert_eq!(*nav.state(), before);
}

#[test]
fn test_toggle_nav_opens_panel_and_shows_chrome() {
    let mut nav = navigator(&["Intro"]);
    nav.hide();
    nav.toggle_nav();
    assert!(nav.state().visible());
    assert!(nav.state().nav_open());
    assert!(nav.root().has_class(NAV_CLASS));
    nav.toggle_nav();
    assert!(!nav.state().nav_open());
}

#[test]
fn test_hotkeys_drive_navigation() {
    let mut nav = navigator(&["Intro", "Setup", "Done"]);
    let dispatcher = HotkeyDispatcher::default();
    for code in [KeyCode::Down, KeyCode::Right, KeyCode::Right] {
        dispatcher.dispatch(&mut nav, &mut KeyPress::new(code));
    }
    assert_eq!(nav.state().current_index(), 2);
    dispatcher.dispatch(&mut nav, &mut KeyPress::new(KeyCode::Up));
    assert_eq!(nav.state().current_index(), 1);
    assert_eq!(
        dispatcher.dispatch(&mut nav, &mut KeyPress::new(KeyCode::Char('z'))),
        None
    );
}

#[test]
fn test_submit_search_uses_box_value() {
    let mut nav = navigator(&["Intro", "Setup", "Done"]);
    nav.search_box_mut().set_value("setup");
    let outcome = nav.submit_search().unwrap();
    assert_eq!(outcome, SearchOutcome::Applied { steps: 1, highlights: 2 });
    let markup = nav.highlighted_markup(1).unwrap();
    assert!(markup.contains("<h1><mark>Setup</mark></h1>"));
    assert!(markup.contains("About <mark>Setup</mark>."));
}

#[test]
fn test_search_does_not_touch_navigation() {
    let mut nav = navigator(&["Intro", "Setup"]);
    nav.next();
    let before = *nav.state();
    nav.search("about").unwrap();
    assert_eq!(*nav.state(), before);
    nav.previous();
    assert_eq!(nav.state().current_index(), 0);
}

#[test]
fn test_search_ignores_rail_markup() {
    let mut nav = navigator(&["Intro", "Setup"]);
    nav.search("atomic").unwrap();
    assert!(nav.search_engine().highlights().is_empty());
}

#[test]
fn test_failed_search_keeps_navigation_working() {
    let options = NavigatorOptions {
        search_size_limit: 16,
        ..NavigatorOptions::default()
    };
    let mut nav = StepNavigator::new(overlay(&["Intro", "Setup", "Done"]), &options).unwrap();

    let err = nav.search(&"setup".repeat(100)).unwrap_err();
    assert!(matches!(err, TourError::InvalidPattern(_)));
    assert!(nav.search_engine().highlights().is_empty());
    assert!(nav.search_engine().query().is_none());

    nav.next();
    assert_eq!(nav.state().current_index(), 1);
    assert_eq!(nav.indicator().selected(), Some(1));
    nav.go_to(2);
    assert_eq!(nav.state().current_index(), 2);
    assert_eq!(nav.indicator().selected(), Some(2));
    assert!(nav.panel(2).unwrap().has_class(ACTIVE_CLASS));
    assert!(nav.select_marker(0));
    assert_eq!(nav.indicator().selected(), Some(0));
}
