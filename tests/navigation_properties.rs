//! Property-based invariant tests for the step navigator.
//!
//! Verifies:
//! 1. The current index stays within bounds under any operation sequence
//! 2. Exactly the current panel carries `active`, and the indicator agrees
//! 3. `go_to` clamps into range
//! 4. An empty query leaves highlight state untouched
//! 5. Searching the same query twice yields the same highlights
//! 6. Regex metacharacters in a query are matched literally

use crossterm::event::KeyCode;
use proptest::prelude::*;
use stepwise::dom::Element;
use stepwise::hotkeys::{KeyPress, Operation};
use stepwise::indicator::ProgressIndicator;
use stepwise::navigator::{NavigatorOptions, ACTIVE_CLASS};
use stepwise::search::SearchOutcome;
use stepwise::StepNavigator;

// ── Strategy helpers ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Action {
    Perform(Operation),
    GoTo(i64),
    Select(usize),
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Previous),
        Just(Operation::Next),
        Just(Operation::FocusSearch),
        Just(Operation::Toggle),
        Just(Operation::Hide),
        Just(Operation::Show),
        Just(Operation::ToggleNav),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => arb_operation().prop_map(Action::Perform),
        2 => (-20i64..20).prop_map(Action::GoTo),
        1 => (0usize..10).prop_map(Action::Select),
    ]
}

fn root(bodies: &[String]) -> Element {
    let mut root = Element::new("section");
    for (i, body) in bodies.iter().enumerate() {
        root.push_child(
            Element::new("article")
                .with_child(Element::new("h1").with_text(format!("Step {}", i + 1)))
                .with_child(Element::new("p").with_text(body.clone())),
        );
    }
    root
}

fn navigator(bodies: &[String]) -> StepNavigator {
    StepNavigator::new(root(bodies), &NavigatorOptions::default()).unwrap()
}

fn highlighted_texts(navigator: &StepNavigator) -> Vec<String> {
    let arena = navigator.search_engine().highlights();
    arena
        .steps()
        .flat_map(|step| {
            let panel = navigator.panel(step).unwrap();
            let nodes = panel.text_nodes();
            arena
                .for_step(step)
                .iter()
                .map(|h| {
                    let (_, text) = nodes.iter().find(|(path, _)| *path == h.text_path).unwrap();
                    text[h.range.clone()].to_string()
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn assert_rendered(navigator: &StepNavigator) {
    let current = navigator.state().current_index();
    match navigator.state().max_index() {
        None => {
            assert_eq!(current, 0);
            assert!(navigator.indicator().selected().is_none());
        }
        Some(max) => {
            assert!(current <= max);
            assert_eq!(max + 1, navigator.len());
            for i in 0..navigator.len() {
                assert_eq!(navigator.panel(i).unwrap().has_class(ACTIVE_CLASS), i == current);
            }
            assert_eq!(navigator.indicator().selected(), Some(current));
        }
    }
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn index_stays_in_bounds(
        bodies in prop::collection::vec("[a-z ]{0,12}", 0..6),
        actions in prop::collection::vec(arb_action(), 0..40),
    ) {
        let mut nav = navigator(&bodies);
        assert_rendered(&nav);
        for action in actions {
            match action {
                Action::Perform(operation) => {
                    let mut event = KeyPress::new(KeyCode::Null);
                    nav.perform(operation, &mut event);
                }
                Action::GoTo(n) => nav.go_to(n),
                Action::Select(i) => {
                    nav.select_marker(i);
                }
            }
            assert_rendered(&nav);
        }
    }

    #[test]
    fn go_to_clamps(len in 1usize..8, n in -50i64..50) {
        let bodies = vec![String::new(); len];
        let mut nav = navigator(&bodies);
        nav.go_to(n);
        let expected = n.clamp(0, len as i64 - 1) as usize;
        prop_assert_eq!(nav.state().current_index(), expected);
    }

    #[test]
    fn empty_query_is_a_no_op(
        bodies in prop::collection::vec("[a-c ]{0,16}", 1..5),
        first in "[a-c]{1,3}",
    ) {
        let mut nav = navigator(&bodies);
        nav.search(&first).unwrap();
        let before = nav.search_engine().highlights().clone();
        let index = nav.state().current_index();

        prop_assert_eq!(nav.search("").unwrap(), SearchOutcome::Skipped);
        prop_assert_eq!(nav.search_engine().highlights(), &before);
        prop_assert_eq!(nav.search_engine().query(), Some(first.as_str()));
        prop_assert_eq!(nav.state().current_index(), index);
    }

    #[test]
    fn repeated_search_is_idempotent(
        bodies in prop::collection::vec("[a-cA-C ]{0,16}", 1..5),
        query in "[a-c]{1,3}",
    ) {
        let mut nav = navigator(&bodies);
        let first = nav.search(&query).unwrap();
        let highlights = nav.search_engine().highlights().clone();
        let second = nav.search(&query).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(nav.search_engine().highlights(), &highlights);
    }

    #[test]
    fn metacharacters_match_literally(
        bodies in prop::collection::vec(r"[ab().*+?|\[\]{}^$\\ ]{0,20}", 1..4),
        query in r"[ab().*+?|\[\]{}^$\\]{1,4}",
    ) {
        let mut nav = navigator(&bodies);
        let outcome = nav.search(&query);
        prop_assert!(outcome.is_ok());
        for text in highlighted_texts(&nav) {
            prop_assert!(text.eq_ignore_ascii_case(&query));
        }
        let expected = bodies
            .iter()
            .map(|body| body.to_ascii_lowercase().matches(&query.to_ascii_lowercase()).count())
            .sum::<usize>();
        prop_assert_eq!(nav.search_engine().highlights().total(), expected);
    }
}
