//! Text search across step panels.
//!
//! Search never rewrites panel content. Each applied query produces a
//! [`HighlightArena`]: per step, the text-node ranges that matched. The arena of
//! the previous query is dropped as a unit before a new one is built, and
//! highlight markup is generated from it on demand.

use std::collections::BTreeMap;
use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::dom::{escape, Element, NodePath};
use crate::error::Result;

/// Tag wrapped around matched text in generated markup
pub const HIGHLIGHT_TAG: &str = "mark";

/// Default compiled-pattern size limit (bytes)
pub const DEFAULT_SIZE_LIMIT: usize = 1 << 20;

/// One highlighted span inside a step panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Path of the text node, relative to the step panel
    pub text_path: NodePath,
    /// Byte range within that text node
    pub range: Range<usize>,
}

/// Highlight annotations indexed by step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightArena {
    by_step: BTreeMap<usize, Vec<Highlight>>,
}

impl HighlightArena {
    pub fn for_step(&self, step: usize) -> &[Highlight] {
        self.by_step.get(&step).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Steps carrying at least one highlight, ascending.
    pub fn steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_step.keys().copied()
    }

    pub fn total(&self) -> usize {
        self.by_step.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_step.is_empty()
    }

    /// Byte ranges highlighted within the text node at `text_path` of `step`.
    pub fn ranges_for(&self, step: usize, text_path: &[usize]) -> Vec<Range<usize>> {
        self.for_step(step)
            .iter()
            .filter(|h| h.text_path == text_path)
            .map(|h| h.range.clone())
            .collect()
    }

    fn insert(&mut self, step: usize, highlights: Vec<Highlight>) {
        if !highlights.is_empty() {
            self.by_step.insert(step, highlights);
        }
    }

    fn clear(&mut self) {
        self.by_step.clear();
    }
}

/// Result of a [`SearchEngine::search`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty query; highlight state left as it was
    Skipped,
    Applied { steps: usize, highlights: usize },
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    size_limit: usize,
    query: Option<String>,
    arena: HighlightArena,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_LIMIT)
    }
}

impl SearchEngine {
    pub fn new(size_limit: usize) -> Self {
        Self {
            size_limit,
            query: None,
            arena: HighlightArena::default(),
        }
    }

    /// Compile `query` as a literal, case-insensitive pattern.
    pub fn compile(&self, query: &str) -> Result<Regex> {
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .size_limit(self.size_limit)
            .build()?;
        Ok(pattern)
    }

    /// Search `panels` (step index, panel element) for `query`.
    ///
    /// An empty query is skipped. A pattern that fails to compile leaves the
    /// previous highlights in place.
    pub fn search<'a, I>(&mut self, panels: I, query: &str) -> Result<SearchOutcome>
    where
        I: IntoIterator<Item = (usize, &'a Element)>,
    {
        if query.is_empty() {
            return Ok(SearchOutcome::Skipped);
        }

        let pattern = self.compile(query)?;
        self.arena.clear();

        for (step, panel) in panels {
            if !pattern.is_match(&panel.text_content()) {
                continue;
            }
            let highlights = panel
                .text_nodes()
                .into_iter()
                .flat_map(|(text_path, text)| {
                    pattern
                        .find_iter(text)
                        .filter(|m| !m.range().is_empty())
                        .map(move |m| Highlight {
                            text_path: text_path.clone(),
                            range: m.range(),
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
            self.arena.insert(step, highlights);
        }

        self.query = Some(query.to_string());
        let outcome = SearchOutcome::Applied {
            steps: self.arena.by_step.len(),
            highlights: self.arena.total(),
        };
        tracing::debug!(query, ?outcome, "search applied");
        Ok(outcome)
    }

    /// Remove every highlight of the last search.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.query = None;
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn highlights(&self) -> &HighlightArena {
        &self.arena
    }

    /// Markup of `panel` with the highlights of `step` wrapped in `<mark>`.
    pub fn highlighted_markup(&self, step: usize, panel: &Element) -> String {
        panel.to_markup_with(&mut |path, text, out| {
            for (segment, marked) in split_highlighted(text, &self.arena.ranges_for(step, path)) {
                if marked {
                    out.push_str(&format!(
                        "<{HIGHLIGHT_TAG}>{}</{HIGHLIGHT_TAG}>",
                        escape(segment)
                    ));
                } else {
                    out.push_str(&escape(segment));
                }
            }
        })
    }
}

/// Split `text` into `(segment, highlighted)` runs.
///
/// `ranges` must be sorted and non-overlapping, as produced by a search.
pub fn split_highlighted<'t>(text: &'t str, ranges: &[Range<usize>]) -> Vec<(&'t str, bool)> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for range in ranges {
        if range.start < cursor || range.end > text.len() {
            continue;
        }
        if range.start > cursor {
            segments.push((&text[cursor..range.start], false));
        }
        segments.push((&text[range.clone()], true));
        cursor = range.end;
    }
    if cursor < text.len() {
        segments.push((&text[cursor..], false));
    }
    segments
}
