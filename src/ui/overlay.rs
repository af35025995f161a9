//! Terminal rendering of a mounted tour.
//!
//! The embedded frame is drawn first; when the chrome is visible the current step
//! panel floats over it, and the navigation rail opens on the left.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::{centered_rect, screen_layout};
use crate::dom::Element;
use crate::frame::GeometryMode;
use crate::indicator::ProgressIndicator;
use crate::search::{split_highlighted, HighlightArena};
use crate::tour::Tour;

/// Screen regions for one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub header: Rect,
    pub viewport: Rect,
    pub status: Rect,
    pub search: Option<Rect>,
    pub gauge: Option<Rect>,
    pub rail: Option<Rect>,
    pub content: Rect,
}

pub struct OverlayView {
    rail_width: u16,
}

impl OverlayView {
    pub fn new(rail_width: u16) -> Self {
        Self { rail_width }
    }

    pub fn layout(&self, area: Rect, nav_open: bool) -> OverlayLayout {
        let [header, viewport, status] = screen_layout(area);
        if !nav_open {
            return OverlayLayout {
                header,
                viewport,
                status,
                search: None,
                gauge: None,
                rail: None,
                content: viewport,
            };
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(self.rail_width), Constraint::Min(1)])
            .split(viewport);
        let nav = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search box
                Constraint::Length(1), // Progress track
                Constraint::Min(1),    // Step rail
            ])
            .split(columns[0]);

        OverlayLayout {
            header,
            viewport,
            status,
            search: Some(nav[0]),
            gauge: Some(nav[1]),
            rail: Some(nav[2]),
            content: columns[1],
        }
    }

    /// Marker under screen cell (`column`, `row`), if the rail is open.
    pub fn marker_at<I: ProgressIndicator>(
        &self,
        area: Rect,
        tour: &Tour<I>,
        column: u16,
        row: u16,
    ) -> Option<usize> {
        let navigator = tour.navigator();
        let state = navigator.state();
        if !state.visible() {
            return None;
        }
        let rail = self.layout(area, state.nav_open()).rail?;
        let inside = column >= rail.x && column < rail.right() && row >= rail.y && row < rail.bottom();
        let index = usize::from(row.checked_sub(rail.y)?);
        (inside && index < navigator.indicator().entries().len()).then_some(index)
    }

    pub fn render<I: ProgressIndicator>(&self, frame: &mut Frame, tour: &Tour<I>, message: Option<&str>) {
        let navigator = tour.navigator();
        let state = navigator.state();
        let layout = self.layout(frame.area(), state.visible() && state.nav_open());

        self.render_embedded(frame, tour, &layout);
        self.render_header(frame, tour, layout.header);

        if state.visible() {
            if let (Some(search), Some(gauge), Some(rail)) = (layout.search, layout.gauge, layout.rail) {
                self.render_nav(frame, tour, search, gauge, rail);
            }
            self.render_step(frame, tour, layout.content);
        }

        self.render_status(frame, tour, layout.status, message);
    }

    fn render_embedded<I: ProgressIndicator>(&self, frame: &mut Frame, tour: &Tour<I>, layout: &OverlayLayout) {
        let embedded = tour.frame();
        let base = match embedded.mode() {
            GeometryMode::Viewport => layout.viewport,
            GeometryMode::Window => frame.area(),
        };
        let (width, height) = embedded.size();
        let area = Rect {
            width: base.width.min(u16::try_from(width).unwrap_or(u16::MAX)),
            height: base.height.min(u16::try_from(height).unwrap_or(u16::MAX)),
            ..base
        };

        let body = vec![
            Line::from(Span::styled(
                embedded.src().to_string(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            )),
            Line::from(Span::styled(
                format!("{}x{} ({:?})", width, height, embedded.mode()),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let widget = Paragraph::new(body).block(
            Block::default()
                .title(" Document ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(widget, area);
    }

    fn render_header<I: ProgressIndicator>(&self, frame: &mut Frame, tour: &Tour<I>, area: Rect) {
        let navigator = tour.navigator();
        let title = navigator.root().attr("data-title").unwrap_or("stepwise");
        let mut spans = vec![Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        )];
        if let Some(step) = navigator.current_step() {
            spans.push(Span::raw(format!(
                "  Step {}/{}: {}",
                step.index() + 1,
                navigator.len(),
                step.title()
            )));
        } else {
            spans.push(Span::styled("  No steps", Style::default().fg(Color::DarkGray)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_nav<I: ProgressIndicator>(
        &self,
        frame: &mut Frame,
        tour: &Tour<I>,
        search: Rect,
        gauge: Rect,
        rail: Rect,
    ) {
        let navigator = tour.navigator();
        let search_box = navigator.search_box();
        let border = if search_box.is_focused() {
            Color::Yellow
        } else {
            Color::Gray
        };
        frame.render_widget(Clear, search);
        frame.render_widget(
            Paragraph::new(search_box.value().to_string()).block(
                Block::default()
                    .title(" Search ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            ),
            search,
        );
        if search_box.is_focused() {
            let x = search.x + 1 + u16::try_from(search_box.value().chars().count()).unwrap_or(0);
            frame.set_cursor_position((x.min(search.right().saturating_sub(2)), search.y + 1));
        }

        let indicator = navigator.indicator();
        frame.render_widget(Clear, gauge);
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(indicator.track().clamp(0.0, 1.0))
                .label(format!(
                    "{}/{}",
                    indicator.selected().map_or(0, |s| s + 1),
                    indicator.entries().len()
                )),
            gauge,
        );

        let highlights = navigator.search_engine().highlights();
        let items: Vec<ListItem> = indicator
            .entries()
            .iter()
            .map(|marker| {
                let selected = indicator.selected() == Some(marker.index);
                let dot = if selected { "● " } else { "○ " };
                let style = if selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let mut spans = vec![Span::styled(format!("{}{}", dot, marker.label), style)];
                let hits = highlights.for_step(marker.index).len();
                if hits > 0 {
                    spans.push(Span::styled(
                        format!(" ({})", hits),
                        Style::default().fg(Color::Yellow),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        frame.render_widget(Clear, rail);
        frame.render_widget(List::new(items), rail);
    }

    fn render_step<I: ProgressIndicator>(&self, frame: &mut Frame, tour: &Tour<I>, content: Rect) {
        let navigator = tour.navigator();
        let Some(step) = navigator.current_step() else {
            return;
        };
        let Some(panel) = navigator.panel(step.index()) else {
            return;
        };

        let area = centered_rect(80, 70, content);
        frame.render_widget(Clear, area);
        let lines = panel_lines(panel, step.index(), navigator.search_engine().highlights());
        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!(" {} ", step.title()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(widget, area);
    }

    fn render_status<I: ProgressIndicator>(
        &self,
        frame: &mut Frame,
        tour: &Tour<I>,
        area: Rect,
        message: Option<&str>,
    ) {
        let navigator = tour.navigator();
        let hint = Style::default().fg(Color::DarkGray);
        let line = if let Some(message) = message {
            Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red)))
        } else if navigator.search_box().is_focused() {
            Line::from(vec![
                Span::styled("Search: ", Style::default().fg(Color::Yellow)),
                Span::raw(navigator.search_box().value().to_string()),
                Span::styled("  Enter search  Esc close", hint),
            ])
        } else if let Some(query) = navigator.search_engine().query() {
            let highlights = navigator.search_engine().highlights();
            Line::from(vec![
                Span::raw(format!(
                    "'{}': {} matches in {} steps",
                    query,
                    highlights.total(),
                    highlights.steps().count()
                )),
                Span::styled("  ? help  q quit", hint),
            ])
        } else if !navigator.state().visible() {
            Line::from(Span::styled("Overlay hidden  ? help  q quit", hint))
        } else {
            Line::from(Span::styled("? help  q quit", hint))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Styled lines for a step panel, with search highlights applied.
pub fn panel_lines<'a>(panel: &'a Element, step: usize, highlights: &HighlightArena) -> Vec<Line<'a>> {
    let mark = Style::default().fg(Color::Black).bg(Color::Yellow);
    let mut lines = Vec::new();

    for (path, text) in panel.text_nodes() {
        let parent = path
            .split_last()
            .and_then(|(_, parent)| panel.at_path(parent))
            .map_or("", Element::tag);
        let (prefix, style) = match parent {
            "h1" => ("", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            "h2" | "h3" | "h4" | "h5" | "h6" => ("", Style::default().add_modifier(Modifier::BOLD)),
            "code" | "pre" => ("  ", Style::default().fg(Color::Green)),
            "li" => ("• ", Style::default()),
            "aside" => ("", Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)),
            _ => ("", Style::default()),
        };

        let mut spans = Vec::new();
        if !prefix.is_empty() {
            spans.push(Span::raw(prefix));
        }
        for (segment, marked) in split_highlighted(text, &highlights.ranges_for(step, &path)) {
            spans.push(Span::styled(segment, if marked { mark } else { style }));
        }
        lines.push(Line::from(spans));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Geometry;
    use crate::hotkeys::HotkeyDispatcher;
    use crate::manifest::LOAD_ATTRIBUTE;
    use crate::tour::TourOptions;
    use crate::ui::geometry_for;
    use crate::window::Window;
    use ratatui::{backend::TestBackend, Terminal};

    fn tour(window: &mut Window) -> Tour {
        let mut root = Element::new("section").with_attr(LOAD_ATTRIBUTE, "https://example.com/app");
        for (title, body) in [("Intro", "Welcome aboard."), ("Setup", "Install the setup tool.")] {
            root.push_child(
                Element::new("article")
                    .with_child(Element::new("h1").with_text(title))
                    .with_child(Element::new("p").with_text(body)),
            );
        }
        Tour::mount(root, &TourOptions::default(), HotkeyDispatcher::default(), window).unwrap()
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn window() -> Window {
        Window::new(geometry_for(80, 24))
    }

    #[test]
    fn test_render_shows_current_step_and_document() {
        let mut window = window();
        let tour = tour(&mut window);
        let view = OverlayView::new(20);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| view.render(f, &tour, None)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("Step 1/2: Intro"));
        assert!(text.contains("Welcome aboard."));
        assert!(text.contains("https://example.com/app"));
    }

    #[test]
    fn test_hidden_overlay_shows_only_document() {
        let mut window = window();
        let mut tour = tour(&mut window);
        tour.navigator_mut().hide();
        let view = OverlayView::new(20);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| view.render(f, &tour, None)).unwrap();

        let text = screen(&terminal);
        assert!(!text.contains("Welcome aboard."));
        assert!(text.contains("Overlay hidden"));
    }

    #[test]
    fn test_panel_lines_mark_highlights() {
        let mut window = window();
        let mut tour = tour(&mut window);
        tour.navigator_mut().search("setup").unwrap();

        let navigator = tour.navigator();
        let panel = navigator.panel(1).unwrap();
        let lines = panel_lines(panel, 1, navigator.search_engine().highlights());
        let marked: Vec<&str> = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.style.bg == Some(Color::Yellow))
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(marked, vec!["Setup", "setup"]);
    }

    #[test]
    fn test_marker_hit_testing_needs_open_rail() {
        let mut window = window();
        let mut tour = tour(&mut window);
        let view = OverlayView::new(20);
        let area = Rect::new(0, 0, 80, 24);
        let rail_row = view.layout(area, true).rail.unwrap().y;

        assert_eq!(view.marker_at(area, &tour, 2, rail_row), None);
        tour.navigator_mut().toggle_nav();
        assert_eq!(view.marker_at(area, &tour, 2, rail_row), Some(0));
        assert_eq!(view.marker_at(area, &tour, 2, rail_row + 1), Some(1));
        assert_eq!(view.marker_at(area, &tour, 2, rail_row + 2), None);
        assert_eq!(view.marker_at(area, &tour, 40, rail_row), None);
    }

    #[test]
    fn test_layout_without_nav_uses_whole_viewport() {
        let view = OverlayView::new(20);
        let layout = view.layout(Rect::new(0, 0, 80, 24), false);
        assert_eq!(layout.content, layout.viewport);
        assert!(layout.rail.is_none());
        let geometry: Geometry = geometry_for(80, 24);
        assert_eq!(u32::from(layout.viewport.height), geometry.viewport.height);
    }
}
