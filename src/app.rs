//! Terminal host for a mounted tour.
//!
//! The loop is synchronous: draw, poll for a terminal event with the configured
//! tick, route it, then flush any coalesced resize.

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;
use std::time::Duration;

use crate::config::Config;
use crate::dom::Element;
use crate::hotkeys::KeyPress;
use crate::search::SearchOutcome;
use crate::tour::{Tour, WindowEvent};
use crate::ui::terminal_guard::{install_panic_hook, TerminalGuard};
use crate::ui::{geometry_for, HelpDialog, OverlayView};
use crate::window::Window;

pub struct App {
    config: Config,
    tour: Tour,
    window: Window,
    view: OverlayView,
    help_dialog: HelpDialog,
    screen: Rect,
    should_quit: bool,
    /// Transient status line message, cleared by the next key
    message: Option<String>,
}

impl App {
    /// Mount `root` for a terminal of `size` (columns, rows).
    pub fn new(config: Config, root: Element, size: (u16, u16)) -> Result<Self> {
        let (width, height) = size;
        let mut window = Window::new(geometry_for(width, height));
        let hotkeys = config.dispatcher()?;
        let tour = Tour::mount(root, &config.tour_options(), hotkeys, &mut window)
            .context("Failed to mount tour")?;

        Ok(Self {
            view: OverlayView::new(config.ui.rail_width),
            config,
            tour,
            window,
            help_dialog: HelpDialog::new(),
            screen: Rect::new(0, 0, width, height),
            should_quit: false,
            message: None,
        })
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let mut guard = TerminalGuard::enter()?;
        let tick_rate = Duration::from_millis(self.config.ui.tick_rate_ms);

        while !self.should_quit {
            guard.terminal().draw(|f| {
                self.view.render(f, &self.tour, self.message.as_deref());
                self.help_dialog.render(f, self.tour.hotkeys());
            })?;

            if event::poll(tick_rate)? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.tour.flush();
        }

        self.tour.detach(&mut self.window);
        guard.leave();
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.handle_resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.help_dialog.visible {
            self.help_dialog.visible = false;
            return;
        }

        self.message = None;
        let focused = self.tour.navigator().search_box().is_focused();

        if focused {
            match key.code {
                KeyCode::Enter => {
                    self.submit_search();
                    return;
                }
                KeyCode::Backspace => {
                    self.tour.navigator_mut().search_box_mut().pop();
                    return;
                }
                KeyCode::Delete => {
                    let navigator = self.tour.navigator_mut();
                    navigator.search_box_mut().set_value("");
                    navigator.clear_search();
                    return;
                }
                _ => {}
            }
        } else {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('?') => {
                    self.help_dialog.toggle();
                    return;
                }
                KeyCode::Char(c) if self.tour.hotkeys().lookup(key.code).is_none() => {
                    if let Some(digit) = c.to_digit(10).filter(|d| *d > 0) {
                        self.tour.select_marker(digit as usize - 1);
                        return;
                    }
                }
                _ => {}
            }
        }

        let mut event = WindowEvent::KeyDown(KeyPress::new(key.code));
        self.tour.handle_event(&self.window, &mut event);

        // Keys the overlay did not claim reach the focused search box as text
        if let (WindowEvent::KeyDown(press), KeyCode::Char(c)) = (event, key.code) {
            let search_box = self.tour.navigator_mut().search_box_mut();
            if search_box.is_focused() && !press.default_prevented() {
                search_box.push(c);
            }
        }
    }

    fn submit_search(&mut self) {
        match self.tour.submit_search() {
            Ok(SearchOutcome::Applied { highlights: 0, .. }) => {
                self.message = Some("No matches".to_string());
            }
            Ok(_) => {}
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(index) = self.view.marker_at(self.screen, &self.tour, mouse.column, mouse.row) {
            self.tour.select_marker(index);
        }
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        let geometry = geometry_for(width, height);
        self.window.set_geometry(geometry);
        self.tour
            .handle_event(&self.window, &mut WindowEvent::Resize(geometry));
    }
}
