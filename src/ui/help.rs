use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use crate::hotkeys::{HotkeyDispatcher, OperationCategory};

pub struct HelpDialog {
    pub visible: bool,
}

impl Default for HelpDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpDialog {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Help text for the bindings of `hotkeys`, grouped by category.
    pub fn lines(hotkeys: &HotkeyDispatcher) -> Vec<Line<'static>> {
        let heading = Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan);
        let mut help_text = vec![Line::from(Span::styled("Keyboard Shortcuts", heading)), Line::from("")];

        for (category, shortcuts) in hotkeys.shortcuts_by_category() {
            if category != OperationCategory::Navigation {
                help_text.push(Line::from(""));
            }
            help_text.push(Line::from(Span::styled(
                format!("{}:", category.display_name()),
                heading,
            )));
            for shortcut in shortcuts {
                help_text.push(Line::from(vec![
                    Span::styled(
                        shortcut.key_display_padded(),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::raw(shortcut.operation.description()),
                ]));
            }
        }

        help_text.push(Line::from(""));
        help_text.push(Line::from(vec![
            Span::styled(format!("{:<7}", "?"), Style::default().fg(Color::Yellow)),
            Span::raw("Toggle this help"),
        ]));
        help_text.push(Line::from(vec![
            Span::styled(format!("{:<7}", "q"), Style::default().fg(Color::Yellow)),
            Span::raw("Quit"),
        ]));
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::Gray),
        )));
        help_text
    }

    pub fn render(&self, frame: &mut Frame, hotkeys: &HotkeyDispatcher) {
        if !self.visible {
            return;
        }

        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);

        let help = Paragraph::new(Self::lines(hotkeys))
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .alignment(Alignment::Left);

        frame.render_widget(help, area);
    }
}
