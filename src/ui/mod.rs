pub mod help;
pub mod overlay;
pub mod terminal_guard;

pub use help::HelpDialog;
pub use overlay::OverlayView;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::frame::{self, Geometry};

/// Rows taken by the header line above the viewport
pub const HEADER_HEIGHT: u16 = 1;
/// Rows taken by the status line below the viewport
pub const STATUS_HEIGHT: u16 = 1;

/// Split the screen into header, viewport and status line.
pub fn screen_layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Host geometry for a terminal of `width` x `height` cells.
pub fn geometry_for(width: u16, height: u16) -> Geometry {
    let [_, viewport, _] = screen_layout(Rect::new(0, 0, width, height));
    Geometry {
        window: (u32::from(width), u32::from(height)),
        viewport: frame::Rect {
            x: u32::from(viewport.x),
            y: u32::from(viewport.y),
            width: u32::from(viewport.width),
            height: u32::from(viewport.height),
        },
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
