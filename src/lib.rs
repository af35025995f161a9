//! Stepwise - guided tours overlaid on an embedded document
//!
//! A tour is a sequence of step panels shown over an embedded frame, with a
//! progress rail, keyboard navigation and text search. The library holds the
//! overlay model; the binary hosts it in a terminal.

pub mod app;
pub mod config;
pub mod dom;
pub mod error;
pub mod frame;
pub mod hotkeys;
pub mod indicator;
pub mod logging;
pub mod manifest;
pub mod navigator;
pub mod search;
pub mod tour;
pub mod ui;
pub mod window;

pub use error::{Result, TourError};
pub use navigator::StepNavigator;
pub use tour::{Tour, TourOptions, WindowEvent};
