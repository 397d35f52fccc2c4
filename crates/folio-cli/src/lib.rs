//! Library components of the folio command-line tool.

pub mod dialogs;
pub mod engine;
pub mod logging;
pub mod plan;
pub mod render;
pub mod settings;
