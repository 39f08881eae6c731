//! Terminal UI: rendering and keyboard handling.

pub mod input;
pub mod render;
pub mod styles;
