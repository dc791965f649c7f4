//! Terminal output helpers

pub mod terminal;

pub use terminal::{colors, Painter, RESET};
