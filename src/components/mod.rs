//! UI components.

pub mod fireflies;
