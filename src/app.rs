//! Application module: the view model the terminal front-end renders.
//!
//! `App` mirrors the worker's published state. It is refreshed by polling
//! and never written to by the worker directly.

mod model;

pub use model::*;
