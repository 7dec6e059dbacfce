//! egui drawing code. Everything here reads [`crate::state::AppState`] and
//! its render tree; no data is computed in this module.

pub mod panels;
pub mod plot;
pub mod view;
