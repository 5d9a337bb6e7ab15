//! Reusable widgets shared across screens.

pub mod confirm_modal;
pub mod text_input;
