//! Input actions.
//!
//! The desktop app translates raw key events into [`Action`]s; the render
//! state only ever consumes actions.

pub mod action;

pub use action::Action;
