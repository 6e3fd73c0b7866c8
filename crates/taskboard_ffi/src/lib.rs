//! Flutter bridge for the task board core.

pub mod api;
