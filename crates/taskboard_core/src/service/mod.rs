//! Board use-case services.
//!
//! # Responsibility
//! - Own the flat task collection and expose board mutations.
//! - Keep presentation code decoupled from storage details.

pub mod board_state;
pub mod input;
