//! Presentation-side input checks shared by board front ends.
//!
//! The board itself stores whatever name it is given; front ends run
//! user text through here before calling `add_task` or `update_task`.

/// Trims `input`, returning `None` when nothing is left.
pub fn normalize_task_name(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
