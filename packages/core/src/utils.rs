// ABOUTME: Shared utility functions for Reqflow
// ABOUTME: Collision-resistant ID generation and log-safe string truncation

use crate::constants::SCENARIO_ID_PREFIX;

/// Generate a scenario id like `SCN-V1StGXR8_Z5j`
pub fn generate_scenario_id() -> String {
    format!("{}-{}", SCENARIO_ID_PREFIX, nanoid::nanoid!(12))
}

/// Generate an id for a pending scenario edit
pub fn generate_edit_id() -> String {
    format!("edit-{}", nanoid::nanoid!(10))
}

/// Generate an id for an uploaded intake file
pub fn generate_file_id() -> String {
    format!("file-{}", nanoid::nanoid!(10))
}

/// Truncate text to at most `max_chars` characters for logging
pub fn truncate_for_log(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_scenario_id() {
        let id = generate_scenario_id();
        assert!(id.starts_with("SCN-"));
        assert_eq!(id.len(), "SCN-".len() + 12);
    }

    #[test]
    fn test_rapid_ids_do_not_collide() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_scenario_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        assert_eq!(truncate_for_log("héllo wörld", 4), "héll");
        assert_eq!(truncate_for_log("short", 100), "short");
        assert_eq!(truncate_for_log("", 3), "");
    }
}
