// ABOUTME: Combines channel contributions into the single requirements document
// ABOUTME: Ready parts in order, blank parts dropped, joined by a blank line

use crate::source::{DocumentSource, SourceContent};

pub const PART_SEPARATOR: &str = "\n\n";

/// Join the ready contents of `sources` in order.
///
/// Pending and failed sources contribute nothing, so the result only ever
/// reflects text that is actually available. Calling it twice over the same
/// sources yields the same document.
pub fn combine_requirements(sources: &[&dyn DocumentSource]) -> String {
    sources
        .iter()
        .filter_map(|source| match source.content_ready() {
            SourceContent::Ready(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR)
}
