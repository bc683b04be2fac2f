//! Heuristic gate that keeps screenshots, documents and similar non-memories
//! out of a story.

/// Substrings that mark a description as uninteresting. Matched against the
/// lowercased description, not as whole words.
pub const STOP_TERMS: [&str; 7] = [
    "screenshot",
    "text",
    "document",
    "chart",
    "diagram",
    "interface",
    "code",
];

/// Returns `true` when a description is worth turning into a memory.
pub fn is_good_memory(description: &str) -> bool {
    if description.trim().is_empty() {
        return false;
    }
    let lowered = description.to_lowercase();
    !STOP_TERMS.iter().any(|term| lowered.contains(term))
}
