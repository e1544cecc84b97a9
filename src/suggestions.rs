//! Rewrite hints for common wordy patterns.
//!
//! Independent of token count. Each rule adds at most one fixed hint, in
//! declaration order; any combination of rules may fire.

const FILLER_WORDS: [&str; 6] = ["very", "really", "just", "actually", "basically", "literally"];

const PASSIVE_MARKERS: [&str; 5] = ["is being", "was being", "has been", "have been", "will be"];

/// Combined `!` and `?` count above which punctuation is flagged.
const MAX_EMPHATIC_MARKS: usize = 3;

/// Character length above which a prompt is considered long.
const LONG_PROMPT_CHARS: usize = 500;

/// Scan `text` for wordy patterns and return actionable hints.
pub fn generate_optimization_suggestions(text: &str) -> Vec<String> {
    let mut suggestions = Vec::new();
    let lower = text.to_lowercase();

    // Only space-delimited occurrences count, so a filler word at the very
    // start or end of the text is not matched.
    if FILLER_WORDS
        .iter()
        .any(|word| lower.contains(&format!(" {word} ")))
    {
        suggestions.push(r#"Remove filler words like "very", "really", "just", etc."#.to_string());
    }

    if text.contains("in order to") {
        suggestions.push(r#"Replace "in order to" with "to""#.to_string());
    }

    if text.contains("due to the fact that") {
        suggestions.push(r#"Replace "due to the fact that" with "because""#.to_string());
    }

    if PASSIVE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        suggestions.push("Consider using active voice instead of passive voice".to_string());
    }

    let emphatic = text.chars().filter(|c| matches!(c, '!' | '?')).count();
    if emphatic > MAX_EMPHATIC_MARKS {
        suggestions.push("Reduce excessive punctuation marks".to_string());
    }

    if text.chars().count() > LONG_PROMPT_CHARS {
        suggestions.push("Break long prompts into smaller, focused requests".to_string());
        suggestions.push("Remove any redundant context or examples".to_string());
    }

    suggestions
}
