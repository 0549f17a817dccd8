//! Search text tokenization.

/// Lower-case `raw` and split it on single spaces.
///
/// Nothing is trimmed, merged or dropped: consecutive spaces produce empty
/// words and an empty input produces one empty word. Callers short-circuit
/// on empty input before tokenizing.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.to_lowercase().split(' ').map(str::to_string).collect()
}
