//! Character-based helpers. Every length in this crate counts chars, never
//! bytes, so Thai and ASCII text are bounded the same way.

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The trailing `count` chars of `text`, or all of it when shorter.
pub fn last_chars(text: &str, count: usize) -> &str {
    let length = char_len(text);
    if length <= count {
        return text;
    }

    text.char_indices()
        .nth(length - count)
        .map_or(text, |(index, _)| &text[index..])
}

/// Cuts `text` into consecutive windows of at most `width` chars.
pub fn fixed_windows(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|window| window.iter().collect())
        .collect()
}
