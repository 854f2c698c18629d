use crate::models::SplitterOptions;
use crate::text::{char_len, last_chars};

const SENTENCE_TERMINATORS: [char; 4] = ['.', '!', '?', '。'];

/// Extra chars searched for a sentence end beyond the overlap window.
const SENTENCE_SEARCH_SLACK: usize = 50;

/// Overlapped chunks may exceed the max size by this factor.
const OVERLAP_GROWTH_LIMIT: f64 = 1.2;

#[derive(Debug, Clone, Copy)]
pub struct OverlapConfig {
    pub overlap_chars: usize,
    pub max_chars: usize,
}

impl From<&SplitterOptions> for OverlapConfig {
    fn from(value: &SplitterOptions) -> Self {
        Self {
            overlap_chars: value.overlap_size,
            max_chars: value.max_chunk_size,
        }
    }
}

/// Prepends a boundary-snapped tail of each chunk to the chunk after it.
///
/// The output has the same length and order as the input. Tails always come
/// from the un-overlapped previous chunk.
pub fn apply_overlap(chunks: &[String], config: OverlapConfig) -> Vec<String> {
    let growth_limit = config.max_chars as f64 * OVERLAP_GROWTH_LIMIT;

    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            if index == 0 || config.overlap_chars == 0 {
                return chunk.clone();
            }

            let snapped = snap_overlap(&chunks[index - 1], config.overlap_chars);
            if snapped.is_empty() {
                return chunk.clone();
            }

            let combined = format!("{snapped}\n{chunk}");
            if char_len(&combined) as f64 <= growth_limit {
                combined
            } else {
                chunk.clone()
            }
        })
        .collect()
}

/// Picks the tail of `previous` to reuse as leading context.
///
/// Prefers the text after the last sentence end near the tail, then the last
/// word of the tail, then the raw tail. A chunk ending on a sentence end
/// yields an empty tail.
pub fn snap_overlap(previous: &str, overlap_chars: usize) -> String {
    let window = last_chars(previous, overlap_chars + SENTENCE_SEARCH_SLACK);
    if let Some((index, terminator)) = window
        .char_indices()
        .rev()
        .find(|(_, c)| SENTENCE_TERMINATORS.contains(c))
    {
        return window[index + terminator.len_utf8()..].trim().to_string();
    }

    let tail = last_chars(previous, overlap_chars);
    if let Some(space) = tail.rfind(' ') {
        let from_space = tail[space..].trim();
        if !from_space.is_empty() {
            return from_space.to_string();
        }
    }

    tail.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(overlap_chars: usize, max_chars: usize) -> OverlapConfig {
        OverlapConfig {
            overlap_chars,
            max_chars,
        }
    }

    #[test]
    fn first_chunk_passes_through_and_length_is_preserved() {
        let chunks = vec![
            "First chunk. With a tail".to_string(),
            "Second chunk".to_string(),
            "Third chunk".to_string(),
        ];
        let overlapped = apply_overlap(&chunks, config(20, 1000));

        assert_eq!(overlapped.len(), 3);
        assert_eq!(overlapped[0], chunks[0]);
        assert_eq!(overlapped[1], "With a tail\nSecond chunk");
    }

    #[test]
    fn overlap_starts_after_sentence_end_beyond_raw_cutoff() {
        let tail = "and then the text keeps going on without any stop for quite a long way ahead xyz";
        assert_eq!(char_len(tail), 80);
        let previous = format!("Opening sentence here. {tail}");
        let chunks = vec![previous.clone(), "Next chunk body.".to_string()];

        let overlapped = apply_overlap(&chunks, config(50, 1000));

        assert_eq!(overlapped[1], format!("{tail}\nNext chunk body."));
        assert!(!overlapped[1].starts_with(last_chars(&previous, 50)));
    }

    #[test]
    fn trailing_terminator_leaves_nothing_to_carry() {
        assert_eq!(snap_overlap("First one. Second one.", 30), "");

        let chunks = vec!["First one. Second one.".to_string(), "Next chunk".to_string()];
        assert_eq!(apply_overlap(&chunks, config(30, 1000)), chunks);
    }

    #[test]
    fn word_boundary_is_used_without_sentence_end() {
        assert_eq!(snap_overlap("alpha beta gamma delta", 10), "delta");
    }

    #[test]
    fn raw_tail_is_used_without_any_boundary() {
        assert_eq!(snap_overlap("abcdefghijklmnop", 5), "lmnop");
    }

    #[test]
    fn thai_full_stop_counts_as_sentence_end() {
        assert_eq!(snap_overlap("ประโยคแรก。ประโยคที่สอง", 10), "ประโยคที่สอง");
    }

    #[test]
    fn oversized_combination_keeps_chunk_unchanged() {
        let chunks = vec!["Lead words here".to_string(), "x".repeat(20)];
        let overlapped = apply_overlap(&chunks, config(10, 20));
        assert_eq!(overlapped[1], chunks[1]);
    }

    #[test]
    fn zero_overlap_disables_stitching() {
        let chunks = vec!["one. two".to_string(), "three".to_string()];
        assert_eq!(apply_overlap(&chunks, config(0, 100)), chunks);
    }
}
