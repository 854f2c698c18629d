use crate::models::{DocumentStructure, SplitterOptions};
use crate::patterns::PatternSet;
use crate::text::{char_len, fixed_windows};

/// Separator cascade for the recursive fallback. The empty separator is a
/// fixed-width cut and must stay last.
const FALLBACK_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub min_chars: usize,
}

impl From<&SplitterOptions> for ChunkingConfig {
    fn from(value: &SplitterOptions) -> Self {
        Self {
            max_chars: value.max_chunk_size,
            min_chars: value.min_chunk_size,
        }
    }
}

/// Cuts `text` into section spans and subdivides the oversized ones.
///
/// Spans shorter than `min_chars` are dropped rather than merged into a
/// neighbour, and text before the first detected section is not emitted.
pub fn split_by_structure(
    patterns: &PatternSet,
    text: &str,
    structure: &DocumentStructure,
    config: ChunkingConfig,
) -> Vec<String> {
    if structure.sections.is_empty() {
        return recursive_split(text, config);
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut chunks = Vec::new();

    for (index, section) in structure.sections.iter().enumerate() {
        let end_line = structure
            .sections
            .get(index + 1)
            .map_or(lines.len(), |next| next.start_line);

        let joined = lines[section.start_line..end_line].join("\n");
        let content = joined.trim();
        let length = char_len(content);

        if length > config.max_chars {
            chunks.extend(split_oversized(patterns, content, config));
        } else if length >= config.min_chars {
            chunks.push(content.to_string());
        }
    }

    chunks
}

/// Tries each split strategy in priority order and packs the pieces of the
/// first one that actually cuts the content.
pub fn split_oversized(patterns: &PatternSet, content: &str, config: ChunkingConfig) -> Vec<String> {
    for strategy in &patterns.strategies {
        let pieces: Vec<&str> = strategy
            .split(content)
            .into_iter()
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .collect();

        if pieces.len() <= 1 {
            continue;
        }

        let packed: Vec<String> = pack_pieces(&pieces, config)
            .into_iter()
            .filter(|chunk| char_len(chunk) >= config.min_chars)
            .collect();

        if packed.is_empty() {
            continue;
        }

        // a single piece can still be larger than the bound
        return packed
            .into_iter()
            .flat_map(|chunk| {
                if char_len(&chunk) > config.max_chars {
                    recursive_split(&chunk, config)
                } else {
                    vec![chunk]
                }
            })
            .collect();
    }

    recursive_split(content, config)
}

fn pack_pieces(pieces: &[&str], config: ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(piece);

        if current.is_empty() {
            current.push_str(piece);
            current_len = piece_len;
            continue;
        }

        if current_len + 1 + piece_len <= config.max_chars {
            current.push('\n');
            current.push_str(piece);
            current_len += 1 + piece_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(piece);
            current_len = piece_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Separator-cascade splitter used when no structural signal applies.
pub fn recursive_split(text: &str, config: ChunkingConfig) -> Vec<String> {
    split_with_separators(text, &FALLBACK_SEPARATORS, config)
}

fn split_with_separators(text: &str, separators: &[&str], config: ChunkingConfig) -> Vec<String> {
    let length = char_len(text);
    if length <= config.max_chars {
        return if length >= config.min_chars {
            vec![text.to_string()]
        } else {
            Vec::new()
        };
    }

    // `remaining` is strictly shorter than `separators`, which bounds the recursion.
    let Some((separator, remaining)) = separators.split_first() else {
        return fixed_windows(text, config.max_chars);
    };

    let pieces: Vec<String> = if separator.is_empty() {
        fixed_windows(text, config.max_chars)
    } else {
        text.split(separator).map(str::to_string).collect()
    };

    let mut kept = Vec::new();
    for piece in pieces {
        let piece_len = char_len(&piece);
        if piece_len > config.max_chars {
            kept.extend(split_with_separators(&piece, remaining, config));
        } else if piece_len >= config.min_chars {
            kept.push(piece);
        }
    }

    merge_splits(&kept, separator, config)
}

/// Greedily re-joins pieces along the separator that produced them.
fn merge_splits(splits: &[String], separator: &str, config: ChunkingConfig) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for split in splits {
        let split = split.trim();
        if split.is_empty() {
            continue;
        }

        let split_len = char_len(split);
        let joiner_len = if current.is_empty() { 0 } else { separator_len };
        let potential_len = current_len + joiner_len + split_len;

        if potential_len <= config.max_chars {
            current.push(split);
            current_len = potential_len;
        } else {
            flush_merged(&mut chunks, &current, separator, config);
            current = vec![split];
            current_len = split_len;
        }
    }

    flush_merged(&mut chunks, &current, separator, config);
    chunks
}

fn flush_merged(chunks: &mut Vec<String>, parts: &[&str], separator: &str, config: ChunkingConfig) {
    if parts.is_empty() {
        return;
    }

    let merged = parts.join(separator);
    if char_len(&merged) >= config.min_chars {
        chunks.push(merged);
    }
}
