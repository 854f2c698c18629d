use crate::chunking::ChunkingConfig;
use crate::models::{ChunkRecord, DocumentStructure, HeaderSummary, SectionKind};
use crate::patterns::{is_thai_char, PatternSet};
use crate::structure::{classify_category, extract_course_codes};
use crate::text::char_len;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

const READABILITY_WEIGHT: f64 = 0.25;
const DENSITY_WEIGHT: f64 = 0.25;
const STRUCTURE_WEIGHT: f64 = 0.25;
const SCRIPT_WEIGHT: f64 = 0.25;

const TABLE_BONUS: f64 = 0.10;
const COURSE_CODE_BONUS: f64 = 0.10;
const HEADER_BONUS: f64 = 0.05;

const MAX_TOPICS: usize = 10;
const CONTENT_HASH_LEN: usize = 12;

/// Per-chunk sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChunkAnalysis {
    pub readability: f64,
    pub information_density: f64,
    pub structural_richness: f64,
    pub script_purity: f64,
}

impl ChunkAnalysis {
    fn weighted(&self) -> f64 {
        self.readability * READABILITY_WEIGHT
            + self.information_density * DENSITY_WEIGHT
            + self.structural_richness * STRUCTURE_WEIGHT
            + self.script_purity * SCRIPT_WEIGHT
    }
}

/// Structural features that earn a quality bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralSignals {
    pub contains_table: bool,
    pub contains_course_codes: bool,
    pub has_headers: bool,
}

pub fn analyze_chunk(patterns: &PatternSet, chunk: &str) -> ChunkAnalysis {
    if chunk.trim().is_empty() {
        return ChunkAnalysis::default();
    }

    ChunkAnalysis {
        readability: readability(patterns, chunk),
        information_density: information_density(chunk),
        structural_richness: structural_richness(patterns, chunk),
        script_purity: script_purity(chunk),
    }
}

/// Peaks at around ten words per sentence.
fn readability(patterns: &PatternSet, chunk: &str) -> f64 {
    let sentence_lengths: Vec<usize> = patterns
        .sentence_terminator
        .split(chunk)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(|sentence| sentence.split_whitespace().count())
        .collect();

    if sentence_lengths.is_empty() {
        return 0.0;
    }

    let mean = sentence_lengths.iter().sum::<usize>() as f64 / sentence_lengths.len() as f64;
    (1.0 - (mean - 10.0) / 20.0).clamp(0.0, 1.0)
}

fn information_density(chunk: &str) -> f64 {
    let words: Vec<&str> = chunk.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let unique: HashSet<&str> = words.iter().copied().collect();
    unique.len() as f64 / words.len() as f64
}

fn structural_richness(patterns: &PatternSet, chunk: &str) -> f64 {
    let indicators = patterns.thai_numbered_marker.find_iter(chunk).count()
        + patterns.header_marker.find_iter(chunk).count()
        + chunk.matches("\n\n").count();

    (indicators as f64 / 5.0).min(1.0)
}

/// Share of non-whitespace chars written in Thai script.
fn script_purity(chunk: &str) -> f64 {
    let mut thai = 0usize;
    let mut visible = 0usize;

    for c in chunk.chars().filter(|c| !c.is_whitespace()) {
        visible += 1;
        if is_thai_char(c) {
            thai += 1;
        }
    }

    if visible == 0 {
        0.0
    } else {
        thai as f64 / visible as f64
    }
}

pub fn quality_score(
    analysis: &ChunkAnalysis,
    signals: StructuralSignals,
    length: usize,
    config: ChunkingConfig,
) -> f64 {
    let mut score = analysis.weighted();

    if length < config.min_chars {
        score *= 0.5;
    } else if length as f64 > config.max_chars as f64 * 1.5 {
        score *= 0.7;
    }

    if signals.contains_table {
        score += TABLE_BONUS;
    }
    if signals.contains_course_codes {
        score += COURSE_CODE_BONUS;
    }
    if signals.has_headers {
        score += HEADER_BONUS;
    }

    score.clamp(0.0, 1.0)
}

pub fn header_summary(patterns: &PatternSet, chunk: &str) -> HeaderSummary {
    let mut summary = HeaderSummary::default();

    for line in chunk.split('\n').map(str::trim) {
        match patterns.header_kind(line) {
            Some(SectionKind::MainHeader) => summary.main_headers.push(line.to_string()),
            Some(SectionKind::SubHeader) => summary.sub_headers.push(line.to_string()),
            Some(SectionKind::SubSubHeader) => summary.sub_sub_headers.push(line.to_string()),
            _ => {}
        }
    }

    summary.has_hierarchy = summary.total() > 0;
    summary
}

/// Course codes first, then programme, subject and organisation names.
pub fn extract_topics(patterns: &PatternSet, chunk: &str, course_codes: &IndexSet<String>) -> Vec<String> {
    let mut topics: IndexSet<String> = course_codes
        .iter()
        .filter(|code| char_len(code) > 2)
        .cloned()
        .collect();

    for pattern in &patterns.topics {
        for captures in pattern.regex.captures_iter(chunk) {
            let Some(found) = captures.get(1) else {
                continue;
            };

            let topic = found.as_str().trim();
            let length = char_len(topic);
            if length > 2 && length > pattern.min_exclusive_len {
                topics.insert(topic.to_string());
            }
        }
    }

    topics.into_iter().take(MAX_TOPICS).collect()
}

pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..CONTENT_HASH_LEN].to_string()
}

/// Document-level values shared by every chunk of one `split_document` call.
pub struct EnrichmentContext<'a> {
    pub patterns: &'a PatternSet,
    pub structure: &'a DocumentStructure,
    pub source_label: &'a str,
    pub config: ChunkingConfig,
    pub created_at: DateTime<Utc>,
}

pub fn enrich_chunk(context: &EnrichmentContext<'_>, sequence_index: usize, content: String) -> ChunkRecord {
    let patterns = context.patterns;
    let length = char_len(&content);
    let analysis = analyze_chunk(patterns, &content);
    let header_summary = header_summary(patterns, &content);
    let course_codes = extract_course_codes(patterns, &content);

    let signals = StructuralSignals {
        contains_table: patterns.is_table(&content),
        contains_course_codes: !course_codes.is_empty(),
        has_headers: header_summary.has_hierarchy,
    };

    ChunkRecord {
        sequence_index,
        content_hash: content_hash(&content),
        length,
        word_count: content.split_whitespace().count(),
        source_label: context.source_label.to_string(),
        document_title: context.structure.title.clone(),
        document_type: context.structure.document_type,
        section_category: classify_category(patterns, &content),
        header_summary,
        contains_table: signals.contains_table,
        contains_course_codes: signals.contains_course_codes,
        topics: extract_topics(patterns, &content, &course_codes),
        course_codes: course_codes.into_iter().collect(),
        quality_score: quality_score(&analysis, signals, length, context.config),
        readability: analysis.readability,
        information_density: analysis.information_density,
        structural_richness: analysis.structural_richness,
        script_purity: analysis.script_purity,
        created_at: context.created_at,
        content,
    }
}
