use crate::chunking::{recursive_split, split_by_structure, ChunkingConfig};
use crate::error::SplitError;
use crate::models::{ChunkRecord, DocumentStructure, SplitterOptions};
use crate::overlap::{apply_overlap, OverlapConfig};
use crate::patterns::PatternSet;
use crate::scoring::{enrich_chunk, EnrichmentContext};
use crate::structure::analyze_structure;
use crate::text::char_len;
use crate::traits::{Clock, SystemClock};

/// Turns raw document text into scored, filtered chunk records.
///
/// Immutable after construction, so one splitter can serve many documents
/// from many threads.
pub struct DocumentSplitter {
    options: SplitterOptions,
    patterns: PatternSet,
    clock: Box<dyn Clock>,
}

impl DocumentSplitter {
    pub fn new(options: SplitterOptions) -> Result<Self, SplitError> {
        validate_options(&options)?;

        Ok(Self {
            options,
            patterns: PatternSet::new()?,
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn options(&self) -> &SplitterOptions {
        &self.options
    }

    pub fn analyze(&self, text: &str) -> DocumentStructure {
        analyze_structure(&self.patterns, text)
    }

    /// Blank input yields no records. Any other input yields at least one:
    /// text that forms no chunk is re-cut without the minimum size, and when
    /// no candidate reaches the quality threshold the best-scoring one is kept.
    pub fn split_document(&self, text: &str, source_label: &str) -> Vec<ChunkRecord> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let structure = analyze_structure(&self.patterns, text);
        let chunking = ChunkingConfig::from(&self.options);

        let mut chunks = split_by_structure(&self.patterns, text, &structure, chunking);
        if chunks.is_empty() {
            chunks = whole_text_candidates(text.trim(), chunking);
        }

        let overlapped = apply_overlap(&chunks, OverlapConfig::from(&self.options));

        let context = EnrichmentContext {
            patterns: &self.patterns,
            structure: &structure,
            source_label,
            config: chunking,
            created_at: self.clock.now(),
        };

        let candidates = overlapped
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| enrich_chunk(&context, index, chunk))
            .collect();

        retain_by_quality(candidates, self.options.quality_threshold)
    }
}

/// Candidates for text whose every span fell below the minimum size.
fn whole_text_candidates(trimmed: &str, config: ChunkingConfig) -> Vec<String> {
    if char_len(trimmed) <= config.max_chars {
        return vec![trimmed.to_string()];
    }

    recursive_split(
        trimmed,
        ChunkingConfig {
            min_chars: 0,
            ..config
        },
    )
}

fn validate_options(options: &SplitterOptions) -> Result<(), SplitError> {
    if options.max_chunk_size == 0 {
        return Err(SplitError::InvalidConfig(
            "max_chunk_size must be greater than zero".to_string(),
        ));
    }

    if options.min_chunk_size > options.max_chunk_size {
        return Err(SplitError::InvalidConfig(format!(
            "min_chunk_size {} exceeds max_chunk_size {}",
            options.min_chunk_size, options.max_chunk_size
        )));
    }

    if options.overlap_size >= options.max_chunk_size {
        return Err(SplitError::InvalidConfig(format!(
            "overlap_size {} must be smaller than max_chunk_size {}",
            options.overlap_size, options.max_chunk_size
        )));
    }

    if !options.quality_threshold.is_finite() || options.quality_threshold < 0.0 {
        return Err(SplitError::InvalidConfig(format!(
            "quality_threshold must be a non-negative number, got {}",
            options.quality_threshold
        )));
    }

    Ok(())
}

/// Keeps records at or above `threshold` in their original order; falls back
/// to the single best record (first one on ties) when none qualify.
fn retain_by_quality(mut candidates: Vec<ChunkRecord>, threshold: f64) -> Vec<ChunkRecord> {
    if candidates.iter().any(|record| record.quality_score >= threshold) {
        candidates.retain(|record| record.quality_score >= threshold);
        return candidates;
    }

    let mut best: Option<usize> = None;
    for (index, record) in candidates.iter().enumerate() {
        let is_better = best.map_or(true, |current| {
            record.quality_score > candidates[current].quality_score
        });
        if is_better {
            best = Some(index);
        }
    }

    match best {
        Some(index) => vec![candidates.swap_remove(index)],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::traits::FixedClock;
    use chrono::{TimeZone, Utc};

    fn splitter(options: SplitterOptions) -> DocumentSplitter {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        DocumentSplitter::new(options)
            .expect("valid options")
            .with_clock(FixedClock(instant))
    }

    fn options(max: usize, min: usize, overlap: usize, threshold: f64) -> SplitterOptions {
        SplitterOptions {
            max_chunk_size: max,
            min_chunk_size: min,
            overlap_size: overlap,
            quality_threshold: threshold,
            ..SplitterOptions::default()
        }
    }

    fn long_document() -> String {
        let mut text = String::new();
        for part in 1..=4 {
            text.push_str(&format!("# Part {part}\n"));
            text.push_str("This part opens with ordinary prose. It keeps going for a while so the span grows. ");
            text.push_str(&"Filler words make the section longer than the limit allows. ".repeat(6));
            text.push_str("\n\n");
            for item in 1..=5 {
                text.push_str(&format!(
                    "{item}. Item {item} of part {part} lists requirements in a single line of text.\n"
                ));
            }
            text.push_str(&format!("{}\n", "unbroken".repeat(60)));
        }
        text
    }

    #[test]
    fn single_header_document_yields_one_titled_chunk() {
        let splitter = splitter(options(1000, 10, 150, 0.5));
        let records = splitter.split_document(
            "# Title\n\nBody sentence one. Body sentence two.\n",
            "a.txt",
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].document_title, "Title");
        assert!(records[0].header_summary.has_hierarchy);
        assert_eq!(records[0].source_label, "a.txt");
        assert_eq!(records[0].sequence_index, 0);
    }

    #[test]
    fn oversized_sections_split_on_paragraphs_before_their_items() {
        let mut text = String::new();
        let mut expected = Vec::new();
        for section in 1..=3 {
            let heading = format!("## Section {section}");
            let paragraphs: Vec<String> = (1..=3)
                .map(|k| {
                    format!(
                        "Paragraph {k} of section {section} explains the rule in plain words and keeps going a little longer than needed."
                    )
                })
                .collect();

            text.push_str(&format!("{heading}\n{}\n", paragraphs.join("\n\n")));
            expected.push(format!("{heading}\n{}\n{}", paragraphs[0], paragraphs[1]));
            expected.push(paragraphs[2].clone());

            for number in 1..=4 {
                let item = format!(
                    "{number}. Requirement {number} of section {section} is described in one line of plain words here."
                );
                text.push_str(&item);
                text.push('\n');
                expected.push(item);
            }
        }

        let splitter = splitter(options(300, 50, 0, 0.0));
        let records = splitter.split_document(&text, "b.txt");

        let contents: Vec<&str> = records.iter().map(|record| record.content.as_str()).collect();
        assert_eq!(contents, expected);
        assert!(records.iter().all(|record| record.length <= 300));
    }

    #[test]
    fn undersized_sections_fall_back_to_bounded_pieces() {
        let text: String = (1..=60)
            .map(|n| format!("{n}. item number {n} here\n"))
            .collect();

        let splitter = splitter(options(500, 100, 150, 0.0));
        let records = splitter.split_document(&text, "g.txt");

        assert!(records.len() >= 3, "expected several records, got {}", records.len());
        assert!(records[0].content.starts_with("1. item number 1 here"));
        for record in &records {
            assert!(record.length as f64 <= 500.0 * 1.2, "too long: {}", record.length);
        }
    }

    #[test]
    fn undersized_input_survives_as_single_fallback_chunk() {
        let splitter = splitter(options(1000, 100, 150, 0.5));
        let records = splitter.split_document("Tiny text.", "c.txt");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "Tiny text.");
        assert!(records[0].quality_score < 0.5);
        assert!((records[0].quality_score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn overlap_snaps_past_the_last_sentence_end() {
        let tail = "and then the text keeps going on without any stop for quite a long way ahead xyz";
        let first = format!("Opening sentence here. {tail}");
        let second = "Closing paragraph words that fill out the second chunk nicely and keep it well above the minimum size for this test run";
        let text = format!("{first}\n\n{second}");

        let splitter = splitter(options(200, 20, 50, 0.0));
        let records = splitter.split_document(&text, "d.txt");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, first);
        assert_eq!(records[1].content, format!("{tail}\n{second}"));
    }

    #[test]
    fn identical_input_produces_identical_records() {
        let text = long_document();
        let options = options(400, 40, 60, 0.2);

        let first = splitter(options.clone()).split_document(&text, "doc.txt");
        let second = splitter(options).split_document(&text, "doc.txt");

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn emitted_chunks_stay_within_soft_bounds() {
        let splitter = splitter(options(400, 40, 60, 0.0));
        let records = splitter.split_document(&long_document(), "doc.txt");

        assert!(records.len() > 4);
        for record in &records {
            assert!(record.length >= 40, "too short: {}", record.length);
            assert!(record.length as f64 <= 400.0 * 1.2, "too long: {}", record.length);
        }
    }

    #[test]
    fn scores_are_bounded_and_order_is_preserved() {
        let splitter = splitter(options(400, 40, 60, 0.3));
        let records = splitter.split_document(&long_document(), "doc.txt");

        assert!(records
            .windows(2)
            .all(|pair| pair[0].sequence_index < pair[1].sequence_index));

        for record in &records {
            for score in [
                record.quality_score,
                record.readability,
                record.information_density,
                record.structural_richness,
                record.script_purity,
            ] {
                assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
            }
        }
    }

    #[test]
    fn non_blank_input_always_yields_a_record() {
        let splitter = splitter(options(200, 50, 20, 1.0));
        for text in ["x", "  a  ", "ภาษาไทย", "word ".repeat(200).as_str()] {
            assert!(
                !splitter.split_document(text, "e.txt").is_empty(),
                "no records for {text:?}"
            );
        }
    }

    #[test]
    fn blank_input_yields_nothing() {
        let splitter = splitter(SplitterOptions::default());
        assert!(splitter.split_document("   \n\t ", "blank.txt").is_empty());
        assert!(splitter.split_document("", "blank.txt").is_empty());
    }

    #[test]
    fn thai_resolution_document_is_classified() {
        let text = "# มติคณะกรรมการสภาวิชาการ\n\
                    ### เรื่อง ขอความเห็นชอบการปรับปรุงหลักสูตร\n\
                    ที่ประชุมพิจารณาแล้วมีมติเห็นชอบตามที่เสนอ และอนุมัติให้ดำเนินการต่อไป\n";
        let splitter = splitter(options(1000, 10, 100, 0.0));
        let structure = splitter.analyze(text);
        let records = splitter.split_document(text, "meeting/1.txt");

        assert_eq!(structure.title, "มติคณะกรรมการสภาวิชาการ");
        assert_eq!(structure.document_type, DocumentType::Resolution);
        assert!(records.iter().all(|r| r.document_type == DocumentType::Resolution));
        assert!(records.iter().all(|r| r.script_purity > 0.5));
    }

    #[test]
    fn fallback_prefers_the_first_best_record() {
        let splitter = splitter(options(200, 10, 0, 0.0));
        let mut records = splitter.split_document("Some words here. More words there.", "f.txt");
        let mut twin = records[0].clone();
        twin.sequence_index = 1;
        records.push(twin);

        let kept = retain_by_quality(records, 2.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sequence_index, 0);
    }

    #[test]
    fn invalid_options_are_rejected() {
        assert!(DocumentSplitter::new(options(0, 0, 0, 0.5)).is_err());
        assert!(DocumentSplitter::new(options(100, 200, 10, 0.5)).is_err());
        assert!(DocumentSplitter::new(options(100, 10, 100, 0.5)).is_err());
        assert!(DocumentSplitter::new(options(100, 10, 10, f64::NAN)).is_err());
        assert!(DocumentSplitter::new(SplitterOptions::default()).is_ok());
    }
}
