use crate::ingest::ProcessedFile;
use crate::text::char_len;
use crate::ChunkRecord;
use indexmap::IndexMap;
use serde::Serialize;

const HIGH_QUALITY: f64 = 0.8;
const LOW_QUALITY: f64 = 0.5;
const TOP_TOPICS: usize = 20;
const TOP_COURSE_CODES: usize = 50;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BasicStats {
    pub total_files: usize,
    pub total_chunks: usize,
    pub avg_chunks_per_file: f64,
    pub total_content_length: usize,
    pub total_word_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SizeDistribution {
    pub min_size: usize,
    pub max_size: usize,
    pub avg_size: f64,
    pub median_size: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QualityMetrics {
    pub avg_quality: f64,
    pub avg_readability: f64,
    pub avg_info_density: f64,
    pub high_quality_chunks: usize,
    pub low_quality_chunks: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContentAnalysis {
    pub document_types: IndexMap<String, usize>,
    pub section_categories: IndexMap<String, usize>,
    pub files_with_tables: usize,
    pub files_with_course_codes: usize,
    pub chunks_with_headers: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct HeaderAnalysis {
    pub main_headers_count: usize,
    pub sub_headers_count: usize,
    pub sub_sub_headers_count: usize,
}

/// Corpus-level view over the chunks of many documents.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorpusStatistics {
    pub basic_stats: BasicStats,
    pub chunk_size_distribution: SizeDistribution,
    pub quality_scores: QualityMetrics,
    pub content_analysis: ContentAnalysis,
    pub header_analysis: HeaderAnalysis,
    pub top_topics: Vec<(String, usize)>,
    pub top_course_codes: Vec<(String, usize)>,
}

impl CorpusStatistics {
    /// `None` when the files hold no chunks at all.
    pub fn from_files(files: &[ProcessedFile]) -> Option<Self> {
        let chunks: Vec<&ChunkRecord> = files.iter().flat_map(|file| &file.chunks).collect();
        if chunks.is_empty() {
            return None;
        }

        let total = chunks.len() as f64;
        let mut lengths: Vec<usize> = chunks.iter().map(|chunk| chunk.length).collect();
        lengths.sort_unstable();
        let total_length: usize = lengths.iter().sum();

        let basic_stats = BasicStats {
            total_files: files.len(),
            total_chunks: chunks.len(),
            avg_chunks_per_file: chunks.len() as f64 / files.len() as f64,
            total_content_length: total_length,
            total_word_count: chunks.iter().map(|chunk| chunk.word_count).sum(),
        };

        let chunk_size_distribution = SizeDistribution {
            min_size: lengths[0],
            max_size: lengths[lengths.len() - 1],
            avg_size: total_length as f64 / total,
            median_size: lengths[lengths.len() / 2],
        };

        let quality_scores = QualityMetrics {
            avg_quality: chunks.iter().map(|chunk| chunk.quality_score).sum::<f64>() / total,
            avg_readability: chunks.iter().map(|chunk| chunk.readability).sum::<f64>() / total,
            avg_info_density: chunks
                .iter()
                .map(|chunk| chunk.information_density)
                .sum::<f64>()
                / total,
            high_quality_chunks: chunks
                .iter()
                .filter(|chunk| chunk.quality_score > HIGH_QUALITY)
                .count(),
            low_quality_chunks: chunks
                .iter()
                .filter(|chunk| chunk.quality_score < LOW_QUALITY)
                .count(),
        };

        let content_analysis = ContentAnalysis {
            document_types: ranked_counts(
                chunks.iter().map(|chunk| chunk.document_type.to_string()),
                usize::MAX,
            )
            .into_iter()
            .collect(),
            section_categories: ranked_counts(
                chunks.iter().map(|chunk| chunk.section_category.to_string()),
                usize::MAX,
            )
            .into_iter()
            .collect(),
            files_with_tables: files
                .iter()
                .filter(|file| file.chunks.iter().any(|chunk| chunk.contains_table))
                .count(),
            files_with_course_codes: files
                .iter()
                .filter(|file| file.chunks.iter().any(|chunk| chunk.contains_course_codes))
                .count(),
            chunks_with_headers: chunks
                .iter()
                .filter(|chunk| chunk.header_summary.has_hierarchy)
                .count(),
        };

        let header_analysis = chunks.iter().fold(HeaderAnalysis::default(), |mut acc, chunk| {
            acc.main_headers_count += chunk.header_summary.main_headers.len();
            acc.sub_headers_count += chunk.header_summary.sub_headers.len();
            acc.sub_sub_headers_count += chunk.header_summary.sub_sub_headers.len();
            acc
        });

        let top_topics = ranked_counts(
            chunks
                .iter()
                .flat_map(|chunk| chunk.topics.iter())
                .filter(|topic| char_len(topic) > 3)
                .cloned(),
            TOP_TOPICS,
        );

        let top_course_codes = ranked_counts(
            chunks.iter().flat_map(|chunk| chunk.course_codes.iter()).cloned(),
            TOP_COURSE_CODES,
        );

        Some(Self {
            basic_stats,
            chunk_size_distribution,
            quality_scores,
            content_analysis,
            header_analysis,
            top_topics,
            top_course_codes,
        })
    }
}

/// Occurrence counts sorted by count descending; ties keep first appearance.
pub fn ranked_counts(values: impl Iterator<Item = String>, limit: usize) -> Vec<(String, usize)> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts.sort_by(|_, left, _, right| right.cmp(left));
    counts.into_iter().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentSplitter, FixedClock, SplitterOptions};
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn processed(label: &str, text: &str) -> ProcessedFile {
        let splitter = DocumentSplitter::new(SplitterOptions {
            max_chunk_size: 300,
            min_chunk_size: 20,
            overlap_size: 30,
            quality_threshold: 0.0,
            ..SplitterOptions::default()
        })
        .expect("valid options")
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));

        ProcessedFile {
            source_label: label.to_string(),
            path: PathBuf::from(label),
            encoding: "utf-8",
            chunks: splitter.split_document(text, label),
        }
    }

    #[test]
    fn ranked_counts_sort_by_count_then_first_seen() {
        let values = ["b", "a", "c", "a", "c"].iter().map(|value| value.to_string());
        let ranked = ranked_counts(values, 2);
        assert_eq!(ranked, vec![("a".to_string(), 2), ("c".to_string(), 2)]);
    }

    #[test]
    fn statistics_are_absent_without_chunks() {
        assert!(CorpusStatistics::from_files(&[]).is_none());
    }

    #[test]
    fn statistics_summarise_chunks_across_files() {
        let files = vec![
            processed(
                "one.txt",
                "# หลักสูตรวิทยาศาสตรบัณฑิต\n\nรายวิชา CS1010 และ CS2020 เปิดสอนในภาคการศึกษาแรก",
            ),
            processed("two.txt", "| code | name | credit |\n| CS1010 | intro | 3 |"),
        ];

        let stats = CorpusStatistics::from_files(&files).expect("chunks exist");
        let total_chunks: usize = files.iter().map(|file| file.chunks.len()).sum();

        assert_eq!(stats.basic_stats.total_files, 2);
        assert_eq!(stats.basic_stats.total_chunks, total_chunks);
        assert!(stats.chunk_size_distribution.min_size <= stats.chunk_size_distribution.median_size);
        assert!(stats.chunk_size_distribution.median_size <= stats.chunk_size_distribution.max_size);
        assert_eq!(stats.content_analysis.files_with_tables, 1);
        assert_eq!(stats.content_analysis.files_with_course_codes, 2);
        assert!(stats.header_analysis.main_headers_count >= 1);
        assert_eq!(stats.top_course_codes[0], ("CS1010".to_string(), 2));
    }
}
