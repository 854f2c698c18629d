use crate::error::IngestError;
use crate::ingest::{ProcessedFile, ProcessingReport};
use crate::models::{ChunkRecord, SplitterOptions};
use crate::stats::{CorpusStatistics, HeaderAnalysis};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_TOP_ENTRIES: usize = 10;
const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct OutputMetadata {
    pub processing_date: DateTime<Utc>,
    pub version: String,
    pub total_files: usize,
    pub total_chunks: usize,
    pub skipped_files: usize,
    pub processing_settings: SplitterOptions,
}

/// Everything one `process` run writes to its main JSON file.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutput {
    pub metadata: OutputMetadata,
    pub chunks: IndexMap<String, Vec<ChunkRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<CorpusStatistics>,
}

impl ProcessingOutput {
    pub fn new(
        report: &ProcessingReport,
        settings: &SplitterOptions,
        version: &str,
        processing_date: DateTime<Utc>,
    ) -> Self {
        let chunks = report
            .files
            .iter()
            .map(|file| (file.source_label.clone(), file.chunks.clone()))
            .collect();

        Self {
            metadata: OutputMetadata {
                processing_date,
                version: version.to_string(),
                total_files: report.files.len(),
                total_chunks: report.chunk_count(),
                skipped_files: report.skipped_files.len(),
                processing_settings: settings.clone(),
            },
            chunks,
            analytics: CorpusStatistics::from_files(&report.files),
        }
    }
}

/// Paths produced by [`write_outputs`]; the sidecars exist only with analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub main: PathBuf,
    pub analytics: Option<PathBuf>,
    pub text_report: Option<PathBuf>,
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IngestError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Writes `output_path` plus `<stem>_analytics.json` and `<stem>.txt` next to it.
pub fn write_outputs(
    output_path: &Path,
    output: &ProcessingOutput,
) -> Result<WrittenOutputs, IngestError> {
    write_json(output_path, output)?;

    let Some(analytics) = &output.analytics else {
        return Ok(WrittenOutputs {
            main: output_path.to_path_buf(),
            analytics: None,
            text_report: None,
        });
    };

    let stem = output_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| IngestError::MissingFileName(output_path.display().to_string()))?;

    let analytics_path = output_path.with_file_name(format!("{stem}_analytics.json"));
    write_json(&analytics_path, analytics)?;

    let report_path = output_path.with_file_name(format!("{stem}.txt"));
    fs::write(
        &report_path,
        render_text_report(analytics, output.metadata.processing_date),
    )?;

    Ok(WrittenOutputs {
        main: output_path.to_path_buf(),
        analytics: Some(analytics_path),
        text_report: Some(report_path),
    })
}

pub fn render_text_report(stats: &CorpusStatistics, generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "DOCUMENT CHUNKING REPORT".to_string(),
        "=".repeat(RULE_WIDTH),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    let basic = &stats.basic_stats;
    lines.push("BASIC STATISTICS".to_string());
    lines.push(format!("  Total files: {}", basic.total_files));
    lines.push(format!("  Total chunks: {}", basic.total_chunks));
    lines.push(format!("  Avg chunks per file: {:.1}", basic.avg_chunks_per_file));
    lines.push(format!("  Total characters: {}", basic.total_content_length));
    lines.push(format!("  Total words: {}", basic.total_word_count));
    lines.push(String::new());

    let sizes = &stats.chunk_size_distribution;
    lines.push("CHUNK SIZE DISTRIBUTION".to_string());
    lines.push(format!("  Min: {} chars", sizes.min_size));
    lines.push(format!("  Max: {} chars", sizes.max_size));
    lines.push(format!("  Avg: {:.0} chars", sizes.avg_size));
    lines.push(format!("  Median: {} chars", sizes.median_size));
    lines.push(String::new());

    let quality = &stats.quality_scores;
    lines.push("QUALITY METRICS".to_string());
    lines.push(format!("  Avg quality: {:.3}", quality.avg_quality));
    lines.push(format!("  Avg readability: {:.3}", quality.avg_readability));
    lines.push(format!("  Avg information density: {:.3}", quality.avg_info_density));
    lines.push(format!("  High quality chunks (>0.8): {}", quality.high_quality_chunks));
    lines.push(format!("  Low quality chunks (<0.5): {}", quality.low_quality_chunks));
    lines.push(String::new());

    lines.extend(header_lines(&stats.header_analysis));
    lines.push(format!(
        "  Chunks with headers: {}",
        stats.content_analysis.chunks_with_headers
    ));
    lines.push(String::new());

    lines.push("DOCUMENT TYPES".to_string());
    for (kind, count) in &stats.content_analysis.document_types {
        lines.push(format!("  {kind}: {count}"));
    }
    lines.push(String::new());

    lines.push("TOP TOPICS".to_string());
    for (index, (topic, count)) in stats.top_topics.iter().take(REPORT_TOP_ENTRIES).enumerate() {
        lines.push(format!("  {}. {topic} ({count})", index + 1));
    }

    if !stats.top_course_codes.is_empty() {
        lines.push(String::new());
        lines.push("TOP COURSE CODES".to_string());
        for (index, (code, count)) in stats
            .top_course_codes
            .iter()
            .take(REPORT_TOP_ENTRIES)
            .enumerate()
        {
            lines.push(format!("  {}. {code} ({count})", index + 1));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn header_lines(headers: &HeaderAnalysis) -> Vec<String> {
    vec![
        "HEADER HIERARCHY".to_string(),
        format!("  Main headers (#): {}", headers.main_headers_count),
        format!("  Sub headers (##): {}", headers.sub_headers_count),
        format!("  Sub-sub headers (###): {}", headers.sub_sub_headers_count),
    ]
}

/// File name for a subfolder group, with path-hostile characters replaced.
pub fn group_file_name(group: &str) -> String {
    let safe: String = group
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();

    format!("group_{safe}.json")
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupResult {
    pub group: String,
    pub files: usize,
    pub chunks: usize,
    pub elapsed_seconds: f64,
    pub output_file: String,
    pub avg_quality: f64,
    pub document_types: IndexMap<String, usize>,
    pub header_counts: HeaderAnalysis,
}

impl GroupResult {
    pub fn from_files(
        group: &str,
        files: &[ProcessedFile],
        elapsed_seconds: f64,
        output_file: &str,
    ) -> Self {
        let stats = CorpusStatistics::from_files(files);

        Self {
            group: group.to_string(),
            files: files.len(),
            chunks: files.iter().map(|file| file.chunks.len()).sum(),
            elapsed_seconds,
            output_file: output_file.to_string(),
            avg_quality: stats
                .as_ref()
                .map_or(0.0, |stats| stats.quality_scores.avg_quality),
            document_types: stats
                .as_ref()
                .map(|stats| stats.content_analysis.document_types.clone())
                .unwrap_or_default(),
            header_counts: stats
                .map(|stats| stats.header_analysis)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupTotals {
    pub groups: usize,
    pub files: usize,
    pub chunks: usize,
    pub elapsed_seconds: f64,
    pub avg_files_per_group: f64,
    pub chunks_per_second: f64,
}

/// Combined summary of a `--per-subfolder` run.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub generated_at: DateTime<Utc>,
    pub totals: GroupTotals,
    pub groups: Vec<GroupResult>,
}

impl GroupSummary {
    pub fn new(generated_at: DateTime<Utc>, groups: Vec<GroupResult>, elapsed_seconds: f64) -> Self {
        let files: usize = groups.iter().map(|group| group.files).sum();
        let chunks: usize = groups.iter().map(|group| group.chunks).sum();

        let totals = GroupTotals {
            groups: groups.len(),
            files,
            chunks,
            elapsed_seconds,
            avg_files_per_group: if groups.is_empty() {
                0.0
            } else {
                files as f64 / groups.len() as f64
            },
            chunks_per_second: if elapsed_seconds > 0.0 {
                chunks as f64 / elapsed_seconds
            } else {
                0.0
            },
        };

        Self {
            generated_at,
            totals,
            groups,
        }
    }

    pub fn render_text(&self) -> String {
        let mut lines = vec![
            "PER-SUBFOLDER PROCESSING SUMMARY".to_string(),
            "=".repeat(RULE_WIDTH),
            format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S")),
            String::new(),
            "TOTALS".to_string(),
            format!("  Groups: {}", self.totals.groups),
            format!("  Files: {}", self.totals.files),
            format!("  Chunks: {}", self.totals.chunks),
            format!("  Elapsed: {:.2}s", self.totals.elapsed_seconds),
            format!("  Avg files per group: {:.1}", self.totals.avg_files_per_group),
            format!("  Chunks per second: {:.1}", self.totals.chunks_per_second),
            String::new(),
            "GROUPS".to_string(),
        ];

        for group in &self.groups {
            lines.push(format!(
                "  {}: {} files, {} chunks, avg quality {:.3}, {:.2}s -> {}",
                group.group,
                group.files,
                group.chunks,
                group.avg_quality,
                group.elapsed_seconds,
                group.output_file
            ));
        }

        lines.push(String::new());
        lines.join("\n")
    }
}
