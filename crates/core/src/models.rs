use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Topical category of a whole document or of a single chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Curriculum,
    Resolution,
    Modification,
    Rationale,
    Table,
    Appointment,
    Report,
    #[default]
    General,
}

/// Chunks are categorised with the same keyword scoring as documents.
pub type SectionCategory = DocumentType;

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Curriculum => "curriculum",
            Self::Resolution => "resolution",
            Self::Modification => "modification",
            Self::Rationale => "rationale",
            Self::Table => "table",
            Self::Appointment => "appointment",
            Self::Report => "report",
            Self::General => "general",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which structural line pattern opened a section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    MainHeader,
    SubHeader,
    SubSubHeader,
    ThaiNumberedList,
    ArabicNumberedList,
    ThaiAlphaList,
    ThaiParenList,
    ArabicParenList,
}

impl SectionKind {
    /// 1 = main header, 2 = sub header, 3 = sub-sub header,
    /// 4 = numbered list item, 5 = lettered or parenthesized item.
    pub fn level(&self) -> u8 {
        match self {
            Self::MainHeader => 1,
            Self::SubHeader => 2,
            Self::SubSubHeader => 3,
            Self::ThaiNumberedList | Self::ArabicNumberedList => 4,
            Self::ThaiAlphaList | Self::ThaiParenList | Self::ArabicParenList => 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionInfo {
    pub title: String,
    pub level: u8,
    pub kind: SectionKind,
    pub start_line: usize,
    pub raw_line_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HeaderHierarchy {
    pub main: Vec<SectionInfo>,
    pub sub: Vec<SectionInfo>,
    pub sub_sub: Vec<SectionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableRecord {
    pub line_index: usize,
    pub matched_text: String,
}

/// Structural model of one document, built once per `split_document` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentStructure {
    pub title: String,
    pub sections: Vec<SectionInfo>,
    pub header_hierarchy: HeaderHierarchy,
    pub tables: Vec<TableRecord>,
    pub course_codes: IndexSet<String>,
    pub document_type: DocumentType,
}

/// Header lines found verbatim inside a single chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderSummary {
    pub main_headers: Vec<String>,
    pub sub_headers: Vec<String>,
    pub sub_sub_headers: Vec<String>,
    pub has_hierarchy: bool,
}

impl HeaderSummary {
    pub fn total(&self) -> usize {
        self.main_headers.len() + self.sub_headers.len() + self.sub_sub_headers.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    pub sequence_index: usize,
    pub content_hash: String,
    pub content: String,
    pub length: usize,
    pub word_count: usize,
    pub source_label: String,
    pub document_title: String,
    pub document_type: DocumentType,
    pub section_category: SectionCategory,
    pub header_summary: HeaderSummary,
    pub contains_table: bool,
    pub contains_course_codes: bool,
    pub course_codes: Vec<String>,
    pub topics: Vec<String>,
    pub quality_score: f64,
    pub readability: f64,
    pub information_density: f64,
    pub structural_richness: f64,
    pub script_purity: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitterOptions {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
    pub overlap_size: usize,
    pub quality_threshold: f64,
    /// Reserved; carried through to reports only.
    pub preserve_tables: bool,
    /// Reserved; carried through to reports only.
    pub preserve_sections: bool,
}

impl Default for SplitterOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1_500,
            min_chunk_size: 100,
            overlap_size: 150,
            quality_threshold: 0.5,
            preserve_tables: true,
            preserve_sections: true,
        }
    }
}
