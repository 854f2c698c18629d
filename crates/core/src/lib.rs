pub mod chunking;
pub mod error;
pub mod ingest;
pub mod models;
pub mod overlap;
pub mod patterns;
pub mod report;
pub mod scoring;
pub mod splitter;
pub mod stats;
pub mod structure;
pub mod text;
pub mod traits;

pub use chunking::{recursive_split, split_by_structure, ChunkingConfig};
pub use error::{IngestError, SplitError};
pub use ingest::{
    decode_bytes, discover_text_files, process_file, process_folder_best_effort, read_text_file,
    require_text_files, DecodedText, ProcessedFile, ProcessingReport, SkippedFile,
};
pub use models::{
    ChunkRecord, DocumentStructure, DocumentType, HeaderHierarchy, HeaderSummary, SectionCategory,
    SectionInfo, SectionKind, SplitterOptions, TableRecord,
};
pub use overlap::{apply_overlap, OverlapConfig};
pub use patterns::PatternSet;
pub use report::{
    group_file_name, render_text_report, write_json, write_outputs, GroupResult, GroupSummary,
    GroupTotals, ProcessingOutput, WrittenOutputs,
};
pub use splitter::DocumentSplitter;
pub use stats::CorpusStatistics;
pub use traits::{Clock, FixedClock, SystemClock};
