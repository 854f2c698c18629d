use crate::{ChunkRecord, DocumentSplitter, IngestError};
use encoding_rs::WINDOWS_874;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn discover_text_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_txt = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

        if is_txt {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Strict UTF-8 (with or without BOM), then Thai Windows-874, then lossy UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    if let Some(stripped) = bytes.strip_prefix(UTF8_BOM) {
        if let Ok(text) = std::str::from_utf8(stripped) {
            return DecodedText {
                text: text.to_string(),
                encoding: "utf-8-sig",
            };
        }
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: text.to_string(),
            encoding: "utf-8",
        };
    }

    let (text, had_errors) = WINDOWS_874.decode_without_bom_handling(bytes);
    if !had_errors {
        return DecodedText {
            text: text.into_owned(),
            encoding: "windows-874",
        };
    }

    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: "utf-8-lossy",
    }
}

pub fn read_text_file(path: &Path) -> Result<DecodedText, IngestError> {
    let bytes = fs::read(path)?;
    let decoded = decode_bytes(&bytes);

    if decoded.encoding == "utf-8-lossy" {
        warn!(path = %path.display(), "read with invalid bytes replaced");
    } else {
        debug!(path = %path.display(), encoding = decoded.encoding, "decoded text file");
    }

    Ok(decoded)
}

/// Chunks produced for one file; `source_label` is the path relative to the
/// processed root.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub source_label: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub encoding: &'static str,
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingReport {
    pub files: Vec<ProcessedFile>,
    pub skipped_files: Vec<SkippedFile>,
}

impl ProcessingReport {
    pub fn chunk_count(&self) -> usize {
        self.files.iter().map(|file| file.chunks.len()).sum()
    }

    /// Files the outcome of [`process_file`]; failures become skipped entries.
    pub fn record(&mut self, path: PathBuf, outcome: Result<ProcessedFile, IngestError>) {
        match outcome {
            Ok(processed) => self.files.push(processed),
            Err(error) => {
                warn!(path = %path.display(), %error, "skipped file");
                self.skipped_files.push(SkippedFile {
                    path,
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Restores path order when outcomes were recorded as they completed.
    pub fn sort_by_path(&mut self) {
        self.files.sort_by(|left, right| left.path.cmp(&right.path));
        self.skipped_files
            .sort_by(|left, right| left.path.cmp(&right.path));
    }
}

/// `.txt` files under `folder`, or an error when there are none.
pub fn require_text_files(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let files = discover_text_files(folder);
    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no txt files found in {}",
            folder.display()
        )));
    }

    info!(folder = %folder.display(), file_count = files.len(), "processing folder");
    Ok(files)
}

pub fn source_label(root: &Path, path: &Path) -> Result<String, IngestError> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if relative.file_name().is_none() {
        return Err(IngestError::MissingFileName(path.display().to_string()));
    }

    Ok(relative.to_string_lossy().replace('\\', "/"))
}

pub fn process_file(
    splitter: &DocumentSplitter,
    root: &Path,
    path: &Path,
) -> Result<ProcessedFile, IngestError> {
    let label = source_label(root, path)?;
    let decoded = read_text_file(path)?;

    if decoded.text.trim().is_empty() {
        return Err(IngestError::EmptyDocument(label));
    }

    let chunks = splitter.split_document(&decoded.text, &label);
    debug!(source = %label, chunk_count = chunks.len(), "split document");

    Ok(ProcessedFile {
        source_label: label,
        path: path.to_path_buf(),
        encoding: decoded.encoding,
        chunks,
    })
}

/// Splits every `.txt` file under `folder`, collecting per-file failures
/// instead of aborting. Errors only when there is nothing to process.
pub fn process_folder_best_effort(
    splitter: &DocumentSplitter,
    folder: &Path,
) -> Result<ProcessingReport, IngestError> {
    let mut report = ProcessingReport::default();
    for path in require_text_files(folder)? {
        let outcome = process_file(splitter, folder, &path);
        report.record(path, outcome);
    }

    Ok(report)
}
