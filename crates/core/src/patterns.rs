//! Priority tables for every pattern the splitter uses.
//!
//! Each table is plain data evaluated top to bottom; adding a category means
//! adding a row, never touching the code that walks the table. All regexes are
//! compiled once in [`PatternSet::new`].

use crate::error::SplitError;
use crate::models::{DocumentType, SectionKind};
use regex::Regex;

/// Line patterns that open a section. First match wins.
const SECTION_PATTERNS: [(&str, SectionKind); 8] = [
    (r"^#\s+(.+)$", SectionKind::MainHeader),
    (r"^##\s+(.+)$", SectionKind::SubHeader),
    (r"^###\s+(.+)$", SectionKind::SubSubHeader),
    (r"^[๑-๙]+[).]\s*(.+)$", SectionKind::ThaiNumberedList),
    (r"^[1-9][0-9]*[).]\s*(.+)$", SectionKind::ArabicNumberedList),
    (r"^[ก-ฮ][).]\s*(.+)$", SectionKind::ThaiAlphaList),
    (r"^\([๑-๙]+\)\s*(.+)$", SectionKind::ThaiParenList),
    (r"^\([1-9][0-9]*\)\s*(.+)$", SectionKind::ArabicParenList),
];

/// Boundaries for oversized spans. Capture group 1 is the text removed at the
/// cut; whatever surrounds it stays with the neighbouring pieces.
const SPLIT_STRATEGIES: [(&str, &str); 10] = [
    ("main_header", r"(\n)#\s"),
    ("sub_header", r"(\n)##\s"),
    ("sub_sub_header", r"(\n)###\s"),
    ("thai_numbered", r"(\n)[๑-๙]+[).]\s"),
    ("arabic_numbered", r"(\n)[1-9][0-9]*[).]\s"),
    ("thai_parentheses", r"(\n)\([๑-๙]+\)\s"),
    ("arabic_parentheses", r"(\n)\([1-9][0-9]*\)\s"),
    ("thai_alpha", r"(\n)[ก-ฮ][).]\s"),
    ("paragraphs", r"(\n\n+)"),
    ("sentences", r"[.!?](\s+)[A-Z]"),
];

const TABLE_PATTERNS: [&str; 5] = [
    r"\|[^\n]*\|[^\n]*\|",
    r"(?s)<table>.*?</table>",
    r"┌[^\n]*┐",
    r"╔[^\n]*╗",
    r"\+[-=]+\+",
];

const COURSE_CODE_PATTERNS: [&str; 5] = [
    r"[๐-๙]{8}",
    r"[0-9]{8}",
    r"[๐-๙]{6}",
    r"[0-9]{6}",
    r"[A-Z]{2,4}[0-9]{3,4}",
];

/// Declaration order doubles as the tie-break order.
const CATEGORY_KEYWORDS: [(DocumentType, &[&str]); 7] = [
    (DocumentType::Curriculum, &["หลักสูตร", "รายวิชา", "สาขาวิชา", "ปริญญา"]),
    (DocumentType::Resolution, &["มติ", "ที่ประชุม", "เห็นชอบ", "อนุมัติ"]),
    (DocumentType::Modification, &["ปรับปรุง", "แก้ไข", "เปลี่ยนแปลง", "ปรับเปลี่ยน"]),
    (DocumentType::Rationale, &["เหตุผล", "ความจำเป็น", "ที่มาของ"]),
    (DocumentType::Table, &["ตาราง", "รายการ", "สรุป"]),
    (DocumentType::Appointment, &["แต่งตั้ง", "อาจารย์", "กรรมการ"]),
    (DocumentType::Report, &["รายงาน", "ผลการ", "สรุปผล"]),
];

/// Topic captures with the minimum trimmed length (exclusive) a capture needs.
const TOPIC_PATTERNS: [(&str, usize); 8] = [
    // curriculum and programme names
    (r"หลักสูตร([^(]+?)(?:\(|$)", 2),
    (r"สาขาวิชา([^(]+?)(?:\(|$)", 2),
    (r"สาขา([^(]+?)(?:\(|$)", 2),
    // subjects
    (r"วิชา([ก-๙\s]+?)(?:\s+[A-Z]|\n|$)", 3),
    (r"รายวิชา([ก-๙\s]+?)(?:\s+[A-Z]|\n|$)", 3),
    // faculties, departments, offices
    (r"คณะ([ก-๙\s]+?)(?:\s|$|\.)", 3),
    (r"ภาควิชา([ก-๙\s]+?)(?:\s|$|\.)", 3),
    (r"สำนัก([ก-๙\s]+?)(?:\s|$|\.)", 3),
];

#[derive(Debug, Clone)]
pub struct SectionPattern {
    pub kind: SectionKind,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct SplitStrategy {
    pub name: &'static str,
    boundary: Regex,
}

impl SplitStrategy {
    /// Cuts `text` at every boundary, dropping the captured separator.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut pieces = Vec::new();
        let mut cursor = 0;

        for captures in self.boundary.captures_iter(text) {
            if let Some(cut) = captures.get(1) {
                pieces.push(&text[cursor..cut.start()]);
                cursor = cut.end();
            }
        }

        pieces.push(&text[cursor..]);
        pieces
    }
}

#[derive(Debug, Clone)]
pub struct TopicPattern {
    pub regex: Regex,
    pub min_exclusive_len: usize,
}

#[derive(Debug, Clone)]
pub struct PatternSet {
    pub sections: Vec<SectionPattern>,
    pub strategies: Vec<SplitStrategy>,
    pub tables: Vec<Regex>,
    pub course_codes: Vec<Regex>,
    pub categories: Vec<(DocumentType, Vec<String>)>,
    pub topics: Vec<TopicPattern>,
    pub sentence_terminator: Regex,
    pub thai_numbered_marker: Regex,
    /// Runs of two or more `#`, wherever they appear.
    pub header_marker: Regex,
}

impl PatternSet {
    pub fn new() -> Result<Self, SplitError> {
        let sections = SECTION_PATTERNS
            .iter()
            .map(|(pattern, kind)| -> Result<SectionPattern, SplitError> {
                Ok(SectionPattern {
                    kind: *kind,
                    regex: Regex::new(pattern)?,
                })
            })
            .collect::<Result<Vec<_>, SplitError>>()?;

        let strategies = SPLIT_STRATEGIES
            .iter()
            .map(|(name, pattern)| -> Result<SplitStrategy, SplitError> {
                Ok(SplitStrategy {
                    name: *name,
                    boundary: Regex::new(pattern)?,
                })
            })
            .collect::<Result<Vec<_>, SplitError>>()?;

        let tables = compile_all(&TABLE_PATTERNS)?;
        let course_codes = compile_all(&COURSE_CODE_PATTERNS)?;

        let categories = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                let lowered: Vec<String> = keywords.iter().map(|keyword| keyword.to_lowercase()).collect();
                (*category, lowered)
            })
            .collect();

        let topics = TOPIC_PATTERNS
            .iter()
            .map(|(pattern, min_exclusive_len)| -> Result<TopicPattern, SplitError> {
                Ok(TopicPattern {
                    regex: Regex::new(pattern)?,
                    min_exclusive_len: *min_exclusive_len,
                })
            })
            .collect::<Result<Vec<_>, SplitError>>()?;

        Ok(Self {
            sections,
            strategies,
            tables,
            course_codes,
            categories,
            topics,
            sentence_terminator: Regex::new(r"[.!?。]")?,
            thai_numbered_marker: Regex::new(r"[๑-๙]+\.")?,
            header_marker: Regex::new(r"##+")?,
        })
    }

    /// First section pattern matching a trimmed line, with the captured title.
    pub fn match_section(&self, line: &str) -> Option<(SectionKind, String)> {
        self.sections.iter().find_map(|pattern| {
            pattern.regex.captures(line).and_then(|captures| {
                captures
                    .get(1)
                    .map(|title| (pattern.kind, title.as_str().trim().to_string()))
            })
        })
    }

    pub fn is_table(&self, text: &str) -> bool {
        self.tables.iter().any(|pattern| pattern.is_match(text))
    }

    /// Header-level kind of a trimmed line, ignoring list patterns.
    pub fn header_kind(&self, line: &str) -> Option<SectionKind> {
        self.sections
            .iter()
            .filter(|pattern| pattern.kind.level() <= 3)
            .find(|pattern| pattern.regex.is_match(line))
            .map(|pattern| pattern.kind)
    }
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>, SplitError> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).map_err(SplitError::from))
        .collect()
}

pub fn is_thai_char(c: char) -> bool {
    ('\u{0E01}'..='\u{0E59}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> PatternSet {
        PatternSet::new().expect("patterns compile")
    }

    #[test]
    fn section_priority_prefers_headers_over_lists() {
        let patterns = patterns();
        assert_eq!(
            patterns.match_section("# Overview"),
            Some((SectionKind::MainHeader, "Overview".to_string()))
        );
        assert_eq!(
            patterns.match_section("### Detail").map(|(kind, _)| kind),
            Some(SectionKind::SubSubHeader)
        );
        assert_eq!(
            patterns.match_section("๓. ข้อที่สาม").map(|(kind, _)| kind),
            Some(SectionKind::ThaiNumberedList)
        );
        assert_eq!(
            patterns.match_section("(2) second").map(|(kind, _)| kind),
            Some(SectionKind::ArabicParenList)
        );
        assert_eq!(
            patterns.match_section("ข) ตัวเลือก").map(|(kind, _)| kind),
            Some(SectionKind::ThaiAlphaList)
        );
        assert_eq!(patterns.match_section("plain prose line"), None);
        assert_eq!(patterns.match_section("#hashtag"), None);
    }

    #[test]
    fn strategy_split_keeps_markers_on_following_piece() {
        let patterns = patterns();
        let numbered = patterns
            .strategies
            .iter()
            .find(|strategy| strategy.name == "arabic_numbered")
            .expect("strategy exists");

        let pieces = numbered.split("intro\n1. first\n2. second");
        assert_eq!(pieces, vec!["intro", "1. first", "2. second"]);
    }

    #[test]
    fn sentence_strategy_keeps_terminator_on_left_piece() {
        let patterns = patterns();
        let sentences = patterns
            .strategies
            .iter()
            .find(|strategy| strategy.name == "sentences")
            .expect("strategy exists");

        let pieces = sentences.split("One thing. Two things! three. Four");
        assert_eq!(pieces, vec!["One thing.", "Two things! three.", "Four"]);
    }

    #[test]
    fn table_patterns_match_common_layouts() {
        let patterns = patterns();
        assert!(patterns.is_table("| a | b | c |"));
        assert!(patterns.is_table("<table><tr><td>1</td></tr></table>"));
        assert!(patterns.is_table("┌──────┐"));
        assert!(patterns.is_table("+-----+"));
        assert!(!patterns.is_table("a | b"));
    }

    #[test]
    fn thai_range_covers_consonants_and_digits() {
        assert!(is_thai_char('ก'));
        assert!(is_thai_char('๙'));
        assert!(!is_thai_char('a'));
    }
}
