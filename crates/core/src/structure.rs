use crate::models::{DocumentStructure, DocumentType, HeaderHierarchy, SectionInfo, TableRecord};
use crate::patterns::PatternSet;
use indexmap::IndexSet;

/// Builds the structural model of `text` in a single pass over its lines.
pub fn analyze_structure(patterns: &PatternSet, text: &str) -> DocumentStructure {
    let mut sections = Vec::new();
    let mut tables = Vec::new();
    let mut course_codes = IndexSet::new();

    for (line_index, raw_line) in text.split('\n').enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((kind, title)) = patterns.match_section(line) {
            sections.push(SectionInfo {
                title,
                level: kind.level(),
                kind,
                start_line: line_index,
                raw_line_text: line.to_string(),
            });
        }

        if patterns.is_table(line) {
            tables.push(TableRecord {
                line_index,
                matched_text: line.to_string(),
            });
        }

        course_codes.extend(extract_course_codes(patterns, line));
    }

    let header_hierarchy = HeaderHierarchy {
        main: sections_at_level(&sections, 1),
        sub: sections_at_level(&sections, 2),
        sub_sub: sections_at_level(&sections, 3),
    };

    let title = header_hierarchy
        .main
        .first()
        .or_else(|| header_hierarchy.sub.first())
        .or_else(|| sections.first())
        .map(|section| section.title.clone())
        .unwrap_or_default();

    DocumentStructure {
        title,
        sections,
        header_hierarchy,
        tables,
        course_codes,
        document_type: classify_category(patterns, text),
    }
}

fn sections_at_level(sections: &[SectionInfo], level: u8) -> Vec<SectionInfo> {
    sections
        .iter()
        .filter(|section| section.level == level)
        .cloned()
        .collect()
}

/// Every course-code-like token, across all patterns, first-seen order.
pub fn extract_course_codes(patterns: &PatternSet, text: &str) -> IndexSet<String> {
    patterns
        .course_codes
        .iter()
        .flat_map(|pattern| pattern.find_iter(text).map(|found| found.as_str().to_string()))
        .collect()
}

/// Keyword-frequency classification. Ties go to the category declared first;
/// no keyword hits at all yields `General`.
pub fn classify_category(patterns: &PatternSet, text: &str) -> DocumentType {
    let lowered = text.to_lowercase();
    let mut best = (DocumentType::General, 0usize);

    for (category, keywords) in &patterns.categories {
        let score: usize = keywords
            .iter()
            .map(|keyword| lowered.matches(keyword.as_str()).count())
            .sum();

        if score > best.1 {
            best = (*category, score);
        }
    }

    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionKind;

    fn patterns() -> PatternSet {
        PatternSet::new().expect("patterns compile")
    }

    #[test]
    fn sections_are_detected_once_per_line_in_order() {
        let text = "## ภาพรวม\nprose\n1. first item\n\n(๑) วงเล็บ\n# หัวข้อหลัก";
        let structure = analyze_structure(&patterns(), text);

        let kinds: Vec<_> = structure.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::SubHeader,
                SectionKind::ArabicNumberedList,
                SectionKind::ThaiParenList,
                SectionKind::MainHeader,
            ]
        );
        let lines: Vec<_> = structure.sections.iter().map(|s| s.start_line).collect();
        assert_eq!(lines, vec![0, 2, 4, 5]);
        assert_eq!(structure.header_hierarchy.main.len(), 1);
        assert_eq!(structure.header_hierarchy.sub.len(), 1);
        assert!(structure.header_hierarchy.sub_sub.is_empty());
    }

    #[test]
    fn title_prefers_main_then_sub_then_any_section() {
        let patterns = patterns();

        let main = analyze_structure(&patterns, "## Sub\n# Main");
        assert_eq!(main.title, "Main");

        let sub = analyze_structure(&patterns, "1. item\n## Sub");
        assert_eq!(sub.title, "Sub");

        let list = analyze_structure(&patterns, "intro\n1. item one");
        assert_eq!(list.title, "item one");

        let none = analyze_structure(&patterns, "just prose");
        assert_eq!(none.title, "");
    }

    #[test]
    fn tables_are_recorded_alongside_sections() {
        let text = "| code | name | credits |\n1. | a | b |\nplain";
        let structure = analyze_structure(&patterns(), text);

        assert_eq!(structure.tables.len(), 2);
        assert_eq!(structure.tables[0].line_index, 0);
        assert_eq!(structure.tables[1].line_index, 1);
        assert_eq!(structure.sections.len(), 1);
    }

    #[test]
    fn course_codes_are_deduplicated_across_patterns() {
        let text = "CS1010 and CS1010 again, 01234567 and ๐๑๒๓๔๕";
        let codes = extract_course_codes(&patterns(), text);

        let collected: Vec<_> = codes.iter().map(String::as_str).collect();
        assert_eq!(collected, vec!["01234567", "๐๑๒๓๔๕", "012345", "CS1010"]);
    }

    #[test]
    fn classification_counts_keywords_and_breaks_ties_by_declaration() {
        let patterns = patterns();

        assert_eq!(
            classify_category(&patterns, "ที่ประชุมมีมติเห็นชอบ แต่งตั้งอาจารย์"),
            DocumentType::Resolution
        );
        // one curriculum hit, one resolution hit: curriculum is declared first
        assert_eq!(
            classify_category(&patterns, "ปริญญา มติ"),
            DocumentType::Curriculum
        );
        assert_eq!(classify_category(&patterns, "no keywords"), DocumentType::General);
    }
}
