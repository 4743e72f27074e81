//! Result renderer.
//!
//! Turns a generated plan's free-text body into typed display blocks for
//! presentation. The format is blank-line separated sections with ALL-CAPS
//! headings and hyphen bullets, as the generation service is prompted to
//! produce. This is a best-effort presentation heuristic, not a structured
//! parser; it is deliberately isolated from the workflow so a structured
//! output format can replace it without touching any state logic.

use once_cell::sync::Lazy;
use regex::Regex;

/// Uppercase letters and whitespace, optionally followed by a single
/// parenthesized annotation such as a time marker.
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z\s]+(?:\([^)]*\))?$").expect("heading regex is valid"));

/// Heading lines longer than this are treated as body text.
const MAX_HEADING_LEN: usize = 100;

/// A line within a body block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A `- ` bullet item, prefix stripped
    Bullet(String),
    /// A plain paragraph line
    Paragraph(String),
}

/// A typed display block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// An ALL-CAPS section heading with its indented follow-on lines
    Heading {
        /// The heading text (the block's first line)
        text: String,
        /// Remaining non-empty lines, in source order
        lines: Vec<String>,
    },
    /// Free-form content: bullets and paragraphs in source order
    Body {
        /// Non-empty lines, classified
        lines: Vec<Line>,
    },
}

/// Whether a trimmed line qualifies as a section heading.
fn is_heading(line: &str) -> bool {
    line.len() < MAX_HEADING_LEN && HEADING_RE.is_match(line)
}

/// Segment plan content into display blocks.
///
/// Deterministic and pure: splits on blank lines, drops empty sections,
/// classifies each section as heading or body, and preserves source order
/// throughout.
pub fn segment(content: &str) -> Vec<Block> {
    content
        .split("\n\n")
        .filter_map(|section| {
            let section = section.trim();
            if section.is_empty() {
                return None;
            }
            Some(segment_section(section))
        })
        .collect()
}

fn segment_section(section: &str) -> Block {
    let mut lines = section.lines();
    let first = lines.next().unwrap_or("").trim();

    if is_heading(first) {
        let rest = lines
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect();
        return Block::Heading { text: first.to_string(), lines: rest };
    }

    let lines = section
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| match line.strip_prefix("- ") {
            Some(item) => Line::Bullet(item.to_string()),
            None => Line::Paragraph(line.to_string()),
        })
        .collect();
    Block::Body { lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_detection() {
        assert!(is_heading("INTRODUCTION"));
        assert!(is_heading("LEARNING OBJECTIVES"));
        assert!(is_heading("WARM UP (10 minutes)"));
        assert!(!is_heading("Introduction"));
        assert!(!is_heading("ASSESSMENT: RUBRIC"));
        assert!(!is_heading(&"A".repeat(100)));
        assert!(is_heading(&"A".repeat(99)));
    }

    #[test]
    fn test_segmentation_headings_and_bullets() {
        let content = "INTRODUCTION\nWelcome text\n\nActivity\n- Do A\n- Do B";
        let blocks = segment(content);

        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    text: "INTRODUCTION".to_string(),
                    lines: vec!["Welcome text".to_string()],
                },
                Block::Body {
                    lines: vec![
                        Line::Paragraph("Activity".to_string()),
                        Line::Bullet("Do A".to_string()),
                        Line::Bullet("Do B".to_string()),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_empty_sections_dropped() {
        let blocks = segment("\n\n  \n\nFIRST\n\n\n\nlast words\n\n");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { text: "FIRST".to_string(), lines: vec![] },
                Block::Body { lines: vec![Line::Paragraph("last words".to_string())] },
            ]
        );
    }

    #[test]
    fn test_heading_with_time_marker() {
        let blocks = segment("MAIN CONTENT DELIVERY (25 minutes)\n- Explain the model");
        assert_eq!(
            blocks,
            vec![Block::Heading {
                text: "MAIN CONTENT DELIVERY (25 minutes)".to_string(),
                lines: vec!["- Explain the model".to_string()],
            }]
        );
    }

    #[test]
    fn test_bullet_prefix_requires_space() {
        let blocks = segment("-dashed but not a bullet\n- real bullet");
        assert_eq!(
            blocks,
            vec![Block::Body {
                lines: vec![
                    Line::Paragraph("-dashed but not a bullet".to_string()),
                    Line::Bullet("real bullet".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn test_order_preserved() {
        let content = "one\n\nTWO\n\nthree";
        let blocks = segment(content);
        assert_eq!(blocks.len(), 3);
        assert!(matches!(&blocks[0], Block::Body { .. }));
        assert!(matches!(&blocks[1], Block::Heading { text, .. } if text == "TWO"));
        assert!(matches!(&blocks[2], Block::Body { .. }));
    }

    #[test]
    fn test_deterministic() {
        let content = "SUMMARY\nfacts\n\n- a\n- b";
        assert_eq!(segment(content), segment(content));
    }
}
