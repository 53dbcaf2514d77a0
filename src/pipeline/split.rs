//! Section splitter: partition extracted document text into candidate modules.
//!
//! This is the one piece of real logic in the pipeline — everything else is
//! service glue. A strictly ordered fallback chain decides the boundaries:
//!
//! 1. numbered headings (`1. Introduction`),
//! 2. labeled headings (`Part 1: ...`, `Chapter 2 ...`, `Section 3: ...`),
//! 3. the whole document as a single module.
//!
//! The numbered pattern is deliberately *not* line-anchored: a sentence
//! containing "3. dogs" becomes a boundary. That mis-segments some prose, but
//! anchoring would miss headings that share a line with trailing page-layout
//! debris, which is the common case in extracted PDF text. The trade-off is
//! preserved as-is.
//!
//! The splitter is a pure function: no I/O, no error conditions. Empty input
//! falls through to the single-module path with empty content; callers that
//! need to reject empty documents do so upstream.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One candidate module: a heading-derived title and the text under it.
/// Order in the returned sequence matches document order and becomes the
/// module numbering downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModule {
    pub title: String,
    pub content: String,
}

static NUMBERED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s*[^\n]+").unwrap());

static LABELED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Part|Chapter|Section)\s*\d+[:\s][^\n]*").unwrap());

static LABEL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:Part|Chapter|Section)\s*\d+[:\s]*").unwrap());

/// Split document text into an ordered sequence of modules.
///
/// Never returns an empty sequence: when no boundary pattern matches, the
/// whole (trimmed) input becomes a single module titled "Module 1".
pub fn split_sections(text: &str) -> Vec<RawModule> {
    let modules = split_numbered(text)
        .or_else(|| split_labeled(text))
        .unwrap_or_else(|| {
            vec![RawModule {
                title: "Module 1".to_string(),
                content: text.trim().to_string(),
            }]
        });

    debug!(modules = modules.len(), "split text into modules");
    modules
}

/// Pass 1: numbered headings (`<integer>. <rest of line>`).
///
/// A module's content runs from the end of its heading to the start of the
/// next one. A heading with nothing under it keeps the heading text as
/// content so no module ends up empty.
fn split_numbered(text: &str) -> Option<Vec<RawModule>> {
    let matches: Vec<regex::Match<'_>> = NUMBERED_HEADING.find_iter(text).collect();
    if matches.is_empty() {
        return None;
    }

    let mut modules = Vec::with_capacity(matches.len());
    for (i, m) in matches.iter().enumerate() {
        let title = m.as_str().trim().to_string();
        let content_end = matches.get(i + 1).map_or(text.len(), |next| next.start());
        let content = text[m.end()..content_end].trim();
        let content = if content.is_empty() {
            title.clone()
        } else {
            content.to_string()
        };
        modules.push(RawModule { title, content });
    }
    Some(modules)
}

/// Pass 2: labeled headings (`Part/Chapter/Section <n>`).
///
/// Text before the first heading is introductory material and is discarded.
/// The label prefix is stripped from the title; a heading that is nothing
/// but its label gets a synthesised `Module <k>` title.
fn split_labeled(text: &str) -> Option<Vec<RawModule>> {
    let matches: Vec<regex::Match<'_>> = LABELED_HEADING.find_iter(text).collect();
    if matches.is_empty() {
        return None;
    }

    let mut modules = Vec::with_capacity(matches.len());
    for (i, m) in matches.iter().enumerate() {
        let raw_title = m.as_str().trim();
        let title = LABEL_PREFIX.replace(raw_title, "").trim().to_string();
        let title = if title.is_empty() {
            format!("Module {}", i + 1)
        } else {
            title
        };
        let content_end = matches.get(i + 1).map_or(text.len(), |next| next.start());
        let content = text[m.end()..content_end].trim().to_string();
        modules.push(RawModule { title, content });
    }
    Some(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_headings_become_modules() {
        let modules = split_sections("1. Intro\nSome text\n2. Basics\nMore text");
        assert_eq!(
            modules,
            vec![
                RawModule {
                    title: "1. Intro".into(),
                    content: "Some text".into()
                },
                RawModule {
                    title: "2. Basics".into(),
                    content: "More text".into()
                },
            ]
        );
    }

    #[test]
    fn numbered_heading_without_body_uses_title_as_content() {
        let modules = split_sections("1. One\n2. Two");
        assert_eq!(modules[0].title, "1. One");
        assert_eq!(modules[0].content, "1. One");
        assert_eq!(modules[1].content, "2. Two");
    }

    #[test]
    fn numbered_pattern_matches_mid_sentence() {
        // Deliberate trade-off: "3. dogs" inside prose is still a boundary.
        let modules = split_sections("We like 3. dogs a lot\nand cats too");
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "3. dogs a lot");
        assert_eq!(modules[0].content, "and cats too");
    }

    #[test]
    fn labeled_headings_used_when_no_numbered() {
        let modules =
            split_sections("Part 1: Foundations\nText A\nPart 2: Advanced\nText B");
        assert_eq!(
            modules,
            vec![
                RawModule {
                    title: "Foundations".into(),
                    content: "Text A".into()
                },
                RawModule {
                    title: "Advanced".into(),
                    content: "Text B".into()
                },
            ]
        );
    }

    #[test]
    fn labeled_pass_discards_intro_and_is_case_insensitive() {
        let modules = split_sections("Welcome to the book.\nCHAPTER 1: Alpha\nBody A");
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Alpha");
        assert_eq!(modules[0].content, "Body A");
    }

    #[test]
    fn bare_label_gets_synthesised_title() {
        let modules = split_sections("Section 1:\nLonely body\nSection 2:\nAnother");
        assert_eq!(modules[0].title, "Module 1");
        assert_eq!(modules[1].title, "Module 2");
        assert_eq!(modules[0].content, "Lonely body");
    }

    #[test]
    fn numbered_pass_wins_over_labeled() {
        // Both patterns present: the numbered pass returns first.
        let modules = split_sections("Part 1: Setup\n1. Install\nRun the installer");
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "1. Install");
    }

    #[test]
    fn plain_prose_falls_back_to_single_module() {
        let modules = split_sections("Just plain prose with no headings.");
        assert_eq!(
            modules,
            vec![RawModule {
                title: "Module 1".into(),
                content: "Just plain prose with no headings.".into()
            }]
        );
    }

    #[test]
    fn empty_input_yields_single_empty_module() {
        let modules = split_sections("");
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Module 1");
        assert_eq!(modules[0].content, "");
    }

    #[test]
    fn whitespace_only_input_trims_to_empty_content() {
        let modules = split_sections("   \n\t \n");
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].content, "");
    }

    #[test]
    fn titles_are_never_empty_for_nonempty_input() {
        for input in [
            "1. A\nb",
            "Part 1: X\ny",
            "Section 9 \n",
            "no headings here",
        ] {
            for module in split_sections(input) {
                assert!(!module.title.is_empty(), "input: {input:?}");
            }
        }
    }

    #[test]
    fn split_is_deterministic() {
        let input = "1. Intro\nSome text\n2. Basics\nMore text\n3. End";
        assert_eq!(split_sections(input), split_sections(input));
    }

    #[test]
    fn order_matches_document_order() {
        let modules = split_sections("2. Second first\nbody\n1. Then first\nbody2");
        // Order follows position in the document, not the heading number.
        assert_eq!(modules[0].title, "2. Second first");
        assert_eq!(modules[1].title, "1. Then first");
    }
}
