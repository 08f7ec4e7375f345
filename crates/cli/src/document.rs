//! Specification document cleanup and section segmentation.

use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"RFC (\d+)\s+(.*?)\s+([A-Za-z]+ \d{4})").expect("valid page header regex")
});
static PAGE_FOOTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^.*\s+\[Page \d+\]$").expect("valid page footer regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid blank run regex"));
static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(\d+(?:\.\d+)*)(\.?)\s+(.*)$").expect("valid section header regex")
});

/// Strip page headers and footers of a paginated document and collapse
/// blank lines.
pub fn clean_document(text: &str) -> String {
    let text = PAGE_HEADER.replace_all(text, "");
    let text = PAGE_FOOTER.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Split a cleaned document at numbered section headers (`3.`, `3.1`,
/// `4.2.1` followed by a title). Each section is `"<number><title>\n<body>"`.
/// Text before the first header is dropped.
pub fn segment_sections(text: &str) -> Vec<String> {
    let headers: Vec<_> = SECTION_HEADER.captures_iter(text).collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let header = caps.get(0).map_or(0..0, |m| m.range());
            let body_end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());

            let number = caps.get(1).map_or("", |m| m.as_str());
            let title = caps.get(3).map_or("", |m| m.as_str().trim());
            let body = text[header.end..body_end].trim();

            format!("{number}{title}\n{body}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "\
RFC 793   Transmission Control Protocol   September 1981


3.  FUNCTIONAL SPECIFICATION

3.1.  Header Format

  TCP segments are sent as internet datagrams.
Postel                                                          [Page 15]


3.2.  Terminology
  Before we can discuss very much about the operation of the TCP we need
  to introduce some detailed terminology.
";

    #[test]
    fn removes_pagination_and_blank_lines() {
        let cleaned = clean_document(PAGE);

        assert!(!cleaned.contains("RFC 793"));
        assert!(!cleaned.contains("[Page 15]"));
        assert!(!cleaned.contains("\n\n"));
        assert!(cleaned.starts_with("3.  FUNCTIONAL SPECIFICATION"));
    }

    #[test]
    fn splits_numbered_sections() {
        let sections = segment_sections(&clean_document(PAGE));

        assert_eq!(
            sections,
            vec![
                "3FUNCTIONAL SPECIFICATION\n".to_string(),
                "3.1Header Format\nTCP segments are sent as internet datagrams.".to_string(),
                "3.2Terminology\nBefore we can discuss very much about the operation of the TCP we need\n  to introduce some detailed terminology.".to_string(),
            ]
        );
    }

    #[test]
    fn preamble_is_dropped() {
        let sections = segment_sections("Status of this memo\n\n1. Introduction\nHello");
        assert_eq!(sections, vec!["1Introduction\nHello".to_string()]);
    }

    #[test]
    fn no_headers_no_sections() {
        assert!(segment_sections("just prose\nwithout numbers").is_empty());
    }
}
