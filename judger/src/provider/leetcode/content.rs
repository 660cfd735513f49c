//! Turning problem statement HTML into plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static SUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<sup>([^<]+)</sup>").unwrap());
static EXAMPLE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<strong[^>]*>\s*Example\s*\d*\s*:?\s*</strong>").unwrap());
static CONSTRAINTS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<strong[^>]*>\s*Constraints?\s*:?\s*</strong>").unwrap());
static FOLLOW_UP_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<strong[^>]*>\s*Follow[- ]?up").unwrap());

static PRE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<pre[^>]*>").unwrap());
static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</(p|div|li|pre|h\d)>").unwrap());
static BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(p|div|li|h\d)[^>]*>").unwrap());
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br\s*/?>|<(ul|ol)[^>]*>").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    pub description: String,
    pub example: String,
    pub constraints: String,
}

/// Split a problem statement into description, first example and constraints.
pub fn parse_content(raw: &str) -> ParsedContent {
    let html = SUP.replace_all(raw, "^$1");
    let html: &str = &html;

    let constraints_at = CONSTRAINTS_HEADER.find(html);
    let constraints = match constraints_at {
        Some(m) => {
            let rest = &html[m.end()..];
            let end = FOLLOW_UP_HEADER
                .find(rest)
                .map_or(rest.len(), |f| f.start());
            html_to_text(&rest[..end])
        }
        None => String::new(),
    };

    let example_at = EXAMPLE_HEADER.find(html);
    let desc_end = example_at
        .map(|m| m.start())
        .or_else(|| constraints_at.map(|m| m.start()))
        .unwrap_or(html.len());
    let mut description = html_to_text(&html[..desc_end]);

    let example = match example_at {
        Some(m) => {
            // only the first example is kept
            let rest = &html[m.start()..];
            let header_len = m.end() - m.start();
            let end = [
                constraints_at.and_then(|c| c.start().checked_sub(m.start())),
                FOLLOW_UP_HEADER.find(rest).map(|f| f.start()),
                EXAMPLE_HEADER
                    .find(&rest[header_len..])
                    .map(|next| next.start() + header_len),
            ]
            .iter()
            .flatten()
            .copied()
            .min()
            .unwrap_or(rest.len());
            html_to_text(&rest[..end])
        }
        None => String::new(),
    };

    for marker in ["constraints", "follow-up"] {
        if let Some(idx) = description.to_ascii_lowercase().find(marker) {
            if idx > 0 {
                description = description[..idx].trim().to_owned();
            }
        }
    }

    ParsedContent {
        description,
        example,
        constraints,
    }
}

/// Strip tags, decode entities and drop blank lines.
pub fn html_to_text(html: &str) -> String {
    let text = PRE_OPEN.replace_all(html, "\n");
    let text = BLOCK_CLOSE.replace_all(&text, "\n");
    let text = BLOCK_OPEN.replace_all(&text, "\n");
    let text = LINE_BREAK.replace_all(&text, "\n");

    let fragment = Html::parse_fragment(&text);
    let text: String = fragment.root_element().text().collect();

    text.replace('\u{a0}', " ")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn basic_statement() {
        let parsed = parse_content(
            r#"<p>Given an array of integers <code>nums</code> and an integer <code>target</code>, return indices of the two numbers.</p>
<p><strong>Example 1:</strong></p>
<pre>
Input: nums = [2,7,11,15], target = 9
Output: [0,1]
</pre>
<p><strong>Constraints:</strong></p>
<ul><li>2 &lt;= nums.length</li></ul>"#,
        );
        assert!(parsed.description.contains("array of integers"));
        assert!(!parsed.description.contains('<'));
        assert!(!parsed.description.to_lowercase().contains("constraint"));
        assert_eq!(parsed.constraints, "2 <= nums.length");
        assert!(parsed.example.contains("nums = [2,7,11,15]"));
    }

    #[test]
    fn only_first_example_is_kept() {
        let parsed = parse_content(
            r#"<p>Description text here.</p>
<p><strong>Example 1:</strong></p>
<pre>Input: x = 5
Output: 25</pre>
<p><strong>Example 2:</strong></p>
<pre>Input: x = -3
Output: 9</pre>
<p><strong>Constraints:</strong></p>
<ul><li>-100 &lt;= x &lt;= 100</li></ul>"#,
        );
        assert_eq!(parsed.description, "Description text here.");
        assert_eq!(parsed.example, "Example 1:\nInput: x = 5\nOutput: 25");
        assert!(!parsed.example.contains("x = -3"));
        assert_eq!(parsed.constraints, "-100 <= x <= 100");
    }

    #[test]
    fn follow_up_is_not_a_constraint() {
        let parsed = parse_content(
            "<p>Text.</p><p><strong>Constraints:</strong></p><ul><li>n &gt; 0</li></ul>\
             <p><strong>Follow-up:</strong> Can you do it in O(1)?</p>",
        );
        assert_eq!(parsed.constraints, "n > 0");
        assert_eq!(parsed.example, "");
    }

    #[test]
    fn superscripts() {
        let parsed = parse_content("<p>2<sup>31</sup> - 1</p>");
        assert_eq!(parsed.description, "2^31 - 1");
    }

    #[test]
    fn entities_and_tags() {
        assert_eq!(html_to_text("<p>a &amp; b &lt; c &gt; d</p>"), "a & b < c > d");
        assert_eq!(
            html_to_text(r#"<div class="foo"><span>hello</span> <a href="bar">world</a></div>"#),
            "hello world"
        );
        assert_eq!(html_to_text("x&nbsp;=&nbsp;1<br/>y = 2"), "x = 1\ny = 2");
    }
}
