use regex::Regex;
use std::str::Lines;
use std::sync::LazyLock;

use crate::anchors::{anchor_id, html_escape};

static HEADING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.+)$").expect("heading line pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Lazily scan markdown for ATX heading lines, in document order.
///
/// Fenced code blocks are skipped so that shell comments and the like never
/// show up in the outline.
pub fn headings(markdown: &str) -> Headings<'_> {
    Headings {
        lines: markdown.lines(),
        fence: None,
    }
}

pub struct Headings<'a> {
    lines: Lines<'a>,
    /// Marker character and run length of the open code fence.
    fence: Option<(char, usize)>,
}

/// Marker character and run length when `line` opens a code fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let marker = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = line.chars().take_while(|c| *c == marker).count();
    (run >= 3).then_some((marker, run))
}

impl Iterator for Headings<'_> {
    type Item = HeadingEntry;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            let trimmed = line.trim();
            if let Some((marker, open)) = self.fence {
                // Closing fences carry no info string and are at least as long.
                if trimmed.len() >= open && trimmed.chars().all(|c| c == marker) {
                    self.fence = None;
                }
                continue;
            }
            if let Some(fence) = fence_marker(trimmed) {
                self.fence = Some(fence);
                continue;
            }

            let Some(caps) = HEADING_LINE_RE.captures(line) else {
                continue;
            };
            let text = caps[2].trim();
            if text.is_empty() {
                continue;
            }
            return Some(HeadingEntry {
                level: caps[1].len() as u8,
                text: text.to_string(),
                anchor: anchor_id(text),
            });
        }
        None
    }
}

/// Render the table of contents block, or nothing when there are no headings.
pub fn render_toc(headings: &[HeadingEntry]) -> String {
    if headings.is_empty() {
        return String::new();
    }

    let items: String = headings
        .iter()
        .map(|heading| {
            format!(
                r##"<li style="margin-left: {}px;"><a href="#{}">{}</a></li>"##,
                (u32::from(heading.level) - 1) * 20,
                heading.anchor,
                html_escape(&heading.text)
            )
        })
        .collect();

    format!(
        r#"<div class="table-of-contents"><h3>Table of Contents</h3><ul>{}</ul></div>"#,
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_in_order() {
        let md = "# Welcome\n\nintro\n\n## Getting Started\ntext\n### Step 1: Install\n";
        let found: Vec<_> = headings(md).collect();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].level, 1);
        assert_eq!(found[0].text, "Welcome");
        assert_eq!(found[0].anchor, "welcome");
        assert_eq!(found[1].anchor, "getting-started");
        assert_eq!(found[2].level, 3);
        assert_eq!(found[2].anchor, "step-1-install");
    }

    #[test]
    fn test_not_headings() {
        let md = "#hashtag\n####### seven\n  # indented\ntext # not\n#\n";
        assert_eq!(headings(md).count(), 0);
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let md = "##   Spaced out   \n";
        let found: Vec<_> = headings(md).collect();
        assert_eq!(found[0].text, "Spaced out");
        assert_eq!(found[0].anchor, "spaced-out");
    }

    #[test]
    fn test_fenced_code_is_skipped() {
        let md = "# Real\n```bash\n# install deps\nnpm i\n```\n~~~\n## fake\n~~~\n## Also real\n";
        let texts: Vec<_> = headings(md).map(|h| h.text).collect();
        assert_eq!(texts, vec!["Real", "Also real"]);
    }

    #[test]
    fn test_fence_closes_only_on_matching_marker() {
        let md = "````md\n```\n# inside\n```rust\n# still inside\n````\n## After\n";
        let texts: Vec<_> = headings(md).map(|h| h.text).collect();
        assert_eq!(texts, vec!["After"]);

        let md = "```\n~~~\n# inside\n```rust\n# inside too\n```  \n# Out\n";
        let texts: Vec<_> = headings(md).map(|h| h.text).collect();
        assert_eq!(texts, vec!["Out"]);
    }

    #[test]
    fn test_each_call_rescans() {
        let md = "# One\n## Two\n";
        assert_eq!(headings(md).count(), 2);
        assert_eq!(headings(md).count(), 2);
    }

    #[test]
    fn test_render_toc_empty() {
        assert_eq!(render_toc(&[]), "");
        let none: Vec<_> = headings("just text\n").collect();
        assert!(render_toc(&none).is_empty());
    }

    #[test]
    fn test_render_toc() {
        let found: Vec<_> = headings("# A & B\n### Deep\n").collect();
        let toc = render_toc(&found);
        assert!(toc.starts_with(r#"<div class="table-of-contents"><h3>Table of Contents</h3><ul>"#));
        assert!(toc.contains(r##"<li style="margin-left: 0px;"><a href="#a-b">A &amp; B</a></li>"##));
        assert!(toc.contains(r##"<li style="margin-left: 40px;"><a href="#deep">Deep</a></li>"##));
        assert!(toc.ends_with("</ul></div>"));
    }
}
