use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::anchors::inject_heading_ids;
use crate::frontmatter::parse_frontmatter;
use crate::registry::{PostMetadata, DEFAULT_CATEGORY};
use crate::toc::{headings, render_toc, HeadingEntry};

const WORDS_PER_MINUTE: usize = 200;

static PRE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</code>\s*</pre>").expect("pre pattern"));

/// Everything needed to draw one post. Lives for a single render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArticle {
    pub id: String,
    pub title: String,
    pub category: String,
    pub date: NaiveDate,
    pub reading_time: u32,
    pub toc_html: String,
    pub body_html: String,
    pub headings: Vec<HeadingEntry>,
}

impl RenderedArticle {
    /// Run the post pipeline over freshly fetched markdown.
    pub fn render(meta: &PostMetadata, raw: &str) -> Self {
        let (frontmatter, body) = parse_frontmatter(raw);
        let title = frontmatter
            .title()
            .map_or_else(|| meta.title.clone(), str::to_string);

        let outline: Vec<HeadingEntry> = headings(body).collect();
        let toc_html = render_toc(&outline);

        let html = markdown_to_html(body);
        let html = inject_heading_ids(&html);
        let body_html = enhance_code_blocks(&html);

        Self {
            id: meta.id.clone(),
            title,
            category: meta
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            date: meta.date,
            reading_time: reading_time(body),
            toc_html,
            body_html,
            headings: outline,
        }
    }
}

pub fn markdown_to_html(body: &str) -> String {
    markdown::to_html(body)
}

/// Minutes at 200 words per minute, rounded up, never below one.
pub fn reading_time(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Append a copy button to every code block; `post.js` wires the click.
pub fn enhance_code_blocks(html: &str) -> String {
    PRE_CLOSE_RE
        .replace_all(
            html,
            r#"</code><button class="copy-code-btn" type="button" aria-label="Copy code">Copy</button></pre>"#,
        )
        .into_owned()
}
