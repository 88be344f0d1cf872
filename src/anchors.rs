use regex::{Captures, Regex};
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<h([1-6])(\s[^>]*)?>(.*?)</h[1-6]>").expect("heading pattern")
});

static ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+id\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("id attribute pattern")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("numeric entity pattern")
});

/// Derive the fragment id for a heading.
///
/// Lowercases the text, drops every character that is not a word character,
/// whitespace or a hyphen, then collapses each whitespace run into a single
/// hyphen. Both the table of contents and [`inject_heading_ids`] go through
/// this function, so their anchors always agree.
pub fn anchor_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            if !in_space {
                id.push('-');
                in_space = true;
            }
        } else if c.is_alphanumeric() || c == '_' || c == '-' {
            id.push(c);
            in_space = false;
        }
    }
    id
}

/// Attach an `id` attribute to every `<h1>`..`<h6>` element of rendered HTML.
///
/// The id comes from the element's plain text (tags stripped, entities
/// decoded), not from the markdown source. Headings whose markup spans several
/// lines are not matched and keep whatever the renderer produced.
pub fn inject_heading_ids(html: &str) -> String {
    HEADING_RE
        .replace_all(html, |caps: &Captures| {
            let level = &caps[1];
            let attrs = caps
                .get(2)
                .map(|m| ID_ATTR_RE.replace_all(m.as_str(), "").into_owned())
                .unwrap_or_default();
            let inner = &caps[3];
            let id = anchor_id(plain_text(inner).trim());
            format!("<h{level}{attrs} id=\"{id}\">{inner}</h{level}>")
        })
        .into_owned()
}

/// Strip tags and decode entities.
pub fn plain_text(html: &str) -> String {
    html_unescape(&TAG_RE.replace_all(html, ""))
}

/// Decode the named entities `html_escape` produces plus any numeric
/// reference (`&#8217;`, `&#x27;`). `&amp;` goes last so `&amp;lt;` stays `&lt;`.
pub fn html_unescape(s: &str) -> String {
    let decoded = NUMERIC_ENTITY_RE.replace_all(s, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse().ok(),
            (None, None) => None,
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    });
    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
