use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A---\s*\n((?s:.*?))\n---\s*\n((?s:.*))\z").expect("frontmatter pattern")
});

/// Key/value header parsed from the top of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: HashMap<String, String>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|t| !t.is_empty())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.fields.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Split a document into its frontmatter and body.
///
/// Only a complete `---` / `---` block at the very start counts. Anything else,
/// including an unterminated header, leaves the whole text as body.
pub fn parse_frontmatter(content: &str) -> (Frontmatter, &str) {
    let Some(caps) = FRONTMATTER_RE.captures(content) else {
        return (Frontmatter::default(), content);
    };
    let header = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2).map_or("", |m| m.as_str());

    let mut fields = HashMap::new();
    for line in header.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), strip_quotes(value.trim()).to_string());
    }

    (Frontmatter { fields }, body)
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
