use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A registered post. The markdown lives at `file`, relative to the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub excerpt: String,
}

/// Keyword rule used to derive a display category from a post title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate post id `{0}`")]
    DuplicateId(String),
    #[error("post id must not be empty (title: `{0}`)")]
    EmptyId(String),
}

/// Immutable table of posts, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    posts: Vec<PostMetadata>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new(posts: Vec<PostMetadata>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(posts.len());
        for (i, post) in posts.iter().enumerate() {
            if post.id.trim().is_empty() {
                return Err(RegistryError::EmptyId(post.title.clone()));
            }
            if index.insert(post.id.clone(), i).is_some() {
                return Err(RegistryError::DuplicateId(post.id.clone()));
            }
        }
        Ok(Self { posts, index })
    }

    pub fn get(&self, id: &str) -> Option<&PostMetadata> {
        self.index.get(id).map(|&i| &self.posts[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PostMetadata> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn references(&self, file: &str) -> bool {
        self.posts.iter().any(|p| p.file == file)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a PostMetadata;
    type IntoIter = std::slice::Iter<'a, PostMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The table a fresh site starts with.
pub fn default_posts() -> Vec<PostMetadata> {
    vec![PostMetadata {
        id: "welcome".to_string(),
        title: "Welcome to My Blog!".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        file: "blog/welcome.md".to_string(),
        category: Some("Personal".to_string()),
        excerpt: "Hello! Welcome to my personal website and blog. This is where I'll be sharing my thoughts, research insights, and learning journey.".to_string(),
    }]
}

pub fn default_category_rules() -> Vec<CategoryRule> {
    let rule = |name: &str, keywords: &[&str]| CategoryRule {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    };
    vec![
        rule("Academic", &["academic", "research"]),
        rule("Tutorial", &["tutorial", "guide"]),
        rule("Personal", &["welcome", "personal"]),
    ]
}

/// First rule with a keyword contained in the title wins.
pub fn derive_category<'a>(title: &str, rules: &'a [CategoryRule]) -> &'a str {
    let title = title.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|k| title.contains(&k.to_lowercase()))
        })
        .map_or(DEFAULT_CATEGORY, |rule| rule.name.as_str())
}

/// Listing estimate: excerpt words at 50 words per minute, at least one.
pub fn excerpt_reading_time(excerpt: &str) -> u32 {
    let words = excerpt.split_whitespace().count() as u32;
    words.div_ceil(50).max(1)
}
