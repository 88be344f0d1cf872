use crate::anchors::html_escape;
use crate::registry::{derive_category, excerpt_reading_time, CategoryRule, PostMetadata, Registry};
use crate::templates::format_date;

/// How listing cards link to their post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// `post.html?id=<id>`, answered by the dev server.
    Query,
    /// `./<id>/`, the layout `generate` writes.
    Directory,
}

impl LinkStyle {
    pub fn href(self, id: &str) -> String {
        match self {
            LinkStyle::Query => format!("post.html?id={}", urlencoding::encode(id)),
            LinkStyle::Directory => format!("./{}/", id),
        }
    }
}

/// Substring search over title and excerpt, plus an exact category match.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, post: &PostMetadata, rules: &[CategoryRule]) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            if !post.title.to_lowercase().contains(&term)
                && !post.excerpt.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        match self.category.as_deref() {
            None | Some("") => true,
            Some(c) if c.eq_ignore_ascii_case("all") => true,
            Some(c) => derive_category(&post.title, rules) == c,
        }
    }
}

/// One listing card's worth of data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card<'a> {
    pub post: &'a PostMetadata,
    pub category: &'a str,
    pub reading_time: u32,
}

pub fn cards<'a>(
    registry: &'a Registry,
    rules: &'a [CategoryRule],
    filter: &ListingFilter,
) -> Vec<Card<'a>> {
    registry
        .iter()
        .filter(|post| filter.matches(post, rules))
        .map(|post| Card {
            post,
            category: derive_category(&post.title, rules),
            reading_time: excerpt_reading_time(&post.excerpt),
        })
        .collect()
}

pub fn render_card(card: &Card, links: LinkStyle) -> String {
    let href = links.href(&card.post.id);
    format!(
        r#"<div class="blog-post">
    <div class="post-category">{category}</div>
    <h2><a href="{href}">{title}</a></h2>
    <div class="meta">
        <time datetime="{iso}">{date}</time>
        <span class="reading-time">• ~{minutes} min read</span>
    </div>
    <div class="excerpt">{excerpt}</div>
    <a href="{href}" class="read-more">Read full post →</a>
</div>"#,
        category = html_escape(card.category),
        href = href,
        title = html_escape(&card.post.title),
        iso = card.post.date.format("%Y-%m-%d"),
        date = format_date(card.post.date),
        minutes = card.reading_time,
        excerpt = html_escape(&card.post.excerpt),
    )
}

pub fn render_empty_state(filtered: bool) -> String {
    let (heading, text) = if filtered {
        ("No matching posts", "Nothing matches that search. Try another term or category.")
    } else {
        ("No posts yet", "I haven't written any blog posts yet, but stay tuned for upcoming content!")
    };
    format!(
        r#"<div class="empty-state">
    <h3>{}</h3>
    <p>{}</p>
</div>"#,
        heading, text
    )
}

/// Render the body of the listing page: intro, cards or the empty state.
pub fn render_listing(
    registry: &Registry,
    rules: &[CategoryRule],
    filter: &ListingFilter,
    intro: &str,
    links: LinkStyle,
) -> String {
    let intro_html = format!(
        r#"<div class="blog-intro"><p>{}</p></div>"#,
        html_escape(intro)
    );

    let cards = cards(registry, rules, filter);
    let body = if cards.is_empty() {
        render_empty_state(!registry.is_empty())
    } else {
        cards
            .iter()
            .map(|card| render_card(card, links))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!("{}\n{}", intro_html, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_category_rules;
    use chrono::NaiveDate;

    fn post(id: &str, title: &str, excerpt: &str) -> PostMetadata {
        PostMetadata {
            id: id.to_string(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            file: format!("blog/{id}.md"),
            category: None,
            excerpt: excerpt.to_string(),
        }
    }

    fn registry() -> Registry {
        Registry::new(vec![
            post("my-research-journey", "My Research Journey", "Lessons from a master's program."),
            post("writing-guide", "A Guide to Writing", "How to write engaging posts."),
            post("welcome", "Welcome!", "Hello there."),
        ])
        .unwrap()
    }

    #[test]
    fn test_cards_keep_registry_order() {
        let registry = registry();
        let rules = default_category_rules();
        let cards = cards(&registry, &rules, &ListingFilter::default());
        let ids: Vec<_> = cards.iter().map(|c| c.post.id.as_str()).collect();
        assert_eq!(ids, vec!["my-research-journey", "writing-guide", "welcome"]);
        let categories: Vec<_> = cards.iter().map(|c| c.category).collect();
        assert_eq!(categories, vec!["Academic", "Tutorial", "Personal"]);
        assert!(cards.iter().all(|c| c.reading_time == 1));
    }

    #[test]
    fn test_search_filter() {
        let registry = registry();
        let rules = default_category_rules();
        let filter = ListingFilter {
            search: Some("ENGAGING".to_string()),
            category: None,
        };
        let found = cards(&registry, &rules, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].post.id, "writing-guide");
    }

    #[test]
    fn test_category_filter() {
        let registry = registry();
        let rules = default_category_rules();
        let only = |category: &str| {
            let filter = ListingFilter {
                search: None,
                category: Some(category.to_string()),
            };
            cards(&registry, &rules, &filter).len()
        };
        assert_eq!(only("Academic"), 1);
        assert_eq!(only("all"), 3);
        assert_eq!(only("General"), 0);
    }

    #[test]
    fn test_render_card() {
        let registry = registry();
        let rules = default_category_rules();
        let cards = cards(&registry, &rules, &ListingFilter::default());
        let html = render_card(&cards[2], LinkStyle::Query);
        assert!(html.contains(r#"<a href="post.html?id=welcome">Welcome!</a>"#));
        assert!(html.contains("February 10, 2024"));
        assert!(html.contains("~1 min read"));
        assert!(render_card(&cards[2], LinkStyle::Directory).contains(r#"href="./welcome/""#));
    }

    #[test]
    fn test_empty_registry_renders_empty_state() {
        let registry = Registry::default();
        let html = render_listing(
            &registry,
            &default_category_rules(),
            &ListingFilter::default(),
            "intro",
            LinkStyle::Directory,
        );
        assert!(html.contains("empty-state"));
        assert!(html.contains("No posts yet"));
        assert!(!html.contains("blog-post"));
    }

    #[test]
    fn test_filtered_out_renders_empty_state() {
        let filter = ListingFilter {
            search: Some("zzz".to_string()),
            category: None,
        };
        let html = render_listing(
            &registry(),
            &default_category_rules(),
            &filter,
            "intro",
            LinkStyle::Directory,
        );
        assert!(html.contains("No matching posts"));
    }
}
