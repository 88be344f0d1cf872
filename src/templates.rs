use chrono::NaiveDate;

use crate::anchors::html_escape;
use crate::article::RenderedArticle;
use crate::config::Config;
use crate::loader::LoadState;

/// `January 1, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePlatform {
    Twitter,
    LinkedIn,
    Copy,
}

impl SharePlatform {
    pub const ALL: [SharePlatform; 3] = [
        SharePlatform::Twitter,
        SharePlatform::LinkedIn,
        SharePlatform::Copy,
    ];

    fn class(self) -> &'static str {
        match self {
            SharePlatform::Twitter => "twitter",
            SharePlatform::LinkedIn => "linkedin",
            SharePlatform::Copy => "copy",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SharePlatform::Twitter => "Share on Twitter",
            SharePlatform::LinkedIn => "Share on LinkedIn",
            SharePlatform::Copy => "Copy link",
        }
    }

    /// Share target for a page, if the platform has one.
    pub fn share_url(self, page_url: &str, title: &str) -> Option<String> {
        match self {
            SharePlatform::Twitter => Some(format!(
                "https://twitter.com/intent/tweet?text={}&url={}",
                urlencoding::encode(title),
                urlencoding::encode(page_url)
            )),
            SharePlatform::LinkedIn => Some(format!(
                "https://www.linkedin.com/sharing/share-offsite/?url={}",
                urlencoding::encode(page_url)
            )),
            SharePlatform::Copy => None,
        }
    }
}

fn post_url(config: &Config, id: &str) -> Option<String> {
    config
        .url
        .as_ref()
        .map(|base| format!("{}/{}/", base.trim_end_matches('/'), id))
}

fn render_share_buttons(config: &Config, article: &RenderedArticle) -> String {
    let page_url = post_url(config, &article.id);
    SharePlatform::ALL
        .iter()
        .map(|&platform| {
            let href = page_url
                .as_deref()
                .and_then(|url| platform.share_url(url, &article.title));
            match href {
                Some(href) => format!(
                    r#"<a href="{}" class="share-btn {}" target="_blank" rel="noopener" aria-label="{}"></a>"#,
                    html_escape(&href),
                    platform.class(),
                    platform.label()
                ),
                None => format!(
                    r#"<button type="button" class="share-btn {}" data-platform="{}" aria-label="{}"></button>"#,
                    platform.class(),
                    platform.class(),
                    platform.label()
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n                        ")
}

pub fn render_article(config: &Config, article: &RenderedArticle, back_href: &str) -> String {
    let category = html_escape(&article.category);
    format!(
        r#"<div class="post-header">
                <div class="post-category">{category}</div>
                <h1 class="article-title">{title}</h1>
                <div class="article-meta">
                    <span><time datetime="{iso}">{date}</time></span>
                    <span>{minutes} min read</span>
                    <span>{category}</span>
                </div>
            </div>

            {toc}

            <div class="article-content">{body}</div>

            <div class="post-footer">
                <div class="post-navigation">
                    <a href="{back}" class="btn btn-secondary">← Back to Blog</a>
                </div>

                <div class="post-sharing">
                    <h4>Share this post</h4>
                    <div class="sharing-buttons">
                        {share}
                    </div>
                </div>
            </div>"#,
        category = category,
        title = html_escape(&article.title),
        iso = article.date.format("%Y-%m-%d"),
        date = format_date(article.date),
        minutes = article.reading_time,
        toc = article.toc_html,
        body = article.body_html,
        back = back_href,
        share = render_share_buttons(config, article),
    )
}

pub fn render_loading() -> String {
    r#"<div class="loading-message">Loading post...</div>"#.to_string()
}

pub fn render_not_found(back_href: &str) -> String {
    format!(
        r#"<div class="error-message">
                <h1>Post Not Found</h1>
                <p>The requested blog post could not be found. This might be because:</p>
                <ul>
                    <li>The URL is incorrect</li>
                    <li>The post has been moved or deleted</li>
                </ul>
                <a href="{}" class="btn btn-primary">← Back to Blog</a>
            </div>"#,
        back_href
    )
}

pub fn render_error(message: &str, back_href: &str) -> String {
    format!(
        r#"<div class="error-message">
                <h1>Error Loading Post</h1>
                <p>There was an error loading the blog post. Please try again later.</p>
                <details>
                    <summary>Technical details</summary>
                    <code>{}</code>
                </details>
                <a href="{}" class="btn btn-primary">← Back to Blog</a>
            </div>"#,
        html_escape(message),
        back_href
    )
}

/// The `#article-content` fragment for any loader state.
pub fn render_state(config: &Config, state: &LoadState, back_href: &str) -> String {
    match state {
        LoadState::Idle => String::new(),
        LoadState::Loading { .. } => render_loading(),
        LoadState::Rendered(article) => render_article(config, article, back_href),
        LoadState::NotFound { .. } => render_not_found(back_href),
        LoadState::Error { message, .. } => render_error(message, back_href),
    }
}

fn page_title(config: &Config, state: &LoadState) -> String {
    match state {
        LoadState::Rendered(article) => format!("{} - {}", article.title, config.author),
        LoadState::NotFound { .. } => format!("Post Not Found - {}", config.author),
        LoadState::Error { .. } => format!("Error - {}", config.author),
        LoadState::Idle | LoadState::Loading { .. } => format!("Blog - {}", config.author),
    }
}

/// Where page assets live relative to the page being written.
#[derive(Debug, Clone, Copy)]
pub struct AssetPaths<'a> {
    pub css: &'a str,
    pub js: &'a str,
    pub home: &'a str,
}

impl AssetPaths<'static> {
    pub const ROOT: AssetPaths<'static> = AssetPaths {
        css: "./style.css",
        js: "./post.js",
        home: "./",
    };
    pub const NESTED: AssetPaths<'static> = AssetPaths {
        css: "../style.css",
        js: "../post.js",
        home: "../",
    };
}

pub fn render_post_page(config: &Config, state: &LoadState, paths: AssetPaths, back_href: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title id="page-title">{page_title}</title>
    <link rel="stylesheet" href="{css}">
</head>
<body>
    <div class="container">
        <header>
            <a href="{home}" class="main-title">{site_title}</a>
        </header>

        <main class="content">
            <article id="article-content">
            {content}
            </article>
        </main>

        <footer>
            <span>© {author}</span>
        </footer>
    </div>
    <script src="{js}"></script>
</body>
</html>"#,
        page_title = html_escape(&page_title(config, state)),
        css = paths.css,
        home = paths.home,
        site_title = html_escape(&config.title),
        content = render_state(config, state, back_href),
        author = html_escape(&config.author),
        js = paths.js,
    )
}

pub fn render_listing_page(config: &Config, listing_html: &str, paths: AssetPaths) -> String {
    let description = config
        .description
        .as_ref()
        .map_or(String::new(), |d| format!(r#"<p class="subtitle">{}</p>"#, html_escape(d)));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Blog - {author}</title>
    <link rel="stylesheet" href="{css}">
</head>
<body>
    <div class="container">
        <header>
            <a href="{home}" class="main-title">{site_title}</a>
            {description}
        </header>

        <main class="content">
            <div id="blog-posts">
            {listing}
            </div>
        </main>
    </div>
</body>
</html>"#,
        author = html_escape(&config.author),
        css = paths.css,
        home = paths.home,
        site_title = html_escape(&config.title),
        description = description,
        listing = listing_html,
    )
}

pub fn generate_css() -> String {
    r#"* {
  margin: 0;
  padding: 0;
  box-sizing: border-box;
}

body {
  font-family: 'Inter', system-ui, sans-serif;
  line-height: 1.7;
  color: #1f2937;
  background: #ffffff;
}

.container { max-width: 760px; margin: 0 auto; padding: 2rem 1rem; }
.main-title { font-weight: 700; text-decoration: none; color: inherit; }

.post-category {
  display: inline-block;
  padding: 0.25rem 0.75rem;
  border-radius: 12px;
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  margin-bottom: 1rem;
}

.post-header { text-align: center; margin-bottom: 3rem; }
.article-meta { display: flex; justify-content: center; gap: 2rem; flex-wrap: wrap; }

.table-of-contents {
  padding: 1.5rem;
  border-radius: 12px;
  margin: 2rem 0;
  border-left: 4px solid #6366f1;
}
.table-of-contents ul { list-style: none; }

pre { position: relative; overflow-x: auto; padding: 1rem; }
.copy-code-btn { position: absolute; top: 0.5rem; right: 0.5rem; opacity: 0.7; cursor: pointer; }
.copy-code-btn:hover { opacity: 1; }

.post-footer { display: flex; justify-content: space-between; flex-wrap: wrap; gap: 2rem; margin-top: 3rem; }
.sharing-buttons { display: flex; gap: 0.5rem; }
.share-btn { width: 40px; height: 40px; border: none; border-radius: 8px; cursor: pointer; display: inline-block; }
.share-btn.twitter { background: #1DA1F2; }
.share-btn.linkedin { background: #0077B5; }
.share-btn.copy { background: #6366f1; }

.loading-message, .error-message, .empty-state { text-align: center; padding: 3rem; }
.error-message code { display: block; margin-top: 0.5rem; }

.blog-post { margin-bottom: 2.5rem; }
.reading-time { opacity: 0.7; }
"#
    .to_string()
}

/// Wires copy buttons, share buttons and smooth scrolling for TOC links.
pub fn generate_js() -> String {
    r#"(function () {
  function flash(button) {
    var original = button.textContent;
    button.textContent = '✓';
    setTimeout(function () { button.textContent = original; }, 2000);
  }

  document.querySelectorAll('.copy-code-btn').forEach(function (button) {
    button.addEventListener('click', function () {
      var code = button.parentElement.querySelector('code');
      if (code) {
        navigator.clipboard.writeText(code.textContent).then(function () { flash(button); });
      }
    });
  });

  document.querySelectorAll('button.share-btn').forEach(function (button) {
    button.addEventListener('click', function () {
      var url = window.location.href;
      var title = document.querySelector('.article-title').textContent;
      switch (button.dataset.platform) {
        case 'twitter':
          window.open('https://twitter.com/intent/tweet?text=' + encodeURIComponent(title) + '&url=' + encodeURIComponent(url));
          break;
        case 'linkedin':
          window.open('https://www.linkedin.com/sharing/share-offsite/?url=' + encodeURIComponent(url));
          break;
        case 'copy':
          navigator.clipboard.writeText(url).then(function () { flash(button); });
          break;
      }
    });
  });

  document.querySelectorAll('.table-of-contents a').forEach(function (link) {
    link.addEventListener('click', function (e) {
      var target = document.getElementById(link.getAttribute('href').substring(1));
      if (target) {
        e.preventDefault();
        target.scrollIntoView({ behavior: 'smooth' });
      }
    });
  });
})();
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> RenderedArticle {
        RenderedArticle {
            id: "welcome".to_string(),
            title: "Welcome & Hello".to_string(),
            category: "Personal".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            reading_time: 3,
            toc_html: String::new(),
            body_html: "<p>body</p>".to_string(),
            headings: Vec::new(),
        }
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()), "February 10, 2024");
    }

    #[test]
    fn test_share_url() {
        let url = SharePlatform::Twitter
            .share_url("https://example.com/welcome/", "Hi there")
            .unwrap();
        assert_eq!(
            url,
            "https://twitter.com/intent/tweet?text=Hi%20there&url=https%3A%2F%2Fexample.com%2Fwelcome%2F"
        );
        assert!(SharePlatform::Copy.share_url("https://example.com", "x").is_none());
    }

    #[test]
    fn test_share_buttons_without_site_url() {
        let html = render_article(&Config::default(), &article(), "../");
        assert!(html.contains(r#"data-platform="twitter""#));
        assert!(!html.contains("twitter.com"));
    }

    #[test]
    fn test_share_links_with_site_url() {
        let config = Config {
            url: Some("https://example.com/".to_string()),
            ..Config::default()
        };
        let html = render_article(&config, &article(), "../");
        assert!(html.contains("https://twitter.com/intent/tweet?text=Welcome%20%26%20Hello"));
        assert!(html.contains(r#"data-platform="copy""#));
    }

    #[test]
    fn test_render_state_views() {
        let config = Config::default();
        assert_eq!(render_state(&config, &LoadState::Idle, "../"), "");
        assert!(render_state(&config, &LoadState::Loading { id: "x".into() }, "../")
            .contains("Loading post..."));
        let not_found = render_state(&config, &LoadState::NotFound { id: None }, "blog.html");
        assert!(not_found.contains("Post Not Found"));
        assert!(not_found.contains(r#"href="blog.html""#));

        let error = LoadState::Error {
            id: "x".into(),
            message: "HTTP error! status: 404".into(),
        };
        assert!(render_state(&config, &error, "../").contains("<code>HTTP error! status: 404</code>"));
    }

    #[test]
    fn test_post_page_title() {
        let config = Config {
            author: "Ying".to_string(),
            ..Config::default()
        };
        let page = render_post_page(&config, &LoadState::Rendered(article()), AssetPaths::NESTED, "../");
        assert!(page.contains("<title id=\"page-title\">Welcome &amp; Hello - Ying</title>"));
        assert!(page.contains(r#"href="../style.css""#));
        assert!(page.contains("3 min read"));
    }
}
