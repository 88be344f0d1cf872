use crate::config::Config;
use crate::listing::{render_listing, LinkStyle, ListingFilter};
use crate::loader::{LoadState, PostLoader};
use crate::registry::Registry;
use crate::source::Source;
use crate::templates::{self, AssetPaths};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// What a `generate` run produced.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub rendered: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub orphans: Vec<PathBuf>,
}

pub struct SiteGenerator<S> {
    config: Config,
    loader: PostLoader<S>,
}

impl<S: Source> SiteGenerator<S> {
    pub fn new(config: Config, registry: Arc<Registry>, source: S) -> Self {
        let timeout = config.fetch_timeout();
        Self {
            config,
            loader: PostLoader::new(registry, source, timeout),
        }
    }

    pub async fn generate(&self) -> Result<GenerateReport> {
        println!("{}", "Generating site...".cyan());

        let output_dir = Path::new(&self.config.output_dir);
        fs::create_dir_all(output_dir)
            .context("Failed to create output directory")?;

        let mut report = GenerateReport::default();
        self.generate_posts(output_dir, &mut report).await?;
        self.generate_index(output_dir)?;
        self.copy_assets(output_dir)?;

        if self.config.source_url.is_none() {
            report.orphans = self.find_orphans();
            for orphan in &report.orphans {
                log::warn!("{} is not referenced by any registered post", orphan.display());
            }
        }

        println!(
            "{}",
            format!("Generated {} posts", report.rendered.len()).green()
        );
        if !report.failed.is_empty() {
            println!(
                "{}",
                format!("{} posts failed to load", report.failed.len()).yellow()
            );
        }

        Ok(report)
    }

    async fn generate_posts(&self, output_dir: &Path, report: &mut GenerateReport) -> Result<()> {
        let registry = self.loader.registry();
        let progress = ProgressBar::new(registry.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
            progress.set_style(style);
        }

        for post in registry {
            progress.set_message(post.id.clone());
            let state = self.loader.load(Some(post.id.as_str())).await;
            match &state {
                LoadState::Rendered(_) => report.rendered.push(post.id.clone()),
                LoadState::Error { message, .. } => {
                    progress.println(format!("Failed to load '{}': {}", post.id, message).red().to_string());
                    report.failed.push((post.id.clone(), message.clone()));
                }
                _ => {}
            }

            let html = templates::render_post_page(&self.config, &state, AssetPaths::NESTED, "../");
            let post_dir = output_dir.join(&post.id);
            fs::create_dir_all(&post_dir)
                .with_context(|| format!("Failed to create {}", post_dir.display()))?;
            fs::write(post_dir.join("index.html"), html)
                .with_context(|| format!("Failed to write page for '{}'", post.id))?;
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(())
    }

    fn generate_index(&self, output_dir: &Path) -> Result<()> {
        let listing = render_listing(
            self.loader.registry(),
            &self.config.categories,
            &ListingFilter::default(),
            &self.config.intro,
            LinkStyle::Directory,
        );
        let html = templates::render_listing_page(&self.config, &listing, AssetPaths::ROOT);
        fs::write(output_dir.join("index.html"), html)
            .context("Failed to write index page")?;
        Ok(())
    }

    fn copy_assets(&self, output_dir: &Path) -> Result<()> {
        fs::write(output_dir.join("style.css"), templates::generate_css())
            .context("Failed to write style.css")?;
        fs::write(output_dir.join("post.js"), templates::generate_js())
            .context("Failed to write post.js")?;
        Ok(())
    }

    /// Markdown files under the content root that no registry entry points at.
    fn find_orphans(&self) -> Vec<PathBuf> {
        let root = Path::new(&self.config.content_dir);
        let output_dir = Path::new(&self.config.output_dir);
        let registry = self.loader.registry();

        WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.path().ends_with(output_dir)
                        || e.file_name().to_str().is_some_and(|n| n.starts_with('.') || n == "target"))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "md"))
            .filter_map(|e| {
                let relative = e.path().strip_prefix(root).ok()?;
                let key = relative.to_string_lossy().replace('\\', "/");
                (!registry.references(&key) && key != "README.md").then(|| e.path().to_path_buf())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PostMetadata;
    use crate::source::FsSource;
    use chrono::NaiveDate;

    fn post(id: &str) -> PostMetadata {
        PostMetadata {
            id: id.to_string(),
            title: format!("Post {id}"),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            file: format!("blog/{id}.md"),
            category: None,
            excerpt: "A short excerpt.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("blog")).unwrap();
        fs::write(root.join("blog/welcome.md"), "---\ntitle: Hello\n---\n# Welcome\n\nHi.\n").unwrap();
        fs::write(root.join("blog/draft.md"), "# Draft\n").unwrap();

        let config = Config {
            content_dir: root.to_string_lossy().into_owned(),
            output_dir: root.join("dist").to_string_lossy().into_owned(),
            posts: vec![post("welcome"), post("missing")],
            ..Config::default()
        };
        let registry = Arc::new(config.registry().unwrap());
        let generator = SiteGenerator::new(config, registry, FsSource::new(root));
        let report = generator.generate().await.unwrap();

        assert_eq!(report.rendered, vec!["welcome".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "missing");
        assert_eq!(report.orphans, vec![root.join("blog/draft.md")]);

        let page = fs::read_to_string(root.join("dist/welcome/index.html")).unwrap();
        assert!(page.contains("Hello - Author"));
        assert!(page.contains(r#"id="welcome""#));
        let error_page = fs::read_to_string(root.join("dist/missing/index.html")).unwrap();
        assert!(error_page.contains("Error Loading Post"));

        let index = fs::read_to_string(root.join("dist/index.html")).unwrap();
        assert!(index.contains(r#"href="./welcome/""#));
        assert!(root.join("dist/style.css").exists());
        assert!(root.join("dist/post.js").exists());
    }
}
