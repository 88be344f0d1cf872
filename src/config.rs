use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::registry::{default_category_rules, default_posts, CategoryRule, PostMetadata, Registry};
use crate::source::{FsSource, HttpSource, PostSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    /// Public URL of the site, used for share links.
    pub url: Option<String>,
    /// Root that post `file` paths are resolved against.
    pub content_dir: String,
    pub output_dir: String,
    /// When set, posts are fetched over HTTP relative to this URL instead of read from disk.
    pub source_url: Option<String>,
    pub fetch_timeout_secs: u64,
    pub intro: String,
    pub categories: Vec<CategoryRule>,
    pub posts: Vec<PostMetadata>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: Some("Notes on research, writing and learning".to_string()),
            author: "Author".to_string(),
            url: None,
            content_dir: ".".to_string(),
            output_dir: "dist".to_string(),
            source_url: None,
            fetch_timeout_secs: 10,
            intro: "Welcome to my blog! This is where I share my thoughts on academic life, research, technology, and personal growth.".to_string(),
            categories: default_category_rules(),
            posts: default_posts(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            let content = fs::read_to_string(&path)
                .context("Failed to read config file")?;
            let config: Config = serde_json::from_str(&content)
                .context("Failed to parse config file")?;
            config
        } else {
            let config = Config::default();
            config.save(&path)
                .context("Failed to write default config")?;
            log::info!("wrote default config to {}", path.as_ref().display());
            config
        };

        if let Ok(url) = std::env::var("FOLIO_SOURCE_URL") {
            config.source_url = Some(url).filter(|u| !u.is_empty());
        }
        if let Ok(dir) = std::env::var("FOLIO_OUTPUT_DIR") {
            if !dir.is_empty() {
                config.output_dir = dir;
            }
        }

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn registry(&self) -> Result<Registry> {
        Registry::new(self.posts.clone()).context("Invalid post registry in config")
    }

    pub fn source(&self) -> PostSource {
        match &self.source_url {
            Some(url) => PostSource::Http(HttpSource::new(url.clone())),
            None => PostSource::Fs(FsSource::new(&self.content_dir)),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}
