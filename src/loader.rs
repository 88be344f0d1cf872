use std::sync::Arc;
use std::time::Duration;

use crate::article::RenderedArticle;
use crate::registry::Registry;
use crate::source::{FetchError, Source};

/// Where a single post load currently stands.
///
/// `Rendered`, `NotFound` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { id: String },
    Rendered(RenderedArticle),
    NotFound { id: Option<String> },
    Error { id: String, message: String },
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoadState::Rendered(_) | LoadState::NotFound { .. } | LoadState::Error { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading { .. } => "loading",
            LoadState::Rendered(_) => "rendered",
            LoadState::NotFound { .. } => "not_found",
            LoadState::Error { .. } => "error",
        }
    }
}

pub struct PostLoader<S> {
    registry: Arc<Registry>,
    source: S,
    timeout: Duration,
}

impl<S: Source> PostLoader<S> {
    pub fn new(registry: Arc<Registry>, source: S, timeout: Duration) -> Self {
        Self {
            registry,
            source,
            timeout,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[cfg(test)]
    fn source(&self) -> &S {
        &self.source
    }

    pub async fn load(&self, id: Option<&str>) -> LoadState {
        self.load_with(id, |_| {}).await
    }

    /// Drive one load to a terminal state, reporting every state to `observe`.
    pub async fn load_with<F>(&self, id: Option<&str>, mut observe: F) -> LoadState
    where
        F: FnMut(&LoadState),
    {
        let mut report = |state: LoadState| {
            log::debug!("post load -> {}", state.name());
            observe(&state);
            state
        };
        report(LoadState::Idle);

        let id = id.map(str::trim).filter(|id| !id.is_empty());
        let Some(meta) = id.and_then(|id| self.registry.get(id)) else {
            log::info!("no post registered for id {id:?}");
            return report(LoadState::NotFound {
                id: id.map(str::to_string),
            });
        };

        report(LoadState::Loading {
            id: meta.id.clone(),
        });

        let fetched = match tokio::time::timeout(self.timeout, self.source.fetch(&meta.file)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        match fetched {
            Ok(raw) => {
                let article = RenderedArticle::render(meta, &raw);
                log::info!(
                    "rendered `{}` ({} headings, {} min read)",
                    meta.id,
                    article.headings.len(),
                    article.reading_time
                );
                report(LoadState::Rendered(article))
            }
            Err(e) => {
                log::warn!("failed to load `{}` from {}: {}", meta.id, meta.file, e);
                report(LoadState::Error {
                    id: meta.id.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}
