//! Server session: owns the preference resolver and the render pipeline.

use std::sync::Arc;

use latex_image::{
    load_preferences, ConfigStore, Elicitor, JsonConfigStore, LatexResult, PreferenceResolver,
    Preferences, RenderPipeline, RenderRequest, RenderedImage,
};

use crate::config::ServerConfig;
use crate::types::McpResult;

/// Shared state behind the three tool operations.
pub struct LatexSession {
    resolver: PreferenceResolver,
    pipeline: RenderPipeline,
}

impl LatexSession {
    /// Open the preferences file named in `config` and seed the preferences.
    pub fn open(config: &ServerConfig) -> McpResult<Self> {
        let store = JsonConfigStore::open(&config.config_path)?;
        tracing::info!("Preferences file: {}", store.path().display());
        Self::with_store(Arc::new(store), config)
    }

    /// Build a session on top of an existing store.
    pub fn with_store(store: Arc<dyn ConfigStore>, config: &ServerConfig) -> McpResult<Self> {
        let initial = load_preferences(store.as_ref(), &config.overrides)?;

        tracing::info!(
            "Loaded preferences: dark_mode={:?} font_size={:?}. Endpoint: {}",
            initial.dark_mode,
            initial.font_size,
            config.endpoint
        );

        Ok(Self {
            resolver: PreferenceResolver::new(initial, store),
            pipeline: RenderPipeline::new(config.endpoint.clone(), config.max_image_bytes),
        })
    }

    /// Render a formula. The first call in the process negotiates preferences.
    pub async fn render(&self, formula: &str, client: &dyn Elicitor) -> LatexResult<RenderedImage> {
        let preferences = self.resolver.ensure_negotiated(client).await;
        let request = RenderRequest::new(formula, preferences);
        self.pipeline.render(&request).await
    }

    pub async fn preferences(&self) -> Preferences {
        self.resolver.snapshot().await
    }

    pub async fn set_preferences(
        &self,
        client: &dyn Elicitor,
        dark_mode: Option<bool>,
        font_size: Option<String>,
    ) -> LatexResult<Preferences> {
        self.resolver
            .set_preferences(client, dark_mode, font_size)
            .await
    }
}
