use godown_core::chat::ChatPipeline;
use godown_core::conditions::DefaultEstimator;
use godown_core::config::GodownConfig;
use godown_core::context::ContextBuilder;
use godown_core::memstore::MemoryStore;
use godown_core::orchestrator::ConsentOrchestrator;
use godown_core::pending::MemoryPendingStore;
use godown_core::weather::{HttpWeather, StaticWeather, WeatherProvider};
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
    pub store: Arc<MemoryStore>,
    pub config: GodownConfig,
}

impl AppState {
    /// Wire the pipeline against the in-memory backend. The weather provider
    /// is HTTP when the config names a gateway, static otherwise.
    pub fn new(config: GodownConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let pending = Arc::new(MemoryPendingStore::new(config.pending_ttl()));
        let weather: Arc<dyn WeatherProvider> = match &config.weather.base_url {
            Some(base_url) => Arc::new(HttpWeather::new(base_url.clone())),
            None => Arc::new(StaticWeather),
        };

        let orchestrator = ConsentOrchestrator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            pending,
            config.clone(),
        );
        let context = ContextBuilder::new(
            store.clone(),
            store.clone(),
            store.clone(),
            weather,
            Arc::new(DefaultEstimator),
            config.clone(),
        );

        Self {
            pipeline: Arc::new(ChatPipeline::new(orchestrator, context)),
            store,
            config,
        }
    }
}
