//! Background-refreshing feature client.

use crate::api::{HttpRouletteApi, RouletteApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::fetcher::Fetcher;
use roulette_features::{
    Evaluation, Feature, FeatureId, FeatureLookup, FeatureRegistry, FeatureSet, Input,
};
use roulette_log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Serves feature evaluations from definitions refreshed in the background.
///
/// Reads never wait on a refresh: evaluations run against the snapshot that
/// was current when they started.
pub struct RouletteClient {
    registry: Arc<FeatureRegistry>,
    fetcher: Arc<Fetcher>,
    config: ClientConfig,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RouletteClient {
    /// Create a client backed by the HTTP definitions API.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = HttpRouletteApi::new(&config)?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Create a client over any definitions source.
    pub fn with_api(config: ClientConfig, api: Arc<dyn RouletteApi>) -> Self {
        debug!(
            "Initializing roulette client - base_url: {}, poll_interval: {:?}",
            config.base_url, config.poll_interval
        );
        Self {
            registry: Arc::new(FeatureRegistry::new()),
            fetcher: Arc::new(Fetcher::new(api)),
            config,
            handle: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    /// The snapshot currently being served.
    pub fn snapshot(&self) -> Arc<FeatureSet> {
        self.registry.snapshot()
    }

    /// Fetch once and apply the result. Returns the served snapshot version.
    pub async fn refresh(&self) -> Result<u64> {
        refresh(&self.fetcher, &self.registry).await
    }

    /// Start refreshing every `poll_interval`.
    ///
    /// Failed refreshes are logged; the served definitions stay as they were.
    pub async fn start(&self) -> Result<()> {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            warn!("Roulette client already running");
            return Err(ClientError::AlreadyRunning);
        }

        let fetcher = Arc::clone(&self.fetcher);
        let registry = Arc::clone(&self.registry);
        let interval = self.config.poll_interval;

        *handle = Some(tokio::spawn(async move {
            loop {
                if let Err(err) = refresh(&fetcher, &registry).await {
                    error!("Feature refresh failed: {}", err);
                }
                tokio::time::sleep(interval).await;
            }
        }));

        info!("Roulette client started");
        Ok(())
    }

    /// Stop the background refresh.
    pub async fn stop(&self) -> Result<()> {
        let handle = self.handle.lock().await.take();
        match handle {
            Some(handle) => {
                handle.abort();
                info!("Roulette client stopped");
                Ok(())
            }
            None => Err(ClientError::NotRunning),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    pub fn feature(&self, name: &str) -> Option<Arc<Feature>> {
        self.registry.by_name(name)
    }

    pub fn feature_by_id(&self, id: &FeatureId) -> Option<Arc<Feature>> {
        self.registry.by_id(id)
    }

    /// Evaluate the named feature; `None` when it is not loaded.
    pub fn evaluate(&self, name: &str, input: impl Into<Arc<Input>>) -> Option<Evaluation> {
        self.registry.evaluate(name, input)
    }
}

impl Drop for RouletteClient {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

/// The cursor only moves past a batch the registry accepted.
async fn refresh(fetcher: &Fetcher, registry: &FeatureRegistry) -> Result<u64> {
    fetcher
        .fetch_with(|outcome| {
            if outcome.features.is_empty() {
                debug!("No feature changes at cursor '{}'", outcome.cursor);
                return Ok(registry.version());
            }
            Ok(registry.apply(outcome.features)?)
        })
        .await
}
