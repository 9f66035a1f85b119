//! Connector facade.
//!
//! The explicit context object that owns the connection state, persisted
//! history, event bus, and every collaborator. There are no process-wide
//! globals: construct one `Connector` per application, inject a custom
//! probe transport or prompt builder for tests, and share it behind an
//! `Arc` if multiple tasks need it.

use crate::adapter::{adapter_chain, ProtocolAdapter};
use crate::config::ConnectorConfig;
use crate::connection::{ConnectionHandle, ConnectionState};
use crate::discovery::{DiscoverOptions, Discovery, DiscoveryError};
use crate::events::{ConnectorEvent, EventBus};
use crate::health::HealthMonitor;
use crate::history::HistoryStore;
use crate::pipeline::{
    GenerateError, GenerationOptions, GenerationResponse, PromptBuilder, RequestPipeline,
    RetryPolicy, SoapPromptBuilder,
};
use crate::probe::{EndpointProbe, EndpointTestResult, Prober};
use crate::recovery::Recovery;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Connector {
    config: ConnectorConfig,
    connection: Arc<ConnectionHandle>,
    history: Arc<HistoryStore>,
    events: EventBus,
    probe: Arc<dyn EndpointProbe>,
    discovery: Arc<Discovery>,
    recovery: Arc<Recovery>,
    pipeline: RequestPipeline,
}

impl Connector {
    /// Build a connector with the real HTTP transport and the default SOAP
    /// prompt template.
    pub fn new(config: ConnectorConfig) -> Self {
        Self::build(config, None, None)
    }

    /// Build a connector with an injected probe transport (testing).
    pub fn with_probe(config: ConnectorConfig, probe: Arc<dyn EndpointProbe>) -> Self {
        Self::build(config, Some(probe), None)
    }

    /// Build a connector with an injected prompt builder.
    pub fn with_prompt_builder(config: ConnectorConfig, builder: Arc<dyn PromptBuilder>) -> Self {
        Self::build(config, None, Some(builder))
    }

    fn build(
        config: ConnectorConfig,
        probe: Option<Arc<dyn EndpointProbe>>,
        prompt_builder: Option<Arc<dyn PromptBuilder>>,
    ) -> Self {
        let client = Arc::new(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.generation.timeout_seconds))
                .build()
                .expect("Failed to build HTTP client"),
        );

        let adapters: Vec<Arc<dyn ProtocolAdapter>> = adapter_chain(client);
        let probe = probe.unwrap_or_else(|| Arc::new(Prober::new(adapters.clone())));
        let prompt_builder = prompt_builder.unwrap_or_else(|| Arc::new(SoapPromptBuilder));

        let connection = Arc::new(ConnectionHandle::new());
        let history = Arc::new(HistoryStore::open(&config.history.path));
        let events = EventBus::default();

        let discovery = Arc::new(Discovery::new(
            probe.clone(),
            history.clone(),
            connection.clone(),
            events.clone(),
            config.discovery.clone(),
        ));

        let recovery = Arc::new(Recovery::new(
            probe.clone(),
            history.clone(),
            connection.clone(),
            events.clone(),
            discovery.clone(),
            Duration::from_secs(config.health_check.timeout_seconds),
        ));

        let pipeline = RequestPipeline::new(
            adapters,
            connection.clone(),
            events.clone(),
            RetryPolicy::from(&config.retry),
            config.generation.clone(),
            prompt_builder,
        );

        Self {
            config,
            connection,
            history,
            events,
            probe,
            discovery,
            recovery,
            pipeline,
        }
    }

    /// Subscribe to status/progress/health/recovery notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.events.subscribe()
    }

    /// Run endpoint discovery with the configured concurrency cap.
    pub async fn discover(&self) -> Result<String, DiscoveryError> {
        self.discover_with(&DiscoverOptions {
            max_concurrent: self.config.discovery.max_concurrent,
            quick_test_first: true,
        })
        .await
    }

    /// Run endpoint discovery with explicit options.
    pub async fn discover_with(&self, options: &DiscoverOptions) -> Result<String, DiscoveryError> {
        self.discovery.discover(options).await
    }

    /// Generate a note from a transcript against the active endpoint.
    pub async fn generate(
        &self,
        transcript: &str,
        options: GenerationOptions,
    ) -> Result<GenerationResponse, GenerateError> {
        self.pipeline.generate(transcript, options).await
    }

    /// Manually trigger the recovery strategy chain.
    pub async fn recover(&self) -> bool {
        self.recovery.recover().await
    }

    /// Start the background health monitor. Stop it by cancelling the token.
    pub fn start_health_monitor(&self, cancel_token: CancellationToken) -> JoinHandle<()> {
        HealthMonitor::new(
            self.probe.clone(),
            self.connection.clone(),
            self.events.clone(),
            self.recovery.clone(),
            self.config.health_check.clone(),
        )
        .start(cancel_token)
    }

    /// Probe one endpoint with the health-check timeout.
    pub async fn probe_endpoint(&self, endpoint: &str) -> EndpointTestResult {
        let timeout = Duration::from_secs(self.config.health_check.timeout_seconds);
        let result = self.probe.test_endpoint_detailed(endpoint, timeout).await;
        self.connection.record_report(result.clone());
        result
    }

    /// Current connection state snapshot.
    pub fn status(&self) -> ConnectionState {
        self.connection.snapshot()
    }

    /// Latest probe outcome per endpoint, most recent first.
    pub fn endpoint_reports(&self) -> Vec<EndpointTestResult> {
        self.connection.endpoint_reports()
    }

    /// Persisted endpoint history, most recent first.
    pub fn endpoint_history(&self) -> Vec<String> {
        self.history.endpoints()
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}
