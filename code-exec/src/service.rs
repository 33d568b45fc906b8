use ecs_runner::OrchestratorClient;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{
    config::Settings,
    error::Error,
    executor::ProcessExecutor,
    languages::{LanguageConfig, LanguageInfo, LanguageRegistry},
    remote::RemoteTaskOrchestrator,
    security::SecurityScreener,
    types::{ExecutionRequest, ExecutionResult, Strategy, MAX_CODE_LENGTH},
};

/// Entry point for code execution. Every request, accepted or rejected,
/// produces an [`ExecutionResult`].
#[derive(Clone)]
pub struct ExecutionCoordinator {
    registry: Arc<LanguageRegistry>,
    screener: Arc<SecurityScreener>,
    executor: Arc<ProcessExecutor>,
    orchestrator: Option<Arc<RemoteTaskOrchestrator>>,
    settings: Settings,
}

impl ExecutionCoordinator {
    /// Coordinator with the built-in languages and the local strategy only.
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, LanguageRegistry::builtin())
    }

    pub fn with_registry(settings: Settings, registry: LanguageRegistry) -> Self {
        let executor = ProcessExecutor::new(
            settings.workspace_root.clone(),
            settings.compile_timeout(),
        );

        Self {
            registry: Arc::new(registry),
            screener: Arc::new(SecurityScreener::new()),
            executor: Arc::new(executor),
            orchestrator: None,
            settings,
        }
    }

    /// Attach a cluster client. Remote execution is used when the settings
    /// prefer it and the language has a container image.
    pub fn with_orchestrator(mut self, client: Arc<dyn OrchestratorClient>) -> Self {
        self.orchestrator = Some(Arc::new(RemoteTaskOrchestrator::new(
            client,
            self.settings.poll_interval(),
        )));
        self
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn languages(&self) -> Vec<LanguageInfo> {
        self.registry.all().iter().map(LanguageInfo::from).collect()
    }

    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let started = Instant::now();

        match self.run(&request).await {
            Ok(output) => {
                info!(
                    "Execution of {} code completed in {:?}",
                    request.language,
                    started.elapsed()
                );
                ExecutionResult::success(output, started.elapsed())
            }
            Err(e) => {
                if e.kind().is_rejection() {
                    warn!("Rejected {} request: {}", request.language, e);
                } else {
                    error!("Execution of {} code failed: {}", request.language, e);
                }
                ExecutionResult::failure(&e, started.elapsed())
            }
        }
    }

    async fn run(&self, request: &ExecutionRequest) -> Result<String, Error> {
        validate(request)?;

        let config = self
            .registry
            .get(&request.language)
            .ok_or_else(|| Error::Validation(format!("Unsupported language: {}", request.language)))?;

        let report = self.screener.validate(&request.code, config.id);
        if !report.allowed {
            return Err(Error::SecurityViolation(report.violations));
        }

        let timeout = request.effective_timeout(config.timeout);
        let input = request.input.as_deref();

        match self.remote_for(config) {
            Some(orchestrator) => {
                debug!("Dispatching {} execution to the cluster", config.id);
                orchestrator
                    .execute(config, &request.code, input, timeout)
                    .await
            }
            None => {
                debug!("Dispatching {} execution to a local process", config.id);
                self.executor
                    .execute(config, &request.code, input, timeout)
                    .await
            }
        }
    }

    fn remote_for(&self, config: &LanguageConfig) -> Option<&RemoteTaskOrchestrator> {
        match (self.settings.strategy, config.image) {
            (Strategy::Remote, Some(_)) => self.orchestrator.as_deref(),
            _ => None,
        }
    }
}

fn validate(request: &ExecutionRequest) -> Result<(), Error> {
    if request.language.trim().is_empty() || request.code.trim().is_empty() {
        return Err(Error::Validation(
            "Language and code are required".to_string(),
        ));
    }
    if request.code.chars().count() > MAX_CODE_LENGTH {
        return Err(Error::Validation(
            "Code size exceeds maximum limit (50KB)".to_string(),
        ));
    }
    Ok(())
}
