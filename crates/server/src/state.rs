use fil_core::{Config, TransformService};

/// Shared application state
pub struct AppState {
    config: Config,
    service: TransformService,
}

impl AppState {
    /// State backed by the default codecs.
    pub fn new(config: Config) -> Self {
        let service = TransformService::with_defaults(config.transform.clone());
        Self::with_service(config, service)
    }

    /// State with an explicitly built service (tests inject mock codecs).
    pub fn with_service(config: Config, service: TransformService) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &TransformService {
        &self.service
    }
}
