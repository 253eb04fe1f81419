use popcorn_core::{AppHandle, Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    app: AppHandle,
}

impl AppState {
    pub fn new(config: Config, app: AppHandle) -> Self {
        Self { config, app }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Handle on the controller runtime.
    pub fn app(&self) -> &AppHandle {
        &self.app
    }
}
