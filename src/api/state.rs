use std::sync::Arc;

use crate::generate::GenerateConfig;
use crate::paste::PasteService;
use crate::secrets::{Invalidator, SecretsConfig};

#[derive(Debug, Clone, Copy)]
pub struct SecretLimits {
    pub max_query_bytes: usize,
    pub max_body_bytes: usize,
}

impl From<&SecretsConfig> for SecretLimits {
    fn from(config: &SecretsConfig) -> Self {
        Self {
            max_query_bytes: config.max_query_bytes,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pastes: Arc<PasteService>,
    pub invalidator: Invalidator,
    pub secret_limits: SecretLimits,
    pub generate: Arc<GenerateConfig>,
}

impl AppState {
    pub fn new(
        pastes: Arc<PasteService>,
        invalidator: Invalidator,
        secrets: &SecretsConfig,
        generate: GenerateConfig,
    ) -> Self {
        Self {
            pastes,
            invalidator,
            secret_limits: SecretLimits::from(secrets),
            generate: Arc::new(generate),
        }
    }
}
