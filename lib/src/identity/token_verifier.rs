// lib/src/identity/token_verifier.rs

use std::collections::HashMap;

use async_trait::async_trait;
use models::errors::{SchedulingError, SchedulingResult};

use crate::config::StaticToken;

/// Turns a bearer token into the email of the principal it was issued to.
/// Identity-provider integrations live behind this trait.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> SchedulingResult<String>;
}

/// Verifier backed by the `access.tokens` table of the configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: &[StaticToken]) -> Self {
        StaticTokenVerifier {
            tokens: tokens
                .iter()
                .map(|entry| (entry.token.clone(), entry.email.trim().to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> SchedulingResult<String> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| SchedulingError::Forbidden("invalid token".to_string()))
    }
}
