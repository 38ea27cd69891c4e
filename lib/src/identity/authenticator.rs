// lib/src/identity/authenticator.rs

use std::sync::Arc;

use log::{debug, warn};
use models::errors::{SchedulingError, SchedulingResult};
use models::Actor;

use crate::config::AccessConfig;
use crate::identity::role_resolver::{is_permitted_principal, resolve_role};
use crate::identity::token_verifier::TokenVerifier;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticates an `Authorization` header and resolves the caller's role.
pub struct Authenticator {
    verifier: Arc<dyn TokenVerifier>,
    access: AccessConfig,
}

impl Authenticator {
    pub fn new(verifier: Arc<dyn TokenVerifier>, access: AccessConfig) -> Self {
        Authenticator { verifier, access }
    }

    pub async fn authenticate(&self, authorization: Option<&str>) -> SchedulingResult<Actor> {
        let token = authorization
            .and_then(|header| header.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SchedulingError::Unauthenticated("token not provided".to_string()))?;

        let email = self.verifier.verify(token).await?;

        if !is_permitted_principal(&email, &self.access) {
            warn!("Rejected principal outside the staff domain and client list: {}", email);
            return Err(SchedulingError::Forbidden("domain or user not authorized".to_string()));
        }

        let role = resolve_role(&email, &self.access);
        debug!("Authenticated {} as {}", email, role);
        Ok(Actor::new(email, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticToken;
    use crate::identity::StaticTokenVerifier;
    use models::Role;

    fn authenticator() -> Authenticator {
        let access = AccessConfig {
            admin_emails: vec!["chefe@maida.health".to_string()],
            client_emails: vec!["gestor@cliente.com.br".to_string()],
            tokens: vec![
                StaticToken { token: "admin".into(), email: "chefe@maida.health".into() },
                StaticToken { token: "client".into(), email: "gestor@cliente.com.br".into() },
                StaticToken { token: "staff".into(), email: "atendente@maida.health".into() },
                StaticToken { token: "outsider".into(), email: "intruso@gmail.com".into() },
            ],
            ..AccessConfig::default()
        };
        let verifier = Arc::new(StaticTokenVerifier::new(&access.tokens));
        Authenticator::new(verifier, access)
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let auth = authenticator();
        assert!(matches!(auth.authenticate(None).await, Err(SchedulingError::Unauthenticated(_))));
        assert!(matches!(
            auth.authenticate(Some("Basic abc")).await,
            Err(SchedulingError::Unauthenticated(_))
        ));
        assert!(matches!(
            auth.authenticate(Some("Bearer   ")).await,
            Err(SchedulingError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn unknown_token_is_forbidden() {
        let err = authenticator().authenticate(Some("Bearer nope")).await.unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));
    }

    #[tokio::test]
    async fn outsider_domain_is_forbidden() {
        let err = authenticator().authenticate(Some("Bearer outsider")).await.unwrap_err();
        assert_eq!(err, SchedulingError::Forbidden("domain or user not authorized".to_string()));
    }

    #[tokio::test]
    async fn resolves_roles_for_valid_tokens() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(Some("Bearer admin")).await.unwrap().role, Role::Admin);
        assert_eq!(auth.authenticate(Some("Bearer client")).await.unwrap().role, Role::Client);
        let staff = auth.authenticate(Some("Bearer staff")).await.unwrap();
        assert_eq!(staff.role, Role::CallCenter);
        assert_eq!(staff.email, "atendente@maida.health");
    }
}
