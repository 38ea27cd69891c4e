// lib/src/identity/role_resolver.rs
//! Maps a principal's email onto one of the fixed roles. Pure function of the
//! access configuration; no global state.

use models::Role;

use crate::config::AccessConfig;

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn listed(list: &[String], email: &str) -> bool {
    list.iter().any(|entry| normalize(entry) == email)
}

/// True when the email belongs to the staff domain.
pub fn is_staff(email: &str, config: &AccessConfig) -> bool {
    let domain = normalize(&config.staff_domain);
    !domain.is_empty() && normalize(email).ends_with(&domain)
}

/// Only staff-domain principals and listed clients may use the portal at all.
pub fn is_permitted_principal(email: &str, config: &AccessConfig) -> bool {
    is_staff(email, config) || listed(&config.client_emails, &normalize(email))
}

/// Resolution order: admin list, front-desk list, client list, staff domain.
/// Anything else is a guest.
pub fn resolve_role(email: &str, config: &AccessConfig) -> Role {
    let email = normalize(email);
    if email.is_empty() {
        return Role::Guest;
    }
    if listed(&config.admin_emails, &email) {
        Role::Admin
    } else if listed(&config.front_desk_emails, &email) {
        Role::FrontDesk
    } else if listed(&config.client_emails, &email) {
        Role::Client
    } else if is_staff(&email, config) {
        Role::CallCenter
    } else {
        Role::Guest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access() -> AccessConfig {
        AccessConfig {
            admin_emails: vec!["chefe@maida.health".to_string()],
            front_desk_emails: vec!["recepcao@maida.health".to_string()],
            client_emails: vec!["gestor@cliente.com.br".to_string()],
            ..AccessConfig::default()
        }
    }

    #[test]
    fn resolves_listed_roles() {
        let config = access();
        assert_eq!(resolve_role("chefe@maida.health", &config), Role::Admin);
        assert_eq!(resolve_role("recepcao@maida.health", &config), Role::FrontDesk);
        assert_eq!(resolve_role("gestor@cliente.com.br", &config), Role::Client);
    }

    #[test]
    fn staff_domain_falls_back_to_call_center() {
        assert_eq!(resolve_role("atendente@maida.health", &access()), Role::CallCenter);
    }

    #[test]
    fn unknown_principals_are_guests() {
        let config = access();
        assert_eq!(resolve_role("someone@gmail.com", &config), Role::Guest);
        assert_eq!(resolve_role("", &config), Role::Guest);
        assert!(!is_permitted_principal("someone@gmail.com", &config));
    }

    #[test]
    fn comparison_ignores_case_and_whitespace() {
        let config = access();
        assert_eq!(resolve_role("  Chefe@Maida.Health ", &config), Role::Admin);
        assert!(is_permitted_principal("GESTOR@cliente.com.br", &config));
    }

    #[test]
    fn lookalike_domain_is_not_staff() {
        let config = access();
        assert!(!is_staff("x@maida.health.evil.com", &config));
        assert!(!is_staff("x@notmaida.healthy", &config));
    }
}
