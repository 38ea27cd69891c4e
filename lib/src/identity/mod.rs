// lib/src/identity/mod.rs

//! Who is calling and what they may do: bearer-token verification, role
//! resolution from the access allow-lists, and the operation/role table.

pub mod access_control;
pub mod authenticator;
pub mod role_resolver;
pub mod token_verifier;

pub use access_control::{authorize, Operation};
pub use authenticator::Authenticator;
pub use role_resolver::{is_permitted_principal, is_staff, resolve_role};
pub use token_verifier::{StaticTokenVerifier, TokenVerifier};
