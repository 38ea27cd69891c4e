// server/src/rest/handlers_identity.rs

use lib::identity::Operation;
use log::debug;
use models::Actor;

use crate::rest::app_state::AppState;
use crate::rest::handlers_utils::{json_ok, lift, permit, ApiReply};
use crate::rest::payloads::{HealthResponse, PublicClientResponse, SearchQuery, WhoAmIResponse};

pub async fn health(state: AppState) -> ApiReply {
    Ok(json_ok(&HealthResponse { status: "ok".to_string(), storage: state.db.storage_type().to_string() }))
}

pub async fn public_client_config(state: AppState) -> ApiReply {
    Ok(json_ok(&PublicClientResponse::from(state.public_client.as_ref())))
}

pub async fn who_am_i(actor: Actor) -> ApiReply {
    permit(&actor, Operation::WhoAmI)?;
    Ok(json_ok(&WhoAmIResponse { email: actor.email, role: actor.role }))
}

pub async fn search_beneficiary(query: SearchQuery, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::SearchBeneficiary)?;
    debug!("{} searching the beneficiary directory", actor.email);
    let page = lift(state.directory.search(query.nome.as_deref().unwrap_or_default()).await)?;
    Ok(json_ok(&page))
}
