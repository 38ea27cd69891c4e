// server/src/rest/handlers_reports.rs

use lib::identity::Operation;
use models::Actor;

use crate::rest::app_state::AppState;
use crate::rest::handlers_utils::{json_ok, lift, permit, ApiReply};
use crate::rest::payloads::RangeQuery;

pub async fn pending_alerts(actor: Actor, state: AppState) -> ApiReply {
    let alerts = lift(state.db.reports.pending_alerts(&actor).await)?;
    Ok(json_ok(&alerts))
}

pub async fn report(query: RangeQuery, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::Reports)?;
    let (from, to) = lift(query.range())?;
    let report = lift(state.db.reports.report(&actor, from, to).await)?;
    Ok(json_ok(&report))
}

pub async fn dashboard(query: RangeQuery, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::Dashboard)?;
    let (from, to) = lift(query.range())?;
    let stats = lift(state.db.reports.dashboard(&actor, from, to).await)?;
    Ok(json_ok(&stats))
}
