// server/src/rest/handlers_reviews.rs

use lib::identity::Operation;
use models::Actor;

use crate::rest::app_state::AppState;
use crate::rest::handlers_utils::{json_ok, lift, permit, ApiReply};
use crate::rest::payloads::{DateQuery, ReviewListing, ReviewPayload, SuccessResponse};

pub async fn list(query: DateQuery, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::DocumentalReview)?;
    let date = lift(query.optional_date())?;
    let reviews = lift(state.db.reviews.list(&actor, date).await)?;
    let body: Vec<ReviewListing> = reviews.iter().map(ReviewListing::from).collect();
    Ok(json_ok(&body))
}

pub async fn record(actor: Actor, state: AppState, payload: ReviewPayload) -> ApiReply {
    let review = lift(state.db.reviews.record(&actor, payload.into_submission()).await)?;
    Ok(json_ok(&SuccessResponse::ok(format!("Review {} recorded.", review.id))))
}
