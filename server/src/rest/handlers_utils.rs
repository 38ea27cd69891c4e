// server/src/rest/handlers_utils.rs

use lib::identity::{authorize, Operation};
use models::errors::SchedulingResult;
use models::Actor;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Rejection;

use crate::rest::rejections::reject_with;

/// Every JSON handler answers with this.
pub type ApiReply = Result<WithStatus<Json>, Rejection>;

pub fn json_ok<T: Serialize>(body: &T) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

/// Lifts a service result into the rejection chain.
pub fn lift<T>(result: SchedulingResult<T>) -> Result<T, Rejection> {
    result.map_err(reject_with)
}

pub fn permit(actor: &Actor, operation: Operation) -> Result<(), Rejection> {
    lift(authorize(actor, operation))
}
