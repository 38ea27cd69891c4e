// server/src/rest/auth.rs

use models::Actor;
use warp::{Filter, Rejection};

use crate::rest::app_state::AppState;
use crate::rest::rejections::reject_with;

/// Resolves the caller from the `Authorization` header. Chain it after the
/// path and method filters so unauthenticated requests to other routes still
/// fall through to 404/405.
pub fn with_actor(state: AppState) -> impl Filter<Extract = (Actor,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let state = state.clone();
        async move {
            state
                .authenticator
                .authenticate(header.as_deref())
                .await
                .map_err(reject_with)
        }
    })
}
