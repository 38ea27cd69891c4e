// server/src/rest/routes.rs

use std::path::PathBuf;

use log::info;
use warp::filters::BoxedFilter;
use warp::http::Uri;
use warp::reply::{Json, Response, WithStatus};
use warp::{Filter, Rejection, Reply};

use crate::rest::app_state::{with_state, AppState};
use crate::rest::auth::with_actor;
use crate::rest::rejections::handle_rejection;
use crate::rest::{
    handlers_bookings, handlers_identity, handlers_reports, handlers_reviews, handlers_slots,
};

const JSON_BODY_LIMIT: u64 = 64 * 1024;
const LOGIN_PAGE: &str = "/html/login.html";

type ApiRoute = BoxedFilter<(WithStatus<Json>,)>;

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    warp::body::content_length_limit(JSON_BODY_LIMIT).and(warp::body::json())
}

fn identity_routes(state: &AppState) -> ApiRoute {
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers_identity::health);

    let public_client = warp::path!("api" / "firebase-config")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers_identity::public_client_config);

    let me = warp::path!("api" / "me")
        .or(warp::path!("api" / "user-role"))
        .unify()
        .and(warp::get())
        .and(with_actor(state.clone()))
        .and_then(handlers_identity::who_am_i);

    let search = warp::path!("api" / "buscar-beneficiario")
        .and(warp::get())
        .and(warp::query())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_identity::search_beneficiary);

    health.or(public_client).unify().or(me).unify().or(search).unify().boxed()
}

fn slot_routes(state: &AppState) -> ApiRoute {
    let available = warp::path!("api" / "slots-disponiveis")
        .and(warp::get())
        .and(warp::query())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_slots::list_available);

    let list_all = warp::path!("api" / "admin" / "slots")
        .and(warp::get())
        .and(warp::query())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_slots::list_all);

    let bulk_create = warp::path!("api" / "admin" / "slots")
        .and(warp::post())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers_slots::bulk_create);

    let delete_on_date = warp::path!("api" / "admin" / "slots" / "date" / String)
        .and(warp::delete())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_slots::delete_slots_on);

    let delete_one = warp::path!("api" / "admin" / "slots" / i64)
        .and(warp::delete())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_slots::delete_slot);

    available
        .or(list_all)
        .unify()
        .or(bulk_create)
        .unify()
        .or(delete_on_date)
        .unify()
        .or(delete_one)
        .unify()
        .boxed()
}

fn booking_routes(state: &AppState) -> ApiRoute {
    let book = warp::path!("api" / "agendar")
        .and(warp::post())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers_bookings::book);

    let book_override = warp::path!("api" / "encaixe")
        .and(warp::post())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers_bookings::book_override);

    let list = warp::path!("api" / "agendamentos")
        .and(warp::get())
        .and(warp::query())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_bookings::list);

    let cancel = warp::path!("api" / "agendamentos" / i64)
        .and(warp::delete())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers_bookings::cancel);

    let change_status = warp::path!("api" / "agendamentos" / i64 / "status")
        .and(warp::patch())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers_bookings::change_status);

    book.or(book_override)
        .unify()
        .or(list)
        .unify()
        .or(cancel)
        .unify()
        .or(change_status)
        .unify()
        .boxed()
}

fn reporting_routes(state: &AppState) -> ApiRoute {
    let pending = warp::path!("api" / "alertas" / "pendencias")
        .and(warp::get())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_reports::pending_alerts);

    let report = warp::path!("api" / "relatorios")
        .and(warp::get())
        .and(warp::query())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_reports::report);

    let dashboard = warp::path!("api" / "dashboard-stats")
        .and(warp::get())
        .and(warp::query())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_reports::dashboard);

    let list_reviews = warp::path!("api" / "pericia")
        .and(warp::get())
        .and(warp::query())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and_then(handlers_reviews::list);

    let record_review = warp::path!("api" / "pericia")
        .and(warp::post())
        .and(with_actor(state.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers_reviews::record);

    pending
        .or(report)
        .unify()
        .or(dashboard)
        .unify()
        .or(list_reviews)
        .unify()
        .or(record_review)
        .unify()
        .boxed()
}

/// Every `/api` endpoint, without recovery. Rejections bubble up.
pub fn api_routes(state: AppState) -> ApiRoute {
    identity_routes(&state)
        .or(slot_routes(&state))
        .unify()
        .or(booking_routes(&state))
        .unify()
        .or(reporting_routes(&state))
        .unify()
        .boxed()
}

/// The external front end: `/` redirects to the login page, everything else
/// is looked up under `dir`.
fn static_routes(dir: PathBuf) -> BoxedFilter<(Response,)> {
    let root = warp::path::end()
        .and(warp::get())
        .map(|| warp::redirect::temporary(Uri::from_static(LOGIN_PAGE)).into_response());
    let files = warp::fs::dir(dir).map(|file: warp::fs::File| file.into_response());
    root.or(files).unify().boxed()
}

/// The full service: API, optional static site, error recovery, access log
/// and CORS.
pub fn routes(state: AppState, static_dir: Option<PathBuf>) -> BoxedFilter<(impl Reply,)> {
    let api = api_routes(state).map(|reply: WithStatus<Json>| reply.into_response());
    let app = match static_dir {
        Some(dir) => {
            info!("Serving static files from {}", dir.display());
            api.or(static_routes(dir)).unify().boxed()
        }
        None => api.boxed(),
    };

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["authorization", "content-type"])
        .allow_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"]);

    app.recover(handle_rejection)
        .with(warp::log("scheduling::http"))
        .with(cors)
        .boxed()
}
