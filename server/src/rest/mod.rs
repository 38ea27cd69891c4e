// server/src/rest/mod.rs

//! The JSON HTTP API. Every endpoint lives under `/api`.

pub mod app_state;
pub mod auth;
pub mod handlers_bookings;
pub mod handlers_identity;
pub mod handlers_reports;
pub mod handlers_reviews;
pub mod handlers_slots;
pub mod handlers_utils;
pub mod payloads;
pub mod rejections;
pub mod routes;

pub use app_state::AppState;
pub use routes::{api_routes, routes};
