// server/src/rest/handlers_bookings.rs

use lib::identity::Operation;
use models::errors::SchedulingError;
use models::{Actor, BookingId};

use crate::rest::app_state::AppState;
use crate::rest::handlers_utils::{json_ok, lift, permit, ApiReply};
use crate::rest::payloads::{
    BookingListing, BookingPayload, CancelPayload, DateQuery, OverridePayload, StatusPayload, SuccessResponse,
};

pub async fn book(actor: Actor, state: AppState, payload: BookingPayload) -> ApiReply {
    permit(&actor, Operation::CreateBooking)?;
    let request = lift(payload.into_request())?;
    lift(state.db.bookings.book(&actor, request).await)?;
    Ok(json_ok(&SuccessResponse::ok("Booking confirmed.")))
}

pub async fn book_override(actor: Actor, state: AppState, payload: OverridePayload) -> ApiReply {
    permit(&actor, Operation::OverrideBooking)?;
    let request = lift(payload.into_request())?;
    let booking = lift(state.db.bookings.book_override(&actor, request).await)?;
    Ok(json_ok(&SuccessResponse::ok(format!("Override booking {} confirmed.", booking.id))))
}

pub async fn list(query: DateQuery, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::ListBookings)?;
    let date = lift(query.optional_date())?;
    let views = lift(state.db.bookings.list(&actor, date).await)?;
    let body: Vec<BookingListing> = views.iter().map(BookingListing::from).collect();
    Ok(json_ok(&body))
}

pub async fn cancel(id: i64, actor: Actor, state: AppState, payload: CancelPayload) -> ApiReply {
    let protocol = payload.protocolo.unwrap_or_default();
    lift(state.db.bookings.cancel(&actor, BookingId(id), &protocol).await)?;
    Ok(json_ok(&SuccessResponse::ok("Booking cancelled and slot released.")))
}

pub async fn change_status(id: i64, actor: Actor, state: AppState, payload: StatusPayload) -> ApiReply {
    permit(&actor, Operation::ChangeStatus)?;
    let raw = lift(payload.status.ok_or_else(|| SchedulingError::validation("status is required")))?;
    let status = lift(state.db.statuses.transition(&actor, BookingId(id), &raw).await)?;
    Ok(json_ok(&SuccessResponse::ok(format!("Status updated to {}.", status))))
}
