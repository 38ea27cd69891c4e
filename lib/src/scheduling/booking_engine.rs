// lib/src/scheduling/booking_engine.rs

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use log::{error, info, warn};
use models::errors::{SchedulingError, SchedulingResult};
use models::{
    Actor, Booking, BookingId, BookingView, Cancellation, CancellationRequest, NewBooking, Region, SlotId,
    OVERRIDE_CONTACT_EMAIL,
};

use crate::identity::{authorize, Operation};
use crate::storage_engine::{DateFilter, SchedulingStore};
use crate::util::Clock;

/// Normal booking against a slot picked from the available list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub slot_id: SlotId,
    pub beneficiary_name: String,
    pub card_number: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub region: Region,
    pub note: String,
}

/// Walk-in booking at a time of day, always for today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRequest {
    pub time: NaiveTime,
    pub beneficiary_name: String,
    pub card_number: String,
    pub contact_phone: String,
    pub region: Region,
    pub note: String,
    /// Skip the same-day duplicate check.
    pub force: bool,
}

fn required_name(raw: &str) -> SchedulingResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SchedulingError::validation("beneficiary name is required"));
    }
    Ok(name.to_string())
}

fn log_rejection<T>(what: &str, result: SchedulingResult<T>) -> SchedulingResult<T> {
    if let Err(e) = &result {
        if e.is_internal() {
            error!("{} failed: {}", what, e);
        } else {
            warn!("{} rejected: {}", what, e);
        }
    }
    result
}

/// Claims and releases slots. Each call is one transactional unit in the store.
pub struct BookingEngine {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn SchedulingStore>, clock: Arc<dyn Clock>) -> Self {
        BookingEngine { store, clock }
    }

    pub async fn book(&self, actor: &Actor, request: BookingRequest) -> SchedulingResult<Booking> {
        authorize(actor, Operation::CreateBooking)?;
        let booking = NewBooking {
            beneficiary_name: required_name(&request.beneficiary_name)?,
            card_number: request.card_number.trim().to_string(),
            contact_phone: request.contact_phone,
            contact_email: request.contact_email,
            region: request.region,
            note: request.note,
            created_by: actor.email.clone(),
        };
        let result = self.store.claim_slot(request.slot_id, booking).await;
        let booking = log_rejection("Booking", result)?;
        info!("{} booked slot {} as booking {}", actor.email, booking.slot_id, booking.id);
        Ok(booking)
    }

    /// Places a booking at today's date and `request.time`, taking over a free
    /// regular slot at that instant or creating one.
    pub async fn book_override(&self, actor: &Actor, request: OverrideRequest) -> SchedulingResult<Booking> {
        authorize(actor, Operation::OverrideBooking)?;
        let starts_at = self.clock.today().and_time(request.time);
        let booking = NewBooking {
            beneficiary_name: required_name(&request.beneficiary_name)?,
            card_number: request.card_number.trim().to_string(),
            contact_phone: request.contact_phone,
            contact_email: OVERRIDE_CONTACT_EMAIL.to_string(),
            region: request.region,
            note: request.note,
            created_by: actor.email.clone(),
        };
        let result = self.store.claim_override_slot(starts_at, booking, !request.force).await;
        let booking = log_rejection("Override booking", result)?;
        info!(
            "{} placed override booking {} at {}{}",
            actor.email,
            booking.id,
            starts_at,
            if request.force { " (forced)" } else { "" }
        );
        Ok(booking)
    }

    pub async fn cancel(&self, actor: &Actor, id: BookingId, protocol: &str) -> SchedulingResult<Cancellation> {
        authorize(actor, Operation::CancelBooking)?;
        let protocol = protocol.trim();
        if protocol.is_empty() {
            return Err(SchedulingError::validation("a protocol number is required to cancel a booking"));
        }
        let request = CancellationRequest {
            cancelled_by: actor.email.clone(),
            protocol: protocol.to_string(),
            cancelled_at: self.clock.now(),
        };
        let result = self.store.cancel_booking(id, request).await;
        let cancellation = log_rejection("Cancellation", result)?;
        info!(
            "{} cancelled booking {} (protocol {}), slot at {} released",
            actor.email, id, cancellation.protocol, cancellation.slot_starts_at
        );
        Ok(cancellation)
    }

    /// Bookings ordered by slot time, optionally restricted to one date.
    pub async fn list(&self, actor: &Actor, date: Option<NaiveDate>) -> SchedulingResult<Vec<BookingView>> {
        authorize(actor, Operation::ListBookings)?;
        let filter = date.map(DateFilter::on).unwrap_or_default();
        self.store.bookings(filter).await
    }
}
