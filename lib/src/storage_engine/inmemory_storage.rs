// lib/src/storage_engine/inmemory_storage.rs
//! Process-local engine. Every operation holds the single table lock for its
//! whole check-then-write sequence, so each one is atomic and operations are
//! serialised exactly as a transaction would serialise them.

use std::any::Any;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use models::errors::{SchedulingError, SchedulingResult};
use models::{
    Booking, BookingId, BookingStatus, BookingView, Cancellation, CancellationId, CancellationRequest,
    DocumentalReview, NewBooking, NewDocumentalReview, ReviewId, Slot, SlotId,
};
use tokio::sync::Mutex as TokioMutex;

use crate::storage_engine::storage_engine::{DateFilter, SchedulingStore, SlotFilter};
use crate::storage_engine::{BOOKED_SLOT_MESSAGE, OCCUPIED_SLOT_MESSAGE, UNAVAILABLE_SLOT_MESSAGE};

#[derive(Debug, Default)]
struct Tables {
    slots: BTreeMap<SlotId, Slot>,
    slot_by_instant: BTreeMap<NaiveDateTime, SlotId>,
    bookings: BTreeMap<BookingId, Booking>,
    cancellations: Vec<Cancellation>,
    reviews: Vec<DocumentalReview>,
    last_slot_id: i64,
    last_booking_id: i64,
    last_cancellation_id: i64,
    last_review_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn is_booked(&self, slot_id: SlotId) -> bool {
        self.bookings.values().any(|b| b.slot_id == slot_id)
    }

    fn view(&self, booking: &Booking) -> SchedulingResult<BookingView> {
        let slot = self.slots.get(&booking.slot_id).ok_or_else(|| {
            SchedulingError::Internal(format!("booking {} references missing slot {}", booking.id, booking.slot_id))
        })?;
        Ok(BookingView { booking: booking.clone(), starts_at: slot.starts_at })
    }

    fn slots_on(&self, date: NaiveDate) -> impl Iterator<Item = &Slot> + '_ {
        self.slot_by_instant
            .iter()
            .filter(move |(instant, _)| instant.date() == date)
            .filter_map(|(_, id)| self.slots.get(id))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: TokioMutex<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStorage {
    fn get_type(&self) -> &'static str {
        "inmemory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn init_schema(&self) -> SchedulingResult<()> {
        Ok(())
    }

    async fn insert_slots(&self, instants: &[NaiveDateTime]) -> SchedulingResult<usize> {
        let mut tables = self.tables.lock().await;
        let mut created = 0;
        for instant in instants {
            if tables.slot_by_instant.contains_key(instant) {
                continue;
            }
            let id = SlotId(next_id(&mut tables.last_slot_id));
            tables.slots.insert(id, Slot { id, starts_at: *instant, available: true });
            tables.slot_by_instant.insert(*instant, id);
            created += 1;
        }
        Ok(created)
    }

    async fn slots_on(&self, date: NaiveDate, filter: SlotFilter) -> SchedulingResult<Vec<Slot>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .slots_on(date)
            .filter(|slot| filter == SlotFilter::All || slot.available)
            .cloned()
            .collect())
    }

    async fn delete_slot(&self, id: SlotId) -> SchedulingResult<()> {
        let mut tables = self.tables.lock().await;
        let starts_at = tables
            .slots
            .get(&id)
            .map(|slot| slot.starts_at)
            .ok_or_else(|| SchedulingError::not_found(format!("slot {} not found", id)))?;
        if tables.is_booked(id) {
            return Err(SchedulingError::conflict(BOOKED_SLOT_MESSAGE));
        }
        tables.slots.remove(&id);
        tables.slot_by_instant.remove(&starts_at);
        Ok(())
    }

    async fn delete_slots_on(&self, date: NaiveDate) -> SchedulingResult<usize> {
        let mut tables = self.tables.lock().await;
        let doomed: Vec<(SlotId, NaiveDateTime)> = tables.slots_on(date).map(|s| (s.id, s.starts_at)).collect();
        if doomed.iter().any(|(id, _)| tables.is_booked(*id)) {
            return Err(SchedulingError::conflict(BOOKED_SLOT_MESSAGE));
        }
        for (id, starts_at) in &doomed {
            tables.slots.remove(id);
            tables.slot_by_instant.remove(starts_at);
        }
        Ok(doomed.len())
    }

    async fn claim_slot(&self, slot_id: SlotId, booking: NewBooking) -> SchedulingResult<Booking> {
        let mut tables = self.tables.lock().await;
        match tables.slots.get_mut(&slot_id) {
            Some(slot) if slot.available => slot.available = false,
            _ => return Err(SchedulingError::conflict(UNAVAILABLE_SLOT_MESSAGE)),
        }
        let id = BookingId(next_id(&mut tables.last_booking_id));
        let booking = booking.into_booking(id, slot_id, false);
        tables.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn claim_override_slot(
        &self,
        starts_at: NaiveDateTime,
        booking: NewBooking,
        duplicate_guard: bool,
    ) -> SchedulingResult<Booking> {
        let mut tables = self.tables.lock().await;
        let date = starts_at.date();

        if duplicate_guard {
            let mut same_day: Vec<BookingView> = tables
                .bookings
                .values()
                .filter(|existing| booking.duplicates(existing))
                .map(|existing| tables.view(existing))
                .collect::<SchedulingResult<_>>()?;
            same_day.retain(|view| view.date() == date);
            same_day.sort_by_key(|view| view.starts_at);
            if let Some(first) = same_day.first() {
                return Err(SchedulingError::DuplicateEntry { hora: first.hour_minute() });
            }
        }

        let slot_id = match tables.slot_by_instant.get(&starts_at).copied() {
            Some(existing) => {
                if tables.is_booked(existing) {
                    return Err(SchedulingError::conflict(OCCUPIED_SLOT_MESSAGE));
                }
                existing
            }
            None => {
                let id = SlotId(next_id(&mut tables.last_slot_id));
                tables.slots.insert(id, Slot { id, starts_at, available: false });
                tables.slot_by_instant.insert(starts_at, id);
                id
            }
        };
        if let Some(slot) = tables.slots.get_mut(&slot_id) {
            slot.available = false;
        }

        let id = BookingId(next_id(&mut tables.last_booking_id));
        let booking = booking.into_booking(id, slot_id, true);
        tables.bookings.insert(id, booking.clone());
        debug!("Override booking {} placed on slot {}", id, slot_id);
        Ok(booking)
    }

    async fn cancel_booking(&self, id: BookingId, request: CancellationRequest) -> SchedulingResult<Cancellation> {
        let mut tables = self.tables.lock().await;
        let view = match tables.bookings.get(&id) {
            Some(booking) => tables.view(booking)?,
            None => return Err(SchedulingError::not_found(format!("booking {} not found", id))),
        };

        let cancellation = Cancellation {
            id: CancellationId(next_id(&mut tables.last_cancellation_id)),
            slot_starts_at: view.starts_at,
            beneficiary_name: view.booking.beneficiary_name.clone(),
            card_number: view.booking.card_number.clone(),
            cancelled_by: request.cancelled_by,
            protocol: request.protocol,
            cancelled_at: request.cancelled_at,
        };
        tables.cancellations.push(cancellation.clone());
        tables.bookings.remove(&id);
        if let Some(slot) = tables.slots.get_mut(&view.booking.slot_id) {
            slot.available = true;
        }
        Ok(cancellation)
    }

    async fn booking(&self, id: BookingId) -> SchedulingResult<Option<BookingView>> {
        let tables = self.tables.lock().await;
        tables.bookings.get(&id).map(|booking| tables.view(booking)).transpose()
    }

    async fn set_booking_status(
        &self,
        id: BookingId,
        expected: Option<BookingStatus>,
        to: BookingStatus,
    ) -> SchedulingResult<()> {
        let mut tables = self.tables.lock().await;
        let booking = tables
            .bookings
            .get_mut(&id)
            .ok_or_else(|| SchedulingError::not_found(format!("booking {} not found", id)))?;
        if expected.map_or(false, |from| booking.status != from) {
            return Err(SchedulingError::conflict(format!(
                "booking {} changed status concurrently (now {})",
                id, booking.status
            )));
        }
        booking.status = to;
        Ok(())
    }

    async fn bookings(&self, filter: DateFilter) -> SchedulingResult<Vec<BookingView>> {
        let tables = self.tables.lock().await;
        let mut views: Vec<BookingView> = tables
            .bookings
            .values()
            .map(|booking| tables.view(booking))
            .collect::<SchedulingResult<_>>()?;
        views.retain(|view| filter.matches(view.date()));
        views.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.booking.id.cmp(&b.booking.id)));
        Ok(views)
    }

    async fn cancellations(&self, filter: DateFilter) -> SchedulingResult<Vec<Cancellation>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .cancellations
            .iter()
            .filter(|c| filter.matches(c.cancelled_at.date()))
            .cloned()
            .collect())
    }

    async fn insert_review(&self, review: NewDocumentalReview) -> SchedulingResult<DocumentalReview> {
        let mut tables = self.tables.lock().await;
        let id = ReviewId(next_id(&mut tables.last_review_id));
        let review = review.into_review(id);
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn reviews(&self, filter: DateFilter) -> SchedulingResult<Vec<DocumentalReview>> {
        let tables = self.tables.lock().await;
        let mut reviews: Vec<DocumentalReview> = tables
            .reviews
            .iter()
            .filter(|r| filter.matches(r.recorded_at.date()))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }
}
