// lib/src/storage_engine/storage_engine.rs

use std::any::Any;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use models::errors::SchedulingResult;
use models::{
    Booking, BookingId, BookingStatus, BookingView, Cancellation, CancellationRequest, DocumentalReview,
    NewBooking, NewDocumentalReview, Slot, SlotId,
};

/// Which slots a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFilter {
    All,
    AvailableOnly,
}

/// Calendar-date window over slot instants. `from`/`to` are inclusive,
/// `before` is exclusive; unset bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
}

impl DateFilter {
    pub fn all() -> Self {
        DateFilter::default()
    }

    pub fn on(date: NaiveDate) -> Self {
        DateFilter { from: Some(date), to: Some(date), before: None }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        DateFilter { from: Some(from), to: Some(to), before: None }
    }

    pub fn before(date: NaiveDate) -> Self {
        DateFilter { from: None, to: None, before: Some(date) }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from)
            && self.to.map_or(true, |to| date <= to)
            && self.before.map_or(true, |before| date < before)
    }
}

/// Persistence for slots, bookings, cancellations and documental reviews.
///
/// Each mutating method is one transactional unit: an implementation either
/// applies every step or none of them. The booking engine is the only caller
/// allowed to use the booking and slot mutations.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    fn get_type(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// Creates missing tables. A no-op for engines without a schema.
    async fn init_schema(&self) -> SchedulingResult<()>;

    /// Inserts a slot per instant; instants that already exist are skipped.
    /// Returns how many slots were actually created.
    async fn insert_slots(&self, instants: &[NaiveDateTime]) -> SchedulingResult<usize>;

    /// Slots on `date`, ascending by instant.
    async fn slots_on(&self, date: NaiveDate, filter: SlotFilter) -> SchedulingResult<Vec<Slot>>;

    /// Fails with `Conflict` if a booking references the slot, `NotFound` if absent.
    async fn delete_slot(&self, id: SlotId) -> SchedulingResult<()>;

    /// All-or-nothing: fails with `Conflict` and deletes nothing if any slot
    /// on `date` is booked. Returns the number of slots removed.
    async fn delete_slots_on(&self, date: NaiveDate) -> SchedulingResult<usize>;

    /// Flips the slot from available to unavailable (the first write) and then
    /// inserts the booking. `Conflict` when the slot is taken or unknown.
    async fn claim_slot(&self, slot_id: SlotId, booking: NewBooking) -> SchedulingResult<Booking>;

    /// Override path: optionally refuses same-day duplicates, upserts an
    /// unavailable slot at `starts_at`, then inserts a booking flagged as override.
    async fn claim_override_slot(
        &self,
        starts_at: NaiveDateTime,
        booking: NewBooking,
        duplicate_guard: bool,
    ) -> SchedulingResult<Booking>;

    /// Writes the audit record, deletes the booking and frees its slot.
    async fn cancel_booking(&self, id: BookingId, request: CancellationRequest) -> SchedulingResult<Cancellation>;

    async fn booking(&self, id: BookingId) -> SchedulingResult<Option<BookingView>>;

    /// Writes `to` into the status column. With `expected` set this is a
    /// compare-and-set that fails with `Conflict` when the stored status
    /// differs; with `None` the write is unconditional. `NotFound` when the
    /// booking is gone.
    async fn set_booking_status(
        &self,
        id: BookingId,
        expected: Option<BookingStatus>,
        to: BookingStatus,
    ) -> SchedulingResult<()>;

    /// Bookings whose slot date matches `filter`, ascending by slot instant.
    async fn bookings(&self, filter: DateFilter) -> SchedulingResult<Vec<BookingView>>;

    /// Cancellations whose cancellation date matches `filter`.
    async fn cancellations(&self, filter: DateFilter) -> SchedulingResult<Vec<Cancellation>>;

    async fn insert_review(&self, review: NewDocumentalReview) -> SchedulingResult<DocumentalReview>;

    /// Reviews whose recorded date matches `filter`, newest first.
    async fn reviews(&self, filter: DateFilter) -> SchedulingResult<Vec<DocumentalReview>>;
}

#[cfg(test)]
mod tests {
    use super::DateFilter;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn date_filter_bounds() {
        assert!(DateFilter::on(d(10)).matches(d(10)));
        assert!(!DateFilter::on(d(10)).matches(d(11)));
        assert!(DateFilter::between(d(10), d(12)).matches(d(12)));
        assert!(!DateFilter::between(d(10), d(12)).matches(d(9)));
        assert!(DateFilter::before(d(10)).matches(d(9)));
        assert!(!DateFilter::before(d(10)).matches(d(10)));
        assert!(DateFilter::all().matches(d(1)));
    }
}
