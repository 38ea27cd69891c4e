// models/src/lib.rs

pub mod access;
pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod timestamp;

pub use access::{Actor, Role};
pub use errors::{SchedulingError, SchedulingResult};
pub use identifiers::{BookingId, CancellationId, ReviewId, SlotId};
pub use medical::{
    Booking, BookingStatus, BookingView, Cancellation, CancellationRequest, DocumentalReview,
    NewBooking, NewDocumentalReview, Region, ReviewOutcome, Slot, OVERRIDE_CONTACT_EMAIL,
};
