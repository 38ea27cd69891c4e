// models/src/medical/mod.rs

pub mod appointment;
pub mod cancellation;
pub mod documental_review;
pub mod slot;

pub use appointment::{Booking, BookingStatus, BookingView, NewBooking, Region, OVERRIDE_CONTACT_EMAIL};
pub use cancellation::{Cancellation, CancellationRequest};
pub use documental_review::{DocumentalReview, NewDocumentalReview, ReviewOutcome};
pub use slot::Slot;
