// lib/src/scheduling/mod.rs

//! Slot inventory, booking/cancellation and status changes. Every operation
//! checks the caller's role before it reaches the store.

pub mod booking_engine;
pub mod slot_inventory;
pub mod status_lifecycle;

pub use booking_engine::{BookingEngine, BookingRequest, OverrideRequest};
pub use slot_inventory::{BulkCreateOutcome, SlotInventory};
pub use status_lifecycle::{
    policy_for, ForwardOnlyTransitions, PermissiveTransitions, StatusLifecycle, TransitionPolicy,
};
