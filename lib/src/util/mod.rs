// lib/src/util/mod.rs

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
