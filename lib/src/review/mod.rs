// lib/src/review/mod.rs

//! Documental-review ("perícia documental") outcome log.

pub mod review_log;

pub use review_log::{ReviewLog, ReviewSubmission};
