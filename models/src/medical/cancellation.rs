// models/src/medical/cancellation.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::identifiers::CancellationId;

/// Immutable audit record written exactly once per cancelled booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub id: CancellationId,
    pub slot_starts_at: NaiveDateTime,
    pub beneficiary_name: String,
    pub card_number: String,
    pub cancelled_by: String,
    pub protocol: String,
    pub cancelled_at: NaiveDateTime,
}

/// Who cancelled, under which protocol, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationRequest {
    pub cancelled_by: String,
    pub protocol: String,
    pub cancelled_at: NaiveDateTime,
}
