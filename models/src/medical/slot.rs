// models/src/medical/slot.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::identifiers::SlotId;
use crate::timestamp::format_hour_minute;

/// A single bookable instant. `starts_at` is unique across all slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub starts_at: NaiveDateTime,
    pub available: bool,
}

impl Slot {
    pub fn date(&self) -> NaiveDate {
        self.starts_at.date()
    }

    /// `HH:MM` projection used by every slot listing.
    pub fn hour_minute(&self) -> String {
        format_hour_minute(&self.starts_at)
    }
}
