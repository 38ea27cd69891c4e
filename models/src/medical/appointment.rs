// models/src/medical/appointment.rs
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::SchedulingError;
use crate::identifiers::{BookingId, SlotId};
use crate::timestamp::{format_display_date, format_hour_minute};

/// Contact email stored on override (walk-in) bookings in place of a real address.
pub const OVERRIDE_CONTACT_EMAIL: &str = "encaixe@recepcao";

/// Lifecycle status of a booking. Serialized with the literals the front desk uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    #[serde(rename = "Agendado")]
    Reserved,
    #[serde(rename = "Aguardando")]
    Awaiting,
    #[serde(rename = "Atendido")]
    Attended,
    #[serde(rename = "Não Compareceu")]
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Reserved,
        BookingStatus::Awaiting,
        BookingStatus::Attended,
        BookingStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Reserved => "Agendado",
            BookingStatus::Awaiting => "Aguardando",
            BookingStatus::Attended => "Atendido",
            BookingStatus::NoShow => "Não Compareceu",
        }
    }

    /// Attended and No-Show close out a booking; anything else is still pending.
    pub fn is_resolved(&self) -> bool {
        matches!(self, BookingStatus::Attended | BookingStatus::NoShow)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| SchedulingError::Validation(format!("invalid status '{}'", s)))
    }
}

/// Region category a beneficiary is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Capital,
    Interior,
    #[serde(rename = "Metropolitana")]
    Metropolitan,
    /// Stored rows whose region is blank or outside the known set.
    #[serde(rename = "Desconhecido")]
    Unknown,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Capital, Region::Interior, Region::Metropolitan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Capital => "Capital",
            Region::Interior => "Interior",
            Region::Metropolitan => "Metropolitana",
            Region::Unknown => "Desconhecido",
        }
    }

    /// Lenient decoding for values already persisted; input goes through `FromStr`.
    pub fn from_stored(raw: &str) -> Region {
        raw.parse().unwrap_or(Region::Unknown)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|region| region.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SchedulingError::Validation(format!("invalid region '{}'", s)))
    }
}

/// A patient's claim on a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub slot_id: SlotId,
    pub beneficiary_name: String,
    pub card_number: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub region: Region,
    pub note: String,
    pub created_by: String,
    pub status: BookingStatus,
    pub is_override: bool,
}

/// Booking fields supplied by the caller; the store assigns id, status and slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub beneficiary_name: String,
    pub card_number: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub region: Region,
    pub note: String,
    pub created_by: String,
}

impl NewBooking {
    pub fn into_booking(self, id: BookingId, slot_id: SlotId, is_override: bool) -> Booking {
        Booking {
            id,
            slot_id,
            beneficiary_name: self.beneficiary_name,
            card_number: self.card_number,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            region: self.region,
            note: self.note,
            created_by: self.created_by,
            status: BookingStatus::Reserved,
            is_override,
        }
    }

    /// Same-day duplicate rule for override bookings: a non-empty card number
    /// match, or a case-insensitive exact name match. No-Show bookings never count.
    pub fn duplicates(&self, existing: &Booking) -> bool {
        if existing.status == BookingStatus::NoShow {
            return false;
        }
        let same_card = !existing.card_number.is_empty() && existing.card_number == self.card_number;
        let same_name = existing.beneficiary_name.to_lowercase() == self.beneficiary_name.to_lowercase();
        same_card || same_name
    }
}

/// A booking joined with the instant of its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingView {
    pub booking: Booking,
    pub starts_at: NaiveDateTime,
}

impl BookingView {
    pub fn date(&self) -> NaiveDate {
        self.starts_at.date()
    }

    pub fn hour_minute(&self) -> String {
        format_hour_minute(&self.starts_at)
    }

    pub fn display_date(&self) -> String {
        format_display_date(&self.starts_at.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(name: &str, card: &str, status: BookingStatus) -> Booking {
        Booking {
            id: BookingId(1),
            slot_id: SlotId(1),
            beneficiary_name: name.to_string(),
            card_number: card.to_string(),
            contact_phone: String::new(),
            contact_email: String::new(),
            region: Region::Capital,
            note: String::new(),
            created_by: "desk@maida.health".to_string(),
            status,
            is_override: false,
        }
    }

    fn candidate(name: &str, card: &str) -> NewBooking {
        NewBooking {
            beneficiary_name: name.to_string(),
            card_number: card.to_string(),
            contact_phone: String::new(),
            contact_email: OVERRIDE_CONTACT_EMAIL.to_string(),
            region: Region::Interior,
            note: String::new(),
            created_by: "desk@maida.health".to_string(),
        }
    }

    #[test]
    fn status_literals_round_trip_through_from_str() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("Cancelado".parse::<BookingStatus>().is_err());
        assert!("agendado".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn status_serializes_to_wire_literal() {
        let json = serde_json::to_string(&BookingStatus::NoShow).unwrap();
        assert_eq!(json, "\"Não Compareceu\"");
    }

    #[test]
    fn region_parsing_ignores_case() {
        assert_eq!("metropolitana".parse::<Region>().unwrap(), Region::Metropolitan);
        assert!("Litoral".parse::<Region>().is_err());
        assert!("Desconhecido".parse::<Region>().is_err());
    }

    #[test]
    fn stored_region_falls_back_to_unknown() {
        assert_eq!(Region::from_stored(" interior "), Region::Interior);
        assert_eq!(Region::from_stored(""), Region::Unknown);
        assert_eq!(Region::from_stored("Litoral"), Region::Unknown);
        let json = serde_json::to_string(&Region::from_stored("")).unwrap();
        assert_eq!(json, "\"Desconhecido\"");
    }

    #[test]
    fn duplicate_by_card_or_name() {
        let booked = existing("Ana Silva", "123", BookingStatus::Reserved);
        assert!(candidate("Someone Else", "123").duplicates(&booked));
        assert!(candidate("ANA SILVA", "").duplicates(&booked));
        assert!(!candidate("Bruno", "999").duplicates(&booked));
    }

    #[test]
    fn empty_card_numbers_never_match_each_other() {
        let booked = existing("Ana Silva", "", BookingStatus::Reserved);
        assert!(!candidate("Bruno", "").duplicates(&booked));
    }

    #[test]
    fn no_show_bookings_are_ignored() {
        let booked = existing("Ana Silva", "123", BookingStatus::NoShow);
        assert!(!candidate("Ana Silva", "123").duplicates(&booked));
    }
}
