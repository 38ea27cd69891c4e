// models/src/medical/documental_review.rs
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::SchedulingError;
use crate::identifiers::ReviewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewOutcome {
    #[serde(rename = "autorizado")]
    Authorized,
    #[serde(rename = "indeferido")]
    Denied,
    #[serde(rename = "autorizado_parcialmente")]
    PartiallyAuthorized,
}

impl ReviewOutcome {
    pub const ALL: [ReviewOutcome; 3] = [
        ReviewOutcome::Authorized,
        ReviewOutcome::Denied,
        ReviewOutcome::PartiallyAuthorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewOutcome::Authorized => "autorizado",
            ReviewOutcome::Denied => "indeferido",
            ReviewOutcome::PartiallyAuthorized => "autorizado_parcialmente",
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewOutcome {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReviewOutcome::ALL
            .iter()
            .copied()
            .find(|outcome| outcome.as_str() == s.trim())
            .ok_or_else(|| SchedulingError::Validation(format!("invalid review outcome '{}'", s)))
    }
}

/// Outcome of a documental review ("perícia documental"). Unrelated to slots
/// and bookings; append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentalReview {
    pub id: ReviewId,
    pub beneficiary_name: String,
    pub card_number: String,
    pub beneficiary_email: String,
    pub outcome: ReviewOutcome,
    pub recorded_by: String,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocumentalReview {
    pub beneficiary_name: String,
    pub card_number: String,
    pub beneficiary_email: String,
    pub outcome: ReviewOutcome,
    pub recorded_by: String,
    pub recorded_at: NaiveDateTime,
}

impl NewDocumentalReview {
    pub fn into_review(self, id: ReviewId) -> DocumentalReview {
        DocumentalReview {
            id,
            beneficiary_name: self.beneficiary_name,
            card_number: self.card_number,
            beneficiary_email: self.beneficiary_email,
            outcome: self.outcome,
            recorded_by: self.recorded_by,
            recorded_at: self.recorded_at,
        }
    }
}
