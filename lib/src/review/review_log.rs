// lib/src/review/review_log.rs

use std::sync::Arc;

use chrono::NaiveDate;
use log::info;
use models::errors::{SchedulingError, SchedulingResult};
use models::{Actor, DocumentalReview, NewDocumentalReview, ReviewOutcome};

use crate::identity::{authorize, Operation};
use crate::storage_engine::{DateFilter, SchedulingStore};
use crate::util::Clock;

/// Caller-supplied fields of a documental review. `outcome` is the raw wire
/// literal and is validated on record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub beneficiary_name: String,
    pub card_number: Option<String>,
    pub beneficiary_email: Option<String>,
    pub outcome: String,
}

pub struct ReviewLog {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
}

impl ReviewLog {
    pub fn new(store: Arc<dyn SchedulingStore>, clock: Arc<dyn Clock>) -> Self {
        ReviewLog { store, clock }
    }

    pub async fn record(&self, actor: &Actor, submission: ReviewSubmission) -> SchedulingResult<DocumentalReview> {
        authorize(actor, Operation::DocumentalReview)?;
        let name = submission.beneficiary_name.trim();
        if name.is_empty() || submission.outcome.trim().is_empty() {
            return Err(SchedulingError::validation("name and status are required"));
        }
        let outcome: ReviewOutcome = submission.outcome.parse()?;
        let review = self
            .store
            .insert_review(NewDocumentalReview {
                beneficiary_name: name.to_string(),
                card_number: submission.card_number.unwrap_or_default(),
                beneficiary_email: submission.beneficiary_email.unwrap_or_default(),
                outcome,
                recorded_by: actor.email.clone(),
                recorded_at: self.clock.now(),
            })
            .await?;
        info!("{} recorded documental review {} ({})", actor.email, review.id, review.outcome);
        Ok(review)
    }

    /// Reviews recorded on `date` (today when absent), newest first.
    pub async fn list(&self, actor: &Actor, date: Option<NaiveDate>) -> SchedulingResult<Vec<DocumentalReview>> {
        authorize(actor, Operation::DocumentalReview)?;
        let date = date.unwrap_or_else(|| self.clock.today());
        self.store.reviews(DateFilter::on(date)).await
    }
}
