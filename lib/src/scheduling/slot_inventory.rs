// lib/src/scheduling/slot_inventory.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use models::errors::{SchedulingError, SchedulingResult};
use models::{Actor, Slot, SlotId};

use crate::identity::{authorize, Operation};
use crate::storage_engine::{SchedulingStore, SlotFilter};

/// Result of a bulk slot creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkCreateOutcome {
    pub requested: usize,
    pub created: usize,
}

impl BulkCreateOutcome {
    pub fn skipped(&self) -> usize {
        self.requested - self.created
    }

    pub fn message(&self) -> String {
        format!(
            "Slots created for the selected days: {} new, {} already existed.",
            self.created,
            self.skipped()
        )
    }
}

/// Manages the bookable instants. Booking state is never touched here; the
/// only slot mutations outside this type belong to the booking engine.
pub struct SlotInventory {
    store: Arc<dyn SchedulingStore>,
}

impl SlotInventory {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        SlotInventory { store }
    }

    /// Inserts the cross product of `dates` and `times`. Existing instants
    /// are left alone, so re-running the same request is harmless.
    pub async fn bulk_create(
        &self,
        actor: &Actor,
        dates: &[NaiveDate],
        times: &[NaiveTime],
    ) -> SchedulingResult<BulkCreateOutcome> {
        authorize(actor, Operation::ManageSlots)?;
        if dates.is_empty() || times.is_empty() {
            return Err(SchedulingError::validation("dates and times are required"));
        }
        let instants: BTreeSet<NaiveDateTime> = dates
            .iter()
            .flat_map(|date| times.iter().map(move |time| date.and_time(*time)))
            .collect();
        let instants: Vec<NaiveDateTime> = instants.into_iter().collect();
        let created = self.store.insert_slots(&instants).await?;
        let outcome = BulkCreateOutcome { requested: instants.len(), created };
        info!(
            "{} created {} slots across {} dates ({} already existed)",
            actor.email,
            outcome.created,
            dates.len(),
            outcome.skipped()
        );
        Ok(outcome)
    }

    pub async fn list_available(&self, actor: &Actor, date: NaiveDate) -> SchedulingResult<Vec<Slot>> {
        authorize(actor, Operation::ListAvailableSlots)?;
        self.store.slots_on(date, SlotFilter::AvailableOnly).await
    }

    pub async fn list_all(&self, actor: &Actor, date: NaiveDate) -> SchedulingResult<Vec<Slot>> {
        authorize(actor, Operation::ManageSlots)?;
        self.store.slots_on(date, SlotFilter::All).await
    }

    pub async fn delete(&self, actor: &Actor, id: SlotId) -> SchedulingResult<()> {
        authorize(actor, Operation::ManageSlots)?;
        match self.store.delete_slot(id).await {
            Ok(()) => {
                info!("{} deleted slot {}", actor.email, id);
                Ok(())
            }
            Err(e) => {
                warn!("Slot {} was not deleted: {}", id, e);
                Err(e)
            }
        }
    }

    pub async fn delete_all_for_date(&self, actor: &Actor, date: NaiveDate) -> SchedulingResult<usize> {
        authorize(actor, Operation::ManageSlots)?;
        match self.store.delete_slots_on(date).await {
            Ok(deleted) => {
                info!("{} deleted {} slots on {}", actor.email, deleted, date);
                Ok(deleted)
            }
            Err(e) => {
                warn!("Slots on {} were not deleted: {}", date, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::InMemoryStorage;
    use models::Role;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn inventory() -> SlotInventory {
        SlotInventory::new(Arc::new(InMemoryStorage::new()))
    }

    fn admin() -> Actor {
        Actor::new("boss@maida.health", Role::Admin)
    }

    #[tokio::test]
    async fn bulk_create_is_cross_product_and_idempotent() {
        let inventory = inventory();
        let dates = [date(10), date(12)];
        let times = [time(9), time(10)];

        let first = inventory.bulk_create(&admin(), &dates, &times).await.unwrap();
        assert_eq!(first, BulkCreateOutcome { requested: 4, created: 4 });

        let second = inventory.bulk_create(&admin(), &dates, &times).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped(), 4);

        let total = inventory.list_all(&admin(), date(10)).await.unwrap().len()
            + inventory.list_all(&admin(), date(12)).await.unwrap().len();
        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn bulk_create_requires_both_sets() {
        let err = inventory().bulk_create(&admin(), &[date(10)], &[]).await.unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(_)));
    }

    #[tokio::test]
    async fn call_center_cannot_manage_slots() {
        let inventory = inventory();
        let agent = Actor::new("agent@maida.health", Role::CallCenter);
        let err = inventory.bulk_create(&agent, &[date(10)], &[time(9)]).await.unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));
        assert!(inventory.list_available(&agent, date(10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn available_listing_is_ordered() {
        let inventory = inventory();
        inventory.bulk_create(&admin(), &[date(10)], &[time(15), time(8)]).await.unwrap();
        let hours: Vec<String> = inventory
            .list_available(&admin(), date(10))
            .await
            .unwrap()
            .iter()
            .map(Slot::hour_minute)
            .collect();
        assert_eq!(hours, vec!["08:00", "15:00"]);
    }

    #[tokio::test]
    async fn delete_unknown_slot_is_not_found() {
        let err = inventory().delete(&admin(), SlotId(7)).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }
}
