// lib/src/database.rs

use std::sync::Arc;

use log::info;
use models::errors::SchedulingResult;

use crate::config::{AppConfig, SchedulingConfig};
use crate::reporting::ReportingReader;
use crate::review::ReviewLog;
use crate::scheduling::{policy_for, BookingEngine, SlotInventory, StatusLifecycle};
use crate::storage_engine::{create_storage, SchedulingStore};
use crate::util::Clock;

/// One storage engine and every service built on it, sharing a clock.
#[derive(Clone)]
pub struct Database {
    storage: Arc<dyn SchedulingStore>,
    pub slots: Arc<SlotInventory>,
    pub bookings: Arc<BookingEngine>,
    pub statuses: Arc<StatusLifecycle>,
    pub reviews: Arc<ReviewLog>,
    pub reports: Arc<ReportingReader>,
}

impl Database {
    /// Opens the configured engine and, when `storage.init_schema` is set,
    /// creates missing tables before anything is served.
    pub async fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> SchedulingResult<Self> {
        let storage = create_storage(&config.storage).await?;
        if config.storage.init_schema {
            storage.init_schema().await?;
        }
        Ok(Database::with_storage(storage, &config.scheduling, clock))
    }

    pub fn with_storage(storage: Arc<dyn SchedulingStore>, scheduling: &SchedulingConfig, clock: Arc<dyn Clock>) -> Self {
        let statuses = StatusLifecycle::new(storage.clone(), policy_for(scheduling));
        info!(
            "Scheduling services ready on {} storage ({} status transitions)",
            storage.get_type(),
            statuses.policy_name()
        );
        Database {
            slots: Arc::new(SlotInventory::new(storage.clone())),
            bookings: Arc::new(BookingEngine::new(storage.clone(), clock.clone())),
            statuses: Arc::new(statuses),
            reviews: Arc::new(ReviewLog::new(storage.clone(), clock.clone())),
            reports: Arc::new(ReportingReader::new(storage.clone(), clock)),
            storage,
        }
    }

    pub fn storage_type(&self) -> &'static str {
        self.storage.get_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::FixedClock;
    use chrono::NaiveDate;
    use models::{Actor, Role};

    #[tokio::test]
    async fn services_share_one_store() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let db = Database::new(&AppConfig::default(), Arc::new(FixedClock(now))).await.unwrap();
        assert_eq!(db.storage_type(), "inmemory");

        let admin = Actor::new("boss@maida.health", Role::Admin);
        let time = now.time();
        db.slots.bulk_create(&admin, &[now.date()], &[time]).await.unwrap();
        let slots = db.slots.list_all(&admin, now.date()).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(db.bookings.list(&admin, Some(now.date())).await.unwrap().len(), 0);
    }
}
