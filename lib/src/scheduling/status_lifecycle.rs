// lib/src/scheduling/status_lifecycle.rs

use std::sync::Arc;

use log::{info, warn};
use models::errors::{SchedulingError, SchedulingResult};
use models::{Actor, BookingId, BookingStatus};

use crate::config::SchedulingConfig;
use crate::identity::{authorize, Operation};
use crate::storage_engine::SchedulingStore;

/// Decides whether a booking may move between two statuses.
pub trait TransitionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn permits(&self, from: BookingStatus, to: BookingStatus) -> bool;

    /// Whether `permits` looks at the current status. When it does not, the
    /// write skips the read and lands unconditionally.
    fn inspects_current(&self) -> bool {
        true
    }
}

/// Any of the four statuses may follow any other, including moving back.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveTransitions;

impl TransitionPolicy for PermissiveTransitions {
    fn name(&self) -> &'static str {
        "permissive"
    }

    fn permits(&self, _from: BookingStatus, _to: BookingStatus) -> bool {
        true
    }

    fn inspects_current(&self) -> bool {
        false
    }
}

/// Reserved -> {Awaiting, Attended, No-Show}, Awaiting -> {Attended, No-Show}.
/// Attended and No-Show are terminal. Re-applying the current status is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardOnlyTransitions;

impl TransitionPolicy for ForwardOnlyTransitions {
    fn name(&self) -> &'static str {
        "forward-only"
    }

    fn permits(&self, from: BookingStatus, to: BookingStatus) -> bool {
        use BookingStatus::*;
        from == to
            || matches!(
                (from, to),
                (Reserved, Awaiting) | (Reserved, Attended) | (Reserved, NoShow) | (Awaiting, Attended) | (Awaiting, NoShow)
            )
    }
}

pub fn policy_for(config: &SchedulingConfig) -> Arc<dyn TransitionPolicy> {
    if config.strict_status_transitions {
        Arc::new(ForwardOnlyTransitions)
    } else {
        Arc::new(PermissiveTransitions)
    }
}

/// Moves bookings through their status values. Slots are never touched.
pub struct StatusLifecycle {
    store: Arc<dyn SchedulingStore>,
    policy: Arc<dyn TransitionPolicy>,
}

impl StatusLifecycle {
    pub fn new(store: Arc<dyn SchedulingStore>, policy: Arc<dyn TransitionPolicy>) -> Self {
        StatusLifecycle { store, policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// `raw_status` must be one of the four wire literals exactly.
    pub async fn transition(&self, actor: &Actor, id: BookingId, raw_status: &str) -> SchedulingResult<BookingStatus> {
        authorize(actor, Operation::ChangeStatus)?;
        let target: BookingStatus = raw_status.parse()?;
        if !self.policy.inspects_current() {
            self.store.set_booking_status(id, None, target).await?;
            info!("{} set booking {} to {}", actor.email, id, target);
            return Ok(target);
        }
        let current = self
            .store
            .booking(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(format!("booking {} not found", id)))?
            .booking
            .status;
        if !self.policy.permits(current, target) {
            warn!("Refused {} -> {} on booking {} under {} policy", current, target, id, self.policy.name());
            return Err(SchedulingError::validation(format!(
                "booking cannot move from '{}' to '{}'",
                current, target
            )));
        }
        self.store.set_booking_status(id, Some(current), target).await?;
        info!("{} moved booking {} from {} to {}", actor.email, id, current, target);
        Ok(target)
    }
}
