// lib/src/identity/access_control.rs

use log::warn;
use models::errors::{SchedulingError, SchedulingResult};
use models::{Actor, Role};

/// Everything a caller can ask of the portal, grouped by who may ask it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    WhoAmI,
    SearchBeneficiary,
    ListAvailableSlots,
    ManageSlots,
    CreateBooking,
    OverrideBooking,
    ListBookings,
    CancelBooking,
    ChangeStatus,
    PendingAlerts,
    Reports,
    Dashboard,
    DocumentalReview,
}

const ALL_OPERATORS: &[Role] = &[Role::Admin, Role::FrontDesk, Role::CallCenter, Role::Client];
const STAFF: &[Role] = &[Role::Admin, Role::FrontDesk, Role::CallCenter];
const PRIVILEGED: &[Role] = &[Role::Admin, Role::FrontDesk];
const DASHBOARD_VIEWERS: &[Role] = &[Role::Admin, Role::FrontDesk, Role::Client];

impl Operation {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::WhoAmI
            | Operation::SearchBeneficiary
            | Operation::ListAvailableSlots
            | Operation::ListBookings
            | Operation::Reports => ALL_OPERATORS,
            Operation::CreateBooking | Operation::CancelBooking => STAFF,
            Operation::ManageSlots
            | Operation::OverrideBooking
            | Operation::ChangeStatus
            | Operation::PendingAlerts
            | Operation::DocumentalReview => PRIVILEGED,
            Operation::Dashboard => DASHBOARD_VIEWERS,
        }
    }
}

pub fn authorize(actor: &Actor, operation: Operation) -> SchedulingResult<()> {
    if operation.allowed_roles().contains(&actor.role) {
        return Ok(());
    }
    warn!("Denied {:?} to {} with role {}", operation, actor.email, actor.role);
    Err(SchedulingError::Forbidden(format!("access denied for role: {}", actor.role)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_center_may_book_but_not_override() {
        let actor = Actor::new("atendente@maida.health", Role::CallCenter);
        assert!(authorize(&actor, Operation::CreateBooking).is_ok());
        assert!(authorize(&actor, Operation::CancelBooking).is_ok());
        assert!(authorize(&actor, Operation::OverrideBooking).is_err());
        assert!(authorize(&actor, Operation::ManageSlots).is_err());
        assert!(authorize(&actor, Operation::Dashboard).is_err());
    }

    #[test]
    fn clients_only_read() {
        let actor = Actor::new("gestor@cliente.com.br", Role::Client);
        assert!(authorize(&actor, Operation::ListBookings).is_ok());
        assert!(authorize(&actor, Operation::Dashboard).is_ok());
        assert!(authorize(&actor, Operation::CreateBooking).is_err());
        assert!(authorize(&actor, Operation::DocumentalReview).is_err());
    }

    #[test]
    fn guests_are_denied_everything() {
        let actor = Actor::new("x@y.com", Role::Guest);
        let err = authorize(&actor, Operation::WhoAmI).unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));
    }

    #[test]
    fn front_desk_has_privileged_operations() {
        let actor = Actor::new("recepcao@maida.health", Role::FrontDesk);
        for op in [Operation::ManageSlots, Operation::OverrideBooking, Operation::ChangeStatus, Operation::PendingAlerts] {
            assert!(authorize(&actor, op).is_ok());
        }
    }
}
