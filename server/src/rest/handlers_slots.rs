// server/src/rest/handlers_slots.rs

use lib::identity::Operation;
use models::{Actor, SlotId};

use crate::rest::app_state::AppState;
use crate::rest::handlers_utils::{json_ok, lift, permit, ApiReply};
use crate::rest::payloads::{AvailableSlot, BulkSlotsPayload, DateQuery, ManagedSlot, MessageResponse, SuccessResponse};

pub async fn list_available(query: DateQuery, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::ListAvailableSlots)?;
    let date = lift(query.required_date())?;
    let slots = lift(state.db.slots.list_available(&actor, date).await)?;
    let body: Vec<AvailableSlot> = slots.iter().map(AvailableSlot::from).collect();
    Ok(json_ok(&body))
}

pub async fn list_all(query: DateQuery, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::ManageSlots)?;
    let date = lift(query.required_date())?;
    let slots = lift(state.db.slots.list_all(&actor, date).await)?;
    let body: Vec<ManagedSlot> = slots.iter().map(ManagedSlot::from).collect();
    Ok(json_ok(&body))
}

pub async fn bulk_create(actor: Actor, state: AppState, payload: BulkSlotsPayload) -> ApiReply {
    permit(&actor, Operation::ManageSlots)?;
    let (dates, times) = lift(payload.parse())?;
    let outcome = lift(state.db.slots.bulk_create(&actor, &dates, &times).await)?;
    Ok(json_ok(&MessageResponse { message: outcome.message() }))
}

pub async fn delete_slot(id: i64, actor: Actor, state: AppState) -> ApiReply {
    lift(state.db.slots.delete(&actor, SlotId(id)).await)?;
    Ok(json_ok(&SuccessResponse::ok("Slot removed.")))
}

pub async fn delete_slots_on(raw_date: String, actor: Actor, state: AppState) -> ApiReply {
    permit(&actor, Operation::ManageSlots)?;
    let date = lift(models::timestamp::parse_iso_date(&raw_date))?;
    let removed = lift(state.db.slots.delete_all_for_date(&actor, date).await)?;
    Ok(json_ok(&SuccessResponse::ok(format!("{} slots removed for {}.", removed, raw_date))))
}
