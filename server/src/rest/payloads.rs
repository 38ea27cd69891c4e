// server/src/rest/payloads.rs

//! Request and response bodies. Field names are the ones the front end sends
//! and reads; every string field is optional on the wire and checked by the
//! handler so a missing field becomes a validation error, not a parse error.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use models::errors::{SchedulingError, SchedulingResult};
use models::timestamp::{parse_hour_minute, parse_iso_date};
use models::{BookingStatus, BookingView, DocumentalReview, Region, Slot};
use serde::{Deserialize, Deserializer, Serialize};

/// Accepts `12`, `"12"` or `null`. Form fields arrive as strings.
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{}'", text))),
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> SchedulingResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SchedulingError::validation(format!("{} is required", field)))
}

fn optional(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn region(value: &Option<String>) -> SchedulingResult<Region> {
    required(value, "regiao")?.parse()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    pub data: Option<String>,
}

impl DateQuery {
    pub fn required_date(&self) -> SchedulingResult<NaiveDate> {
        parse_iso_date(required(&self.data, "data")?)
    }

    pub fn optional_date(&self) -> SchedulingResult<Option<NaiveDate>> {
        match self.data.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_iso_date(raw).map(Some),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub inicio: Option<String>,
    pub fim: Option<String>,
}

impl RangeQuery {
    pub fn range(&self) -> SchedulingResult<(NaiveDate, NaiveDate)> {
        if self.inicio.is_none() || self.fim.is_none() {
            return Err(SchedulingError::validation("start and end dates are required"));
        }
        Ok((parse_iso_date(required(&self.inicio, "inicio")?)?, parse_iso_date(required(&self.fim, "fim")?)?))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub nome: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BulkSlotsPayload {
    pub datas: Vec<String>,
    pub slots: Vec<String>,
}

impl BulkSlotsPayload {
    pub fn parse(&self) -> SchedulingResult<(Vec<NaiveDate>, Vec<NaiveTime>)> {
        if self.datas.is_empty() || self.slots.is_empty() {
            return Err(SchedulingError::validation("dates and times are required"));
        }
        let dates = self.datas.iter().map(|d| parse_iso_date(d)).collect::<SchedulingResult<Vec<_>>>()?;
        let times = self.slots.iter().map(|t| parse_hour_minute(t)).collect::<SchedulingResult<Vec<_>>>()?;
        Ok((dates, times))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingPayload {
    #[serde(deserialize_with = "flexible_id")]
    pub slot_id: Option<i64>,
    pub nome: Option<String>,
    pub cartao: Option<String>,
    pub contato: Option<String>,
    pub email: Option<String>,
    pub regiao: Option<String>,
    pub obs: Option<String>,
}

impl BookingPayload {
    pub fn into_request(self) -> SchedulingResult<lib::scheduling::BookingRequest> {
        let slot_id = self.slot_id.ok_or_else(|| SchedulingError::validation("slot_id is required"))?;
        let beneficiary_name = required(&self.nome, "nome")?.to_string();
        let region = region(&self.regiao)?;
        Ok(lib::scheduling::BookingRequest {
            slot_id: slot_id.into(),
            beneficiary_name,
            card_number: optional(self.cartao),
            contact_phone: optional(self.contato),
            contact_email: optional(self.email),
            region,
            note: optional(self.obs),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OverridePayload {
    pub hora: Option<String>,
    pub nome: Option<String>,
    pub cartao: Option<String>,
    pub contato: Option<String>,
    pub regiao: Option<String>,
    pub obs: Option<String>,
    pub force: bool,
}

impl OverridePayload {
    pub fn into_request(self) -> SchedulingResult<lib::scheduling::OverrideRequest> {
        let time = parse_hour_minute(required(&self.hora, "hora")?)?;
        let beneficiary_name = required(&self.nome, "nome")?.to_string();
        let region = region(&self.regiao)?;
        Ok(lib::scheduling::OverrideRequest {
            time,
            beneficiary_name,
            card_number: optional(self.cartao),
            contact_phone: optional(self.contato),
            region,
            note: optional(self.obs),
            force: self.force,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CancelPayload {
    pub protocolo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewPayload {
    pub nome: Option<String>,
    pub cartao: Option<String>,
    pub email_beneficiario: Option<String>,
    pub status: Option<String>,
}

impl ReviewPayload {
    pub fn into_submission(self) -> lib::review::ReviewSubmission {
        lib::review::ReviewSubmission {
            beneficiary_name: optional(self.nome),
            card_number: self.cartao,
            beneficiary_email: self.email_beneficiario,
            outcome: optional(self.status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub id: i64,
    pub hora: String,
}

impl From<&Slot> for AvailableSlot {
    fn from(slot: &Slot) -> Self {
        AvailableSlot { id: slot.id.0, hora: slot.hour_minute() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedSlot {
    pub id: i64,
    pub hora: String,
    pub disponivel: bool,
}

impl From<&Slot> for ManagedSlot {
    fn from(slot: &Slot) -> Self {
        ManagedSlot { id: slot.id.0, hora: slot.hour_minute(), disponivel: slot.available }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingListing {
    pub id: i64,
    pub slot_id: i64,
    pub horario: String,
    pub data_formatada: String,
    pub data_hora: NaiveDateTime,
    pub nome_beneficiario: String,
    pub numero_cartao: String,
    pub contato: String,
    pub email_contato: String,
    pub observacao: String,
    pub regiao: Region,
    pub colaborador_email: String,
    pub status: BookingStatus,
    pub is_encaixe: bool,
}

impl From<&BookingView> for BookingListing {
    fn from(view: &BookingView) -> Self {
        let booking = &view.booking;
        BookingListing {
            id: booking.id.0,
            slot_id: booking.slot_id.0,
            horario: view.hour_minute(),
            data_formatada: view.display_date(),
            data_hora: view.starts_at,
            nome_beneficiario: booking.beneficiary_name.clone(),
            numero_cartao: booking.card_number.clone(),
            contato: booking.contact_phone.clone(),
            email_contato: booking.contact_email.clone(),
            observacao: booking.note.clone(),
            regiao: booking.region,
            colaborador_email: booking.created_by.clone(),
            status: booking.status,
            is_encaixe: booking.is_override,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewListing {
    pub id: i64,
    pub nome_beneficiario: String,
    pub numero_cartao: String,
    pub email_beneficiario: String,
    pub status: String,
    pub colaborador_email: String,
    pub hora: String,
    pub data_formatada: String,
}

impl From<&DocumentalReview> for ReviewListing {
    fn from(review: &DocumentalReview) -> Self {
        ReviewListing {
            id: review.id.0,
            nome_beneficiario: review.beneficiary_name.clone(),
            numero_cartao: review.card_number.clone(),
            email_beneficiario: review.beneficiary_email.clone(),
            status: review.outcome.as_str().to_string(),
            colaborador_email: review.recorded_by.clone(),
            hora: models::timestamp::format_hour_minute(&review.recorded_at),
            data_formatada: models::timestamp::format_display_date(&review.recorded_at.date()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        SuccessResponse { success: true, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub email: String,
    pub role: models::Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
}

/// Login UI settings, keyed the way the browser SDK expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicClientResponse {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

impl From<&lib::config::PublicClientConfig> for PublicClientResponse {
    fn from(config: &lib::config::PublicClientConfig) -> Self {
        PublicClientResponse {
            api_key: config.api_key.clone(),
            auth_domain: config.auth_domain.clone(),
            project_id: config.project_id.clone(),
            storage_bucket: config.storage_bucket.clone(),
            messaging_sender_id: config.messaging_sender_id.clone(),
            app_id: config.app_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slot_id_accepts_numbers_and_strings() {
        let from_number: BookingPayload = serde_json::from_value(json!({ "slot_id": 12 })).unwrap();
        let from_text: BookingPayload = serde_json::from_value(json!({ "slot_id": "12" })).unwrap();
        let missing: BookingPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(from_number.slot_id, Some(12));
        assert_eq!(from_text.slot_id, Some(12));
        assert_eq!(missing.slot_id, None);
        assert!(serde_json::from_value::<BookingPayload>(json!({ "slot_id": "abc" })).is_err());
    }

    #[test]
    fn booking_payload_requires_name_slot_and_region() {
        let payload: BookingPayload =
            serde_json::from_value(json!({ "slot_id": "3", "nome": "Ana", "regiao": "capital" })).unwrap();
        let request = payload.into_request().unwrap();
        assert_eq!(request.region, Region::Capital);
        assert_eq!(request.card_number, "");

        for body in [
            json!({ "nome": "Ana", "regiao": "Capital" }),
            json!({ "slot_id": 3, "regiao": "Capital" }),
            json!({ "slot_id": 3, "nome": "Ana" }),
            json!({ "slot_id": 3, "nome": "Ana", "regiao": "Litoral" }),
        ] {
            let payload: BookingPayload = serde_json::from_value(body).unwrap();
            assert!(matches!(payload.into_request(), Err(SchedulingError::Validation(_))));
        }
    }

    #[test]
    fn override_payload_parses_time_and_force() {
        let payload: OverridePayload = serde_json::from_value(
            json!({ "hora": "14:30", "nome": "Ana", "regiao": "Interior", "force": true, "obs": null }),
        )
        .unwrap();
        let request = payload.into_request().unwrap();
        assert_eq!(request.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert!(request.force);
        assert_eq!(request.note, "");
    }

    #[test]
    fn range_query_requires_both_ends() {
        let query = RangeQuery { inicio: Some("2025-06-01".into()), fim: None };
        assert!(matches!(query.range(), Err(SchedulingError::Validation(_))));
        let query = RangeQuery { inicio: Some("2025-06-01".into()), fim: Some("2025-06-30".into()) };
        assert!(query.range().is_ok());
    }

    #[test]
    fn public_client_uses_camel_case() {
        let config = lib::config::PublicClientConfig { api_key: Some("k".into()), ..Default::default() };
        let value = serde_json::to_value(PublicClientResponse::from(&config)).unwrap();
        assert_eq!(value["apiKey"], "k");
        assert!(value.get("api_key").is_none());
    }
}
