// lib/src/storage_engine/postgres_storage.rs
//! PostgreSQL engine. Every multi-step mutation runs inside one
//! `client.transaction()`; returning early drops the transaction, which rolls
//! it back, so only a fully successful sequence reaches `commit`.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, error, info};
use models::errors::{SchedulingError, SchedulingResult};
use models::{
    Booking, BookingId, BookingStatus, BookingView, Cancellation, CancellationId, CancellationRequest,
    DocumentalReview, NewBooking, NewDocumentalReview, Region, ReviewId, ReviewOutcome, Slot, SlotId,
};
use tokio::sync::Mutex;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::{Client, NoTls, Row};

use crate::config::StorageConfig;
use crate::storage_engine::postgres_schema::schema_script;
use crate::storage_engine::storage_engine::{DateFilter, SchedulingStore, SlotFilter};
use crate::storage_engine::{BOOKED_SLOT_MESSAGE, OCCUPIED_SLOT_MESSAGE, UNAVAILABLE_SLOT_MESSAGE};

const BOOKING_SELECT: &str = "
SELECT a.id, a.slot_id, a.nome_beneficiario, a.numero_cartao, a.contato, a.email_contato,
       a.regiao, a.observacao, a.colaborador_email, a.status, a.is_encaixe, s.data_hora
FROM appointments a
JOIN slots s ON s.id = a.slot_id";

const INSERT_BOOKING: &str = "
INSERT INTO appointments
    (slot_id, nome_beneficiario, numero_cartao, contato, email_contato, regiao, observacao,
     colaborador_email, status, is_encaixe)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
RETURNING id";

fn pg_error(context: &str, err: tokio_postgres::Error) -> SchedulingError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        return SchedulingError::conflict(UNAVAILABLE_SLOT_MESSAGE);
    }
    error!("Postgres failure while {}: {}", context, err);
    SchedulingError::storage(format!("{}: {}", context, err))
}

/// Legacy rows may hold NULL in optional text columns.
fn text(row: &Row, column: &str) -> SchedulingResult<String> {
    row.try_get::<_, Option<String>>(column)
        .map(Option::unwrap_or_default)
        .map_err(|e| SchedulingError::storage(format!("reading column {}: {}", column, e)))
}

fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> SchedulingResult<T> {
    row.try_get(name)
        .map_err(|e| SchedulingError::storage(format!("reading column {}: {}", name, e)))
}

fn booking_view_from_row(row: &Row) -> SchedulingResult<BookingView> {
    let region = Region::from_stored(&text(row, "regiao")?);
    let status: BookingStatus = text(row, "status")?
        .parse()
        .map_err(|e| SchedulingError::storage(format!("stored status is invalid: {}", e)))?;
    Ok(BookingView {
        booking: Booking {
            id: BookingId(column(row, "id")?),
            slot_id: SlotId(column(row, "slot_id")?),
            beneficiary_name: text(row, "nome_beneficiario")?,
            card_number: text(row, "numero_cartao")?,
            contact_phone: text(row, "contato")?,
            contact_email: text(row, "email_contato")?,
            region,
            note: text(row, "observacao")?,
            created_by: text(row, "colaborador_email")?,
            status,
            is_override: column(row, "is_encaixe")?,
        },
        starts_at: column(row, "data_hora")?,
    })
}

fn slot_from_row(row: &Row) -> SchedulingResult<Slot> {
    Ok(Slot {
        id: SlotId(column(row, "id")?),
        starts_at: column(row, "data_hora")?,
        available: column(row, "disponivel")?,
    })
}

fn cancellation_from_row(row: &Row) -> SchedulingResult<Cancellation> {
    Ok(Cancellation {
        id: CancellationId(column(row, "id")?),
        slot_starts_at: column(row, "data_hora_agendamento")?,
        beneficiary_name: text(row, "nome_beneficiario")?,
        card_number: text(row, "numero_cartao")?,
        cancelled_by: text(row, "quem_cancelou")?,
        protocol: text(row, "protocolo")?,
        cancelled_at: column(row, "data_cancelamento")?,
    })
}

fn review_from_row(row: &Row) -> SchedulingResult<DocumentalReview> {
    let outcome: ReviewOutcome = text(row, "status")?
        .parse()
        .map_err(|e| SchedulingError::storage(format!("stored review outcome is invalid: {}", e)))?;
    Ok(DocumentalReview {
        id: ReviewId(column(row, "id")?),
        beneficiary_name: text(row, "nome_beneficiario")?,
        card_number: text(row, "numero_cartao")?,
        beneficiary_email: text(row, "email_beneficiario")?,
        outcome,
        recorded_by: text(row, "colaborador_email")?,
        recorded_at: column(row, "data_registro")?,
    })
}

/// Renders `filter` as a `WHERE` clause over `expr::date`, pushing the bound
/// dates onto `params` so placeholders line up.
fn date_clause(expr: &str, filter: &DateFilter, params: &mut Vec<NaiveDate>) -> String {
    let mut conditions = Vec::new();
    let mut push = |op: &str, date: NaiveDate, params: &mut Vec<NaiveDate>| {
        params.push(date);
        conditions.push(format!("{}::date {} ${}", expr, op, params.len()));
    };
    if let Some(from) = filter.from {
        push(">=", from, params);
    }
    if let Some(to) = filter.to {
        push("<=", to, params);
    }
    if let Some(before) = filter.before {
        push("<", before, params);
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn as_params(dates: &[NaiveDate]) -> Vec<&(dyn ToSql + Sync)> {
    dates.iter().map(|d| d as &(dyn ToSql + Sync)).collect()
}

#[derive(Debug)]
pub struct PostgresStorage {
    client: Arc<Mutex<Client>>,
}

impl PostgresStorage {
    pub async fn connect(config: &StorageConfig) -> SchedulingResult<Self> {
        let connection_string = config.connection_string.as_deref().ok_or_else(|| {
            SchedulingError::Configuration("Postgres connection string is required".to_string())
        })?;
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| SchedulingError::storage(format!("Failed to connect to Postgres: {}", e)))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Postgres connection closed with error: {}", e);
            }
        });
        info!("Connected to Postgres");
        Ok(PostgresStorage { client: Arc::new(Mutex::new(client)) })
    }
}

#[async_trait]
impl SchedulingStore for PostgresStorage {
    fn get_type(&self) -> &'static str {
        "postgres"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn init_schema(&self) -> SchedulingResult<()> {
        let client = self.client.lock().await;
        client
            .batch_execute(&schema_script())
            .await
            .map_err(|e| pg_error("creating schema", e))?;
        info!("Postgres schema is in place");
        Ok(())
    }

    async fn insert_slots(&self, instants: &[NaiveDateTime]) -> SchedulingResult<usize> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(|e| pg_error("opening transaction", e))?;
        let mut created = 0;
        for instant in instants {
            created += tx
                .execute(
                    "INSERT INTO slots (data_hora) VALUES ($1) ON CONFLICT (data_hora) DO NOTHING",
                    &[instant],
                )
                .await
                .map_err(|e| pg_error("inserting slot", e))?;
        }
        tx.commit().await.map_err(|e| pg_error("committing slots", e))?;
        Ok(created as usize)
    }

    async fn slots_on(&self, date: NaiveDate, filter: SlotFilter) -> SchedulingResult<Vec<Slot>> {
        let sql = match filter {
            SlotFilter::All => {
                "SELECT id, data_hora, disponivel FROM slots WHERE data_hora::date = $1 ORDER BY data_hora"
            }
            SlotFilter::AvailableOnly => {
                "SELECT id, data_hora, disponivel FROM slots \
                 WHERE data_hora::date = $1 AND disponivel = TRUE ORDER BY data_hora"
            }
        };
        let client = self.client.lock().await;
        let rows = client.query(sql, &[&date]).await.map_err(|e| pg_error("listing slots", e))?;
        rows.iter().map(slot_from_row).collect()
    }

    async fn delete_slot(&self, id: SlotId) -> SchedulingResult<()> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(|e| pg_error("opening transaction", e))?;
        let locked = tx
            .query_opt("SELECT id FROM slots WHERE id = $1 FOR UPDATE", &[&id.0])
            .await
            .map_err(|e| pg_error("locking slot", e))?;
        if locked.is_none() {
            return Err(SchedulingError::not_found(format!("slot {} not found", id)));
        }
        let booked: bool = tx
            .query_one("SELECT EXISTS(SELECT 1 FROM appointments WHERE slot_id = $1)", &[&id.0])
            .await
            .map_err(|e| pg_error("checking slot bookings", e))?
            .get(0);
        if booked {
            return Err(SchedulingError::conflict(BOOKED_SLOT_MESSAGE));
        }
        tx.execute("DELETE FROM slots WHERE id = $1", &[&id.0])
            .await
            .map_err(|e| pg_error("deleting slot", e))?;
        tx.commit().await.map_err(|e| pg_error("committing slot delete", e))
    }

    async fn delete_slots_on(&self, date: NaiveDate) -> SchedulingResult<usize> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(|e| pg_error("opening transaction", e))?;
        tx.query("SELECT id FROM slots WHERE data_hora::date = $1 FOR UPDATE", &[&date])
            .await
            .map_err(|e| pg_error("locking slots", e))?;
        let booked: i64 = tx
            .query_one(
                "SELECT COUNT(*) FROM appointments a JOIN slots s ON s.id = a.slot_id WHERE s.data_hora::date = $1",
                &[&date],
            )
            .await
            .map_err(|e| pg_error("checking date bookings", e))?
            .get(0);
        if booked > 0 {
            return Err(SchedulingError::conflict(BOOKED_SLOT_MESSAGE));
        }
        let deleted = tx
            .execute("DELETE FROM slots WHERE data_hora::date = $1", &[&date])
            .await
            .map_err(|e| pg_error("deleting slots", e))?;
        tx.commit().await.map_err(|e| pg_error("committing date delete", e))?;
        Ok(deleted as usize)
    }

    async fn claim_slot(&self, slot_id: SlotId, booking: NewBooking) -> SchedulingResult<Booking> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(|e| pg_error("opening transaction", e))?;
        let claimed = tx
            .execute(
                "UPDATE slots SET disponivel = FALSE WHERE id = $1 AND disponivel = TRUE",
                &[&slot_id.0],
            )
            .await
            .map_err(|e| pg_error("claiming slot", e))?;
        if claimed == 0 {
            return Err(SchedulingError::conflict(UNAVAILABLE_SLOT_MESSAGE));
        }
        let region = booking.region.as_str();
        let status = BookingStatus::Reserved.as_str();
        let id: i64 = tx
            .query_one(
                INSERT_BOOKING,
                &[
                    &slot_id.0,
                    &booking.beneficiary_name,
                    &booking.card_number,
                    &booking.contact_phone,
                    &booking.contact_email,
                    &region,
                    &booking.note,
                    &booking.created_by,
                    &status,
                    &false,
                ],
            )
            .await
            .map_err(|e| pg_error("inserting booking", e))?
            .get(0);
        tx.commit().await.map_err(|e| pg_error("committing booking", e))?;
        Ok(booking.into_booking(BookingId(id), slot_id, false))
    }

    async fn claim_override_slot(
        &self,
        starts_at: NaiveDateTime,
        booking: NewBooking,
        duplicate_guard: bool,
    ) -> SchedulingResult<Booking> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(|e| pg_error("opening transaction", e))?;

        if duplicate_guard {
            let date = starts_at.date();
            let no_show = BookingStatus::NoShow.as_str();
            let existing = tx
                .query_opt(
                    "SELECT s.data_hora FROM appointments a JOIN slots s ON s.id = a.slot_id \
                     WHERE s.data_hora::date = $1 AND a.status <> $2 \
                       AND ((a.numero_cartao = $3 AND a.numero_cartao <> '') \
                            OR LOWER(a.nome_beneficiario) = LOWER($4)) \
                     ORDER BY s.data_hora LIMIT 1",
                    &[&date, &no_show, &booking.card_number, &booking.beneficiary_name],
                )
                .await
                .map_err(|e| pg_error("checking duplicates", e))?;
            if let Some(row) = existing {
                let at: NaiveDateTime = column(&row, "data_hora")?;
                return Err(SchedulingError::DuplicateEntry { hora: models::timestamp::format_hour_minute(&at) });
            }
        }

        let slot_id: i64 = tx
            .query_one(
                "INSERT INTO slots (data_hora, disponivel) VALUES ($1, FALSE) \
                 ON CONFLICT (data_hora) DO UPDATE SET disponivel = FALSE RETURNING id",
                &[&starts_at],
            )
            .await
            .map_err(|e| pg_error("upserting override slot", e))?
            .get(0);
        let occupied: bool = tx
            .query_one("SELECT EXISTS(SELECT 1 FROM appointments WHERE slot_id = $1)", &[&slot_id])
            .await
            .map_err(|e| pg_error("checking override slot", e))?
            .get(0);
        if occupied {
            return Err(SchedulingError::conflict(OCCUPIED_SLOT_MESSAGE));
        }

        let region = booking.region.as_str();
        let status = BookingStatus::Reserved.as_str();
        let id: i64 = tx
            .query_one(
                INSERT_BOOKING,
                &[
                    &slot_id,
                    &booking.beneficiary_name,
                    &booking.card_number,
                    &booking.contact_phone,
                    &booking.contact_email,
                    &region,
                    &booking.note,
                    &booking.created_by,
                    &status,
                    &true,
                ],
            )
            .await
            .map_err(|e| pg_error("inserting override booking", e))?
            .get(0);
        tx.commit().await.map_err(|e| pg_error("committing override booking", e))?;
        debug!("Override booking {} placed on slot {}", id, slot_id);
        Ok(booking.into_booking(BookingId(id), SlotId(slot_id), true))
    }

    async fn cancel_booking(&self, id: BookingId, request: CancellationRequest) -> SchedulingResult<Cancellation> {
        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(|e| pg_error("opening transaction", e))?;
        let row = tx
            .query_opt(
                "SELECT a.nome_beneficiario, a.numero_cartao, a.slot_id, s.data_hora \
                 FROM appointments a JOIN slots s ON s.id = a.slot_id WHERE a.id = $1 FOR UPDATE OF a",
                &[&id.0],
            )
            .await
            .map_err(|e| pg_error("loading booking", e))?
            .ok_or_else(|| SchedulingError::not_found(format!("booking {} not found", id)))?;
        let beneficiary_name = text(&row, "nome_beneficiario")?;
        let card_number = text(&row, "numero_cartao")?;
        let slot_id: i64 = column(&row, "slot_id")?;
        let slot_starts_at: NaiveDateTime = column(&row, "data_hora")?;

        let cancellation_id: i64 = tx
            .query_one(
                "INSERT INTO cancelamentos \
                 (data_hora_agendamento, nome_beneficiario, numero_cartao, quem_cancelou, protocolo, data_cancelamento) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                &[
                    &slot_starts_at,
                    &beneficiary_name,
                    &card_number,
                    &request.cancelled_by,
                    &request.protocol,
                    &request.cancelled_at,
                ],
            )
            .await
            .map_err(|e| pg_error("writing cancellation", e))?
            .get(0);
        tx.execute("DELETE FROM appointments WHERE id = $1", &[&id.0])
            .await
            .map_err(|e| pg_error("deleting booking", e))?;
        tx.execute("UPDATE slots SET disponivel = TRUE WHERE id = $1", &[&slot_id])
            .await
            .map_err(|e| pg_error("freeing slot", e))?;
        tx.commit().await.map_err(|e| pg_error("committing cancellation", e))?;

        Ok(Cancellation {
            id: CancellationId(cancellation_id),
            slot_starts_at,
            beneficiary_name,
            card_number,
            cancelled_by: request.cancelled_by,
            protocol: request.protocol,
            cancelled_at: request.cancelled_at,
        })
    }

    async fn booking(&self, id: BookingId) -> SchedulingResult<Option<BookingView>> {
        let client = self.client.lock().await;
        let sql = format!("{} WHERE a.id = $1", BOOKING_SELECT);
        let row = client.query_opt(sql.as_str(), &[&id.0]).await.map_err(|e| pg_error("loading booking", e))?;
        row.as_ref().map(booking_view_from_row).transpose()
    }

    async fn set_booking_status(
        &self,
        id: BookingId,
        expected: Option<BookingStatus>,
        to: BookingStatus,
    ) -> SchedulingResult<()> {
        let client = self.client.lock().await;
        let to = to.as_str();
        let updated = match expected {
            Some(from) => {
                let from = from.as_str();
                client
                    .execute(
                        "UPDATE appointments SET status = $1 WHERE id = $2 AND status = $3",
                        &[&to, &id.0, &from],
                    )
                    .await
            }
            None => {
                client
                    .execute("UPDATE appointments SET status = $1 WHERE id = $2", &[&to, &id.0])
                    .await
            }
        }
        .map_err(|e| pg_error("updating status", e))?;
        if updated == 1 {
            return Ok(());
        }
        let exists: bool = client
            .query_one("SELECT EXISTS(SELECT 1 FROM appointments WHERE id = $1)", &[&id.0])
            .await
            .map_err(|e| pg_error("checking booking", e))?
            .get(0);
        if exists {
            Err(SchedulingError::conflict(format!("booking {} changed status concurrently", id)))
        } else {
            Err(SchedulingError::not_found(format!("booking {} not found", id)))
        }
    }

    async fn bookings(&self, filter: DateFilter) -> SchedulingResult<Vec<BookingView>> {
        let mut dates = Vec::new();
        let sql = format!(
            "{}{} ORDER BY s.data_hora ASC, a.id ASC",
            BOOKING_SELECT,
            date_clause("s.data_hora", &filter, &mut dates)
        );
        let client = self.client.lock().await;
        let rows = client
            .query(sql.as_str(), &as_params(&dates))
            .await
            .map_err(|e| pg_error("listing bookings", e))?;
        rows.iter().map(booking_view_from_row).collect()
    }

    async fn cancellations(&self, filter: DateFilter) -> SchedulingResult<Vec<Cancellation>> {
        let mut dates = Vec::new();
        let sql = format!(
            "SELECT id, data_hora_agendamento, nome_beneficiario, numero_cartao, quem_cancelou, protocolo, \
             data_cancelamento FROM cancelamentos{} ORDER BY data_cancelamento ASC",
            date_clause("data_cancelamento", &filter, &mut dates)
        );
        let client = self.client.lock().await;
        let rows = client
            .query(sql.as_str(), &as_params(&dates))
            .await
            .map_err(|e| pg_error("listing cancellations", e))?;
        rows.iter().map(cancellation_from_row).collect()
    }

    async fn insert_review(&self, review: NewDocumentalReview) -> SchedulingResult<DocumentalReview> {
        let client = self.client.lock().await;
        let outcome = review.outcome.as_str();
        let id: i64 = client
            .query_one(
                "INSERT INTO pericia_documental \
                 (nome_beneficiario, numero_cartao, email_beneficiario, status, colaborador_email, data_registro) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                &[
                    &review.beneficiary_name,
                    &review.card_number,
                    &review.beneficiary_email,
                    &outcome,
                    &review.recorded_by,
                    &review.recorded_at,
                ],
            )
            .await
            .map_err(|e| pg_error("inserting documental review", e))?
            .get(0);
        Ok(review.into_review(ReviewId(id)))
    }

    async fn reviews(&self, filter: DateFilter) -> SchedulingResult<Vec<DocumentalReview>> {
        let mut dates = Vec::new();
        let sql = format!(
            "SELECT id, nome_beneficiario, numero_cartao, email_beneficiario, status, colaborador_email, \
             data_registro FROM pericia_documental{} ORDER BY data_registro DESC, id DESC",
            date_clause("data_registro", &filter, &mut dates)
        );
        let client = self.client.lock().await;
        let rows = client
            .query(sql.as_str(), &as_params(&dates))
            .await
            .map_err(|e| pg_error("listing documental reviews", e))?;
        rows.iter().map(review_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn empty_filter_renders_no_where_clause() {
        let mut params = Vec::new();
        assert_eq!(date_clause("s.data_hora", &DateFilter::all(), &mut params), "");
        assert!(params.is_empty());
    }

    #[test]
    fn placeholders_follow_bound_order() {
        let mut params = Vec::new();
        let clause = date_clause("s.data_hora", &DateFilter::between(d(1), d(30)), &mut params);
        assert_eq!(clause, " WHERE s.data_hora::date >= $1 AND s.data_hora::date <= $2");
        assert_eq!(params, vec![d(1), d(30)]);

        let mut params = Vec::new();
        let clause = date_clause("data_registro", &DateFilter::before(d(10)), &mut params);
        assert_eq!(clause, " WHERE data_registro::date < $1");
        assert_eq!(params, vec![d(10)]);
    }

    #[tokio::test]
    async fn connect_requires_connection_string() {
        let err = PostgresStorage::connect(&StorageConfig::default()).await.unwrap_err();
        assert!(matches!(err, SchedulingError::Configuration(_)));
    }

    // Live tests need a disposable database in SCHEDULER_TEST_PG and return
    // early when it is unset. Each truncates every table while holding LIVE_DB.

    const LIVE_DB_ENV: &str = "SCHEDULER_TEST_PG";

    static LIVE_DB: Mutex<()> = Mutex::const_new(());

    fn live_config() -> Option<StorageConfig> {
        let url = std::env::var(LIVE_DB_ENV).ok().filter(|url| !url.trim().is_empty())?;
        Some(StorageConfig { connection_string: Some(url), ..StorageConfig::default() })
    }

    async fn live_store() -> Option<PostgresStorage> {
        let config = live_config()?;
        let store = PostgresStorage::connect(&config).await.unwrap();
        store.init_schema().await.unwrap();
        store
            .client
            .lock()
            .await
            .batch_execute("TRUNCATE appointments, cancelamentos, pericia_documental, slots RESTART IDENTITY CASCADE")
            .await
            .unwrap();
        Some(store)
    }

    async fn raw(store: &PostgresStorage, sql: &str) {
        store.client.lock().await.batch_execute(sql).await.unwrap();
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        d(day).and_hms_opt(hour, minute, 0).unwrap()
    }

    fn new_booking(name: &str, card: &str) -> NewBooking {
        NewBooking {
            beneficiary_name: name.to_string(),
            card_number: card.to_string(),
            contact_phone: "(85) 9 9999-0000".to_string(),
            contact_email: "ana@example.com".to_string(),
            region: Region::Interior,
            note: String::new(),
            created_by: "desk@maida.health".to_string(),
        }
    }

    fn cancel_request(protocol: &str) -> CancellationRequest {
        CancellationRequest {
            cancelled_by: "desk@maida.health".to_string(),
            protocol: protocol.to_string(),
            cancelled_at: at(11, 8, 0),
        }
    }

    fn review(name: &str, recorded_at: NaiveDateTime) -> NewDocumentalReview {
        NewDocumentalReview {
            beneficiary_name: name.to_string(),
            card_number: "123".to_string(),
            beneficiary_email: String::new(),
            outcome: ReviewOutcome::Authorized,
            recorded_by: "chefe@maida.health".to_string(),
            recorded_at,
        }
    }

    #[tokio::test]
    async fn live_insert_slots_is_idempotent() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };

        let instants = [at(10, 10, 0), at(10, 9, 0)];
        assert_eq!(store.insert_slots(&instants).await.unwrap(), 2);
        assert_eq!(store.insert_slots(&instants).await.unwrap(), 0);
        let slots = store.slots_on(d(10), SlotFilter::All).await.unwrap();
        assert_eq!(slots.iter().map(|s| s.starts_at).collect::<Vec<_>>(), vec![at(10, 9, 0), at(10, 10, 0)]);
        assert!(slots.iter().all(|s| s.available));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn live_concurrent_claims_have_exactly_one_winner() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(10, 14, 30)]).await.unwrap();
        let slot_id = store.slots_on(d(10), SlotFilter::All).await.unwrap()[0].id;

        // One connection per contender so the race happens inside Postgres.
        let Some(config) = live_config() else { return };
        let mut contenders = Vec::new();
        for _ in 0..8 {
            contenders.push(Arc::new(PostgresStorage::connect(&config).await.unwrap()));
        }
        let handles: Vec<_> = contenders
            .into_iter()
            .enumerate()
            .map(|(i, contender)| {
                tokio::spawn(async move { contender.claim_slot(slot_id, new_booking(&format!("P{}", i), "")).await })
            })
            .collect();
        let results = futures::future::join_all(handles).await;

        let winners = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Ok(Err(SchedulingError::Conflict(_)))))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.bookings(DateFilter::all()).await.unwrap().len(), 1);
        assert!(store.slots_on(d(10), SlotFilter::AvailableOnly).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn live_claim_unknown_slot_is_conflict() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        let err = store.claim_slot(SlotId(99), new_booking("Ana", "1")).await.unwrap_err();
        assert_eq!(err, SchedulingError::conflict(UNAVAILABLE_SLOT_MESSAGE));
    }

    #[tokio::test]
    async fn live_second_booking_row_on_a_slot_is_a_conflict() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(10, 9, 0)]).await.unwrap();
        store.claim_slot(SlotId(1), new_booking("Ana", "1")).await.unwrap();

        let client = store.client.lock().await;
        let (region, status) = (Region::Capital.as_str(), BookingStatus::Reserved.as_str());
        let (name, empty) = ("Bruno".to_string(), String::new());
        let err = client
            .query_one(
                INSERT_BOOKING,
                &[&1i64, &name, &empty, &empty, &empty, &region, &empty, &empty, &status, &false],
            )
            .await
            .map_err(|e| pg_error("inserting booking", e))
            .unwrap_err();
        assert_eq!(err, SchedulingError::conflict(UNAVAILABLE_SLOT_MESSAGE));
    }

    #[tokio::test]
    async fn live_cancel_writes_audit_and_frees_slot() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(10, 14, 30)]).await.unwrap();
        let booking = store.claim_slot(SlotId(1), new_booking("Ana Silva", "123")).await.unwrap();

        let cancellation = store.cancel_booking(booking.id, cancel_request("PR-1")).await.unwrap();
        assert_eq!(cancellation.protocol, "PR-1");
        assert_eq!(cancellation.slot_starts_at, at(10, 14, 30));
        assert_eq!(cancellation.beneficiary_name, "Ana Silva");

        assert!(store.booking(booking.id).await.unwrap().is_none());
        let audit = store.cancellations(DateFilter::on(d(11))).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].card_number, "123");
        assert_eq!(store.slots_on(d(10), SlotFilter::AvailableOnly).await.unwrap().len(), 1);

        let err = store.cancel_booking(booking.id, cancel_request("PR-2")).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
        assert_eq!(store.cancellations(DateFilter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn live_slot_deletes_respect_bookings() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(10, 9, 0), at(10, 10, 0), at(12, 9, 0)]).await.unwrap();
        store.claim_slot(SlotId(2), new_booking("Ana", "1")).await.unwrap();

        let err = store.delete_slots_on(d(10)).await.unwrap_err();
        assert_eq!(err, SchedulingError::conflict(BOOKED_SLOT_MESSAGE));
        assert_eq!(store.slots_on(d(10), SlotFilter::All).await.unwrap().len(), 2);
        assert_eq!(store.delete_slots_on(d(12)).await.unwrap(), 1);

        assert!(matches!(store.delete_slot(SlotId(2)).await, Err(SchedulingError::Conflict(_))));
        assert!(store.delete_slot(SlotId(1)).await.is_ok());
        assert!(matches!(store.delete_slot(SlotId(1)).await, Err(SchedulingError::NotFound(_))));
        assert_eq!(store.insert_slots(&[at(10, 9, 0)]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn live_override_takes_over_or_creates_slots() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(10, 9, 0)]).await.unwrap();

        let taken = store.claim_override_slot(at(10, 9, 0), new_booking("Ana", "1"), true).await.unwrap();
        assert_eq!(taken.slot_id, SlotId(1));
        assert!(taken.is_override);

        let err = store
            .claim_override_slot(at(10, 9, 0), new_booking("Bruno", "2"), true)
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::conflict(OCCUPIED_SLOT_MESSAGE));

        let created = store.claim_override_slot(at(10, 11, 15), new_booking("Bruno", "2"), true).await.unwrap();
        let slots = store.slots_on(d(10), SlotFilter::All).await.unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].id, created.slot_id);
        assert!(!slots[1].available);
    }

    #[tokio::test]
    async fn live_override_duplicate_guard_reports_existing_time() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.claim_override_slot(at(10, 9, 15), new_booking("Ana Silva", "123"), true).await.unwrap();

        let err = store
            .claim_override_slot(at(10, 11, 0), new_booking("ana silva", ""), true)
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::DuplicateEntry { hora: "09:15".to_string() });
        assert_eq!(store.slots_on(d(10), SlotFilter::All).await.unwrap().len(), 1);

        assert!(store.claim_override_slot(at(11, 11, 0), new_booking("Ana Silva", "123"), true).await.is_ok());
        assert!(store.claim_override_slot(at(10, 11, 0), new_booking("Ana Silva", "123"), false).await.is_ok());
    }

    #[tokio::test]
    async fn live_status_update_modes() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(10, 9, 0)]).await.unwrap();
        let booking = store.claim_slot(SlotId(1), new_booking("Ana", "1")).await.unwrap();

        store
            .set_booking_status(booking.id, Some(BookingStatus::Reserved), BookingStatus::Awaiting)
            .await
            .unwrap();
        let err = store
            .set_booking_status(booking.id, Some(BookingStatus::Reserved), BookingStatus::Attended)
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict(_)));

        store.set_booking_status(booking.id, None, BookingStatus::NoShow).await.unwrap();
        let stored = store.booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking.status, BookingStatus::NoShow);

        let err = store.set_booking_status(BookingId(42), None, BookingStatus::Attended).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }

    #[tokio::test]
    async fn live_rows_with_blank_or_unknown_region_still_list() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(10, 8, 0), at(10, 9, 0), at(10, 10, 0)]).await.unwrap();
        store.claim_slot(SlotId(1), new_booking("Ana", "1")).await.unwrap();
        raw(
            &store,
            "INSERT INTO appointments (slot_id, nome_beneficiario, regiao, status) VALUES (2, 'Bruno', '', 'Agendado');
             INSERT INTO appointments (slot_id, nome_beneficiario, regiao, status) VALUES (3, 'Carla', 'Litoral', 'Agendado');
             UPDATE slots SET disponivel = FALSE WHERE id IN (2, 3);",
        )
        .await;

        let listed = store.bookings(DateFilter::on(d(10))).await.unwrap();
        let regions: Vec<Region> = listed.iter().map(|v| v.booking.region).collect();
        assert_eq!(regions, vec![Region::Interior, Region::Unknown, Region::Unknown]);
        assert_eq!(listed[1].booking.card_number, "");
        assert_eq!(listed[1].booking.created_by, "");
    }

    #[tokio::test]
    async fn live_listings_follow_date_filters_and_order() {
        let _guard = LIVE_DB.lock().await;
        let Some(store) = live_store().await else { return };
        store.insert_slots(&[at(12, 9, 0), at(10, 15, 0), at(10, 8, 0)]).await.unwrap();
        for id in 1..=3 {
            store.claim_slot(SlotId(id), new_booking(&format!("P{}", id), "")).await.unwrap();
        }
        let day = store.bookings(DateFilter::on(d(10))).await.unwrap();
        let times: Vec<String> = day.iter().map(|v| v.hour_minute()).collect();
        assert_eq!(times, vec!["08:00", "15:00"]);
        assert_eq!(store.bookings(DateFilter::before(d(12))).await.unwrap().len(), 2);
        assert_eq!(store.bookings(DateFilter::between(d(11), d(30))).await.unwrap().len(), 1);

        store.insert_review(review("Ana", at(10, 9, 0))).await.unwrap();
        let newest = store.insert_review(review("Bruno", at(11, 9, 0))).await.unwrap();
        let reviews = store.reviews(DateFilter::all()).await.unwrap();
        assert_eq!(reviews[0].id, newest.id);
        assert_eq!(reviews[0].outcome, ReviewOutcome::Authorized);
        assert_eq!(store.reviews(DateFilter::on(d(10))).await.unwrap().len(), 1);
    }
}
