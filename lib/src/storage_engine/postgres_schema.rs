// lib/src/storage_engine/postgres_schema.rs
//! Table layout shared with the legacy deployment. Column names are kept so an
//! existing database can be pointed at without migration.

pub const CREATE_SLOTS: &str = "
CREATE TABLE IF NOT EXISTS slots (
    id BIGSERIAL PRIMARY KEY,
    data_hora TIMESTAMP NOT NULL UNIQUE,
    disponivel BOOLEAN NOT NULL DEFAULT TRUE
)";

pub const CREATE_APPOINTMENTS: &str = "
CREATE TABLE IF NOT EXISTS appointments (
    id BIGSERIAL PRIMARY KEY,
    slot_id BIGINT NOT NULL UNIQUE REFERENCES slots(id),
    nome_beneficiario TEXT NOT NULL,
    numero_cartao TEXT,
    contato TEXT,
    email_contato TEXT,
    regiao TEXT NOT NULL,
    observacao TEXT,
    colaborador_email TEXT,
    status TEXT NOT NULL DEFAULT 'Agendado',
    is_encaixe BOOLEAN NOT NULL DEFAULT FALSE
)";

/// Databases created before the column carried `UNIQUE` get the guard here.
pub const INDEX_APPOINTMENT_SLOT: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS appointments_slot_id_key ON appointments (slot_id)";

pub const CREATE_CANCELLATIONS: &str = "
CREATE TABLE IF NOT EXISTS cancelamentos (
    id BIGSERIAL PRIMARY KEY,
    data_hora_agendamento TIMESTAMP NOT NULL,
    nome_beneficiario TEXT,
    numero_cartao TEXT,
    quem_cancelou TEXT,
    protocolo TEXT NOT NULL,
    data_cancelamento TIMESTAMP NOT NULL DEFAULT NOW()
)";

pub const CREATE_DOCUMENTAL_REVIEWS: &str = "
CREATE TABLE IF NOT EXISTS pericia_documental (
    id BIGSERIAL PRIMARY KEY,
    nome_beneficiario TEXT NOT NULL,
    numero_cartao TEXT,
    email_beneficiario TEXT,
    status TEXT NOT NULL,
    colaborador_email TEXT,
    data_registro TIMESTAMP NOT NULL DEFAULT NOW()
)";

/// In dependency order.
pub const SCHEMA_STATEMENTS: [&str; 5] = [
    CREATE_SLOTS,
    CREATE_APPOINTMENTS,
    INDEX_APPOINTMENT_SLOT,
    CREATE_CANCELLATIONS,
    CREATE_DOCUMENTAL_REVIEWS,
];

pub fn schema_script() -> String {
    SCHEMA_STATEMENTS.join(";\n") + ";"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_creates_every_table_once() {
        let script = schema_script();
        for table in ["slots", "appointments", "cancelamentos", "pericia_documental"] {
            let needle = format!("CREATE TABLE IF NOT EXISTS {} (", table);
            assert_eq!(script.matches(&needle).count(), 1, "{}", table);
        }
        assert!(script.find("slots (").unwrap() < script.find("appointments (").unwrap());
    }

    #[test]
    fn one_booking_per_slot_is_enforced_by_an_index() {
        let script = schema_script();
        let index = script
            .find("CREATE UNIQUE INDEX IF NOT EXISTS appointments_slot_id_key ON appointments (slot_id)")
            .unwrap();
        assert!(script.find("CREATE TABLE IF NOT EXISTS appointments (").unwrap() < index);
        assert!(index < script.find("CREATE TABLE IF NOT EXISTS cancelamentos (").unwrap());
    }
}
