// lib/src/reporting/report_types.rs

//! Read models returned by the reporting endpoints. Field names are the ones
//! the dashboard front end reads.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use models::{BookingStatus, BookingView, Region};
use serde::{Deserialize, Serialize};

/// Day-of-week histogram, index 0 is Sunday.
pub type WeekHistogram = [usize; 7];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCounts {
    pub capital: usize,
    pub interior: usize,
    pub metropolitana: usize,
}

impl RegionCounts {
    pub fn add(&mut self, region: Region) {
        match region {
            Region::Capital => self.capital += 1,
            Region::Interior => self.interior += 1,
            Region::Metropolitan => self.metropolitana += 1,
            Region::Unknown => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAlerts {
    pub pendencias: usize,
    /// `DD/MM/YYYY`, ascending.
    pub datas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub data_formatada: String,
    pub hora: String,
    pub data_hora: NaiveDateTime,
    pub nome_beneficiario: String,
    pub numero_cartao: String,
    pub regiao: Region,
    pub status: BookingStatus,
    pub is_encaixe: bool,
    pub observacao: String,
}

impl From<&BookingView> for ReportEntry {
    fn from(view: &BookingView) -> Self {
        ReportEntry {
            data_formatada: view.display_date(),
            hora: view.hour_minute(),
            data_hora: view.starts_at,
            nome_beneficiario: view.booking.beneficiary_name.clone(),
            numero_cartao: view.booking.card_number.clone(),
            regiao: view.booking.region,
            status: view.booking.status,
            is_encaixe: view.booking.is_override,
            observacao: view.booking.note.clone(),
        }
    }
}

/// Closed-out bookings (Attended or No-Show) in a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub total: usize,
    pub atendidos: usize,
    pub nao_compareceu: usize,
    pub regiao: RegionCounts,
    pub lista_detalhada: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub atendido: usize,
    pub nao_compareceu: usize,
    pub pendente: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub normal: usize,
    pub encaixe: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: usize,
    pub autorizado: usize,
    pub indeferido: usize,
    pub parcial: usize,
    pub fluxo_semana: WeekHistogram,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub status: StatusCounts,
    pub tipo: KindCounts,
    pub regiao: RegionCounts,
    pub colaboradores_agend: BTreeMap<String, usize>,
    pub colaboradores_cancel: BTreeMap<String, usize>,
    pub pericia: ReviewStats,
    pub fluxo_semana: WeekHistogram,
}
