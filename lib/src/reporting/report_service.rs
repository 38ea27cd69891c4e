// lib/src/reporting/report_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use models::errors::{SchedulingError, SchedulingResult};
use models::timestamp::{format_display_date, weekday_index};
use models::{Actor, BookingStatus, BookingView, Cancellation, DocumentalReview, ReviewOutcome};

use crate::identity::{authorize, Operation};
use crate::reporting::report_types::{DashboardStats, PendingAlerts, Report, ReportEntry};
use crate::storage_engine::{DateFilter, SchedulingStore};
use crate::util::Clock;

/// Bucket for bookings with no recorded collaborator.
pub const UNKNOWN_BOOKER: &str = "Sistema/Desconhecido";
/// Bucket for cancellations with no recorded collaborator.
pub const UNKNOWN_CANCELLER: &str = "Sistema";

fn collaborator(email: &str, fallback: &str) -> String {
    if email.trim().is_empty() {
        fallback.to_string()
    } else {
        email.to_string()
    }
}

/// Distinct dates among unresolved bookings. Expects `views` in slot order.
pub fn pending_dates(views: &[BookingView]) -> PendingAlerts {
    let mut datas: Vec<String> = Vec::new();
    let mut last: Option<NaiveDate> = None;
    for view in views.iter().filter(|v| !v.booking.status.is_resolved()) {
        if last != Some(view.date()) {
            last = Some(view.date());
            datas.push(format_display_date(&view.date()));
        }
    }
    PendingAlerts { pendencias: datas.len(), datas }
}

pub fn summarize_report(views: &[BookingView]) -> Report {
    let mut report = Report::default();
    for view in views.iter().filter(|v| v.booking.status.is_resolved()) {
        report.total += 1;
        match view.booking.status {
            BookingStatus::Attended => report.atendidos += 1,
            BookingStatus::NoShow => report.nao_compareceu += 1,
            _ => {}
        }
        report.regiao.add(view.booking.region);
        report.lista_detalhada.push(ReportEntry::from(view));
    }
    report
}

pub fn summarize_dashboard(
    views: &[BookingView],
    cancellations: &[Cancellation],
    reviews: &[DocumentalReview],
) -> DashboardStats {
    let mut stats = DashboardStats { total: views.len(), ..DashboardStats::default() };

    for view in views {
        let booking = &view.booking;
        match booking.status {
            BookingStatus::Attended => stats.status.atendido += 1,
            BookingStatus::NoShow => stats.status.nao_compareceu += 1,
            BookingStatus::Reserved | BookingStatus::Awaiting => stats.status.pendente += 1,
        }
        if booking.is_override {
            stats.tipo.encaixe += 1;
        } else {
            stats.tipo.normal += 1;
        }
        stats.regiao.add(booking.region);
        *stats
            .colaboradores_agend
            .entry(collaborator(&booking.created_by, UNKNOWN_BOOKER))
            .or_insert(0) += 1;
        stats.fluxo_semana[weekday_index(&view.date())] += 1;
    }

    for cancellation in cancellations {
        *stats
            .colaboradores_cancel
            .entry(collaborator(&cancellation.cancelled_by, UNKNOWN_CANCELLER))
            .or_insert(0) += 1;
    }

    stats.pericia.total = reviews.len();
    for review in reviews {
        match review.outcome {
            ReviewOutcome::Authorized => stats.pericia.autorizado += 1,
            ReviewOutcome::Denied => stats.pericia.indeferido += 1,
            ReviewOutcome::PartiallyAuthorized => stats.pericia.parcial += 1,
        }
        stats.pericia.fluxo_semana[weekday_index(&review.recorded_at.date())] += 1;
    }
    stats
}

/// Read-only aggregations over bookings, cancellations and reviews.
pub struct ReportingReader {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
}

impl ReportingReader {
    pub fn new(store: Arc<dyn SchedulingStore>, clock: Arc<dyn Clock>) -> Self {
        ReportingReader { store, clock }
    }

    /// Past dates that still hold bookings neither attended nor marked no-show.
    pub async fn pending_alerts(&self, actor: &Actor) -> SchedulingResult<PendingAlerts> {
        authorize(actor, Operation::PendingAlerts)?;
        let views = self.store.bookings(DateFilter::before(self.clock.today())).await?;
        let alerts = pending_dates(&views);
        debug!("{} dates with unresolved bookings", alerts.pendencias);
        Ok(alerts)
    }

    pub async fn report(&self, actor: &Actor, from: NaiveDate, to: NaiveDate) -> SchedulingResult<Report> {
        authorize(actor, Operation::Reports)?;
        check_range(from, to)?;
        let views = self.store.bookings(DateFilter::between(from, to)).await?;
        Ok(summarize_report(&views))
    }

    /// Bookings are bucketed by slot date, cancellations by the day they
    /// happened and reviews by the day they were recorded.
    pub async fn dashboard(&self, actor: &Actor, from: NaiveDate, to: NaiveDate) -> SchedulingResult<DashboardStats> {
        authorize(actor, Operation::Dashboard)?;
        check_range(from, to)?;
        let filter = DateFilter::between(from, to);
        let (views, cancellations, reviews) = futures::try_join!(
            self.store.bookings(filter),
            self.store.cancellations(filter),
            self.store.reviews(filter)
        )?;
        Ok(summarize_dashboard(&views, &cancellations, &reviews))
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> SchedulingResult<()> {
    if from > to {
        return Err(SchedulingError::validation(format!(
            "start date {} is after end date {}",
            from, to
        )));
    }
    Ok(())
}
