// lib/src/reporting/mod.rs

pub mod report_service;
pub mod report_types;

pub use report_service::{pending_dates, summarize_dashboard, summarize_report, ReportingReader};
pub use report_types::{
    DashboardStats, KindCounts, PendingAlerts, RegionCounts, Report, ReportEntry, ReviewStats, StatusCounts,
    WeekHistogram,
};
