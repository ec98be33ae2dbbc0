//! Carelog — personal health-records and scheduling service.
//!
//! Health events (consultations, exams, procedures, medication) are tied
//! to one professional, one calendar date, and a start/end time window;
//! each event carries a per-slot document repository of attached files.
//! Everything is exposed as a local HTTP JSON API backed by SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod schedule;
pub mod storage;
