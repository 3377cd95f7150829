//! Reminder scheduling for veterinary practice management.
//!
//! A SQLite-backed engine that turns reminder configuration (types,
//! escalation counts, channel rules) into concrete send work: pending
//! items queried through a mutation-resilient paginated cursor, grouped
//! per recipient for combined delivery, and generated per escalation
//! level by the rule processor.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
