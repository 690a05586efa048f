#![doc = "book-courier-core: publish-once scheduling for book-courier."]

//! This crate holds the scheduling logic: it scans an inbox directory, decides
//! which books still need publishing, hands them to a [`contract::Channel`],
//! and records each published book so it is never sent twice.
//! Transport code (the Telegram client) lives in the `book-courier` crate.
//!
//! # Usage
//! Build a [`config::CourierConfig`], wrap a channel and caption generator in a
//! [`cycle::ScanCycle`], then either call `run_cycle` once or hand the cycle to
//! a [`supervisor::Supervisor`].

pub mod caption;
pub mod config;
pub mod contract;
pub mod cycle;
pub mod identity;
pub mod ledger;
pub mod publisher;
pub mod store;
pub mod supervisor;

pub use cycle::{CycleError, CycleReport, ScanCycle};
pub use identity::{identity, BookIdentity};
pub use supervisor::{StopHandle, Supervisor};
