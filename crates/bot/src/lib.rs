//! `tavern-bot` library crate.
//!
//! The Discord gateway binary lives in `main.rs`; everything it wires
//! together is exposed here for testing:
//!
//! - [`ledger`] -- the [`XpLedger`](ledger::XpLedger) storage seam and its
//!   Postgres implementation.
//! - [`accrual`] -- the per-message XP accrual orchestrator.
//! - [`locks`] -- per-owner async locks serializing ledger cycles.
//! - [`commands`] -- slash-command definitions and handlers.
//! - [`handler`] -- the serenity event handler.

pub mod accrual;
pub mod commands;
pub mod config;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod locks;
