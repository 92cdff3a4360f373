//! Core types and trait definitions for the SentriHawk visitor ledger.
//!
//! No database or I/O dependencies. Lifecycle transitions and dashboard
//! projections are pure functions over [`visitor::Visitor`] values; storage
//! backends persist the results.

pub mod dashboard;
pub mod error;
pub mod history;
pub mod legacy;
pub mod lifecycle;
pub mod package;
pub mod session;
pub mod store;
pub mod visitor;

pub use error::{Error, Result};
