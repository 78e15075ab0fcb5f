//! # FitTrack Database Crate
//!
//! The application-specific interface to the hosted record store. Workouts are
//! a three-level aggregate (session → exercises → sets) but the store only has
//! flat tables, no joins across the wire, no multi-row transactions and no
//! cascading deletes. This crate does the fan-out and fan-in by hand.
//!
//! ## Public API
//!
//! - `WorkoutRepository`: create, read (single and list) and delete whole aggregates.
//! - `CommittedRows` / `CascadeReport`: what a partial create or a best-effort
//!   delete actually did.
//! - `DbError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod repository;
pub mod tables;

pub use error::DbError;
pub use repository::{CascadeFailure, CascadeReport, CascadeStep, CommittedRows, WorkoutRepository};
