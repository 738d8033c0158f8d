//! # rf-rules
//!
//! The declarative rules document that drives a remix run.
//!
//! - [`RuleDocument`] -- `global` settings, optional `preprocessing`, and the
//!   ordered operations list.
//! - [`Operation`] -- the closed set of operation types with their defaults.
//! - [`OperationSlot`] -- an operations-array element, known or skipped.

pub mod document;
pub mod operation;

pub use document::{GlobalSettings, Preprocessing, RuleDocument};
pub use operation::{BleepRange, Operation, OperationSlot, KNOWN_KINDS};
