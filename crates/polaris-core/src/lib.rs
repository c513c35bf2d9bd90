#![deny(missing_docs)]

//! # polaris-core — Foundational Types for the Polaris Audit Stack
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `thiserror`,
//! `chrono`, `uuid`, `parking_lot`, and `tracing` from the external
//! ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for backend identifiers.** Every identifier is a
//!    distinct type. You cannot pass a [`GroupId`] where a [`PolicyId`] is
//!    expected, even though both are opaque backend strings.
//!
//! 2. **Single [`ComplianceState`] enumeration.** Backend status text is
//!    normalized into this closed enum exactly once, at the adapter
//!    boundary. All downstream logic matches on the enum, never on text.
//!
//! 3. **Explicit [`RunContext`].** One context per audit run, passed into
//!    every component that can surface diagnostics. No process-wide state
//!    survives a run.
//!
//! 4. **[`CoreError`] hierarchy.** Structured errors with `thiserror` — no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod context;
pub mod error;
pub mod identity;
pub mod state;
pub mod warning;

pub use context::RunContext;
pub use error::{CoreError, ValidationError};
pub use identity::{DeviceId, FilterId, GroupId, PolicyId};
pub use state::ComplianceState;
pub use warning::{DataIntegrityWarning, IntegrityWarningKind};
