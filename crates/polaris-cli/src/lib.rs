//! # polaris-cli — Command-Line Interface
//!
//! Provides the `polaris` binary: offline policy-targeting resolution and
//! compliance-reconciliation audits for one managed device, driven by a
//! captured backend snapshot.
//!
//! ## Subcommands
//!
//! - `polaris audit` — full pipeline: targeting, concurrent source
//!   fetches, reconciliation, report.
//! - `polaris targeting` — targeting resolution only, no compliance
//!   fetches.
//!
//! ```bash
//! polaris audit device-snapshot.json --output report.json
//! polaris targeting device-snapshot.json --policy-id pol-1
//! polaris -vv audit device-snapshot.json --json
//! ```

pub mod audit;
pub mod input;
pub mod targeting;
