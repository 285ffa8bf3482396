//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No note text or key material** must appear in any log field. Events
//!   carry note ids, patient ids and error kinds only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden by
//!   `RUST_LOG` when set.

pub mod init;

pub use init::init;
