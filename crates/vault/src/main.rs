//! `vault-demo` — stores one encrypted note and reads it back.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Decode the KEK and build a [`NoteVault`] over an in-memory store.
//! 4. Insert a demo note, list it, and decrypt it again.

use anyhow::{Context, Result};
use tracing::info;

use vault::config::Config;
use vault::{MemoryStore, NoteVault};

const DEMO_PATIENT_ID: u64 = 999;
const DEMO_AUTHOR: &str = "dr.sen";
const DEMO_NOTE: &str = "BP stable. Continue meds.";

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    vault::telemetry::init(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "vault-demo starting");

    // -----------------------------------------------------------------------
    // 3. Vault
    // -----------------------------------------------------------------------
    let kek = cfg.kek()?;
    info!(kek_bits = kek.bits(), aad_policy = ?cfg.aad_policy(), "KEK loaded");
    let vault = NoteVault::new(kek, MemoryStore::new()).with_aad_policy(cfg.aad_policy());

    // -----------------------------------------------------------------------
    // 4. Round trip
    // -----------------------------------------------------------------------
    let note_id = vault
        .create_note(DEMO_PATIENT_ID, DEMO_AUTHOR, DEMO_NOTE)
        .await
        .context("failed to store demo note")?;

    let listed = vault.list_notes(Some(DEMO_PATIENT_ID)).await?;
    info!(patient_id = DEMO_PATIENT_ID, count = listed.len(), "notes listed");

    let view = vault
        .read_note(note_id)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read demo note: {}", e.public()))?;

    anyhow::ensure!(view.content == DEMO_NOTE, "decrypted note does not match");
    info!(note_id = %note_id, "demo note round-tripped");
    Ok(())
}
