//! Configuration loading and validation for the vault.
//!
//! All values are read from environment variables at startup. The crypto core
//! never reads configuration; only the binary does, and hands the decoded KEK
//! down explicitly.

use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::crypto::Kek;
use crate::vault::AadPolicy;

/// Validated vault configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded Key Encryption Key (32, 48 or 64 hex digits). **Required.**
    pub kek_hex: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bind each note's id to its ciphertext as associated data.
    #[serde(default)]
    pub bind_record_id: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `KEK_HEX` is absent or invalid, or if any other
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Decode `KEK_HEX` into a [`Kek`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not hex or not an AES key size.
    pub fn kek(&self) -> Result<Kek> {
        let bytes = Zeroizing::new(
            hex::decode(self.kek_hex.trim()).context("KEK_HEX must be hex-encoded")?,
        );
        Kek::new(&bytes).context("KEK_HEX must decode to 16, 24 or 32 bytes")
    }

    /// The associated-data policy selected by `BIND_RECORD_ID`.
    pub fn aad_policy(&self) -> AadPolicy {
        if self.bind_record_id {
            AadPolicy::RecordId
        } else {
            AadPolicy::None
        }
    }

    fn validate(&self) -> Result<()> {
        if self.kek_hex.trim().is_empty() {
            anyhow::bail!("KEK_HEX is required and must not be empty");
        }
        self.kek()?;
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("kek_hex", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .field("bind_record_id", &self.bind_record_id)
            .finish()
    }
}
