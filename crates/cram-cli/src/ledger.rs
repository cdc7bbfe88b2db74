//! # Ledger File I/O
//!
//! The CLI persists the whole studio as one pretty-printed JSON file.
//! A missing file is a fresh studio with the default tuition table, so
//! the first command needs no separate init step.

use std::fs;
use std::path::Path;

use anyhow::Context;

use cram_service::StudioService;

/// Load the service from the ledger file, or start fresh if it does not
/// exist yet.
pub fn load_service(path: &Path) -> anyhow::Result<StudioService> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no ledger file; starting fresh");
        return Ok(StudioService::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading ledger file {}", path.display()))?;
    let service = serde_json::from_str(&data)
        .with_context(|| format!("parsing ledger file {}", path.display()))?;
    Ok(service)
}

/// Write the service back to the ledger file.
pub fn save_service(path: &Path, service: &StudioService) -> anyhow::Result<()> {
    let mut data = serde_json::to_string_pretty(service).context("serializing ledger")?;
    data.push('\n');
    fs::write(path, data).with_context(|| format!("writing ledger file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "ledger saved");
    Ok(())
}
